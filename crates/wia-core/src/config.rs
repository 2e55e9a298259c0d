//! Canvas configuration.
//!
//! Hosts either rely on the defaults (the plain C factory) or pass a JSON
//! document through the extended factory. Every field is optional.

use crate::error::CanvasError;
use crate::example::ExampleKind;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

// ─── Frame budget ───────────────────────────────────────────────────────────

/// Cap on the number of frames a canvas actively renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameBudget {
    #[default]
    Unbounded,
    Limited(NonZeroU32),
}

impl FrameBudget {
    /// `max_frames <= 0` means unbounded.
    pub fn from_max_frames(max_frames: i32) -> Self {
        u32::try_from(max_frames)
            .ok()
            .and_then(NonZeroU32::new)
            .map_or(FrameBudget::Unbounded, FrameBudget::Limited)
    }

    /// True once `presented` frames have used up the budget.
    pub fn is_exhausted(self, presented: u32) -> bool {
        match self {
            FrameBudget::Unbounded => false,
            FrameBudget::Limited(max) => presented >= max.get(),
        }
    }
}

// ─── Adapter hints ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerPreference {
    LowPower,
    #[default]
    HighPerformance,
}

// ─── Config ─────────────────────────────────────────────────────────────────

/// Creation parameters for a canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Frame budget; zero or negative for unbounded.
    pub max_frames: i32,
    /// Example active right after creation.
    pub initial_example: ExampleKind,
    /// Initial surface width in physical pixels.
    pub width: u32,
    /// Initial surface height in physical pixels.
    pub height: u32,
    pub power_preference: PowerPreference,
    /// Wait for vertical blank when presenting.
    pub vsync: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_frames: 0,
            initial_example: ExampleKind::default(),
            width: 800,
            height: 600,
            power_preference: PowerPreference::default(),
            vsync: true,
        }
    }
}

impl CanvasConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    /// Malformed JSON, unknown fields and unknown examples are reported as
    /// [`CanvasError::Initialization`].
    pub fn from_json(text: &str) -> Result<Self, CanvasError> {
        let config: CanvasConfig = serde_json::from_str(text)
            .map_err(|e| CanvasError::Initialization(format!("invalid canvas config: {e}")))?;
        log::debug!("parsed canvas config: {config:?}");
        Ok(config)
    }

    /// Builder-style override of the frame budget.
    pub fn with_max_frames(mut self, max_frames: i32) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn budget(&self) -> FrameBudget {
        FrameBudget::from_max_frames(self.max_frames)
    }
}
