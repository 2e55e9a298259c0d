//! Baseline example: a full-surface clear that breathes with the frame counter.

use crate::palette;
use wia_core::FrameInfo;

#[derive(Debug, Default)]
pub struct PulseScene;

impl PulseScene {
    pub fn new() -> Self {
        PulseScene
    }

    pub fn clear_color(&self, frame: &FrameInfo) -> wgpu::Color {
        palette::to_wgpu(palette::pulse(frame.frame))
    }
}
