//! Built-in example catalogue.
//!
//! Examples are addressed by index across the C boundary and by name in
//! configuration. Index 0 is the baseline selected at creation.

use crate::error::CanvasError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One of the fixed rendering configurations a canvas can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExampleKind {
    /// Full-surface clear that breathes with the frame counter.
    #[default]
    Pulse,
    /// Rotating filled polygon.
    Polygon,
    /// Animated Bézier curves drawn as lines.
    Lines,
}

impl ExampleKind {
    /// Every example, in index order.
    pub const ALL: [ExampleKind; 3] = [ExampleKind::Pulse, ExampleKind::Polygon, ExampleKind::Lines];

    /// Number of built-in examples.
    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> i32 {
        match self {
            ExampleKind::Pulse => 0,
            ExampleKind::Polygon => 1,
            ExampleKind::Lines => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExampleKind::Pulse => "pulse",
            ExampleKind::Polygon => "polygon",
            ExampleKind::Lines => "lines",
        }
    }

    /// Look up an example by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl TryFrom<i32> for ExampleKind {
    type Error = CanvasError;

    fn try_from(index: i32) -> Result<Self, Self::Error> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(CanvasError::InvalidIndex {
                index,
                count: Self::COUNT,
            })
    }
}

impl fmt::Display for ExampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Serde: accept either a name or an index ────────────────────────────────

impl Serialize for ExampleKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ExampleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Index(i32),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Index(i) => ExampleKind::try_from(i).map_err(serde::de::Error::custom),
            Repr::Name(name) => ExampleKind::from_name(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown example `{name}`"))),
        }
    }
}
