//! Progress reporting from the canvas to its host.
//!
//! The host hands over a one-way sink at creation. The canvas reports once
//! per driven frame and never after destruction begins.

use std::fmt;

/// Wire value reported when the frame budget is used up.
pub const STATUS_BUDGET_EXHAUSTED: i32 = -1;
/// Wire value reported when a frame could not be presented this tick.
pub const STATUS_PRESENT_FAILED: i32 = -2;

/// Highest frame number a canvas reports. The counter holds here once
/// reached, so every value fits the host callback's `int32`.
pub const MAX_FRAME: u32 = i32::MAX as u32;

/// Outcome of one Drive Frame call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame was presented; carries the 1-based frame counter.
    Presented(u32),
    /// The frame budget is exhausted; nothing was rendered.
    BudgetExhausted,
    /// Rendering ran but presentation failed; the counter did not advance.
    PresentFailed,
}

impl FrameStatus {
    /// Encode for the `(int32) -> void` host callback.
    pub fn to_wire(self) -> i32 {
        match self {
            FrameStatus::Presented(frame) => frame.min(MAX_FRAME) as i32,
            FrameStatus::BudgetExhausted => STATUS_BUDGET_EXHAUSTED,
            FrameStatus::PresentFailed => STATUS_PRESENT_FAILED,
        }
    }

    /// Decode a value received by the host callback.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            STATUS_BUDGET_EXHAUSTED => Some(FrameStatus::BudgetExhausted),
            STATUS_PRESENT_FAILED => Some(FrameStatus::PresentFailed),
            v if v >= 1 => Some(FrameStatus::Presented(v as u32)),
            _ => None,
        }
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameStatus::Presented(n) => write!(f, "frame {n}"),
            FrameStatus::BudgetExhausted => f.write_str("budget exhausted"),
            FrameStatus::PresentFailed => f.write_str("present failed"),
        }
    }
}

/// Receiver of per-frame progress.
///
/// Implementations must not call back into the canvas that reports to them.
pub trait ProgressSink: Send {
    fn report(&mut self, status: FrameStatus);
}

impl<F> ProgressSink for F
where
    F: FnMut(FrameStatus) + Send,
{
    fn report(&mut self, status: FrameStatus) {
        self(status)
    }
}

/// Host callback with the C signature `void (*)(int32_t)`.
#[derive(Clone, Copy)]
pub struct HostCallback(pub extern "C" fn(i32));

impl ProgressSink for HostCallback {
    fn report(&mut self, status: FrameStatus) {
        (self.0)(status.to_wire())
    }
}

/// Sink for hosts that pass no callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&mut self, _status: FrameStatus) {}
}
