//! Lifecycle and notification types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a reveal engine. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LifecycleState {
    #[default]
    Closed,
    Closing,
    Open,
    Opening,
    Dragging,
}

impl LifecycleState {
    /// Stable integer code used in persisted state.
    pub fn code(self) -> i32 {
        match self {
            Self::Closed => 0,
            Self::Closing => 1,
            Self::Open => 2,
            Self::Opening => 3,
            Self::Dragging => 4,
        }
    }

    /// Inverse of [`LifecycleState::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Closed),
            1 => Some(Self::Closing),
            2 => Some(Self::Open),
            3 => Some(Self::Opening),
            4 => Some(Self::Dragging),
            _ => None,
        }
    }

    /// Stable name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "state_close",
            Self::Closing => "state_closing",
            Self::Open => "state_open",
            Self::Opening => "state_opening",
            Self::Dragging => "state_dragging",
        }
    }

    /// Open or opening.
    pub fn is_open_leaning(self) -> bool {
        matches!(self, Self::Open | Self::Opening)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slide progress reported whenever the main panel moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlideEvent {
    Closed,
    Opened,
    /// 0.0 at closed, 1.0 at open.
    Sliding(f32),
}

/// Requests the engine queues for its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Run another layout pass.
    RequestLayout,
    /// Ask the scrollable ancestor to stop intercepting the current gesture.
    DisallowParentIntercept,
}
