//! Per-instance swipe-to-reveal engine.
//!
//! One engine owns the placement of a main panel and a secondary panel:
//! - Layout passes derive the resting rectangles
//! - Pointer samples drive capture, clamped drags and release decisions
//! - Settles are stepped by the host's frame clock
//!
//! Panels stay host-owned data. The engine only tells the host where they go.

mod engine;
mod state;

pub use engine::{LifecycleListener, Panels, RevealEngine, SlideListener};
pub use state::{HostRequest, LifecycleState, SlideEvent};
