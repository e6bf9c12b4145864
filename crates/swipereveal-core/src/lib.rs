//! SwipeReveal Core Library
//!
//! Headless swipe-to-reveal state machine for list rows, plus a coordinator
//! that keeps reveal state stable across recycled rows.

pub mod config;
pub mod coordinator;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod input;
pub mod reveal;

pub use config::RevealConfig;
pub use coordinator::{RevealCoordinator, STATES_BUNDLE_KEY, SharedEngine, StateBundle, share};
pub use error::{RevealError, RevealResult};
pub use geometry::{Axis, DragEdge, PanelGeometry, RevealMode};
pub use input::PointerEvent;
pub use reveal::{HostRequest, LifecycleState, Panels, RevealEngine, SlideEvent};
