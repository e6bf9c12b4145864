//! Drag capture and settle motion for the main panel.
//!
//! The helper only tracks pointer deltas, its own drag state and the in-flight
//! settle. Clamping and panel placement stay with the engine, which owns the
//! geometry.

use std::time::Duration;

use kurbo::Point;

/// Base duration of a settle covering the full secondary extent at rest.
pub const BASE_SETTLE_DURATION: Duration = Duration::from_millis(256);
/// Upper bound for any settle.
pub const MAX_SETTLE_DURATION: Duration = Duration::from_millis(600);

/// State of the drag helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// The main panel is captured and follows the pointer.
    Dragging,
    /// The main panel is animating towards a target.
    Settling,
}

/// Quintic ease-out, fast start and gentle landing.
fn ease_out_quint(t: f64) -> f64 {
    let t = t - 1.0;
    t * t * t * t * t + 1.0
}

/// An animated move of the main panel origin towards a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleMotion {
    from: Point,
    to: Point,
    elapsed: Duration,
    duration: Duration,
}

impl SettleMotion {
    /// Plan a settle; `extent` is the full travel range on the drag axis.
    pub fn new(from: Point, to: Point, extent: f64) -> Self {
        let distance = (to - from).hypot();
        let duration = if extent > 0.0 {
            BASE_SETTLE_DURATION
                .mul_f64(1.0 + distance / extent)
                .min(MAX_SETTLE_DURATION)
        } else {
            BASE_SETTLE_DURATION
        };
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Planned duration of the whole settle.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the settle has reached its target.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` and return the new position. Lands exactly on the
    /// target once the duration has elapsed.
    pub fn step(&mut self, dt: Duration) -> Point {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from.lerp(self.to, ease_out_quint(t))
    }
}

/// Tracks captured drags and settles of the main panel.
#[derive(Debug, Clone, Default)]
pub struct DragHelper {
    state: DragState,
    motion: Option<SettleMotion>,
    last_pointer: Option<Point>,
}

impl DragHelper {
    /// Create an idle helper with no tracked pointer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current drag state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Whether a settle is in flight.
    pub fn is_settling(&self) -> bool {
        self.state == DragState::Settling
    }

    /// Switch state; returns true when it actually changed.
    pub fn set_state(&mut self, state: DragState) -> bool {
        if self.state == state {
            return false;
        }
        if state != DragState::Settling {
            self.motion = None;
        }
        self.state = state;
        true
    }

    /// Remember where the pointer is so later moves produce deltas.
    pub fn track_pointer(&mut self, position: Point) {
        self.last_pointer = Some(position);
    }

    /// Pointer movement since the last tracked sample.
    pub fn pointer_delta(&mut self, position: Point) -> kurbo::Vec2 {
        let delta = self
            .last_pointer
            .map(|last| position - last)
            .unwrap_or(kurbo::Vec2::ZERO);
        self.last_pointer = Some(position);
        delta
    }

    /// Forget the tracked pointer at the end of a gesture.
    pub fn release_pointer(&mut self) {
        self.last_pointer = None;
    }

    /// Start settling from `from` to `to`. Returns false when there is
    /// nothing to animate, in which case the caller resolves immediately.
    pub fn start_settle(&mut self, from: Point, to: Point, extent: f64) -> bool {
        if from == to {
            self.motion = None;
            return false;
        }
        self.motion = Some(SettleMotion::new(from, to, extent));
        true
    }

    /// Step the in-flight settle. Returns the new position and whether the
    /// motion has finished.
    pub fn advance(&mut self, dt: Duration) -> Option<(Point, bool)> {
        let motion = self.motion.as_mut()?;
        let position = motion.step(dt);
        let finished = motion.is_finished();
        if finished {
            self.motion = None;
        }
        Some((position, finished))
    }

    /// Drop any in-flight settle without moving the panel.
    pub fn cancel_motion(&mut self) {
        self.motion = None;
    }
}
