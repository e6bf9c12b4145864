//! Pointer input and gesture disambiguation.
//!
//! The host delivers abstract pointer samples; this module turns them into
//! recognizer verdicts and keeps the per-gesture bookkeeping used to tell a
//! tap on the main panel's content from a drag.

use kurbo::{Point, Rect, Vec2};

use crate::geometry::Axis;

/// Pointer sample in container-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
    },
    Move {
        position: Point,
    },
    /// Release, with the velocity (px/s) reported by the host's tracker.
    Up {
        position: Point,
        velocity: Vec2,
    },
    Cancel,
}

impl PointerEvent {
    /// Pointer position, if the sample carries one.
    pub fn position(&self) -> Option<Point> {
        match *self {
            Self::Down { position } | Self::Move { position } | Self::Up { position, .. } => {
                Some(position)
            }
            Self::Cancel => None,
        }
    }

    /// Whether this sample starts a gesture.
    pub fn is_down(&self) -> bool {
        matches!(self, Self::Down { .. })
    }
}

/// Verdict of the gesture recognizer for one pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureVerdict {
    Down,
    /// Movement after the touch slop was exceeded.
    Scroll { delta: Vec2 },
    /// Release fast enough to count as a fling.
    Fling { velocity: Vec2 },
}

/// Minimal tap/scroll/fling recognizer.
#[derive(Debug, Clone, Default)]
pub struct GestureTracker {
    down_position: Option<Point>,
    last_position: Option<Point>,
    in_scroll: bool,
}

impl GestureTracker {
    /// Create a tracker with no gesture in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pointer sample; `touch_slop` and `min_fling` are in pixels.
    pub fn process(
        &mut self,
        event: &PointerEvent,
        touch_slop: f64,
        min_fling: f64,
    ) -> Option<GestureVerdict> {
        match *event {
            PointerEvent::Down { position } => {
                self.down_position = Some(position);
                self.last_position = Some(position);
                self.in_scroll = false;
                Some(GestureVerdict::Down)
            }
            PointerEvent::Move { position } => {
                let down = self.down_position?;
                let last = self.last_position.unwrap_or(down);
                self.last_position = Some(position);

                if !self.in_scroll {
                    let travelled = position - down;
                    if travelled.hypot2() < touch_slop * touch_slop {
                        return None;
                    }
                    self.in_scroll = true;
                }
                Some(GestureVerdict::Scroll {
                    delta: position - last,
                })
            }
            PointerEvent::Up { velocity, .. } => {
                let was_tracking = self.down_position.take().is_some();
                self.last_position = None;
                self.in_scroll = false;
                let fast = velocity.x.abs() >= min_fling || velocity.y.abs() >= min_fling;
                (was_tracking && fast).then_some(GestureVerdict::Fling { velocity })
            }
            PointerEvent::Cancel => {
                self.down_position = None;
                self.last_position = None;
                self.in_scroll = false;
                None
            }
        }
    }
}

/// Running drag distance along one axis since the last pointer-down.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragDistance {
    total: f64,
    previous: Option<Point>,
}

impl DragDistance {
    /// Reset on down, otherwise accumulate absolute movement along `axis`.
    pub fn accumulate(&mut self, event: &PointerEvent, axis: Axis) {
        let Some(position) = event.position() else {
            return;
        };
        if event.is_down() {
            self.total = 0.0;
        } else if let Some(previous) = self.previous {
            self.total += axis.component(position - previous).abs();
        }
        self.previous = Some(position);
    }

    /// Accumulated distance in pixels.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Whether enough distance has accumulated to count as a drag.
    pub fn exceeds(&self, touch_slop: f64) -> bool {
        self.total >= touch_slop
    }
}

/// Flags that live for exactly one pointer gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GestureSession {
    /// The recognizer reported a scroll or fling during this gesture.
    pub scrolled: bool,
    /// The parent has already been asked to stop intercepting.
    pub parent_disallowed: bool,
}

impl GestureSession {
    /// Clear the flags for a new gesture.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Inclusive containment test for a pointer inside a panel.
pub fn is_inside(rect: Rect, point: Point) -> bool {
    rect.x0 <= point.x && point.x <= rect.x1 && rect.y0 <= point.y && point.y <= rect.y1
}

/// A gesture could still be a tap on the main panel's content when it began
/// inside the panel and has not travelled the touch slop.
pub fn could_become_click(main: Rect, point: Point, distance: &DragDistance, touch_slop: f64) -> bool {
    is_inside(main, point) && !distance.exceeds(touch_slop)
}
