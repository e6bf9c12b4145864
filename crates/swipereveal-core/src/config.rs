//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::RevealResult;
use crate::geometry::{DragEdge, RevealMode};

/// Default minimum fling velocity in dp per second.
pub const DEFAULT_MIN_FLING_VELOCITY: f64 = 300.0;
/// Default distance (dp) before the parent is asked to stop intercepting.
pub const DEFAULT_MIN_DIST_REQUEST_DISALLOW_PARENT: f64 = 1.0;
/// Default minimum pointer travel (dp) before a touch counts as a drag.
pub const DEFAULT_TOUCH_SLOP: f64 = 8.0;
/// Minimum release speed (dp/s) for the gesture tracker to report a fling.
pub const MIN_GESTURE_FLING_VELOCITY: f64 = 50.0;

/// Public configuration surface of a reveal engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Edge the main panel is dragged towards.
    pub drag_edge: DragEdge,
    /// Secondary panel behavior.
    pub mode: RevealMode,
    /// Release velocity threshold in dp/s; inclusive on both directions.
    pub min_fling_velocity: f64,
    /// Drag distance in dp before the parent is asked to disallow interception.
    pub min_dist_request_disallow_parent: f64,
    /// Minimum drag distance in dp separating a tap from a drag.
    pub touch_slop: f64,
    /// Pixels per density-independent unit.
    pub density: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            drag_edge: DragEdge::default(),
            mode: RevealMode::default(),
            min_fling_velocity: DEFAULT_MIN_FLING_VELOCITY,
            min_dist_request_disallow_parent: DEFAULT_MIN_DIST_REQUEST_DISALLOW_PARENT,
            touch_slop: DEFAULT_TOUCH_SLOP,
            density: 1.0,
        }
    }
}

impl RevealConfig {
    /// Configuration with every default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> RevealResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the drag edge.
    pub fn with_drag_edge(mut self, edge: DragEdge) -> Self {
        self.drag_edge = edge;
        self
    }

    /// Set the reveal mode.
    pub fn with_mode(mut self, mode: RevealMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the fling threshold in dp/s.
    pub fn with_min_fling_velocity(mut self, velocity: f64) -> Self {
        self.min_fling_velocity = velocity;
        self
    }

    /// Set the disallow-parent distance in dp.
    pub fn with_min_dist_request_disallow_parent(mut self, dp: f64) -> Self {
        self.min_dist_request_disallow_parent = dp;
        self
    }

    /// Set the touch slop in dp.
    pub fn with_touch_slop(mut self, dp: f64) -> Self {
        self.touch_slop = dp;
        self
    }

    /// Set the pixels per dp.
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Convert pixels to whole dp, truncating toward zero.
    pub fn px_to_dp(&self, px: f64) -> f64 {
        if self.density <= 0.0 {
            return px.trunc();
        }
        (px / self.density).trunc()
    }

    /// Convert dp to whole pixels, truncating toward zero.
    pub fn dp_to_px(&self, dp: f64) -> f64 {
        (dp * self.density.max(0.0)).trunc()
    }

    /// Touch slop in pixels.
    pub fn touch_slop_px(&self) -> f64 {
        self.dp_to_px(self.touch_slop)
    }

    /// Disallow-parent distance in pixels.
    pub fn min_dist_request_disallow_parent_px(&self) -> f64 {
        self.dp_to_px(self.min_dist_request_disallow_parent)
    }
}
