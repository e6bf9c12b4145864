//! Panel geometry: edges, drag axes and the four resting rectangles.
//!
//! Everything here is a pure function of measured panel sizes, the drag edge
//! and the reveal mode. Degenerate inputs (zero-size panels) clamp to neutral
//! values instead of failing.

use kurbo::{Insets, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// The edge the main panel is dragged towards to reveal the secondary panel.
///
/// `Start` is the leading (left) edge and `End` the trailing (right) edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DragEdge {
    #[default]
    Start,
    End,
    Top,
    Bottom,
}

impl DragEdge {
    /// The axis the main panel moves along for this edge.
    pub fn axis(self) -> Axis {
        match self {
            Self::Start | Self::End => Axis::Horizontal,
            Self::Top | Self::Bottom => Axis::Vertical,
        }
    }

    /// +1 when revealing increases the coordinate on the drag axis, -1 otherwise.
    pub fn reveal_sign(self) -> f64 {
        match self {
            Self::Start | Self::Top => 1.0,
            Self::End | Self::Bottom => -1.0,
        }
    }
}

/// Drag axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Coordinate of a point on this axis.
    pub fn of(self, point: Point) -> f64 {
        match self {
            Self::Horizontal => point.x,
            Self::Vertical => point.y,
        }
    }

    /// Component of a vector on this axis.
    pub fn component(self, v: Vec2) -> f64 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }

    /// Extent of a size along this axis.
    pub fn extent(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// A vector of length `amount` along this axis.
    pub fn vec(self, amount: f64) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(amount, 0.0),
            Self::Vertical => Vec2::new(0.0, amount),
        }
    }

    /// Replace this axis' coordinate of `point`, keeping the cross axis.
    pub fn with(self, point: Point, value: f64) -> Point {
        match self {
            Self::Horizontal => Point::new(value, point.y),
            Self::Vertical => Point::new(point.x, value),
        }
    }
}

/// How the secondary panel behaves while the main panel moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RevealMode {
    /// Secondary panel stays put underneath the main panel.
    #[default]
    Normal,
    /// Secondary panel starts just outside the bounds and slides in rigidly
    /// coupled to the main panel.
    SameLevel,
}

/// Place a child inside the container, anchored to the drag edge and clipped
/// to the padded bounds.
pub fn layout_child(edge: DragEdge, container: Size, padding: Insets, child: Size) -> Rect {
    let min_left = padding.x0;
    let max_right = (container.width - padding.x1).max(0.0);
    let min_top = padding.y0;
    let max_bottom = (container.height - padding.y1).max(0.0);

    match edge {
        DragEdge::End => Rect::new(
            (container.width - child.width - padding.x1).max(min_left),
            padding.y0.min(max_bottom),
            (container.width - padding.x1).max(min_left),
            (child.height + padding.y0).min(max_bottom),
        ),
        DragEdge::Start | DragEdge::Top => Rect::new(
            padding.x0.min(max_right),
            padding.y0.min(max_bottom),
            (child.width + padding.x0).min(max_right),
            (child.height + padding.y0).min(max_bottom),
        ),
        DragEdge::Bottom => Rect::new(
            padding.x0.min(max_right),
            (container.height - child.height - padding.y1).max(min_top),
            (child.width + padding.x0).min(max_right),
            (container.height - padding.y1).max(min_top),
        ),
    }
}

/// Offset applied to the secondary panel in same-level mode so that it starts
/// just outside the visible bound, opposite the reveal direction.
pub fn same_level_offset(edge: DragEdge, secondary: Rect) -> Vec2 {
    let axis = edge.axis();
    axis.vec(-edge.reveal_sign() * axis.extent(secondary.size()))
}

/// The four resting rectangles derived from one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelGeometry {
    pub edge: DragEdge,
    pub main_closed: Rect,
    pub main_open: Rect,
    pub secondary_closed: Rect,
    pub secondary_open: Rect,
}

impl PanelGeometry {
    /// Compute the open rectangles from the laid-out (closed) positions.
    pub fn compute(edge: DragEdge, mode: RevealMode, main: Rect, secondary: Rect) -> Self {
        let axis = edge.axis();
        let travel = axis.vec(edge.reveal_sign() * axis.extent(secondary.size()));
        let secondary_open = match mode {
            RevealMode::Normal => secondary,
            RevealMode::SameLevel => secondary + travel,
        };

        Self {
            edge,
            main_closed: main,
            main_open: main + travel,
            secondary_closed: secondary,
            secondary_open,
        }
    }

    /// Drag axis of the edge these rectangles were computed for.
    pub fn axis(&self) -> Axis {
        self.edge.axis()
    }

    /// Extent of the secondary panel on the drag axis.
    pub fn secondary_extent(&self) -> f64 {
        self.axis().extent(self.secondary_closed.size()).max(0.0)
    }

    /// Main panel position on the drag axis when closed.
    pub fn main_closed_position(&self) -> f64 {
        self.axis().of(self.main_closed.origin())
    }

    /// Main panel position on the drag axis when open.
    pub fn main_open_position(&self) -> f64 {
        self.axis().of(self.main_open.origin())
    }

    /// Clamp a proposed main panel origin to the drag axis between the closed
    /// and open positions. The cross axis is pinned to the closed rectangle.
    pub fn clamp_main(&self, proposed: Point) -> Point {
        let axis = self.axis();
        let closed = self.main_closed_position();
        let open = self.main_open_position();
        let along = axis.of(proposed).clamp(closed.min(open), closed.max(open));
        axis.with(self.main_closed.origin(), along)
    }

    /// Halfway point between closed and open on the drag axis, rounded to a
    /// whole pixel towards the closed position.
    pub fn halfway_pivot(&self) -> f64 {
        let half = (self.secondary_extent() / 2.0).trunc();
        self.main_closed_position() + self.edge.reveal_sign() * half
    }

    /// Whether the main panel has crossed the halfway pivot towards open.
    ///
    /// Edges revealing in the positive direction settle open at the pivot
    /// itself; negative edges need to be strictly past it.
    pub fn past_pivot(&self, main_origin: Point) -> bool {
        let position = self.axis().of(main_origin);
        let pivot = self.halfway_pivot();
        match self.edge {
            DragEdge::Start | DragEdge::Top => position >= pivot,
            DragEdge::End | DragEdge::Bottom => position < pivot,
        }
    }

    /// Normalized reveal progress: 0.0 at closed, 1.0 at open.
    pub fn slide_offset(&self, main_origin: Point) -> f32 {
        let extent = self.secondary_extent();
        if extent <= 0.0 {
            return 0.0;
        }
        let travelled = self.axis().of(main_origin) - self.main_closed_position();
        (self.edge.reveal_sign() * travelled / extent) as f32
    }

    /// Distance on the drag axis from the main panel to the closer of the
    /// closed position and the halfway pivot.
    pub fn distance_to_closest_rest(&self, main_origin: Point) -> f64 {
        let position = self.axis().of(main_origin);
        let from_closed = (position - self.main_closed_position()).abs();
        let from_pivot = (self.halfway_pivot() - position).abs();
        from_closed.min(from_pivot)
    }

    /// Whether the main panel sits exactly at the closed position.
    pub fn is_at_closed(&self, main_origin: Point) -> bool {
        self.axis().of(main_origin) == self.main_closed_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EDGES: [DragEdge; 4] = [DragEdge::Start, DragEdge::End, DragEdge::Top, DragEdge::Bottom];

    fn geometry(edge: DragEdge, mode: RevealMode) -> PanelGeometry {
        let container = Size::new(300.0, 80.0);
        let secondary = layout_child(edge, container, Insets::ZERO, Size::new(120.0, 40.0));
        let secondary = match mode {
            RevealMode::Normal => secondary,
            RevealMode::SameLevel => secondary + same_level_offset(edge, secondary),
        };
        let main = layout_child(edge, container, Insets::ZERO, Size::new(300.0, 80.0));
        PanelGeometry::compute(edge, mode, main, secondary)
    }

    #[test]
    fn test_open_minus_closed_matches_extent() {
        for edge in ALL_EDGES {
            let g = geometry(edge, RevealMode::Normal);
            let delta = g.main_open_position() - g.main_closed_position();
            assert!((delta.abs() - g.secondary_extent()).abs() < f64::EPSILON);
            assert_eq!(delta.signum(), edge.reveal_sign());
        }
    }

    #[test]
    fn test_layout_child_end_anchors_right() {
        let rect = layout_child(DragEdge::End, Size::new(300.0, 80.0), Insets::ZERO, Size::new(120.0, 40.0));
        assert_eq!(rect, Rect::new(180.0, 0.0, 300.0, 40.0));
    }

    #[test]
    fn test_layout_child_bottom_anchors_bottom() {
        let rect = layout_child(DragEdge::Bottom, Size::new(300.0, 80.0), Insets::ZERO, Size::new(120.0, 40.0));
        assert_eq!(rect, Rect::new(0.0, 40.0, 120.0, 80.0));
    }

    #[test]
    fn test_layout_child_respects_padding() {
        let padding = Insets::new(10.0, 5.0, 10.0, 5.0);
        let rect = layout_child(DragEdge::Start, Size::new(300.0, 80.0), padding, Size::new(400.0, 40.0));
        assert_eq!(rect, Rect::new(10.0, 5.0, 290.0, 45.0));
    }

    #[test]
    fn test_same_level_secondary_moves_with_main() {
        for edge in ALL_EDGES {
            let g = geometry(edge, RevealMode::SameLevel);
            let main_travel = g.main_open.origin() - g.main_closed.origin();
            let secondary_travel = g.secondary_open.origin() - g.secondary_closed.origin();
            assert_eq!(main_travel, secondary_travel);
        }
    }

    #[test]
    fn test_normal_secondary_is_stationary() {
        let g = geometry(DragEdge::End, RevealMode::Normal);
        assert_eq!(g.secondary_open, g.secondary_closed);
    }

    #[test]
    fn test_clamp_main_pins_cross_axis() {
        let g = geometry(DragEdge::Start, RevealMode::Normal);
        let clamped = g.clamp_main(Point::new(500.0, 33.0));
        assert_eq!(clamped, Point::new(120.0, 0.0));
        let clamped = g.clamp_main(Point::new(-20.0, -4.0));
        assert_eq!(clamped, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_clamp_main_negative_edge() {
        let g = geometry(DragEdge::Bottom, RevealMode::Normal);
        assert_eq!(g.clamp_main(Point::new(9.0, -300.0)), Point::new(0.0, -40.0));
        assert_eq!(g.clamp_main(Point::new(9.0, 15.0)), Point::new(0.0, 0.0));
        assert_eq!(g.clamp_main(Point::new(9.0, -15.0)), Point::new(0.0, -15.0));
    }

    #[test]
    fn test_slide_offset_endpoints() {
        for edge in ALL_EDGES {
            let g = geometry(edge, RevealMode::Normal);
            assert_eq!(g.slide_offset(g.main_closed.origin()), 0.0);
            assert_eq!(g.slide_offset(g.main_open.origin()), 1.0);
        }
    }

    #[test]
    fn test_slide_offset_zero_extent_is_neutral() {
        let main = Rect::new(0.0, 0.0, 100.0, 50.0);
        let g = PanelGeometry::compute(DragEdge::Start, RevealMode::Normal, main, Rect::ZERO);
        assert_eq!(g.slide_offset(Point::new(10.0, 0.0)), 0.0);
    }

    #[test]
    fn test_odd_extent_pivot_is_whole_pixel() {
        let main = Rect::new(0.0, 0.0, 300.0, 80.0);
        let secondary = Rect::new(0.0, 0.0, 121.0, 80.0);
        let start = PanelGeometry::compute(DragEdge::Start, RevealMode::Normal, main, secondary);
        assert_eq!(start.halfway_pivot(), 60.0);
        assert!(start.past_pivot(Point::new(60.0, 0.0)));

        let end = PanelGeometry::compute(DragEdge::End, RevealMode::Normal, main, Rect::new(179.0, 0.0, 300.0, 80.0));
        assert_eq!(end.halfway_pivot(), -60.0);
        assert!(!end.past_pivot(Point::new(-60.0, 0.0)));
    }

    #[test]
    fn test_pivot_tie_break_per_edge() {
        let start = geometry(DragEdge::Start, RevealMode::Normal);
        assert!(start.past_pivot(Point::new(60.0, 0.0)));
        assert!(!start.past_pivot(Point::new(59.0, 0.0)));

        let end = geometry(DragEdge::End, RevealMode::Normal);
        assert!(!end.past_pivot(Point::new(-60.0, 0.0)));
        assert!(end.past_pivot(Point::new(-61.0, 0.0)));
    }

    #[test]
    fn test_distance_to_closest_rest() {
        let g = geometry(DragEdge::Start, RevealMode::Normal);
        assert_eq!(g.distance_to_closest_rest(Point::new(10.0, 0.0)), 10.0);
        assert_eq!(g.distance_to_closest_rest(Point::new(55.0, 0.0)), 5.0);
        assert_eq!(g.distance_to_closest_rest(Point::new(0.0, 0.0)), 0.0);
    }
}
