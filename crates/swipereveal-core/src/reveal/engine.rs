//! The reveal state machine.

use std::fmt;
use std::time::Duration;

use kurbo::{Insets, Point, Rect, Size, Vec2};

use super::state::{HostRequest, LifecycleState, SlideEvent};
use crate::config::{MIN_GESTURE_FLING_VELOCITY, RevealConfig};
use crate::drag::{DragHelper, DragState, MAX_SETTLE_DURATION};
use crate::error::{RevealError, RevealResult};
use crate::geometry::{DragEdge, PanelGeometry, RevealMode, layout_child, same_level_offset};
use crate::input::{
    DragDistance, GestureSession, GestureTracker, GestureVerdict, PointerEvent, could_become_click,
    is_inside,
};

/// Observer for lifecycle transitions.
pub type LifecycleListener = Box<dyn FnMut(LifecycleState) + Send>;
/// Observer for slide progress.
pub type SlideListener = Box<dyn FnMut(SlideEvent) + Send>;

/// Layout passes needed before panel measurement is considered stable.
const STABILIZING_LAYOUT_PASSES: u32 = 2;

/// Current placement of the two panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panels {
    pub main: Rect,
    pub secondary: Rect,
}

/// Drag/reveal state machine for one main/secondary panel pair.
///
/// Must be driven from the thread that owns the host's UI tree. Shared
/// access from a [`crate::RevealCoordinator`] goes through a mutex.
pub struct RevealEngine {
    config: RevealConfig,
    panels: Option<Panels>,
    geometry: PanelGeometry,
    state: LifecycleState,
    /// Whether the last request targeted open; replayed on every layout pass.
    open_target: bool,
    /// Set by an abort; silences the resolution it triggers.
    aborted: bool,
    drag_locked: bool,
    last_main_origin: Point,
    layout_count: u32,
    drag: DragHelper,
    tracker: GestureTracker,
    distance: DragDistance,
    session: GestureSession,
    /// Pointer-down position, used for the capture slop.
    capture_origin: Option<Point>,
    lifecycle_listener: Option<LifecycleListener>,
    slide_listener: Option<SlideListener>,
    requests: Vec<HostRequest>,
}

impl fmt::Debug for RevealEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealEngine")
            .field("config", &self.config)
            .field("panels", &self.panels)
            .field("state", &self.state)
            .field("drag_state", &self.drag.state())
            .field("drag_locked", &self.drag_locked)
            .field("layout_count", &self.layout_count)
            .finish_non_exhaustive()
    }
}

impl Default for RevealEngine {
    fn default() -> Self {
        Self::new(RevealConfig::default())
    }
}

impl RevealEngine {
    /// Create a closed engine. It has no panels until the first layout pass.
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            panels: None,
            geometry: PanelGeometry::default(),
            state: LifecycleState::Closed,
            open_target: false,
            aborted: false,
            drag_locked: false,
            last_main_origin: Point::ZERO,
            layout_count: 0,
            drag: DragHelper::new(),
            tracker: GestureTracker::new(),
            distance: DragDistance::default(),
            session: GestureSession::default(),
            capture_origin: None,
            lifecycle_listener: None,
            slide_listener: None,
            requests: Vec::new(),
        }
    }

    // --- Configuration ---

    /// Current configuration.
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Edge the secondary panel is revealed from.
    pub fn drag_edge(&self) -> DragEdge {
        self.config.drag_edge
    }

    /// Change the drag edge. Ignored while a drag or settle is in progress.
    pub fn set_drag_edge(&mut self, edge: DragEdge) {
        if self.drag.state() != DragState::Idle {
            log::warn!("Ignoring drag edge change to {:?} during a drag", edge);
            return;
        }
        if self.config.drag_edge != edge {
            self.config.drag_edge = edge;
            self.request_layout();
        }
    }

    /// Current reveal mode.
    pub fn mode(&self) -> RevealMode {
        self.config.mode
    }

    /// Change the reveal mode. Ignored while a drag or settle is in progress.
    pub fn set_mode(&mut self, mode: RevealMode) {
        if self.drag.state() != DragState::Idle {
            log::warn!("Ignoring reveal mode change to {:?} during a drag", mode);
            return;
        }
        if self.config.mode != mode {
            self.config.mode = mode;
            self.request_layout();
        }
    }

    /// Release velocity threshold in dp/s.
    pub fn min_fling_velocity(&self) -> f64 {
        self.config.min_fling_velocity
    }

    /// Change the release velocity threshold (dp/s).
    pub fn set_min_fling_velocity(&mut self, velocity: f64) {
        self.config.min_fling_velocity = velocity;
    }

    /// Locked engines never capture a drag; programmatic open/close still work.
    pub fn set_drag_locked(&mut self, locked: bool) {
        self.drag_locked = locked;
    }

    /// Whether user drags are locked out.
    pub fn is_drag_locked(&self) -> bool {
        self.drag_locked
    }

    // --- Observers ---

    /// Install or clear the lifecycle observer. Replacing it revokes the
    /// previous one.
    pub fn set_lifecycle_listener(&mut self, listener: Option<LifecycleListener>) {
        self.lifecycle_listener = listener;
    }

    /// Install or clear the slide progress observer.
    pub fn set_slide_listener(&mut self, listener: Option<SlideListener>) {
        self.slide_listener = listener;
    }

    /// Drain the requests queued for the host.
    pub fn take_host_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Queue a layout request for the host, once.
    pub fn request_layout(&mut self) {
        if !self.requests.contains(&HostRequest::RequestLayout) {
            self.requests.push(HostRequest::RequestLayout);
        }
    }

    // --- Queries ---

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the engine rests fully open.
    pub fn is_opened(&self) -> bool {
        self.state == LifecycleState::Open
    }

    /// Whether the engine rests fully closed. True before the first layout.
    pub fn is_closed(&self) -> bool {
        self.state == LifecycleState::Closed
    }

    /// Resting rectangles from the last layout pass.
    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    /// Current panel placement, once laid out.
    pub fn panels(&self) -> Option<Panels> {
        self.panels
    }

    /// Current main panel rectangle.
    pub fn main_rect(&self) -> Option<Rect> {
        self.panels.map(|p| p.main)
    }

    /// Current secondary panel rectangle.
    pub fn secondary_rect(&self) -> Option<Rect> {
        self.panels.map(|p| p.secondary)
    }

    /// Main panel position on the drag axis when open.
    pub fn main_open_position(&self) -> f64 {
        self.geometry.main_open_position()
    }

    /// Main panel position on the drag axis when closed.
    pub fn main_closed_position(&self) -> f64 {
        self.geometry.main_closed_position()
    }

    /// Whether a settle is in flight.
    pub fn is_settling(&self) -> bool {
        self.drag.is_settling()
    }

    /// True until two layout passes have completed.
    pub fn needs_stabilizing_layout(&self) -> bool {
        self.layout_count < STABILIZING_LAYOUT_PASSES
    }

    fn main_origin(&self) -> Point {
        self.panels
            .map(|p| p.main.origin())
            .unwrap_or_else(|| self.geometry.main_closed.origin())
    }

    // --- Layout ---

    /// Run a layout pass.
    ///
    /// `children` are the measured panel sizes in stacking order: secondary
    /// first, main last. Aborts any settle silently, recomputes the resting
    /// rectangles and snaps to the last requested target.
    pub fn layout(&mut self, container: Size, padding: Insets, children: &[Size]) -> RevealResult<()> {
        if children.len() < 2 {
            log::error!("Reveal layout needs two panels, got {}", children.len());
            return Err(RevealError::MissingPanels {
                found: children.len(),
            });
        }
        if children.len() > 2 {
            log::warn!("Reveal layout ignoring {} extra panels", children.len() - 2);
        }

        self.abort();

        let edge = self.config.drag_edge;
        let mode = self.config.mode;
        let main = layout_child(edge, container, padding, children[1]);
        let mut secondary = layout_child(edge, container, padding, children[0]);
        if mode == RevealMode::SameLevel {
            secondary = secondary + same_level_offset(edge, secondary);
        }

        self.panels = Some(Panels { main, secondary });
        self.geometry = PanelGeometry::compute(edge, mode, main, secondary);

        if self.open_target {
            self.open(false);
        } else {
            self.close(false);
        }

        self.last_main_origin = self.main_origin();
        self.layout_count = self.layout_count.saturating_add(1);
        Ok(())
    }

    // --- Open / close ---

    /// Open the engine, settling there when `animated`.
    pub fn open(&mut self, animated: bool) {
        self.open_target = true;
        self.aborted = false;
        if animated {
            self.begin_settle(LifecycleState::Opening, self.geometry.main_open.origin());
        } else {
            self.halt_settle();
            self.state = LifecycleState::Open;
            self.snap(self.geometry.main_open, self.geometry.secondary_open);
        }
    }

    /// Close the engine, settling there when `animated`.
    pub fn close(&mut self, animated: bool) {
        self.open_target = false;
        self.aborted = false;
        if animated {
            self.begin_settle(LifecycleState::Closing, self.geometry.main_closed.origin());
        } else {
            self.halt_settle();
            self.state = LifecycleState::Closed;
            self.snap(self.geometry.main_closed, self.geometry.secondary_closed);
        }
    }

    /// Cancel any drag or settle in place without notifying observers.
    pub fn abort(&mut self) {
        self.aborted = true;
        self.capture_origin = None;
        self.drag.release_pointer();
        self.drag.cancel_motion();
        self.set_drag_state(DragState::Idle);
    }

    fn begin_settle(&mut self, transition: LifecycleState, target: Point) {
        let previous = self.state;
        self.state = transition;
        if previous != transition {
            self.notify_lifecycle(transition);
        }

        if self.panels.is_none() {
            // Nothing placed yet; the next layout pass applies the target.
            return;
        }

        let from = self.main_origin();
        let extent = self.geometry.secondary_extent();
        if self.drag.start_settle(from, target, extent) {
            self.set_drag_state(DragState::Settling);
        } else {
            self.drag.set_state(DragState::Idle);
            self.on_drag_state_changed(DragState::Idle);
        }
    }

    fn halt_settle(&mut self) {
        self.drag.cancel_motion();
        self.drag.set_state(DragState::Idle);
    }

    fn snap(&mut self, main: Rect, secondary: Rect) {
        if let Some(panels) = self.panels.as_mut() {
            panels.main = main;
            panels.secondary = secondary;
            self.last_main_origin = main.origin();
        }
    }

    // --- Frame polling ---

    /// Step the in-flight settle by `dt`. Returns true while another frame
    /// is needed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.drag.is_settling() {
            return false;
        }
        match self.drag.advance(dt) {
            Some((position, false)) => {
                self.move_main_to(position);
                true
            }
            Some((position, true)) => {
                self.move_main_to(position);
                self.set_drag_state(DragState::Idle);
                false
            }
            None => {
                self.set_drag_state(DragState::Idle);
                false
            }
        }
    }

    /// Run the in-flight settle to completion.
    pub fn finish_settle(&mut self) {
        while self.advance(MAX_SETTLE_DURATION) {}
    }

    // --- Pointer input ---

    /// Decide whether the engine claims the gesture instead of letting it
    /// through to the main panel's content.
    pub fn intercept(&mut self, event: &PointerEvent) -> bool {
        if self.drag_locked {
            return false;
        }

        self.process_pointer(event);
        self.distance.accumulate(event, self.config.drag_edge.axis());

        let touch_slop = self.config.touch_slop_px();
        let could_click = match (event.position(), self.main_rect()) {
            (Some(position), Some(main)) => {
                could_become_click(main, position, &self.distance, touch_slop)
            }
            _ => false,
        };
        let settling = self.drag.is_settling();
        let idle_after_scrolled = self.drag.state() == DragState::Idle && self.session.scrolled;

        !could_click && (settling || idle_after_scrolled)
    }

    /// Handle a pointer sample the engine already owns.
    pub fn on_pointer(&mut self, event: &PointerEvent) {
        self.process_pointer(event);
    }

    fn process_pointer(&mut self, event: &PointerEvent) {
        let touch_slop = self.config.touch_slop_px();
        let min_fling = self.config.dp_to_px(MIN_GESTURE_FLING_VELOCITY);
        if let Some(verdict) = self.tracker.process(event, touch_slop, min_fling) {
            self.on_gesture(verdict);
        }

        match *event {
            PointerEvent::Down { position } => {
                self.drag.track_pointer(position);
                self.capture_origin = Some(position);
                if self.drag.is_settling() && self.is_over_panels(position) {
                    self.try_capture();
                }
            }
            PointerEvent::Move { position } => {
                let delta = self.drag.pointer_delta(position);
                if self.drag.state() == DragState::Dragging {
                    self.drag_by(delta);
                } else if self.passed_capture_slop(position) && self.try_capture() {
                    self.drag_by(delta);
                }
            }
            PointerEvent::Up { velocity, .. } => {
                if self.drag.state() == DragState::Dragging {
                    self.release(velocity);
                }
                self.drag.release_pointer();
                self.capture_origin = None;
            }
            PointerEvent::Cancel => {
                if self.drag.state() == DragState::Dragging {
                    self.release(Vec2::ZERO);
                }
                self.drag.release_pointer();
                self.capture_origin = None;
            }
        }
    }

    fn on_gesture(&mut self, verdict: GestureVerdict) {
        match verdict {
            GestureVerdict::Down => self.session.reset(),
            GestureVerdict::Fling { .. } => self.session.scrolled = true,
            GestureVerdict::Scroll { .. } => {
                self.session.scrolled = true;
                self.update_parent_intercept();
            }
        }
    }

    /// Once the main panel is far enough from a resting position, ask the
    /// parent to stop intercepting. Latched for the rest of the gesture.
    fn update_parent_intercept(&mut self) {
        if self.session.parent_disallowed {
            return;
        }
        let distance = self.geometry.distance_to_closest_rest(self.main_origin());
        if distance >= self.config.min_dist_request_disallow_parent_px() {
            self.session.parent_disallowed = true;
            self.requests.push(HostRequest::DisallowParentIntercept);
        }
    }

    fn is_over_panels(&self, position: Point) -> bool {
        self.panels
            .is_some_and(|p| is_inside(p.main, position) || is_inside(p.secondary, position))
    }

    fn passed_capture_slop(&self, position: Point) -> bool {
        let Some(origin) = self.capture_origin else {
            return false;
        };
        let axis = self.config.drag_edge.axis();
        axis.component(position - origin).abs() >= self.config.touch_slop_px()
    }

    fn try_capture(&mut self) -> bool {
        self.aborted = false;
        if self.drag_locked || self.panels.is_none() {
            return false;
        }
        self.drag.cancel_motion();
        self.set_drag_state(DragState::Dragging);
        true
    }

    fn drag_by(&mut self, delta: Vec2) {
        let proposed = self.main_origin() + delta;
        let clamped = self.geometry.clamp_main(proposed);
        self.move_main_to(clamped);
    }

    /// Pick open or close from the release velocity (px/s) and position.
    fn release(&mut self, velocity: Vec2) {
        let vx = self.config.px_to_dp(velocity.x);
        let vy = self.config.px_to_dp(velocity.y);
        let threshold = self.config.min_fling_velocity;
        let past_pivot = self.geometry.past_pivot(self.main_origin());

        let open = match self.config.drag_edge {
            DragEdge::Start => {
                if vx >= threshold {
                    true
                } else if vx <= -threshold {
                    false
                } else {
                    past_pivot
                }
            }
            DragEdge::End => {
                if vx >= threshold {
                    false
                } else if vx <= -threshold {
                    true
                } else {
                    past_pivot
                }
            }
            DragEdge::Top => {
                if vy <= -threshold {
                    false
                } else if vy >= threshold {
                    true
                } else {
                    past_pivot
                }
            }
            DragEdge::Bottom => {
                if vy <= -threshold {
                    true
                } else if vy >= threshold {
                    false
                } else {
                    past_pivot
                }
            }
        };

        log::debug!(
            "Released at {:?} with {:?} dp/s, settling {}",
            self.main_origin(),
            (vx, vy),
            if open { "open" } else { "closed" }
        );

        if open {
            self.open(true);
        } else {
            self.close(true);
        }
    }

    // --- Position and state bookkeeping ---

    fn move_main_to(&mut self, origin: Point) {
        let same_level = self.config.mode == RevealMode::SameLevel;
        let axis = self.config.drag_edge.axis();
        let Some(panels) = self.panels.as_mut() else {
            return;
        };
        if panels.main.origin() == origin {
            return;
        }
        panels.main = panels.main.with_origin(origin);
        if same_level {
            // Rigidly coupled: the secondary panel has travelled exactly as far
            // as the main panel on the drag axis.
            let travelled = axis.of(origin) - axis.of(self.geometry.main_closed.origin());
            panels.secondary = self.geometry.secondary_closed + axis.vec(travelled);
        }
        self.report_slide();
    }

    fn report_slide(&mut self) {
        let origin = self.main_origin();
        if origin != self.last_main_origin {
            let event = if origin == self.geometry.main_closed.origin() {
                SlideEvent::Closed
            } else if origin == self.geometry.main_open.origin() {
                SlideEvent::Opened
            } else {
                SlideEvent::Sliding(self.geometry.slide_offset(origin))
            };
            log::trace!("Slide {:?}", event);
            if let Some(listener) = self.slide_listener.as_mut() {
                listener(event);
            }
        }
        self.last_main_origin = origin;
    }

    fn set_drag_state(&mut self, state: DragState) {
        if self.drag.set_state(state) {
            self.on_drag_state_changed(state);
        }
    }

    fn on_drag_state_changed(&mut self, drag_state: DragState) {
        let previous = self.state;
        match drag_state {
            DragState::Dragging => self.state = LifecycleState::Dragging,
            DragState::Idle => {
                self.state = if self.geometry.is_at_closed(self.main_origin()) {
                    LifecycleState::Closed
                } else {
                    LifecycleState::Open
                };
            }
            DragState::Settling => {}
        }

        if !self.aborted && previous != self.state {
            self.notify_lifecycle(self.state);
        }
    }

    fn notify_lifecycle(&mut self, state: LifecycleState) {
        log::debug!("Reveal state -> {}", state);
        if let Some(listener) = self.lifecycle_listener.as_mut() {
            listener(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const ALL_EDGES: [DragEdge; 4] = [DragEdge::Start, DragEdge::End, DragEdge::Top, DragEdge::Bottom];
    const CONTAINER: Size = Size::new(300.0, 80.0);

    fn laid_out_with(config: RevealConfig, secondary: Size) -> RevealEngine {
        let mut engine = RevealEngine::new(config);
        let children = [secondary, CONTAINER];
        engine.layout(CONTAINER, Insets::ZERO, &children).unwrap();
        engine.layout(CONTAINER, Insets::ZERO, &children).unwrap();
        engine
    }

    fn laid_out(edge: DragEdge, mode: RevealMode) -> RevealEngine {
        let secondary = match edge.axis() {
            crate::geometry::Axis::Horizontal => Size::new(120.0, 80.0),
            crate::geometry::Axis::Vertical => Size::new(300.0, 40.0),
        };
        laid_out_with(RevealConfig::new().with_drag_edge(edge).with_mode(mode), secondary)
    }

    fn record_states(engine: &mut RevealEngine) -> Arc<Mutex<Vec<LifecycleState>>> {
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = states.clone();
        engine.set_lifecycle_listener(Some(Box::new(move |state| {
            sink.lock().unwrap().push(state);
        })));
        states
    }

    fn record_slides(engine: &mut RevealEngine) -> Arc<Mutex<Vec<SlideEvent>>> {
        let slides = Arc::new(Mutex::new(Vec::new()));
        let sink = slides.clone();
        engine.set_slide_listener(Some(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        })));
        slides
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            position: Point::new(x, y),
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            position: Point::new(x, y),
        }
    }

    fn up(x: f64, y: f64, vx: f64, vy: f64) -> PointerEvent {
        PointerEvent::Up {
            position: Point::new(x, y),
            velocity: Vec2::new(vx, vy),
        }
    }

    #[test]
    fn test_closed_before_first_layout() {
        let engine = RevealEngine::default();
        assert!(engine.is_closed());
        assert!(!engine.is_opened());
        assert!(engine.main_rect().is_none());
        assert!(engine.needs_stabilizing_layout());
    }

    #[test]
    fn test_layout_requires_two_panels() {
        let mut engine = RevealEngine::default();
        let result = engine.layout(CONTAINER, Insets::ZERO, &[CONTAINER]);
        assert_eq!(result, Err(RevealError::MissingPanels { found: 1 }));
        assert!(engine.panels().is_none());
    }

    #[test]
    fn test_two_layouts_stabilize() {
        let engine = laid_out(DragEdge::Start, RevealMode::Normal);
        assert!(!engine.needs_stabilizing_layout());
    }

    #[test]
    fn test_open_close_lands_on_rects_for_every_edge() {
        for mode in [RevealMode::Normal, RevealMode::SameLevel] {
            for edge in ALL_EDGES {
                for animated in [false, true] {
                    let mut engine = laid_out(edge, mode);
                    engine.open(animated);
                    engine.finish_settle();
                    assert_eq!(engine.main_rect(), Some(engine.geometry().main_open));
                    assert_eq!(engine.secondary_rect(), Some(engine.geometry().secondary_open));
                    assert!(engine.is_opened());

                    engine.close(animated);
                    engine.finish_settle();
                    assert_eq!(engine.main_rect(), Some(engine.geometry().main_closed));
                    assert_eq!(engine.secondary_rect(), Some(engine.geometry().secondary_closed));
                    assert!(engine.is_closed());
                }
            }
        }
    }

    #[test]
    fn test_open_minus_closed_position_is_extent() {
        for edge in ALL_EDGES {
            let engine = laid_out(edge, RevealMode::Normal);
            let delta = engine.main_open_position() - engine.main_closed_position();
            assert!((delta.abs() - engine.geometry().secondary_extent()).abs() < f64::EPSILON);
            assert_eq!(delta.signum(), edge.reveal_sign());
        }
    }

    #[test]
    fn test_close_unanimated_is_idempotent() {
        let mut engine = laid_out(DragEdge::End, RevealMode::Normal);
        engine.open(false);
        engine.close(false);
        let once = engine.panels();
        engine.close(false);
        assert_eq!(engine.panels(), once);
        assert!(engine.is_closed());
    }

    #[test]
    fn test_animated_open_notifies_opening_then_open() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        let states = record_states(&mut engine);

        engine.open(true);
        assert_eq!(engine.state(), LifecycleState::Opening);
        assert_eq!(*states.lock().unwrap(), vec![LifecycleState::Opening]);

        assert!(engine.advance(Duration::from_millis(16)));
        engine.finish_settle();
        assert_eq!(
            *states.lock().unwrap(),
            vec![LifecycleState::Opening, LifecycleState::Open]
        );
    }

    #[test]
    fn test_unanimated_open_is_silent() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        let states = record_states(&mut engine);
        let slides = record_slides(&mut engine);
        engine.open(false);
        assert!(engine.is_opened());
        assert!(states.lock().unwrap().is_empty());
        assert!(slides.lock().unwrap().is_empty());
    }

    #[test]
    fn test_settle_after_snap_reports_slides() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        let slides = record_slides(&mut engine);
        engine.open(false);
        engine.close(true);
        assert!(engine.advance(Duration::from_millis(16)));
        engine.finish_settle();

        let slides = slides.lock().unwrap();
        assert!(slides.len() > 1);
        assert!(matches!(slides[0], SlideEvent::Sliding(_)));
        assert_eq!(slides.last(), Some(&SlideEvent::Closed));
    }

    #[test]
    fn test_abort_is_silent() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.open(true);
        engine.advance(Duration::from_millis(50));
        let states = record_states(&mut engine);

        engine.abort();
        assert!(!engine.is_settling());
        assert!(states.lock().unwrap().is_empty());
        assert_eq!(engine.state(), LifecycleState::Open);
    }

    #[test]
    fn test_layout_replays_target() {
        let mut engine = laid_out(DragEdge::Bottom, RevealMode::Normal);
        engine.open(true);
        engine.advance(Duration::from_millis(30));
        engine
            .layout(CONTAINER, Insets::ZERO, &[Size::new(300.0, 40.0), CONTAINER])
            .unwrap();
        assert!(engine.is_opened());
        assert!(!engine.is_settling());
        assert_eq!(engine.main_rect(), Some(engine.geometry().main_open));
    }

    #[test]
    fn test_drag_below_pivot_settles_closed() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        let states = record_states(&mut engine);
        let slides = record_slides(&mut engine);

        engine.on_pointer(&down(150.0, 40.0));
        engine.on_pointer(&moved(160.0, 40.0));
        assert_eq!(engine.state(), LifecycleState::Dragging);
        assert_eq!(engine.main_rect().unwrap().x0, 10.0);

        engine.on_pointer(&moved(200.0, 40.0));
        assert_eq!(engine.main_rect().unwrap().x0, 50.0);
        engine.on_pointer(&up(200.0, 40.0, 0.0, 0.0));
        assert_eq!(engine.state(), LifecycleState::Closing);

        engine.finish_settle();
        assert!(engine.is_closed());
        assert_eq!(
            *states.lock().unwrap(),
            vec![
                LifecycleState::Dragging,
                LifecycleState::Closing,
                LifecycleState::Closed
            ]
        );
        assert_eq!(slides.lock().unwrap().last(), Some(&SlideEvent::Closed));
    }

    #[test]
    fn test_drag_past_pivot_settles_open() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.on_pointer(&down(100.0, 40.0));
        engine.on_pointer(&moved(110.0, 40.0));
        engine.on_pointer(&moved(170.0, 40.0));
        engine.on_pointer(&up(170.0, 40.0, 0.0, 0.0));
        engine.finish_settle();
        assert!(engine.is_opened());
        assert_eq!(engine.main_rect(), Some(engine.geometry().main_open));
    }

    #[test]
    fn test_drag_is_clamped_to_open() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.on_pointer(&down(10.0, 40.0));
        engine.on_pointer(&moved(20.0, 40.0));
        engine.on_pointer(&moved(290.0, 70.0));
        let main = engine.main_rect().unwrap();
        assert_eq!(main.origin(), Point::new(120.0, 0.0));
    }

    #[test]
    fn test_fling_threshold_is_inclusive() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.on_pointer(&down(100.0, 40.0));
        engine.on_pointer(&moved(110.0, 40.0));
        engine.on_pointer(&up(110.0, 40.0, 300.0, 0.0));
        assert_eq!(engine.state(), LifecycleState::Opening);

        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.on_pointer(&down(100.0, 40.0));
        engine.on_pointer(&moved(110.0, 40.0));
        engine.on_pointer(&up(110.0, 40.0, 299.0, 0.0));
        assert_eq!(engine.state(), LifecycleState::Closing);
    }

    #[test]
    fn test_fling_direction_mirrors_for_end_edge() {
        let mut engine = laid_out(DragEdge::End, RevealMode::Normal);
        engine.on_pointer(&down(200.0, 40.0));
        engine.on_pointer(&moved(190.0, 40.0));
        engine.on_pointer(&up(190.0, 40.0, -300.0, 0.0));
        engine.finish_settle();
        assert!(engine.is_opened());

        engine.on_pointer(&down(100.0, 40.0));
        engine.on_pointer(&moved(110.0, 40.0));
        engine.on_pointer(&up(110.0, 40.0, 300.0, 0.0));
        engine.finish_settle();
        assert!(engine.is_closed());
    }

    #[test]
    fn test_vertical_fling_uses_density() {
        let config = RevealConfig::new()
            .with_drag_edge(DragEdge::Bottom)
            .with_density(2.0);
        let mut engine = laid_out_with(config, Size::new(300.0, 40.0));
        engine.on_pointer(&down(100.0, 60.0));
        engine.on_pointer(&moved(100.0, 40.0));
        // -500 px/s is -250 dp/s: below the threshold, falls back to the pivot.
        engine.on_pointer(&up(100.0, 40.0, 0.0, -500.0));
        assert_eq!(engine.state(), LifecycleState::Closing);

        engine.finish_settle();
        engine.on_pointer(&down(100.0, 60.0));
        engine.on_pointer(&moved(100.0, 40.0));
        engine.on_pointer(&up(100.0, 40.0, 0.0, -600.0));
        assert_eq!(engine.state(), LifecycleState::Opening);
    }

    #[test]
    fn test_slide_offsets_are_monotonic() {
        let mut engine = laid_out(DragEdge::Top, RevealMode::Normal);
        let slides = record_slides(&mut engine);
        engine.on_pointer(&down(100.0, 10.0));
        for y in (20..=60).step_by(5) {
            engine.on_pointer(&moved(100.0, y as f64));
        }

        let slides = slides.lock().unwrap();
        let mut last = 0.0;
        for event in slides.iter() {
            match *event {
                SlideEvent::Sliding(offset) => {
                    assert!(offset > last);
                    assert!(offset < 1.0);
                    last = offset;
                }
                SlideEvent::Opened => last = 1.0,
                SlideEvent::Closed => panic!("unexpected close"),
            }
        }
        assert_eq!(slides.last(), Some(&SlideEvent::Opened));
    }

    #[test]
    fn test_same_level_secondary_moves_in_lockstep() {
        let mut engine = laid_out(DragEdge::End, RevealMode::SameLevel);
        let secondary_before = engine.secondary_rect().unwrap();
        assert_eq!(secondary_before.x0, 300.0);

        engine.on_pointer(&down(200.0, 40.0));
        engine.on_pointer(&moved(190.0, 40.0));
        engine.on_pointer(&moved(160.0, 40.0));
        let main = engine.main_rect().unwrap();
        let secondary = engine.secondary_rect().unwrap();
        assert_eq!(main.x0, -40.0);
        assert_eq!(secondary.x0, 260.0);
    }

    #[test]
    fn test_locked_engine_ignores_drags() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.set_drag_locked(true);
        let states = record_states(&mut engine);

        assert!(!engine.intercept(&down(150.0, 40.0)));
        engine.on_pointer(&down(150.0, 40.0));
        engine.on_pointer(&moved(200.0, 40.0));
        engine.on_pointer(&up(200.0, 40.0, 2000.0, 0.0));
        assert!(engine.is_closed());
        assert!(states.lock().unwrap().is_empty());

        engine.open(false);
        assert!(engine.is_opened());
    }

    #[test]
    fn test_tap_on_main_is_not_intercepted() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        assert!(!engine.intercept(&down(150.0, 40.0)));
        assert!(!engine.intercept(&moved(152.0, 40.0)));
        assert!(!engine.intercept(&up(152.0, 40.0, 0.0, 0.0)));
        assert!(engine.is_closed());
    }

    #[test]
    fn test_idle_after_cross_axis_scroll_is_intercepted() {
        let mut engine = laid_out(DragEdge::Top, RevealMode::Normal);
        engine.open(false);
        // Main spans y 40..120; y 20 only touches the secondary panel.
        assert!(!engine.intercept(&down(100.0, 20.0)));
        assert!(engine.intercept(&moved(140.0, 20.0)));
        assert_eq!(engine.state(), LifecycleState::Open);
    }

    #[test]
    fn test_touch_outside_panels_while_settling_is_intercepted() {
        let config = RevealConfig::new();
        let mut engine = laid_out_with(config, Size::new(120.0, 40.0));
        engine.open(true);
        engine.advance(Duration::from_millis(200));
        assert!(engine.main_rect().unwrap().x0 > 50.0);
        assert!(engine.intercept(&down(50.0, 60.0)));
        assert!(engine.is_settling());
    }

    #[test]
    fn test_touch_while_settling_captures() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.open(true);
        engine.advance(Duration::from_millis(16));
        engine.on_pointer(&down(150.0, 40.0));
        assert_eq!(engine.state(), LifecycleState::Dragging);
        assert!(!engine.is_settling());
    }

    #[test]
    fn test_disallow_parent_is_latched() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.take_host_requests();

        engine.on_pointer(&down(150.0, 40.0));
        engine.on_pointer(&moved(160.0, 40.0));
        assert!(engine.take_host_requests().is_empty());

        engine.on_pointer(&moved(170.0, 40.0));
        assert_eq!(engine.take_host_requests(), vec![HostRequest::DisallowParentIntercept]);

        engine.on_pointer(&moved(150.0, 40.0));
        engine.on_pointer(&moved(175.0, 40.0));
        assert!(engine.take_host_requests().is_empty());
    }

    #[test]
    fn test_edge_change_ignored_mid_drag() {
        let mut engine = laid_out(DragEdge::Start, RevealMode::Normal);
        engine.on_pointer(&down(150.0, 40.0));
        engine.on_pointer(&moved(160.0, 40.0));
        engine.set_drag_edge(DragEdge::Top);
        assert_eq!(engine.drag_edge(), DragEdge::Start);

        engine.on_pointer(&up(160.0, 40.0, 0.0, 0.0));
        engine.finish_settle();
        engine.take_host_requests();
        engine.set_drag_edge(DragEdge::Top);
        assert_eq!(engine.drag_edge(), DragEdge::Top);
        assert_eq!(engine.take_host_requests(), vec![HostRequest::RequestLayout]);
    }

    #[test]
    fn test_zero_extent_secondary_is_neutral() {
        let mut engine = laid_out_with(RevealConfig::new(), Size::ZERO);
        engine.open(true);
        assert!(!engine.is_settling());
        assert!(engine.is_closed());
        assert_eq!(engine.geometry().slide_offset(Point::new(5.0, 0.0)), 0.0);
    }
}
