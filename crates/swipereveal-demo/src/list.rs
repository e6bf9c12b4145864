//! A headless recycled list.
//!
//! A fixed pool of row slots is reused for a longer list of item ids, the way
//! a scrolling list recycles its row views. Each slot owns one reveal engine.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use kurbo::{Insets, Point, Size, Vec2};
use swipereveal_core::{
    HostRequest, LifecycleState, PointerEvent, RevealConfig, RevealCoordinator, RevealEngine,
    RevealResult, SharedEngine, SlideEvent, share,
};

/// Frame interval used to step settles.
const FRAME: Duration = Duration::from_millis(16);

pub const ROW_SIZE: Size = Size::new(360.0, 72.0);
pub const ACTIONS_SIZE: Size = Size::new(144.0, 72.0);

struct Slot {
    engine: SharedEngine,
    item: Option<String>,
    /// Slide events since the slot was created, shared with its listener.
    slides: Arc<Mutex<Vec<SlideEvent>>>,
}

/// Recycled list of rows backed by a shared coordinator.
pub struct RecycledList {
    coordinator: RevealCoordinator,
    items: Vec<String>,
    slots: Vec<Slot>,
    first_visible: usize,
}

impl RecycledList {
    pub fn new(config: &RevealConfig, items: Vec<String>, slot_count: usize) -> Self {
        let slots = (0..slot_count)
            .map(|index| {
                let mut engine = RevealEngine::new(config.clone());
                let slides = Arc::new(Mutex::new(Vec::new()));
                let sink = slides.clone();
                engine.set_slide_listener(Some(Box::new(move |event| {
                    log::trace!("Slot {} slide {:?}", index, event);
                    if let Ok(mut slides) = sink.lock() {
                        slides.push(event);
                    }
                })));
                Slot {
                    engine: share(engine),
                    item: None,
                    slides,
                }
            })
            .collect();

        Self {
            coordinator: RevealCoordinator::new(),
            items,
            slots,
            first_visible: 0,
        }
    }

    /// Coordinator shared by every slot.
    pub fn coordinator(&self) -> &RevealCoordinator {
        &self.coordinator
    }

    /// Scroll so `first` is the top visible item, rebinding every slot.
    pub fn scroll_to(&mut self, first: usize) -> RevealResult<()> {
        let max_first = self.items.len().saturating_sub(self.slots.len());
        self.first_visible = first.min(max_first);
        log::info!("Scrolled to item {}", self.first_visible);

        for index in 0..self.slots.len() {
            let Some(item) = self.items.get(self.first_visible + index).cloned() else {
                continue;
            };
            let engine = self.slots[index].engine.clone();
            self.coordinator.bind(&engine, &item);
            self.slots[index].item = Some(item);
            self.service_host_requests(index)?;
        }
        Ok(())
    }

    /// Run layout passes for as long as the slot's engine asks for them.
    fn service_host_requests(&self, index: usize) -> RevealResult<()> {
        let slot = &self.slots[index];
        let mut engine = slot.engine.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            let requests = engine.take_host_requests();
            if requests.is_empty() {
                return Ok(());
            }
            for request in requests {
                match request {
                    HostRequest::RequestLayout => {
                        engine.layout(ROW_SIZE, Insets::ZERO, &[ACTIONS_SIZE, ROW_SIZE])?;
                        if engine.needs_stabilizing_layout() {
                            engine.request_layout();
                        }
                    }
                    HostRequest::DisallowParentIntercept => {
                        log::debug!("Row {:?} keeps the gesture from the list", slot.item);
                    }
                }
            }
        }
    }

    /// Horizontal swipe across the visible slot `index`, ending with `velocity`
    /// in px/s.
    pub fn swipe(&self, index: usize, from_x: f64, to_x: f64, velocity: f64) -> RevealResult<()> {
        let Some(slot) = self.slots.get(index) else {
            log::warn!("No slot {}", index);
            return Ok(());
        };
        let y = ROW_SIZE.height / 2.0;
        let steps = 6;
        let mut events = vec![PointerEvent::Down {
            position: Point::new(from_x, y),
        }];
        for step in 1..=steps {
            let x = from_x + (to_x - from_x) * f64::from(step) / f64::from(steps);
            events.push(PointerEvent::Move {
                position: Point::new(x, y),
            });
        }
        events.push(PointerEvent::Up {
            position: Point::new(to_x, y),
            velocity: Vec2::new(velocity, 0.0),
        });

        let mut engine = slot.engine.lock().unwrap_or_else(|e| e.into_inner());
        for event in &events {
            engine.on_pointer(event);
        }
        drop(engine);
        self.service_host_requests(index)
    }

    /// Step every slot's settle until all are at rest. Returns frames run.
    pub fn run_frames(&self) -> usize {
        let mut frames = 0;
        loop {
            let mut busy = false;
            for slot in &self.slots {
                let mut engine = slot.engine.lock().unwrap_or_else(|e| e.into_inner());
                busy |= engine.advance(FRAME);
            }
            if !busy {
                return frames;
            }
            frames += 1;
        }
    }

    /// Visible rows with their item id and engine state.
    pub fn visible(&self) -> Vec<(String, LifecycleState)> {
        self.slots
            .iter()
            .filter_map(|slot| {
                let item = slot.item.clone()?;
                let state = slot.engine.lock().unwrap_or_else(|e| e.into_inner()).state();
                Some((item, state))
            })
            .collect()
    }

    /// Number of slide events a slot has reported.
    pub fn slide_count(&self, index: usize) -> usize {
        self.slots
            .get(index)
            .and_then(|slot| slot.slides.lock().ok().map(|s| s.len()))
            .unwrap_or(0)
    }
}
