//! Cross-instance coordination of reveal state for recycled rows.
//!
//! Lists reuse a small pool of engines for many logical rows. The coordinator
//! remembers each row's state by a stable identifier and replays it whenever
//! an engine is bound to that identifier. It can also keep at most one row
//! open and lock rows against user drags.

mod bundle;

pub use bundle::StateBundle;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::reveal::{LifecycleState, RevealEngine};

/// A reveal engine shared between its host and a coordinator.
pub type SharedEngine = Arc<Mutex<RevealEngine>>;

/// Key under which the state map is stored in a [`StateBundle`].
pub const STATES_BUNDLE_KEY: &str = "swipereveal.coordinator.states";

/// Wrap an engine for sharing with a coordinator.
pub fn share(engine: RevealEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

fn lock_engine(engine: &SharedEngine) -> MutexGuard<'_, RevealEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Binding {
    engine: SharedEngine,
    /// Issued per bind; notifications carrying an older token are dropped.
    token: u64,
}

#[derive(Default)]
struct Registry {
    states: HashMap<String, LifecycleState>,
    bindings: HashMap<String, Binding>,
    locked: HashSet<String>,
    open_only_one: bool,
    next_token: u64,
}

impl Registry {
    fn open_count(&self) -> usize {
        self.states.values().filter(|s| s.is_open_leaning()).count()
    }

    /// Close every identifier except `keep` when more than one is open.
    /// Returns the bound engines that must be closed once the lock is released.
    fn cascade(&mut self, keep: &str) -> Vec<SharedEngine> {
        if self.open_count() <= 1 {
            return Vec::new();
        }
        log::debug!("Only one open: closing all rows except {}", keep);

        for (id, state) in self.states.iter_mut() {
            if id != keep {
                *state = LifecycleState::Closed;
            }
        }
        self.bindings
            .iter()
            .filter(|(id, _)| id.as_str() != keep)
            .map(|(_, binding)| binding.engine.clone())
            .collect()
    }
}

/// Registry of logical row identifiers and the engines bound to them.
///
/// All map updates happen inside one lock; engines are only driven after the
/// lock is released, so engine observers may call back into the coordinator.
/// Do not call coordinator methods while holding the lock of the engine they
/// would drive.
#[derive(Clone, Default)]
pub struct RevealCoordinator {
    registry: Arc<Mutex<Registry>>,
}

impl RevealCoordinator {
    /// Create an empty coordinator with the single-open policy off.
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Keep at most one row open at a time.
    pub fn set_open_only_one(&self, open_only_one: bool) {
        self.registry().open_only_one = open_only_one;
    }

    /// Whether the single-open policy is active.
    pub fn open_only_one(&self) -> bool {
        self.registry().open_only_one
    }

    /// Bind `engine` to the row `id`, replaying the row's remembered state
    /// without animation.
    pub fn bind(&self, engine: &SharedEngine, id: &str) {
        let (remembered, locked, token) = {
            let mut registry = self.registry();
            registry
                .bindings
                .retain(|_, binding| !Arc::ptr_eq(&binding.engine, engine));

            registry.next_token += 1;
            let token = registry.next_token;
            registry.bindings.insert(
                id.to_string(),
                Binding {
                    engine: engine.clone(),
                    token,
                },
            );

            let remembered = registry.states.get(id).copied();
            if remembered.is_none() {
                registry.states.insert(id.to_string(), LifecycleState::Closed);
            }
            (remembered, registry.locked.contains(id), token)
        };

        log::debug!("Binding row {} (remembered {:?})", id, remembered);

        let weak = Arc::downgrade(&self.registry);
        let row = id.to_string();

        let mut engine = lock_engine(engine);
        if engine.needs_stabilizing_layout() {
            engine.request_layout();
        }
        engine.abort();
        engine.set_lifecycle_listener(Some(Box::new(move |state| {
            on_lifecycle(&weak, &row, token, state);
        })));

        match remembered {
            Some(state) if state.is_open_leaning() => engine.open(false),
            _ => engine.close(false),
        }
        engine.set_drag_locked(locked);
    }

    /// Remember `id` as open and animate its engine open if one is bound.
    pub fn open_layout(&self, id: &str) {
        let (engine, to_close) = {
            let mut registry = self.registry();
            registry.states.insert(id.to_string(), LifecycleState::Open);
            let engine = registry.bindings.get(id).map(|b| b.engine.clone());
            let to_close = if registry.open_only_one {
                registry.cascade(id)
            } else {
                Vec::new()
            };
            (engine, to_close)
        };

        if let Some(engine) = engine {
            lock_engine(&engine).open(true);
        }
        close_all(to_close);
    }

    /// Remember `id` as closed and animate its engine closed if one is bound.
    pub fn close_layout(&self, id: &str) {
        let engine = {
            let mut registry = self.registry();
            registry.states.insert(id.to_string(), LifecycleState::Closed);
            registry.bindings.get(id).map(|b| b.engine.clone())
        };

        if let Some(engine) = engine {
            lock_engine(&engine).close(true);
        }
    }

    /// Prevent user drags on the given rows.
    pub fn lock_swipe(&self, ids: &[&str]) {
        self.set_lock_swipe(true, ids);
    }

    /// Allow user drags on the given rows again.
    pub fn unlock_swipe(&self, ids: &[&str]) {
        self.set_lock_swipe(false, ids);
    }

    fn set_lock_swipe(&self, lock: bool, ids: &[&str]) {
        if ids.is_empty() {
            return;
        }

        let engines: Vec<SharedEngine> = {
            let mut registry = self.registry();
            for id in ids {
                if lock {
                    registry.locked.insert(id.to_string());
                } else {
                    registry.locked.remove(*id);
                }
            }
            ids.iter()
                .filter_map(|id| registry.bindings.get(*id).map(|b| b.engine.clone()))
                .collect()
        };

        for engine in engines {
            lock_engine(&engine).set_drag_locked(lock);
        }
    }

    /// Whether user drags are locked for `id`.
    pub fn is_locked(&self, id: &str) -> bool {
        self.registry().locked.contains(id)
    }

    /// Remembered state of a row, if it has ever been seen.
    pub fn remembered_state(&self, id: &str) -> Option<LifecycleState> {
        self.registry().states.get(id).copied()
    }

    /// Snapshot of every remembered state.
    pub fn remembered_states(&self) -> HashMap<String, LifecycleState> {
        self.registry().states.clone()
    }

    /// Whether an engine is currently bound to `id`.
    pub fn is_bound(&self, id: &str) -> bool {
        self.registry().bindings.contains_key(id)
    }

    /// Write the state map into `out` under [`STATES_BUNDLE_KEY`].
    pub fn save_states(&self, out: &mut StateBundle) {
        let mut states = StateBundle::new();
        for (id, state) in self.registry().states.iter() {
            states.put_int(id.clone(), state.code());
        }
        out.put_bundle(STATES_BUNDLE_KEY, states);
    }

    /// Replace the state map with the one stored in `input`, if present.
    pub fn restore_states(&self, input: &StateBundle) {
        let Some(saved) = input.get_bundle(STATES_BUNDLE_KEY) else {
            return;
        };

        let mut restored = HashMap::new();
        for (id, code) in saved.ints() {
            match LifecycleState::from_code(code) {
                Some(state) => {
                    restored.insert(id.to_string(), state);
                }
                None => log::warn!("Skipping row {} with unknown state code {}", id, code),
            }
        }

        log::debug!("Restored {} row states", restored.len());
        self.registry().states = restored;
    }
}

fn close_all(engines: Vec<SharedEngine>) {
    for engine in engines {
        lock_engine(&engine).close(true);
    }
}

/// Lifecycle observer installed on every bound engine.
fn on_lifecycle(registry: &Weak<Mutex<Registry>>, id: &str, token: u64, state: LifecycleState) {
    let Some(registry) = registry.upgrade() else {
        return;
    };

    let to_close = {
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        if registry.bindings.get(id).map(|b| b.token) != Some(token) {
            log::warn!("Dropping {} from an engine no longer bound to {}", state, id);
            return;
        }
        registry.states.insert(id.to_string(), state);
        if registry.open_only_one {
            registry.cascade(id)
        } else {
            Vec::new()
        }
    };

    close_all(to_close);
}
