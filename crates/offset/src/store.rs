//! Observable store for the raw-to-effective time offset.

use crate::persistence::{MemoryPersistence, OffsetPersistence};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Lowest accepted offset in seconds.
pub const MIN_OFFSET: f64 = -5.0;

/// Highest accepted offset in seconds.
pub const MAX_OFFSET: f64 = 5.0;

/// Offset used when nothing has been persisted. Negative pulls text earlier.
pub const DEFAULT_OFFSET: f64 = -0.45;

/// Fixed key the offset is persisted under.
pub const OFFSET_STORAGE_KEY: &str = "global_offset_seconds";

/// Bounds and default for the offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetConfig {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        Self {
            min: MIN_OFFSET,
            max: MAX_OFFSET,
            default: DEFAULT_OFFSET,
        }
    }
}

impl OffsetConfig {
    fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Value handed to subscribers on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetSnapshot {
    pub offset: f64,
    pub debug_mode: bool,
}

/// Callback type for offset changes.
pub type OffsetListener = Arc<dyn Fn(OffsetSnapshot) + Send + Sync + 'static>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, OffsetListener)>,
}

/// Handle returned by [`OffsetStore::subscribe`].
///
/// The listener stays registered for as long as the handle lives.
#[must_use = "dropping the subscription removes the listener"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Stop receiving notifications.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entries
                .retain(|(id, _)| *id != self.id);
        }
    }
}

/// Single source of truth for the calibration offset and the debug flag.
///
/// `set` is the only writer. Share it behind an `Arc` between the engine and
/// any calibration tooling so both always apply the same value.
pub struct OffsetStore {
    config: OffsetConfig,
    persistence: Arc<dyn OffsetPersistence>,
    state: Mutex<OffsetSnapshot>,
    listeners: Arc<Mutex<Listeners>>,
}

impl OffsetStore {
    pub fn new(persistence: Arc<dyn OffsetPersistence>) -> Self {
        Self::with_config(persistence, OffsetConfig::default())
    }

    /// Create a store and read the persisted value once.
    pub fn with_config(persistence: Arc<dyn OffsetPersistence>, config: OffsetConfig) -> Self {
        let offset = Self::load_initial(persistence.as_ref(), &config);
        tracing::debug!(offset, "offset store initialized");

        Self {
            config,
            persistence,
            state: Mutex::new(OffsetSnapshot {
                offset,
                debug_mode: false,
            }),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Store that keeps its value in memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryPersistence::new()))
    }

    fn load_initial(persistence: &dyn OffsetPersistence, config: &OffsetConfig) -> f64 {
        let stored = match persistence.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load offset, using default");
                return config.default;
            }
        };

        let Some(raw) = stored else {
            return config.default;
        };

        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => config.clamp(value),
            _ => {
                tracing::warn!(stored = %raw, "ignoring unparsable stored offset");
                config.default
            }
        }
    }

    pub fn config(&self) -> &OffsetConfig {
        &self.config
    }

    pub fn get(&self) -> f64 {
        self.state.lock().unwrap().offset
    }

    pub fn snapshot(&self) -> OffsetSnapshot {
        *self.state.lock().unwrap()
    }

    /// Clamp, round to 0.01s, persist and notify.
    ///
    /// Listeners run after the lock is released, so they may read the store.
    pub fn set(&self, value: f64) {
        if !value.is_finite() {
            tracing::warn!(value, "ignoring non-finite offset");
            return;
        }

        let rounded = (self.config.clamp(value) * 100.0).round() / 100.0;
        // Saved under the lock so the stored value matches the last writer.
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.offset = rounded;
            if let Err(e) = self.persistence.save(&rounded.to_string()) {
                tracing::warn!(error = %e, offset = rounded, "failed to persist offset");
            }
            *state
        };

        tracing::debug!(offset = rounded, "offset changed");
        self.notify(snapshot);
    }

    pub fn adjust(&self, delta: f64) {
        self.set(self.get() + delta);
    }

    pub fn reset_to_default(&self) {
        self.set(self.config.default);
    }

    pub fn reset_to_zero(&self) {
        self.set(0.0);
    }

    pub fn is_default(&self) -> bool {
        (self.get() - self.config.default).abs() < 1e-9
    }

    pub fn debug_mode(&self) -> bool {
        self.state.lock().unwrap().debug_mode
    }

    /// Not persisted.
    pub fn set_debug_mode(&self, enabled: bool) {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.debug_mode = enabled;
            *state
        };
        self.notify(snapshot);
    }

    pub fn to_effective_time(&self, raw_time: f64) -> f64 {
        raw_time + self.get()
    }

    pub fn to_raw_time(&self, effective_time: f64) -> f64 {
        effective_time - self.get()
    }

    /// Register a listener that runs synchronously after every mutation.
    pub fn subscribe(&self, listener: OffsetListener) -> Subscription {
        let mut listeners = self.listeners.lock().unwrap();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, listener));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().entries.len()
    }

    fn notify(&self, snapshot: OffsetSnapshot) {
        // Listeners may call back into the store.
        let listeners: Vec<OffsetListener> = self
            .listeners
            .lock()
            .unwrap()
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(snapshot);
        }
    }
}
