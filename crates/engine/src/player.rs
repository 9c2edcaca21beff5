//! Shared engine plus its frame loop.

use crate::engine::SyncEngine;
use crate::snapshot::EngineSnapshot;
use crate::ticker::FrameTicker;
use cuesync_transport::Transport;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Owns a [`SyncEngine`] behind a mutex and keeps a [`FrameTicker`] running
/// exactly while the engine is.
///
/// Every control runs on the engine and then starts or stops the ticker to
/// match. Must be driven from inside a tokio runtime for frames to tick.
pub struct Player<T: Transport + 'static> {
    engine: Arc<Mutex<SyncEngine<T>>>,
    ticker: FrameTicker,
}

impl<T: Transport + 'static> Player<T> {
    pub fn new(engine: SyncEngine<T>) -> Self {
        let ticker = FrameTicker::new(engine.config().frame_interval());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            ticker,
        }
    }

    /// Shared handle to the engine, for renderers and event wiring.
    pub fn engine(&self) -> Arc<Mutex<SyncEngine<T>>> {
        Arc::clone(&self.engine)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.lock().snapshot().clone()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running()
    }

    pub fn start(&mut self) {
        self.lock().start();
        self.sync_ticker();
    }

    pub fn toggle_play_pause(&mut self) {
        self.lock().toggle_play_pause();
        self.sync_ticker();
    }

    pub fn advance_to_next_cue(&mut self) {
        self.lock().advance_to_next_cue();
        self.sync_ticker();
    }

    pub fn rewind_to_previous_cue(&mut self) {
        self.lock().rewind_to_previous_cue();
        self.sync_ticker();
    }

    pub fn seek_to_effective(&mut self, effective_time: f64) {
        self.lock().seek_to_effective(effective_time);
        self.sync_ticker();
    }

    pub fn seek_to_cue(&mut self, index: usize) {
        self.lock().seek_to_cue(index);
        self.sync_ticker();
    }

    pub fn handle_ended(&mut self) {
        self.lock().handle_ended();
        self.sync_ticker();
    }

    /// Stop ticking first, then return the engine to its initial state.
    pub fn reset(&mut self) {
        self.ticker.stop();
        self.lock().reset();
    }

    pub fn set_muted(&self, muted: bool) {
        self.lock().set_muted(muted);
    }

    pub fn is_muted(&self) -> bool {
        self.lock().is_muted()
    }

    /// Run `f` against the attached transport, if any.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.lock().transport_mut().map(f)
    }

    fn lock(&self) -> MutexGuard<'_, SyncEngine<T>> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sync_ticker(&mut self) {
        let running = self.lock().is_running();
        // Restart rather than reuse: the previous task may be about to exit.
        self.ticker.stop();
        if !running {
            return;
        }
        let engine = Arc::clone(&self.engine);
        self.ticker.start(move |token| {
            let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
            if token.is_cancelled() {
                return ControlFlow::Break(());
            }
            engine.tick()
        });
    }
}

impl<T: Transport + 'static> Drop for Player<T> {
    fn drop(&mut self) {
        self.ticker.stop();
    }
}
