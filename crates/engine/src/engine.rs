//! Frame-driven resolution of the cue timeline against a transport clock.

use crate::config::EngineConfig;
use crate::snapshot::{EngineSnapshot, PlaybackPhase};
use cuesync_cues::{lookup, CueLifecycle, CueScript};
use cuesync_events::{
    emit_event, event_names, CueChangedEvent, EventBusRef, NullEventBus, SequenceCompleteEvent,
    SequenceResetEvent, StatusChangedEvent, StepState, StepsChangedEvent,
    TranscriptAppendedEvent,
};
use cuesync_offset::OffsetStore;
use cuesync_transport::Transport;
use std::ops::ControlFlow;
use std::sync::Arc;
use uuid::Uuid;

/// Seeks to a cue start land this far past it so the reverse offset
/// conversion cannot leave the clock a rounding error short of the window.
const CUE_SEEK_NUDGE: f64 = 0.001;

/// Replays a [`CueScript`] in lockstep with a [`Transport`].
///
/// The engine holds no timeline state of its own: every tick reads the clock
/// once and rebuilds the whole [`EngineSnapshot`] from the static tables. The
/// only value carried between ticks is the last cue that was actually active,
/// kept on screen through the silence that follows it.
pub struct SyncEngine<T: Transport> {
    script: Arc<CueScript>,
    config: EngineConfig,
    offset: Arc<OffsetStore>,
    transport: Option<T>,
    events: EventBusRef,
    snapshot: EngineSnapshot,
    last_active: Option<usize>,
    run_id: Uuid,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(script: impl Into<Arc<CueScript>>, offset: Arc<OffsetStore>, transport: T) -> Self {
        Self::with_config(script, offset, Some(transport), EngineConfig::default())
    }

    /// Engine with no transport attached; every control is a no-op until
    /// [`attach_transport`](Self::attach_transport) is called.
    pub fn detached(script: impl Into<Arc<CueScript>>, offset: Arc<OffsetStore>) -> Self {
        Self::with_config(script, offset, None, EngineConfig::default())
    }

    pub fn with_config(
        script: impl Into<Arc<CueScript>>,
        offset: Arc<OffsetStore>,
        transport: Option<T>,
        config: EngineConfig,
    ) -> Self {
        let script = script.into();
        for warning in script.validate() {
            tracing::warn!(%warning, "script warning");
        }
        let snapshot = EngineSnapshot::initial(&script);
        Self {
            script,
            config,
            offset,
            transport,
            events: Arc::new(NullEventBus),
            snapshot,
            last_active: None,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn with_event_bus(mut self, events: EventBusRef) -> Self {
        self.events = events;
        self
    }

    /// Attach a transport, returning the previous one.
    pub fn attach_transport(&mut self, transport: T) -> Option<T> {
        self.transport.replace(transport)
    }

    /// Detach the transport. The engine stops running until one is attached.
    pub fn detach_transport(&mut self) -> Option<T> {
        let transport = self.transport.take();
        self.snapshot.is_playing = false;
        transport
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    pub fn snapshot(&self) -> &EngineSnapshot {
        &self.snapshot
    }

    pub fn script(&self) -> &CueScript {
        &self.script
    }

    pub fn offset(&self) -> &Arc<OffsetStore> {
        &self.offset
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Identifier of the current playback run, renewed by [`start`](Self::start).
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Whether the frame loop should keep ticking.
    pub fn is_running(&self) -> bool {
        self.transport.is_some()
            && self.snapshot.has_started
            && self.snapshot.is_playing
            && !self.snapshot.is_complete
    }

    /// Resolve one animation frame.
    ///
    /// Returns `Break` once the loop should stop: the engine is paused,
    /// detached, or the sequence just completed.
    pub fn tick(&mut self) -> ControlFlow<()> {
        if !self.is_running() {
            return ControlFlow::Break(());
        }
        let Some(transport) = self.transport.as_ref() else {
            return ControlFlow::Break(());
        };
        let raw_time = transport.current_time();
        let ended = transport.is_ended();

        let prev = self.snapshot.clone();
        self.resolve_frame(raw_time);
        tracing::trace!(
            phase = ?self.snapshot.phase,
            effective_time = self.snapshot.effective_time,
            "tick"
        );

        let reached_end = self
            .script
            .complete_at
            .is_some_and(|at| self.snapshot.effective_time >= at);
        if ended || reached_end {
            self.complete();
        }
        self.publish_changes(&prev);

        if self.snapshot.is_complete {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Re-resolve the snapshot at the transport's current position.
    ///
    /// Used after seeks so a paused engine still shows the new position.
    /// Does nothing before [`start`](Self::start).
    pub fn refresh(&mut self) {
        if !self.snapshot.has_started {
            return;
        }
        let Some(transport) = self.transport.as_ref() else {
            return;
        };
        let raw_time = transport.current_time();
        self.resolve_frame(raw_time);
    }

    /// Begin a new run from the top.
    pub fn start(&mut self) {
        let Some(transport) = self.transport.as_mut() else {
            tracing::debug!("start ignored: no transport attached");
            return;
        };
        let prev = self.snapshot.clone();

        transport.set_current_time(0.0);
        let playing = match transport.play() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "play rejected, staying paused");
                false
            }
        };

        self.run_id = Uuid::new_v4();
        self.last_active = None;
        self.snapshot = EngineSnapshot::initial(&self.script);
        self.snapshot.has_started = true;
        self.snapshot.is_playing = playing;
        tracing::info!(run_id = %self.run_id, playing, "sequence started");

        self.refresh();
        self.publish_changes(&prev);
    }

    /// Pause or resume. A completed sequence is reset instead, and an engine
    /// that was never started is started.
    pub fn toggle_play_pause(&mut self) {
        if self.transport.is_none() {
            return;
        }
        if self.snapshot.is_complete {
            self.reset();
            return;
        }
        if !self.snapshot.has_started {
            self.start();
            return;
        }
        let Some(transport) = self.transport.as_mut() else {
            return;
        };

        if self.snapshot.is_playing {
            transport.pause();
            self.snapshot.is_playing = false;
            tracing::info!(effective_time = self.snapshot.effective_time, "paused");
        } else {
            match transport.play() {
                Ok(()) => {
                    self.snapshot.is_playing = true;
                    tracing::info!(effective_time = self.snapshot.effective_time, "resumed");
                }
                Err(e) => tracing::debug!(error = %e, "play rejected, staying paused"),
            }
        }
    }

    /// Skip to the next cue start. Completes the sequence when none is left.
    pub fn advance_to_next_cue(&mut self) {
        if !self.snapshot.has_started || self.snapshot.is_complete {
            tracing::debug!("advance ignored: sequence not in progress");
            return;
        }
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let prev = self.snapshot.clone();

        let effective = self.offset.to_effective_time(transport.current_time());
        match lookup::next_cue_start_after(
            &self.script.cues,
            effective,
            self.config.next_cue_debounce,
        ) {
            Some(start) => {
                let raw = (self.offset.to_raw_time(start) + CUE_SEEK_NUDGE).max(0.0);
                transport.set_current_time(raw);
                tracing::debug!(from = effective, to = start, "advanced to next cue");
                self.refresh();
            }
            None => {
                tracing::debug!(effective_time = effective, "no cue left to advance to");
                self.refresh();
                self.complete();
            }
        }
        self.publish_changes(&prev);
    }

    /// Jump back to the start of the previous cue, or to the top.
    pub fn rewind_to_previous_cue(&mut self) {
        if !self.snapshot.has_started {
            tracing::debug!("rewind ignored: sequence not started");
            return;
        }
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let prev = self.snapshot.clone();

        let effective = self.offset.to_effective_time(transport.current_time());
        let target = lookup::previous_cue_start_before(
            &self.script.cues,
            effective,
            self.config.previous_cue_margin,
        )
        .unwrap_or(0.0);
        let raw = self.offset.to_raw_time(target).max(0.0);
        transport.set_current_time(raw);
        tracing::debug!(from = effective, to = target, "rewound to previous cue");

        self.snapshot.is_complete = false;
        self.snapshot.show_confirmation = false;
        self.refresh();
        self.publish_changes(&prev);
    }

    /// Return to the initial state: paused at zero, nothing shown.
    pub fn reset(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            transport.pause();
            transport.set_current_time(0.0);
        }
        self.last_active = None;
        self.snapshot = EngineSnapshot::initial(&self.script);
        tracing::info!(run_id = %self.run_id, "sequence reset");
        emit_event(
            self.events.as_ref(),
            event_names::RESET,
            &SequenceResetEvent {
                run_id: self.run_id,
            },
        );
    }

    /// Seek so that the effective clock reads `effective_time`.
    pub fn seek_to_effective(&mut self, effective_time: f64) {
        if !effective_time.is_finite() {
            tracing::warn!(effective_time, "ignoring non-finite seek target");
            return;
        }
        self.seek_raw(self.offset.to_raw_time(effective_time).max(0.0));
    }

    /// Seek to the start of the cue at `index`.
    pub fn seek_to_cue(&mut self, index: usize) {
        let Some(start) = self.script.cues.get(index).map(|c| c.start_time) else {
            tracing::debug!(index, "seek ignored: no such cue");
            return;
        };
        self.seek_raw((self.offset.to_raw_time(start) + CUE_SEEK_NUDGE).max(0.0));
    }

    fn seek_raw(&mut self, raw_time: f64) {
        let Some(transport) = self.transport.as_mut() else {
            return;
        };
        let prev = self.snapshot.clone();
        transport.set_current_time(raw_time);
        self.refresh();
        self.publish_changes(&prev);
    }

    pub fn set_muted(&mut self, muted: bool) {
        if let Some(transport) = self.transport.as_mut() {
            transport.set_muted(muted);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_muted())
    }

    /// Entry point for transports that report end of media by callback.
    pub fn handle_ended(&mut self) {
        if !self.snapshot.has_started || self.snapshot.is_complete {
            return;
        }
        let prev = self.snapshot.clone();
        self.refresh();
        self.complete();
        self.publish_changes(&prev);
    }

    fn complete(&mut self) {
        if self.snapshot.is_complete {
            return;
        }
        if let Some(transport) = self.transport.as_mut() {
            transport.pause();
        }
        let snapshot = &mut self.snapshot;
        snapshot.phase = PlaybackPhase::Complete;
        snapshot.is_complete = true;
        snapshot.show_confirmation = true;
        snapshot.is_processing = false;
        snapshot.is_playing = false;
        tracing::info!(
            run_id = %self.run_id,
            effective_time = snapshot.effective_time,
            "sequence complete"
        );
    }

    /// Rebuild the snapshot from the tables at one clock sample.
    fn resolve_frame(&mut self, raw_time: f64) {
        let script = Arc::clone(&self.script);
        let cues = &script.cues;
        let effective = self.offset.to_effective_time(raw_time);
        let snapshot = &mut self.snapshot;

        snapshot.raw_time = raw_time;
        snapshot.effective_time = effective;
        snapshot.total_steps = script.step_triggers.len();

        let first_start = script.first_cue_start();
        if first_start.map_or(true, |start| effective < start) {
            self.last_active = None;
            snapshot.phase = PlaybackPhase::Idle;
            snapshot.active_cue = None;
            snapshot.lifecycle = CueLifecycle::Hidden;
            snapshot.cue_index = None;
            snapshot.active_chunk_index = None;
            snapshot.visible_chunks.clear();
            snapshot.next_chunk_time = None;
            snapshot.next_cue_time = first_start;
            snapshot.status.clear();
            snapshot.steps = lookup::resolve_steps(&script.steps, &[], effective);
            snapshot.current_step_index = None;
            snapshot.transcript.clear();
            snapshot.is_processing = false;
        } else {
            if let Some((index, cue)) = lookup::find_active_cue(cues, effective) {
                self.last_active = Some(index);
                snapshot.phase = PlaybackPhase::CueActive;
                snapshot.lifecycle = CueLifecycle::Active;
                snapshot.cue_index = Some(index);
                snapshot.visible_chunks = lookup::visible_chunks(cue, effective).to_vec();
                snapshot.active_chunk_index = lookup::active_chunk_index(cue, effective);
                snapshot.next_chunk_time = lookup::next_chunk_time(cue, effective);
                snapshot.active_cue = Some(cue.clone());
                snapshot.is_processing = true;
            } else {
                // A seek, or a window shorter than a frame, can leave the memo
                // behind the clock.
                let shown = lookup::last_shown_cue(cues, effective);
                if self.last_active != shown {
                    tracing::debug!(
                        memo = ?self.last_active,
                        shown = ?shown,
                        "refreshing gap cue"
                    );
                    self.last_active = shown;
                }
                snapshot.phase = PlaybackPhase::Gap;
                snapshot.next_chunk_time = None;
                snapshot.is_processing = false;
                match self.last_active.and_then(|i| cues.get(i).map(|cue| (i, cue))) {
                    Some((index, cue)) => {
                        snapshot.lifecycle = CueLifecycle::Completed;
                        snapshot.cue_index = Some(index);
                        snapshot.visible_chunks =
                            lookup::visible_chunks(cue, effective).to_vec();
                        snapshot.active_chunk_index = lookup::active_chunk_index(cue, effective);
                        snapshot.active_cue = Some(cue.clone());
                    }
                    None => {
                        snapshot.lifecycle = CueLifecycle::Hidden;
                        snapshot.cue_index = None;
                        snapshot.visible_chunks.clear();
                        snapshot.active_chunk_index = None;
                        snapshot.active_cue = None;
                    }
                }
            }

            snapshot.next_cue_time = lookup::find_next_cue_time(cues, effective);
            snapshot.status = lookup::resolve_status(&script.status_triggers, effective).to_string();
            snapshot.steps = lookup::resolve_steps(&script.steps, &script.step_triggers, effective);
            snapshot.current_step_index = lookup::current_step_index(&script.step_triggers, effective);
            snapshot.transcript = lookup::transcript_so_far(cues, effective);
        }

        if snapshot.is_complete {
            snapshot.phase = PlaybackPhase::Complete;
            snapshot.is_processing = false;
        }
    }

    /// Emit an event for every observable difference from `prev`.
    fn publish_changes(&self, prev: &EngineSnapshot) {
        let bus = self.events.as_ref();
        let now = &self.snapshot;
        let run_id = self.run_id;

        if prev.phase != now.phase {
            tracing::debug!(
                from = ?prev.phase,
                to = ?now.phase,
                effective_time = now.effective_time,
                "phase changed"
            );
        }

        if prev.active_cue_id() != now.active_cue_id()
            || prev.lifecycle != now.lifecycle
            || prev.active_chunk_index != now.active_chunk_index
        {
            emit_event(
                bus,
                event_names::CUE_CHANGED,
                &CueChangedEvent {
                    run_id,
                    cue_id: now.active_cue_id().map(str::to_string),
                    cue_index: now.cue_index,
                    lifecycle: now.lifecycle,
                    active_chunk_index: now.active_chunk_index,
                    effective_time: now.effective_time,
                },
            );
        }

        if prev.status != now.status {
            emit_event(
                bus,
                event_names::STATUS_CHANGED,
                &StatusChangedEvent {
                    run_id,
                    status: now.status.clone(),
                    effective_time: now.effective_time,
                },
            );
        }

        if prev.steps != now.steps || prev.current_step_index != now.current_step_index {
            emit_event(
                bus,
                event_names::STEPS_CHANGED,
                &StepsChangedEvent {
                    run_id,
                    steps: now
                        .steps
                        .iter()
                        .map(|s| StepState {
                            id: s.id.clone(),
                            status: s.status,
                        })
                        .collect(),
                    current_step_index: now.current_step_index,
                },
            );
        }

        for entry in &now.transcript {
            if prev.transcript.iter().any(|p| p.cue_id == entry.cue_id) {
                continue;
            }
            emit_event(
                bus,
                event_names::TRANSCRIPT_APPENDED,
                &TranscriptAppendedEvent {
                    run_id,
                    cue_id: entry.cue_id.clone(),
                    speaker: entry.speaker,
                    text: entry.text.clone(),
                },
            );
        }

        if !prev.is_complete && now.is_complete {
            emit_event(
                bus,
                event_names::COMPLETE,
                &SequenceCompleteEvent::now(run_id, now.effective_time),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesync_cues::{Chunk, Cue, Speaker};
    use cuesync_transport::ManualTransport;

    fn script() -> CueScript {
        CueScript {
            cues: vec![
                Cue {
                    id: "1".to_string(),
                    speaker: Speaker::Agent,
                    start_time: 5.0,
                    end_time: 10.0,
                    chunks: vec![Chunk::new(5.0, "Hello"), Chunk::new(7.0, "there")],
                },
                Cue {
                    id: "2".to_string(),
                    speaker: Speaker::Driver,
                    start_time: 15.0,
                    end_time: 20.0,
                    chunks: vec![Chunk::new(15.0, "Hi")],
                },
            ],
            ..CueScript::default()
        }
    }

    fn engine() -> SyncEngine<ManualTransport> {
        let offset = Arc::new(OffsetStore::in_memory());
        offset.reset_to_zero();
        SyncEngine::new(script(), offset, ManualTransport::with_duration(30.0))
    }

    fn play_to(engine: &mut SyncEngine<ManualTransport>, t: f64) {
        let now = engine.transport().unwrap().current_time();
        engine.transport_mut().unwrap().advance(t - now);
        let _ = engine.tick();
    }

    #[test]
    fn test_tick_before_start_breaks() {
        let mut engine = engine();
        assert_eq!(engine.tick(), ControlFlow::Break(()));
        assert!(!engine.snapshot().has_started);
    }

    #[test]
    fn test_detached_engine_ignores_controls() {
        let offset = Arc::new(OffsetStore::in_memory());
        let mut engine: SyncEngine<ManualTransport> = SyncEngine::detached(script(), offset);
        engine.start();
        assert!(!engine.snapshot().has_started);
        assert!(!engine.is_running());
        assert!(!engine.is_muted());

        engine.attach_transport(ManualTransport::new());
        engine.start();
        assert!(engine.is_running());
    }

    #[test]
    fn test_chunks_reveal_forward() {
        let mut engine = engine();
        engine.start();
        play_to(&mut engine, 6.0);
        assert_eq!(engine.snapshot().visible_chunks.len(), 1);
        assert_eq!(engine.snapshot().next_chunk_time, Some(7.0));
        play_to(&mut engine, 7.5);
        assert_eq!(engine.snapshot().visible_text(), "Hello there");
        assert_eq!(engine.snapshot().active_chunk_index, Some(1));
    }

    #[test]
    fn test_gap_memo_follows_backward_seek() {
        let mut engine = engine();
        engine.start();
        play_to(&mut engine, 22.0);
        assert_eq!(engine.snapshot().active_cue_id(), Some("2"));
        assert_eq!(engine.snapshot().phase, PlaybackPhase::Gap);

        engine.seek_to_effective(12.0);
        assert_eq!(engine.snapshot().phase, PlaybackPhase::Gap);
        assert_eq!(engine.snapshot().active_cue_id(), Some("1"));
        assert_eq!(engine.snapshot().lifecycle, CueLifecycle::Completed);
    }

    #[test]
    fn test_seek_to_cue_lands_inside_window() {
        let mut engine = engine();
        engine.offset().set(-0.45);
        engine.start();
        engine.seek_to_cue(1);
        assert_eq!(engine.snapshot().phase, PlaybackPhase::CueActive);
        assert_eq!(engine.snapshot().active_cue_id(), Some("2"));

        engine.seek_to_cue(9);
        assert_eq!(engine.snapshot().active_cue_id(), Some("2"));
    }

    #[test]
    fn test_mute_forwards_to_transport() {
        let mut engine = engine();
        engine.set_muted(true);
        assert!(engine.is_muted());
        assert!(engine.transport().unwrap().is_muted());
    }
}
