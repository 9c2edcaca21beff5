//! Derived per-frame state handed to renderers.

use cuesync_cues::{Chunk, Cue, CueLifecycle, CueScript, TimelineStep, TranscriptEntry};
use serde::{Deserialize, Serialize};

/// Which part of the timeline the clock is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Not started, or before the first cue.
    #[default]
    Idle,
    /// Inside a cue window.
    CueActive,
    /// Between cues; the last cue stays on screen.
    Gap,
    /// End of media or the hard completion time was reached.
    Complete,
}

/// Everything a renderer needs for one frame.
///
/// Rebuilt from the clock and the static tables on every tick. Empty fields
/// mean "nothing to show", never "unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub phase: PlaybackPhase,
    /// Transport time the frame was resolved at.
    pub raw_time: f64,
    /// `raw_time` plus the calibration offset.
    pub effective_time: f64,
    pub active_cue: Option<Cue>,
    pub lifecycle: CueLifecycle,
    pub cue_index: Option<usize>,
    pub active_chunk_index: Option<usize>,
    pub visible_chunks: Vec<Chunk>,
    pub next_chunk_time: Option<f64>,
    pub next_cue_time: Option<f64>,
    pub status: String,
    pub steps: Vec<TimelineStep>,
    pub current_step_index: Option<usize>,
    pub total_steps: usize,
    /// Finished utterances, oldest first.
    pub transcript: Vec<TranscriptEntry>,
    /// A cue is being spoken right now.
    pub is_processing: bool,
    pub is_playing: bool,
    pub has_started: bool,
    pub is_complete: bool,
    pub show_confirmation: bool,
}

impl EngineSnapshot {
    /// State before `start()` and after `reset()`.
    pub fn initial(script: &CueScript) -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            raw_time: 0.0,
            effective_time: 0.0,
            active_cue: None,
            lifecycle: CueLifecycle::Hidden,
            cue_index: None,
            active_chunk_index: None,
            visible_chunks: Vec::new(),
            next_chunk_time: None,
            next_cue_time: script.first_cue_start(),
            status: String::new(),
            steps: script.steps.iter().map(TimelineStep::from).collect(),
            current_step_index: None,
            total_steps: script.step_triggers.len(),
            transcript: Vec::new(),
            is_processing: false,
            is_playing: false,
            has_started: false,
            is_complete: false,
            show_confirmation: false,
        }
    }

    pub fn active_cue_id(&self) -> Option<&str> {
        self.active_cue.as_ref().map(|c| c.id.as_str())
    }

    /// Text of the most recently revealed chunk.
    pub fn current_chunk_text(&self) -> Option<&str> {
        self.visible_chunks.last().map(|c| c.text.as_str())
    }

    /// Revealed part of the displayed cue.
    pub fn visible_text(&self) -> String {
        self.visible_chunks
            .iter()
            .map(|c| c.text.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Fraction of timeline steps reached, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        let reached = self.current_step_index.map(|i| i + 1).unwrap_or(0);
        (reached as f64 / self.total_steps as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuesync_cues::demo;

    #[test]
    fn test_initial_snapshot() {
        let script = demo::charger_support_call();
        let snapshot = EngineSnapshot::initial(&script);
        assert_eq!(snapshot.phase, PlaybackPhase::Idle);
        assert_eq!(snapshot.next_cue_time, Some(6.3));
        assert_eq!(snapshot.steps.len(), 9);
        assert_eq!(snapshot.total_steps, 9);
        assert!(snapshot.status.is_empty());
        assert_eq!(snapshot.progress(), 0.0);
        assert_eq!(snapshot.current_chunk_text(), None);
    }

    #[test]
    fn test_progress() {
        let script = demo::charger_support_call();
        let mut snapshot = EngineSnapshot::initial(&script);
        snapshot.current_step_index = Some(8);
        assert_eq!(snapshot.progress(), 1.0);
    }
}
