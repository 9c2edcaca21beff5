//! Event contracts published by the sync engine.
//!
//! Renderers, loggers and the CLI consume these instead of polling the
//! snapshot. Using shared types prevents runtime deserialization errors from
//! mismatched field names.

mod bus;

pub use bus::{
    emit_event, CallbackEventBus, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus,
    NullEventBus,
};

use cuesync_cues::{CueLifecycle, Speaker, StepStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emitted when the displayed cue, its lifecycle or its revealed chunk changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueChangedEvent {
    /// Playback run that produced this event.
    pub run_id: Uuid,
    /// Displayed cue, `None` while idle.
    #[serde(default)]
    pub cue_id: Option<String>,
    #[serde(default)]
    pub cue_index: Option<usize>,
    pub lifecycle: CueLifecycle,
    #[serde(default)]
    pub active_chunk_index: Option<usize>,
    pub effective_time: f64,
}

/// Emitted when the system status line changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub run_id: Uuid,
    /// New status, empty when cleared.
    pub status: String,
    pub effective_time: f64,
}

/// Status of a single timeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepState {
    pub id: String,
    pub status: StepStatus,
}

/// Emitted when any timeline step changes status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepsChangedEvent {
    pub run_id: Uuid,
    pub steps: Vec<StepState>,
    #[serde(default)]
    pub current_step_index: Option<usize>,
}

/// Emitted once per utterance when it enters the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptAppendedEvent {
    pub run_id: Uuid,
    pub cue_id: String,
    pub speaker: Speaker,
    pub text: String,
}

/// Emitted when the sequence reaches its end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceCompleteEvent {
    pub run_id: Uuid,
    pub effective_time: f64,
    /// Wall-clock time in milliseconds since epoch.
    pub timestamp_ms: i64,
}

impl SequenceCompleteEvent {
    pub fn now(run_id: Uuid, effective_time: f64) -> Self {
        Self {
            run_id,
            effective_time,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Emitted when the engine returns to its initial state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceResetEvent {
    pub run_id: Uuid,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const CUE_CHANGED: &str = "sequence:cue_changed";
    pub const STATUS_CHANGED: &str = "sequence:status_changed";
    pub const STEPS_CHANGED: &str = "sequence:steps_changed";
    pub const TRANSCRIPT_APPENDED: &str = "sequence:transcript_appended";
    pub const COMPLETE: &str = "sequence:complete";
    pub const RESET: &str = "sequence:reset";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_changed_deserialize_minimal() {
        let json = r#"{"run_id": "6f1c1c52-5d2a-4a51-9b1e-0c7a3c5f6a10",
            "lifecycle": "hidden", "effective_time": 0.0}"#;
        let event: CueChangedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.cue_id, None);
        assert_eq!(event.lifecycle, CueLifecycle::Hidden);
    }

    #[test]
    fn test_steps_changed_serialize() {
        let event = StepsChangedEvent {
            run_id: Uuid::nil(),
            steps: vec![StepState {
                id: "1".to_string(),
                status: StepStatus::Active,
            }],
            current_step_index: Some(0),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["steps"][0]["status"], "active");
        assert_eq!(value["current_step_index"], 0);
    }

    #[test]
    fn test_complete_event_stamps_wall_clock() {
        let event = SequenceCompleteEvent::now(Uuid::new_v4(), 137.0);
        assert!(event.timestamp_ms > 0);
    }
}
