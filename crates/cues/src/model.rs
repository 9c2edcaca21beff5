//! Static cue sheet and trigger table types.
//!
//! Everything here is authored ahead of time and never mutated while a
//! sequence is playing. All times are seconds in the effective-time domain.

use serde::{Deserialize, Serialize};

/// Who is talking during a cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The caller.
    Driver,
    /// The support agent.
    #[serde(alias = "amelia")]
    Agent,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Driver => "driver",
            Speaker::Agent => "agent",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A short phrase of a cue with its own reveal timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Reveal time.
    pub t: f64,
    pub text: String,
}

impl Chunk {
    pub fn new(t: f64, text: impl Into<String>) -> Self {
        Self {
            t,
            text: text.into(),
        }
    }
}

/// A single utterance with its time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub id: String,
    pub speaker: Speaker,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
}

impl Cue {
    /// Half-open window test: `start_time <= t < end_time`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time
    }

    /// Full utterance text.
    pub fn text(&self) -> String {
        self.chunks
            .iter()
            .map(|c| c.text.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }
}

/// Where a cue stands relative to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CueLifecycle {
    /// Upcoming, or nothing to show.
    #[default]
    Hidden,
    /// Currently being spoken.
    Active,
    /// Finished speaking and shown frozen.
    Completed,
}

/// Maps a timestamp to the system-status line shown from that moment on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTrigger {
    pub time: f64,
    pub status: String,
}

impl StatusTrigger {
    pub fn new(time: f64, status: impl Into<String>) -> Self {
        Self {
            time,
            status: status.into(),
        }
    }
}

/// Lifecycle of a timeline step. Only ever moves forward for increasing time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Completed,
}

/// Static description of a timeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub detail: String,
    /// Highlighted by renderers as a moment of value for the caller.
    #[serde(default)]
    pub is_value_moment: bool,
}

/// Activation and completion times for a named step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepTrigger {
    pub step_id: String,
    pub activate_at: f64,
    pub complete_at: f64,
}

/// A step definition with its resolved status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub id: String,
    pub label: String,
    pub detail: String,
    pub is_value_moment: bool,
    pub status: StepStatus,
}

impl From<&StepDefinition> for TimelineStep {
    fn from(def: &StepDefinition) -> Self {
        Self {
            id: def.id.clone(),
            label: def.label.clone(),
            detail: def.detail.clone(),
            is_value_moment: def.is_value_moment,
            status: StepStatus::Pending,
        }
    }
}

/// A completed utterance in the running transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub cue_id: String,
    pub speaker: Speaker,
    pub text: String,
}

impl From<&Cue> for TranscriptEntry {
    fn from(cue: &Cue) -> Self {
        Self {
            cue_id: cue.id.clone(),
            speaker: cue.speaker,
            text: cue.text(),
        }
    }
}
