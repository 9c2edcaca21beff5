//! The full static configuration of a replay and its authoring checks.

use crate::error::{ScriptError, ScriptResult};
use crate::model::{Cue, StatusTrigger, StepDefinition, StepTrigger};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Cue sheet plus the status and step trigger tables that run alongside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueScript {
    #[serde(default)]
    pub title: Option<String>,
    pub cues: Vec<Cue>,
    #[serde(default)]
    pub status_triggers: Vec<StatusTrigger>,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub step_triggers: Vec<StepTrigger>,
    /// Nominal length of the recording in raw seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Hard completion timestamp in effective time.
    #[serde(default)]
    pub complete_at: Option<f64>,
}

impl CueScript {
    pub fn from_json_str(json: &str) -> ScriptResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> ScriptResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> ScriptResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Start of the first cue, which is where the idle phase ends.
    pub fn first_cue_start(&self) -> Option<f64> {
        self.cues.first().map(|c| c.start_time)
    }

    /// End of the last utterance.
    pub fn last_cue_end(&self) -> Option<f64> {
        self.cues.iter().map(|c| c.end_time).max_by(f64::total_cmp)
    }

    pub fn cue_index(&self, id: &str) -> Option<usize> {
        self.cues.iter().position(|c| c.id == id)
    }

    /// Report authoring problems.
    ///
    /// Nothing here is fatal: resolution falls back to first-match and
    /// last-write-wins, so a script with warnings still plays.
    pub fn validate(&self) -> Vec<ScriptWarning> {
        let mut warnings = Vec::new();

        for cue in &self.cues {
            if cue.end_time < cue.start_time {
                warnings.push(ScriptWarning::InvertedCueWindow {
                    cue_id: cue.id.clone(),
                });
            }

            let mut last_t = f64::NEG_INFINITY;
            for chunk in &cue.chunks {
                if chunk.t < cue.start_time || chunk.t > cue.end_time {
                    warnings.push(ScriptWarning::ChunkOutsideWindow {
                        cue_id: cue.id.clone(),
                        t: chunk.t,
                    });
                }
                if chunk.t < last_t {
                    warnings.push(ScriptWarning::UnorderedChunks {
                        cue_id: cue.id.clone(),
                    });
                }
                last_t = chunk.t;
            }
        }

        for pair in self.cues.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.start_time < prev.start_time {
                warnings.push(ScriptWarning::UnorderedCues {
                    cue_id: next.id.clone(),
                });
            } else if next.start_time < prev.end_time {
                warnings.push(ScriptWarning::OverlappingCues {
                    first: prev.id.clone(),
                    second: next.id.clone(),
                });
            }
        }

        for pair in self.status_triggers.windows(2) {
            if pair[1].time < pair[0].time {
                warnings.push(ScriptWarning::UnorderedStatusTriggers { time: pair[1].time });
            }
        }

        let known: HashSet<&str> = self.steps.iter().map(|s| s.id.as_str()).collect();
        for trigger in &self.step_triggers {
            if trigger.complete_at < trigger.activate_at {
                warnings.push(ScriptWarning::InvertedStepTrigger {
                    step_id: trigger.step_id.clone(),
                });
            }
            if !known.contains(trigger.step_id.as_str()) {
                warnings.push(ScriptWarning::UnknownStep {
                    step_id: trigger.step_id.clone(),
                });
            }
        }

        warnings
    }
}

/// An authoring inconsistency in a [`CueScript`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptWarning {
    InvertedCueWindow { cue_id: String },
    UnorderedCues { cue_id: String },
    OverlappingCues { first: String, second: String },
    ChunkOutsideWindow { cue_id: String, t: f64 },
    UnorderedChunks { cue_id: String },
    UnorderedStatusTriggers { time: f64 },
    InvertedStepTrigger { step_id: String },
    UnknownStep { step_id: String },
}

impl std::fmt::Display for ScriptWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptWarning::InvertedCueWindow { cue_id } => {
                write!(f, "cue {cue_id} ends before it starts")
            }
            ScriptWarning::UnorderedCues { cue_id } => {
                write!(f, "cue {cue_id} starts before the cue preceding it")
            }
            ScriptWarning::OverlappingCues { first, second } => {
                write!(f, "cues {first} and {second} overlap; {first} wins")
            }
            ScriptWarning::ChunkOutsideWindow { cue_id, t } => {
                write!(f, "chunk at {t:.2}s lies outside cue {cue_id}")
            }
            ScriptWarning::UnorderedChunks { cue_id } => {
                write!(f, "chunks of cue {cue_id} are not in time order")
            }
            ScriptWarning::UnorderedStatusTriggers { time } => {
                write!(f, "status trigger at {time:.2}s is out of order")
            }
            ScriptWarning::InvertedStepTrigger { step_id } => {
                write!(f, "step {step_id} completes before it activates")
            }
            ScriptWarning::UnknownStep { step_id } => {
                write!(f, "trigger references unknown step {step_id}")
            }
        }
    }
}
