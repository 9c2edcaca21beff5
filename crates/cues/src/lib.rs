//! Cue sheets and trigger tables for scripted call replay.
//!
//! A [`CueScript`] holds the hand-authored timeline: speech cues split into
//! timed chunks, a status trigger table and a timeline-step trigger table.
//! The [`lookup`] module resolves any of them against an effective time.

mod error;
mod model;
mod script;

pub mod demo;
pub mod lookup;

pub use error::{ScriptError, ScriptResult};
pub use model::{
    Chunk, Cue, CueLifecycle, Speaker, StatusTrigger, StepDefinition, StepStatus, StepTrigger,
    TimelineStep, TranscriptEntry,
};
pub use script::{CueScript, ScriptWarning};
