//! Pure resolution over the static tables.
//!
//! Every function here is a deterministic function of `(table, time)`.
//! The engine calls them from scratch on every frame, so none of them keep
//! state between calls.

use crate::model::{
    Chunk, Cue, StatusTrigger, StepDefinition, StepStatus, StepTrigger, TimelineStep,
    TranscriptEntry,
};

/// First cue whose `[start_time, end_time)` window contains `t`.
///
/// Returns `None` before the first cue, after the last one, and in the
/// silence between two cues. Overlapping windows resolve to table order.
pub fn find_active_cue(cues: &[Cue], t: f64) -> Option<(usize, &Cue)> {
    cues.iter().enumerate().find(|(_, cue)| cue.contains(t))
}

/// Smallest cue start strictly after `t`.
pub fn find_next_cue_time(cues: &[Cue], t: f64) -> Option<f64> {
    cues.iter()
        .map(|c| c.start_time)
        .filter(|&start| start > t)
        .min_by(f64::total_cmp)
}

/// Chunks of `cue` revealed at `t`, in order.
pub fn visible_chunks(cue: &Cue, t: f64) -> &[Chunk] {
    let revealed = cue.chunks.iter().take_while(|c| c.t <= t).count();
    &cue.chunks[..revealed]
}

/// Index of the last revealed chunk.
///
/// `None` is a valid transient state: the window has opened but the first
/// chunk is not due yet.
pub fn active_chunk_index(cue: &Cue, t: f64) -> Option<usize> {
    visible_chunks(cue, t).len().checked_sub(1)
}

/// Reveal time of the first chunk still hidden at `t`.
pub fn next_chunk_time(cue: &Cue, t: f64) -> Option<f64> {
    cue.chunks.iter().find(|c| c.t > t).map(|c| c.t)
}

/// Status of the last trigger that has fired, or `""`.
pub fn resolve_status(triggers: &[StatusTrigger], t: f64) -> &str {
    triggers
        .iter()
        .filter(|trigger| t >= trigger.time)
        .last()
        .map(|trigger| trigger.status.as_str())
        .unwrap_or("")
}

/// Rebuild every timeline step from pending.
///
/// Completion wins over activation when both thresholds have passed.
/// Triggers naming an unknown step are skipped.
pub fn resolve_steps(
    definitions: &[StepDefinition],
    triggers: &[StepTrigger],
    t: f64,
) -> Vec<TimelineStep> {
    let mut steps: Vec<TimelineStep> = definitions.iter().map(TimelineStep::from).collect();

    for trigger in triggers {
        let Some(step) = steps.iter_mut().find(|s| s.id == trigger.step_id) else {
            continue;
        };
        if t >= trigger.complete_at {
            step.status = StepStatus::Completed;
        } else if t >= trigger.activate_at {
            step.status = StepStatus::Active;
        }
    }

    steps
}

/// Index of the last trigger (table order) that has activated.
pub fn current_step_index(triggers: &[StepTrigger], t: f64) -> Option<usize> {
    triggers.iter().rposition(|trigger| t >= trigger.activate_at)
}

/// Every utterance that has finished by `t`, in table order.
pub fn transcript_so_far(cues: &[Cue], t: f64) -> Vec<TranscriptEntry> {
    cues.iter()
        .filter(|cue| cue.end_time <= t)
        .map(TranscriptEntry::from)
        .collect()
}

/// Cue that was on screen at the last covered instant before `t`.
///
/// Meant for a `t` that no window contains. The latest window end at or
/// before `t` marks that instant, and first-match resolution picks among the
/// windows closing there. Zero-length windows are never on screen, and a
/// window shadowed by an earlier overlapping one never wins.
pub fn last_shown_cue(cues: &[Cue], t: f64) -> Option<usize> {
    let closed = || {
        cues.iter()
            .enumerate()
            .filter(|(_, cue)| cue.start_time < cue.end_time && cue.end_time <= t)
    };
    let last_end = closed().map(|(_, cue)| cue.end_time).max_by(f64::total_cmp)?;
    closed()
        .find(|(_, cue)| cue.end_time == last_end)
        .map(|(index, _)| index)
}

/// Smallest cue start strictly after `t + margin`.
pub fn next_cue_start_after(cues: &[Cue], t: f64, margin: f64) -> Option<f64> {
    find_next_cue_time(cues, t + margin)
}

/// Largest cue start strictly before `t - margin`.
pub fn previous_cue_start_before(cues: &[Cue], t: f64, margin: f64) -> Option<f64> {
    let limit = t - margin;
    cues.iter()
        .map(|c| c.start_time)
        .filter(|&start| start < limit)
        .max_by(f64::total_cmp)
}
