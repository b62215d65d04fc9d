//! Rep Events
//!
//! Every rep change goes through a named event with a fixed delta.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RepEvent {
    /// Submission approved and paid out
    GigCompleted,
    SquadJoined,
    /// AI quality score for a submission, 0-100
    QualityScore { score: u8 },
    /// Submission rejected
    SubmissionFailed,
    /// Admin adjustment
    Manual { delta: i32, reason: String },
}

impl RepEvent {
    pub fn delta(&self) -> i32 {
        match self {
            RepEvent::GigCompleted => 50,
            RepEvent::SquadJoined => 10,
            RepEvent::QualityScore { score } => quality_bonus(*score),
            RepEvent::SubmissionFailed => -20,
            RepEvent::Manual { delta, .. } => *delta,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RepEvent::GigCompleted => "gig_completed",
            RepEvent::SquadJoined => "squad_joined",
            RepEvent::QualityScore { .. } => "quality_score",
            RepEvent::SubmissionFailed => "submission_failed",
            RepEvent::Manual { .. } => "manual",
        }
    }
}

/// Bonus for a quality score. Nothing below 70.
pub fn quality_bonus(score: u8) -> i32 {
    match score {
        90.. => 30,
        80..=89 => 20,
        70..=79 => 10,
        _ => 0,
    }
}

/// Rep ceiling. Keeps every stored change representable as an `i32` delta
/// and within the signed column range.
pub const MAX_REP: u32 = i32::MAX as u32;

/// New rep after applying `delta`, clamped to `0..=MAX_REP`.
pub fn apply_delta(current: u32, delta: i32) -> u32 {
    let next = i64::from(current) + i64::from(delta);
    next.clamp(0, i64::from(MAX_REP)) as u32
}

/// Signed difference between two rep totals, saturating at the `i32` range.
pub fn rep_difference(previous: u32, current: u32) -> i32 {
    let diff = i64::from(current) - i64::from(previous);
    diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
