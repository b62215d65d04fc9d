//! Gig Acceptance Gate
//!
//! Capacity rules evaluated inside the store transaction. Every backend
//! re-reads the gig and its submissions under lock, then calls into here, so
//! the in-memory and PostgreSQL stores enforce exactly the same rules.
//!
//! The pre-check in `GigService::accept_gig` runs the same rules on an
//! unlocked snapshot only to fail fast; these functions, called under the
//! lock, are what keeps a gig from being overbooked.

use chrono::{DateTime, Utc};

use crate::error::{GigletError, GigletResult};
use crate::models::{Gig, GigStatus, Submission, SubmissionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptDecision {
    /// Creator already holds this gig; nothing to write
    AlreadyAccepted,
    Accept,
}

/// Decide whether `creator_id` may accept `gig`.
///
/// `live_by_others` counts live submissions from creators other than
/// `creator_id`.
pub fn decide_acceptance(
    gig: &Gig,
    creator_id: &str,
    live_by_others: u32,
    now: DateTime<Utc>,
) -> GigletResult<AcceptDecision> {
    if gig.status == GigStatus::Closed {
        return Err(GigletError::GigClosed);
    }
    if gig.deadline_passed(now) {
        return Err(GigletError::DeadlinePassed);
    }
    if gig.has_accepted(creator_id) {
        return Ok(AcceptDecision::AlreadyAccepted);
    }
    if gig.is_single_slot() {
        if let Some(holder) = gig.accepted_by.as_deref() {
            if holder != creator_id {
                return Err(GigletError::Conflict(
                    "Gig already accepted by another creator".to_string(),
                ));
            }
        }
    }
    if live_by_others >= gig.accepted_submissions_limit {
        return Err(GigletError::Conflict(format!(
            "Gig has reached its limit of {} submissions",
            gig.accepted_submissions_limit
        )));
    }
    Ok(AcceptDecision::Accept)
}

/// Record the acceptance on the gig document.
pub fn apply_acceptance(gig: &mut Gig, creator_id: &str, at: DateTime<Utc>) {
    if gig.accepted_by.is_none() {
        gig.accepted_by = Some(creator_id.to_string());
        gig.accepted_at = Some(at);
    }
    if !gig.acceptances.iter().any(|c| c == creator_id) {
        gig.acceptances.push(creator_id.to_string());
    }
    if gig.status == GigStatus::Open {
        gig.status = GigStatus::Accepted;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPlan {
    Create,
    /// Reuse the creator's submission that needs changes
    Resubmit { submission_id: String },
}

/// Decide how a creator's content for `gig` is stored.
///
/// `own` holds the creator's existing submissions for the gig and
/// `live_by_others` the live submissions of everybody else.
pub fn plan_submission(
    gig: &Gig,
    creator_id: &str,
    own: &[Submission],
    live_by_others: u32,
    now: DateTime<Utc>,
) -> GigletResult<SubmissionPlan> {
    if gig.status == GigStatus::Closed {
        return Err(GigletError::GigClosed);
    }
    if gig.deadline_passed(now) {
        return Err(GigletError::DeadlinePassed);
    }
    if !gig.has_accepted(creator_id) {
        return Err(GigletError::Forbidden(
            "Creator has not accepted this gig".to_string(),
        ));
    }

    if let Some(existing) = own.iter().find(|s| s.status.is_live()) {
        return match existing.status {
            SubmissionStatus::NeedsChanges => Ok(SubmissionPlan::Resubmit {
                submission_id: existing.id.clone(),
            }),
            _ => Err(GigletError::Conflict(format!(
                "Submission {} is already {}",
                existing.id,
                existing.status.as_str()
            ))),
        };
    }

    if live_by_others >= gig.accepted_submissions_limit {
        return Err(GigletError::Conflict(format!(
            "Gig has reached its limit of {} submissions",
            gig.accepted_submissions_limit
        )));
    }
    Ok(SubmissionPlan::Create)
}

/// Statuses an approval may start from.
pub const REVIEWABLE: [SubmissionStatus; 2] =
    [SubmissionStatus::Submitted, SubmissionStatus::NeedsChanges];

/// Whether the gig is full once `approved` submissions are approved.
pub fn closes_gig(gig: &Gig, approved: u32) -> bool {
    approved >= gig.accepted_submissions_limit
}
