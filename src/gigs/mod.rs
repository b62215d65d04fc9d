//! Gigs: posting, visibility, eligibility, acceptance and review.
//!
//! ```text
//!  accept_gig ──► visibility ──► eligibility ──► pre-check ──► store tx
//!                 (audience,      (trust,         (unlocked     (acceptance
//!                  timer)          followers)      snapshot)      rules)
//! ```
//!
//! The pure rule functions live in `acceptance`, `visibility`,
//! `eligibility` and `payout`; `GigService` wires them to the store.

pub mod acceptance;
pub mod eligibility;
pub mod payout;
mod service;
pub mod visibility;

pub use acceptance::{
    AcceptDecision, REVIEWABLE, SubmissionPlan, apply_acceptance, closes_gig, decide_acceptance,
    plan_submission,
};
pub use eligibility::{EligibilityReport, check_eligibility};
pub use payout::{max_payout, min_followers_for_payout, payout_for, validate_payout};
pub use service::{
    AccessReport, EvaluationOutcome, FeedEntry, GigService, NEEDS_CHANGES_BELOW, NewGig,
    ReviewDecision, ReviewOutcome, ReviewRequest,
};
pub use visibility::{Visibility, in_audience, visibility_for};
