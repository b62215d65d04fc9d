//! Document Store Abstraction
//!
//! Everything the services need from persistence. Plain reads and inserts
//! are single-document operations; the methods documented as atomic run as
//! one transaction in every backend and either commit fully or leave the
//! prior state untouched.
//!
//! ```text
//! ┌──────────────────┐        ┌─────────────────────┐
//! │ GigService       │───────►│ dyn MarketplaceStore│
//! │ ReputationManager│        └─────────┬───────────┘
//! │ SquadService     │          ┌───────┴────────┐
//! └──────────────────┘          ▼                ▼
//!                         MemoryStore      DatabasePool
//!                         (RwLock)         (PostgreSQL)
//! ```

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GigletResult;
use crate::models::{
    AiEvaluation, Creator, Gig, Payment, Squad, Submission, SubmissionStatus, User,
};

/// Result of an atomic rep update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepChange {
    pub creator_id: String,
    pub previous: u32,
    pub current: u32,
    /// Delta actually applied after clamping at zero
    pub applied_delta: i32,
}

/// Result of an atomic gig acceptance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptOutcome {
    pub gig: Gig,
    pub already_accepted: bool,
}

/// Everything written by an approval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalRecord {
    pub submission: Submission,
    pub payment: Payment,
    pub creator: Creator,
    pub gig_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadMembership {
    pub squad: Squad,
    /// False when the creator was already a member
    pub newly_joined: bool,
}

#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn insert_user(&self, user: &User) -> GigletResult<()>;
    async fn get_user(&self, id: &str) -> GigletResult<Option<User>>;

    /// Fails with `Conflict` when the creator already exists.
    async fn insert_creator(&self, creator: &Creator) -> GigletResult<()>;
    async fn get_creator(&self, id: &str) -> GigletResult<Option<Creator>>;

    /// Overwrite profile fields (username, followers, verification,
    /// socials). Rep, balance and squad membership are only changed by the
    /// atomic operations below.
    async fn update_creator_profile(&self, creator: &Creator) -> GigletResult<()>;

    /// Atomic: `rep = max(0, rep + delta)` under the creator's row lock.
    async fn apply_rep_delta(&self, creator_id: &str, delta: i32) -> GigletResult<RepChange>;

    async fn insert_gig(&self, gig: &Gig) -> GigletResult<()>;
    async fn get_gig(&self, id: &str) -> GigletResult<Option<Gig>>;

    /// Gigs not closed and still before their deadline, newest first.
    async fn list_active_gigs(&self, now: DateTime<Utc>) -> GigletResult<Vec<Gig>>;

    /// Submissions for the gig in a live status.
    async fn count_live_submissions(&self, gig_id: &str) -> GigletResult<u32>;

    /// Atomic: re-read the gig, re-count live submissions and record the
    /// acceptance, see `gigs::acceptance::decide_acceptance`.
    async fn accept_gig(
        &self,
        gig_id: &str,
        creator_id: &str,
        at: DateTime<Utc>,
    ) -> GigletResult<AcceptOutcome>;

    /// Atomic: create the creator's submission, or resubmit one that needs
    /// changes, without exceeding the gig's limit.
    async fn submit(
        &self,
        gig_id: &str,
        creator_id: &str,
        content_url: &str,
        at: DateTime<Utc>,
    ) -> GigletResult<Submission>;

    async fn get_submission(&self, id: &str) -> GigletResult<Option<Submission>>;
    async fn list_submissions_for_gig(&self, gig_id: &str) -> GigletResult<Vec<Submission>>;

    /// Compare-and-set on the submission status. `Conflict` when the current
    /// status is not one of `expected`, or when `evaluation` is given and the
    /// submission already carries one. Resubmitting clears the evaluation.
    async fn transition_submission(
        &self,
        submission_id: &str,
        expected: &[SubmissionStatus],
        to: SubmissionStatus,
        evaluation: Option<&AiEvaluation>,
    ) -> GigletResult<Submission>;

    /// Atomic: approve the submission, insert the payment, credit the
    /// creator, update squad stats and close the gig at capacity.
    async fn approve_submission(
        &self,
        submission_id: &str,
        payment: &Payment,
    ) -> GigletResult<ApprovalRecord>;

    async fn list_payments_for_creator(&self, creator_id: &str) -> GigletResult<Vec<Payment>>;

    /// Atomic: insert the squad with its owner as the only member. The owner
    /// must exist and must not belong to another squad.
    async fn create_squad(&self, squad: &Squad) -> GigletResult<SquadMembership>;
    async fn get_squad(&self, id: &str) -> GigletResult<Option<Squad>>;

    /// Atomic: add the creator to the squad. A creator belongs to at most
    /// one squad.
    async fn join_squad(&self, squad_id: &str, creator_id: &str) -> GigletResult<SquadMembership>;
}
