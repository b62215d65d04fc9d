//! In-memory store
//!
//! All documents live behind one `RwLock`. Atomic operations hold the write
//! guard for their whole read-check-write sequence, which serialises them
//! the same way row locks do in PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{AcceptOutcome, ApprovalRecord, MarketplaceStore, RepChange, SquadMembership};
use crate::error::{GigletError, GigletResult};
use crate::gigs::acceptance::{
    AcceptDecision, REVIEWABLE, SubmissionPlan, apply_acceptance, closes_gig, decide_acceptance,
    plan_submission,
};
use crate::models::{
    AiEvaluation, Creator, Gig, GigStatus, Payment, Squad, Submission, SubmissionStatus, User,
    new_id,
};
use crate::reputation::{apply_delta, rep_difference};

#[derive(Default)]
struct Documents {
    users: HashMap<String, User>,
    creators: HashMap<String, Creator>,
    gigs: HashMap<String, Gig>,
    submissions: HashMap<String, Submission>,
    payments: HashMap<String, Payment>,
    squads: HashMap<String, Squad>,
}

impl Documents {
    fn live_by_others(&self, gig_id: &str, creator_id: &str) -> u32 {
        self.submissions
            .values()
            .filter(|s| s.gig_id == gig_id && s.creator_id != creator_id && s.status.is_live())
            .count() as u32
    }

    fn approved_count(&self, gig_id: &str) -> u32 {
        self.submissions
            .values()
            .filter(|s| s.gig_id == gig_id && s.status == SubmissionStatus::Approved)
            .count() as u32
    }
}

#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Documents>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, user: &User) -> GigletResult<()> {
        let mut docs = self.docs.write().await;
        if docs.users.contains_key(&user.id) {
            return Err(GigletError::Conflict(format!("User {} already exists", user.id)));
        }
        docs.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> GigletResult<Option<User>> {
        Ok(self.docs.read().await.users.get(id).cloned())
    }

    async fn insert_creator(&self, creator: &Creator) -> GigletResult<()> {
        let mut docs = self.docs.write().await;
        if docs.creators.contains_key(&creator.id) {
            return Err(GigletError::Conflict(format!(
                "Creator {} already exists",
                creator.id
            )));
        }
        docs.creators.insert(creator.id.clone(), creator.clone());
        Ok(())
    }

    async fn get_creator(&self, id: &str) -> GigletResult<Option<Creator>> {
        Ok(self.docs.read().await.creators.get(id).cloned())
    }

    async fn update_creator_profile(&self, creator: &Creator) -> GigletResult<()> {
        let mut docs = self.docs.write().await;
        let stored = docs
            .creators
            .get_mut(&creator.id)
            .ok_or_else(|| GigletError::not_found("creator", &creator.id))?;
        stored.username = creator.username.clone();
        stored.follower_count = creator.follower_count;
        stored.verification = creator.verification;
        stored.socials = creator.socials;
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn apply_rep_delta(&self, creator_id: &str, delta: i32) -> GigletResult<RepChange> {
        let mut docs = self.docs.write().await;
        let creator = docs
            .creators
            .get_mut(creator_id)
            .ok_or_else(|| GigletError::not_found("creator", creator_id))?;

        let previous = creator.rep;
        creator.rep = apply_delta(previous, delta);
        creator.updated_at = Utc::now();

        Ok(RepChange {
            creator_id: creator_id.to_string(),
            previous,
            current: creator.rep,
            applied_delta: rep_difference(previous, creator.rep),
        })
    }

    async fn insert_gig(&self, gig: &Gig) -> GigletResult<()> {
        let mut docs = self.docs.write().await;
        if docs.gigs.contains_key(&gig.id) {
            return Err(GigletError::Conflict(format!("Gig {} already exists", gig.id)));
        }
        docs.gigs.insert(gig.id.clone(), gig.clone());
        Ok(())
    }

    async fn get_gig(&self, id: &str) -> GigletResult<Option<Gig>> {
        Ok(self.docs.read().await.gigs.get(id).cloned())
    }

    async fn list_active_gigs(&self, now: DateTime<Utc>) -> GigletResult<Vec<Gig>> {
        let docs = self.docs.read().await;
        let mut gigs: Vec<Gig> = docs
            .gigs
            .values()
            .filter(|g| g.status != GigStatus::Closed && !g.deadline_passed(now))
            .cloned()
            .collect();
        gigs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(gigs)
    }

    async fn count_live_submissions(&self, gig_id: &str) -> GigletResult<u32> {
        let docs = self.docs.read().await;
        Ok(docs
            .submissions
            .values()
            .filter(|s| s.gig_id == gig_id && s.status.is_live())
            .count() as u32)
    }

    async fn accept_gig(
        &self,
        gig_id: &str,
        creator_id: &str,
        at: DateTime<Utc>,
    ) -> GigletResult<AcceptOutcome> {
        let mut docs = self.docs.write().await;
        let live_by_others = docs.live_by_others(gig_id, creator_id);
        let gig = docs
            .gigs
            .get_mut(gig_id)
            .ok_or_else(|| GigletError::not_found("gig", gig_id))?;

        match decide_acceptance(gig, creator_id, live_by_others, at)? {
            AcceptDecision::AlreadyAccepted => Ok(AcceptOutcome {
                gig: gig.clone(),
                already_accepted: true,
            }),
            AcceptDecision::Accept => {
                apply_acceptance(gig, creator_id, at);
                debug!(gig_id = %gig_id, creator_id = %creator_id, "Gig accepted");
                Ok(AcceptOutcome {
                    gig: gig.clone(),
                    already_accepted: false,
                })
            }
        }
    }

    async fn submit(
        &self,
        gig_id: &str,
        creator_id: &str,
        content_url: &str,
        at: DateTime<Utc>,
    ) -> GigletResult<Submission> {
        let mut docs = self.docs.write().await;
        let gig = docs
            .gigs
            .get(gig_id)
            .ok_or_else(|| GigletError::not_found("gig", gig_id))?;

        let own: Vec<Submission> = docs
            .submissions
            .values()
            .filter(|s| s.gig_id == gig_id && s.creator_id == creator_id)
            .cloned()
            .collect();
        let live_by_others = docs.live_by_others(gig_id, creator_id);

        match plan_submission(gig, creator_id, &own, live_by_others, at)? {
            SubmissionPlan::Resubmit { submission_id } => {
                let submission = docs
                    .submissions
                    .get_mut(&submission_id)
                    .ok_or_else(|| GigletError::not_found("submission", &submission_id))?;
                submission.content_url = content_url.to_string();
                submission.status = SubmissionStatus::Submitted;
                submission.evaluation = None;
                submission.updated_at = at;
                Ok(submission.clone())
            }
            SubmissionPlan::Create => {
                let mut submission = Submission::new(
                    new_id(),
                    gig_id.to_string(),
                    creator_id.to_string(),
                    content_url.to_string(),
                );
                submission.created_at = at;
                submission.updated_at = at;
                docs.submissions
                    .insert(submission.id.clone(), submission.clone());
                Ok(submission)
            }
        }
    }

    async fn get_submission(&self, id: &str) -> GigletResult<Option<Submission>> {
        Ok(self.docs.read().await.submissions.get(id).cloned())
    }

    async fn list_submissions_for_gig(&self, gig_id: &str) -> GigletResult<Vec<Submission>> {
        let docs = self.docs.read().await;
        let mut submissions: Vec<Submission> = docs
            .submissions
            .values()
            .filter(|s| s.gig_id == gig_id)
            .cloned()
            .collect();
        submissions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(submissions)
    }

    async fn transition_submission(
        &self,
        submission_id: &str,
        expected: &[SubmissionStatus],
        to: SubmissionStatus,
        evaluation: Option<&AiEvaluation>,
    ) -> GigletResult<Submission> {
        let mut docs = self.docs.write().await;
        let submission = docs
            .submissions
            .get_mut(submission_id)
            .ok_or_else(|| GigletError::not_found("submission", submission_id))?;

        if !expected.contains(&submission.status) {
            return Err(GigletError::Conflict(format!(
                "Submission {} is {}",
                submission_id,
                submission.status.as_str()
            )));
        }

        if evaluation.is_some() && submission.evaluation.is_some() {
            return Err(GigletError::Conflict(format!(
                "Submission {} has already been evaluated",
                submission_id
            )));
        }

        submission.status = to;
        if let Some(evaluation) = evaluation {
            submission.evaluation = Some(evaluation.clone());
        }
        submission.updated_at = Utc::now();
        Ok(submission.clone())
    }

    async fn approve_submission(
        &self,
        submission_id: &str,
        payment: &Payment,
    ) -> GigletResult<ApprovalRecord> {
        let mut docs = self.docs.write().await;

        let current = docs
            .submissions
            .get(submission_id)
            .cloned()
            .ok_or_else(|| GigletError::not_found("submission", submission_id))?;
        if !REVIEWABLE.contains(&current.status) {
            return Err(GigletError::Conflict(format!(
                "Submission {} is {}",
                submission_id,
                current.status.as_str()
            )));
        }
        if !docs.gigs.contains_key(&current.gig_id) {
            return Err(GigletError::not_found("gig", &current.gig_id));
        }
        if !docs.creators.contains_key(&current.creator_id) {
            return Err(GigletError::not_found("creator", &current.creator_id));
        }

        // All checks passed; nothing below can fail.
        let now = Utc::now();
        let submission = {
            let s = docs
                .submissions
                .get_mut(submission_id)
                .ok_or_else(|| GigletError::not_found("submission", submission_id))?;
            s.status = SubmissionStatus::Approved;
            s.updated_at = now;
            s.clone()
        };

        docs.payments.insert(payment.id.clone(), payment.clone());

        let creator = {
            let c = docs
                .creators
                .get_mut(&current.creator_id)
                .ok_or_else(|| GigletError::not_found("creator", &current.creator_id))?;
            c.balance_cents += payment.amount_cents;
            c.gigs_completed += 1;
            c.updated_at = now;
            c.clone()
        };

        if let Some(squad_id) = creator.squad_id.as_deref() {
            if let Some(squad) = docs.squads.get_mut(squad_id) {
                squad.stats.gigs_completed += 1;
                squad.stats.total_earned_cents += payment.amount_cents;
            }
        }

        let approved = docs.approved_count(&current.gig_id);
        let gig = docs
            .gigs
            .get_mut(&current.gig_id)
            .ok_or_else(|| GigletError::not_found("gig", &current.gig_id))?;
        let gig_closed = closes_gig(gig, approved);
        if gig_closed {
            gig.status = GigStatus::Closed;
        }

        Ok(ApprovalRecord {
            submission,
            payment: payment.clone(),
            creator,
            gig_closed,
        })
    }

    async fn list_payments_for_creator(&self, creator_id: &str) -> GigletResult<Vec<Payment>> {
        let docs = self.docs.read().await;
        let mut payments: Vec<Payment> = docs
            .payments
            .values()
            .filter(|p| p.creator_id == creator_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    async fn create_squad(&self, squad: &Squad) -> GigletResult<SquadMembership> {
        let mut guard = self.docs.write().await;
        let docs = &mut *guard;
        if docs.squads.contains_key(&squad.id) {
            return Err(GigletError::Conflict(format!("Squad {} already exists", squad.id)));
        }
        let owner = docs
            .creators
            .get_mut(&squad.owner_id)
            .ok_or_else(|| GigletError::not_found("creator", &squad.owner_id))?;
        if let Some(current) = owner.squad_id.as_deref() {
            return Err(GigletError::Conflict(format!(
                "Creator already belongs to squad {}",
                current
            )));
        }

        owner.squad_id = Some(squad.id.clone());
        owner.updated_at = Utc::now();

        let mut squad = squad.clone();
        squad.member_ids = vec![squad.owner_id.clone()];
        docs.squads.insert(squad.id.clone(), squad.clone());
        Ok(SquadMembership {
            squad,
            newly_joined: true,
        })
    }

    async fn get_squad(&self, id: &str) -> GigletResult<Option<Squad>> {
        Ok(self.docs.read().await.squads.get(id).cloned())
    }

    async fn join_squad(&self, squad_id: &str, creator_id: &str) -> GigletResult<SquadMembership> {
        let mut guard = self.docs.write().await;
        let docs = &mut *guard;
        if !docs.squads.contains_key(squad_id) {
            return Err(GigletError::not_found("squad", squad_id));
        }
        let creator = docs
            .creators
            .get_mut(creator_id)
            .ok_or_else(|| GigletError::not_found("creator", creator_id))?;

        match creator.squad_id.as_deref() {
            Some(current) if current == squad_id => {
                let squad = docs
                    .squads
                    .get(squad_id)
                    .cloned()
                    .ok_or_else(|| GigletError::not_found("squad", squad_id))?;
                return Ok(SquadMembership {
                    squad,
                    newly_joined: false,
                });
            }
            Some(other) => {
                return Err(GigletError::Conflict(format!(
                    "Creator already belongs to squad {}",
                    other
                )));
            }
            None => {}
        }

        creator.squad_id = Some(squad_id.to_string());
        creator.updated_at = Utc::now();

        let squad = docs
            .squads
            .get_mut(squad_id)
            .ok_or_else(|| GigletError::not_found("squad", squad_id))?;
        if !squad.is_member(creator_id) {
            squad.member_ids.push(creator_id.to_string());
        }

        Ok(SquadMembership {
            squad: squad.clone(),
            newly_joined: true,
        })
    }
}
