//! `MarketplaceStore` on PostgreSQL
//!
//! Every atomic operation runs in one transaction. Rows are locked with
//! `SELECT ... FOR UPDATE` in a fixed order (gig, submission, creator,
//! squad) so concurrent writers queue instead of deadlocking. Returning
//! early with `?` drops the transaction, which rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::database::DatabasePool;
use crate::database::creators::fetch_creator;
use crate::database::gigs::{fetch_gig, write_gig_state};
use crate::database::squads::{fetch_squad, insert_squad};
use crate::database::submissions::{
    count_approved, count_live, fetch_submission, insert_payment, insert_submission,
    list_for_gig, update_submission,
};
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
use crate::store::{AcceptOutcome, ApprovalRecord, MarketplaceStore, RepChange, SquadMembership};

#[async_trait]
impl MarketplaceStore for DatabasePool {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn insert_user(&self, user: &User) -> GigletResult<()> {
        self.creators().insert_user(user).await
    }

    async fn get_user(&self, id: &str) -> GigletResult<Option<User>> {
        self.creators().get_user(id).await
    }

    async fn insert_creator(&self, creator: &Creator) -> GigletResult<()> {
        self.creators().insert(creator).await
    }

    async fn get_creator(&self, id: &str) -> GigletResult<Option<Creator>> {
        self.creators().get(id).await
    }

    async fn update_creator_profile(&self, creator: &Creator) -> GigletResult<()> {
        self.creators().update_profile(creator).await
    }

    async fn apply_rep_delta(&self, creator_id: &str, delta: i32) -> GigletResult<RepChange> {
        let mut tx = self.pool().begin().await?;
        let creator = fetch_creator(&mut *tx, creator_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("creator", creator_id))?;

        let previous = creator.rep;
        let current = apply_delta(previous, delta);
        sqlx::query("UPDATE giglet.creators SET rep = $2, updated_at = NOW() WHERE id = $1")
            .bind(creator_id)
            .bind(i64::from(current))
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(RepChange {
            creator_id: creator_id.to_string(),
            previous,
            current,
            applied_delta: rep_difference(previous, current),
        })
    }

    async fn insert_gig(&self, gig: &Gig) -> GigletResult<()> {
        self.gigs().insert(gig).await
    }

    async fn get_gig(&self, id: &str) -> GigletResult<Option<Gig>> {
        self.gigs().get(id).await
    }

    async fn list_active_gigs(&self, now: DateTime<Utc>) -> GigletResult<Vec<Gig>> {
        self.gigs().list_active(now).await
    }

    async fn count_live_submissions(&self, gig_id: &str) -> GigletResult<u32> {
        self.submissions().count_live(gig_id).await
    }

    async fn accept_gig(
        &self,
        gig_id: &str,
        creator_id: &str,
        at: DateTime<Utc>,
    ) -> GigletResult<AcceptOutcome> {
        let mut tx = self.pool().begin().await?;
        let mut gig = fetch_gig(&mut *tx, gig_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("gig", gig_id))?;
        let live_by_others = count_live(&mut *tx, gig_id, Some(creator_id)).await?;

        match decide_acceptance(&gig, creator_id, live_by_others, at)? {
            AcceptDecision::AlreadyAccepted => {
                tx.rollback().await?;
                Ok(AcceptOutcome {
                    gig,
                    already_accepted: true,
                })
            }
            AcceptDecision::Accept => {
                apply_acceptance(&mut gig, creator_id, at);
                write_gig_state(&mut *tx, &gig).await?;
                tx.commit().await?;
                debug!(gig_id = %gig_id, creator_id = %creator_id, "Gig accepted");
                Ok(AcceptOutcome {
                    gig,
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
        let mut tx = self.pool().begin().await?;
        let gig = fetch_gig(&mut *tx, gig_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("gig", gig_id))?;

        let own: Vec<Submission> = list_for_gig(&mut *tx, gig_id)
            .await?
            .into_iter()
            .filter(|s| s.creator_id == creator_id)
            .collect();
        let live_by_others = count_live(&mut *tx, gig_id, Some(creator_id)).await?;

        let submission = match plan_submission(&gig, creator_id, &own, live_by_others, at)? {
            SubmissionPlan::Resubmit { submission_id } => {
                let mut submission = fetch_submission(&mut *tx, &submission_id, true)
                    .await?
                    .ok_or_else(|| GigletError::not_found("submission", &submission_id))?;
                submission.content_url = content_url.to_string();
                submission.status = SubmissionStatus::Submitted;
                submission.evaluation = None;
                submission.updated_at = at;
                update_submission(&mut *tx, &submission).await?;
                submission
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
                insert_submission(&mut *tx, &submission).await?;
                submission
            }
        };

        tx.commit().await?;
        Ok(submission)
    }

    async fn get_submission(&self, id: &str) -> GigletResult<Option<Submission>> {
        self.submissions().get(id).await
    }

    async fn list_submissions_for_gig(&self, gig_id: &str) -> GigletResult<Vec<Submission>> {
        self.submissions().list_for_gig(gig_id).await
    }

    async fn transition_submission(
        &self,
        submission_id: &str,
        expected: &[SubmissionStatus],
        to: SubmissionStatus,
        evaluation: Option<&AiEvaluation>,
    ) -> GigletResult<Submission> {
        let mut tx = self.pool().begin().await?;
        let mut submission = fetch_submission(&mut *tx, submission_id, true)
            .await?
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
        update_submission(&mut *tx, &submission).await?;
        tx.commit().await?;
        Ok(submission)
    }

    async fn approve_submission(
        &self,
        submission_id: &str,
        payment: &Payment,
    ) -> GigletResult<ApprovalRecord> {
        // Unlocked read for the gig id; the gig row is locked before the
        // submission row to keep the lock order.
        let gig_id = self
            .submissions()
            .get(submission_id)
            .await?
            .ok_or_else(|| GigletError::not_found("submission", submission_id))?
            .gig_id;

        let mut tx = self.pool().begin().await?;
        let mut gig = fetch_gig(&mut *tx, &gig_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("gig", &gig_id))?;
        let mut submission = fetch_submission(&mut *tx, submission_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("submission", submission_id))?;
        if !REVIEWABLE.contains(&submission.status) {
            return Err(GigletError::Conflict(format!(
                "Submission {} is {}",
                submission_id,
                submission.status.as_str()
            )));
        }
        let mut creator = fetch_creator(&mut *tx, &submission.creator_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("creator", &submission.creator_id))?;

        let now = Utc::now();
        submission.status = SubmissionStatus::Approved;
        submission.updated_at = now;
        update_submission(&mut *tx, &submission).await?;
        insert_payment(&mut *tx, payment).await?;

        sqlx::query(
            r#"
            UPDATE giglet.creators
            SET balance_cents = balance_cents + $2, gigs_completed = gigs_completed + 1,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(&creator.id)
        .bind(payment.amount_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        creator.balance_cents += payment.amount_cents;
        creator.gigs_completed += 1;
        creator.updated_at = now;

        if let Some(squad_id) = creator.squad_id.as_deref() {
            sqlx::query(
                r#"
                UPDATE giglet.squads
                SET gigs_completed = gigs_completed + 1,
                    total_earned_cents = total_earned_cents + $2
                WHERE id = $1
                "#,
            )
            .bind(squad_id)
            .bind(payment.amount_cents)
            .execute(&mut *tx)
            .await?;
        }

        let approved = count_approved(&mut *tx, &gig.id).await?;
        let gig_closed = closes_gig(&gig, approved);
        if gig_closed {
            gig.status = GigStatus::Closed;
            write_gig_state(&mut *tx, &gig).await?;
        }

        tx.commit().await?;
        Ok(ApprovalRecord {
            submission,
            payment: payment.clone(),
            creator,
            gig_closed,
        })
    }

    async fn list_payments_for_creator(&self, creator_id: &str) -> GigletResult<Vec<Payment>> {
        self.submissions().list_payments_for_creator(creator_id).await
    }

    async fn create_squad(&self, squad: &Squad) -> GigletResult<SquadMembership> {
        let mut tx = self.pool().begin().await?;
        let owner = fetch_creator(&mut *tx, &squad.owner_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("creator", &squad.owner_id))?;
        if let Some(current) = owner.squad_id.as_deref() {
            return Err(GigletError::Conflict(format!(
                "Creator already belongs to squad {}",
                current
            )));
        }

        let mut squad = squad.clone();
        squad.member_ids = vec![squad.owner_id.clone()];
        insert_squad(&mut *tx, &squad).await?;
        sqlx::query("UPDATE giglet.creators SET squad_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(&squad.owner_id)
            .bind(&squad.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(SquadMembership {
            squad,
            newly_joined: true,
        })
    }

    async fn get_squad(&self, id: &str) -> GigletResult<Option<Squad>> {
        self.squads().get(id).await
    }

    async fn join_squad(&self, squad_id: &str, creator_id: &str) -> GigletResult<SquadMembership> {
        let mut tx = self.pool().begin().await?;
        let creator = fetch_creator(&mut *tx, creator_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("creator", creator_id))?;
        let mut squad = fetch_squad(&mut *tx, squad_id, true)
            .await?
            .ok_or_else(|| GigletError::not_found("squad", squad_id))?;

        match creator.squad_id.as_deref() {
            Some(current) if current == squad_id => {
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

        sqlx::query("UPDATE giglet.creators SET squad_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(creator_id)
            .bind(squad_id)
            .execute(&mut *tx)
            .await?;
        if !squad.is_member(creator_id) {
            squad.member_ids.push(creator_id.to_string());
            sqlx::query("UPDATE giglet.squads SET member_ids = $2 WHERE id = $1")
                .bind(squad_id)
                .bind(&squad.member_ids)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(SquadMembership {
            squad,
            newly_joined: true,
        })
    }
}
