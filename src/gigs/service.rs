//! Gig Service - brand and creator workflows
//!
//! Creates gigs, answers "can this creator see / take this gig", runs the
//! acceptance pre-check before handing off to the store transaction, and
//! drives submissions through evaluation and review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{GigletError, GigletResult};
use crate::gigs::acceptance::REVIEWABLE;
use crate::gigs::eligibility::{EligibilityReport, check_eligibility};
use crate::gigs::payout::{payout_for, validate_payout};
use crate::gigs::visibility::{Visibility, visibility_for};
use crate::models::{
    AiEvaluation, Gig, GigRequirements, GigStatus, GigVisibility, Payment, PaymentStatus,
    PayoutStructure, Submission, SubmissionStatus, UserRole, new_id,
};
use crate::reputation::{RepAward, RepEvent, ReputationManager};
use crate::store::{AcceptOutcome, ApprovalRecord, MarketplaceStore};

/// Evaluations scoring below this send the submission back for changes.
pub const NEEDS_CHANGES_BELOW: u8 = 70;

#[derive(Debug, Clone, Deserialize)]
pub struct NewGig {
    pub brand_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub payout: PayoutStructure,
    #[serde(default = "open_visibility")]
    pub visibility: GigVisibility,
    pub deadline: DateTime<Utc>,
    #[serde(default = "single_slot")]
    pub accepted_submissions_limit: u32,
    #[serde(default)]
    pub requirements: GigRequirements,
    #[serde(default)]
    pub reimbursement: bool,
    #[serde(default)]
    pub premium: bool,
    #[serde(default)]
    pub compliance_required: bool,
}

fn open_visibility() -> GigVisibility {
    GigVisibility::Open
}

fn single_slot() -> u32 {
    1
}

/// What a creator sees when looking at one gig
#[derive(Debug, Clone, Serialize)]
pub struct AccessReport {
    pub gig_id: String,
    pub creator_id: String,
    #[serde(flatten)]
    pub visibility: Visibility,
    pub eligibility: EligibilityReport,
    /// Payout for this creator's follower count, if they qualify for any tier
    pub payout_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub gig: Gig,
    pub payout_cents: Option<i64>,
    pub eligibility: EligibilityReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
    NeedsChanges,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub reviewer_id: String,
    pub decision: ReviewDecision,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub submission: Submission,
    pub payment: Option<Payment>,
    pub gig_closed: bool,
    pub rep: Option<RepAward>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub submission: Submission,
    pub rep: RepAward,
}

pub struct GigService {
    store: Arc<dyn MarketplaceStore>,
    reputation: Arc<ReputationManager>,
}

impl GigService {
    pub fn new(store: Arc<dyn MarketplaceStore>, reputation: Arc<ReputationManager>) -> Self {
        Self { store, reputation }
    }

    pub async fn create_gig(&self, request: NewGig) -> GigletResult<Gig> {
        self.create_gig_at(request, Utc::now()).await
    }

    pub async fn create_gig_at(&self, request: NewGig, now: DateTime<Utc>) -> GigletResult<Gig> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(GigletError::Validation("title is required".to_string()));
        }
        if request.accepted_submissions_limit == 0 {
            return Err(GigletError::Validation(
                "accepted_submissions_limit must be at least 1".to_string(),
            ));
        }
        if request.deadline <= now {
            return Err(GigletError::Validation(
                "deadline must be in the future".to_string(),
            ));
        }
        if request.requirements.min_trust_score > 100 {
            return Err(GigletError::Validation(
                "min_trust_score cannot exceed 100".to_string(),
            ));
        }
        validate_payout(&request.payout).map_err(GigletError::Validation)?;

        let brand = self
            .store
            .get_user(&request.brand_id)
            .await?
            .ok_or_else(|| GigletError::not_found("brand", &request.brand_id))?;
        if !matches!(brand.role, UserRole::Brand | UserRole::Admin) {
            return Err(GigletError::Forbidden(format!(
                "{} accounts cannot post gigs",
                brand.role.as_str()
            )));
        }

        let gig = Gig {
            id: new_id(),
            brand_id: brand.id,
            title: title.to_string(),
            description: request.description,
            payout: request.payout,
            visibility: request.visibility,
            deadline: request.deadline,
            accepted_submissions_limit: request.accepted_submissions_limit,
            requirements: request.requirements,
            reimbursement: request.reimbursement,
            premium: request.premium,
            compliance_required: request.compliance_required,
            status: GigStatus::Open,
            accepted_by: None,
            accepted_at: None,
            acceptances: Vec::new(),
            created_at: now,
        };
        self.store.insert_gig(&gig).await?;

        info!(
            gig_id = %gig.id,
            brand_id = %gig.brand_id,
            limit = gig.accepted_submissions_limit,
            "Created gig"
        );
        Ok(gig)
    }

    pub async fn get_gig(&self, gig_id: &str) -> GigletResult<Gig> {
        self.store
            .get_gig(gig_id)
            .await?
            .ok_or_else(|| GigletError::not_found("gig", gig_id))
    }

    pub async fn access_report(
        &self,
        gig_id: &str,
        creator_id: &str,
        now: DateTime<Utc>,
    ) -> GigletResult<AccessReport> {
        let gig = self.get_gig(gig_id).await?;
        let creator = self.reputation.get_creator(creator_id).await?;
        let thresholds = self.reputation.thresholds();

        Ok(AccessReport {
            gig_id: gig.id.clone(),
            creator_id: creator.id.clone(),
            visibility: visibility_for(&gig, &creator, thresholds, now),
            eligibility: check_eligibility(&gig, &creator, thresholds),
            payout_cents: payout_for(&gig.payout, creator.follower_count),
        })
    }

    /// Active gigs the creator can currently see, newest first.
    pub async fn feed(&self, creator_id: &str, now: DateTime<Utc>) -> GigletResult<Vec<FeedEntry>> {
        let creator = self.reputation.get_creator(creator_id).await?;
        let thresholds = self.reputation.thresholds();

        let entries: Vec<FeedEntry> = self
            .store
            .list_active_gigs(now)
            .await?
            .into_iter()
            .filter(|gig| visibility_for(gig, &creator, thresholds, now).is_visible())
            .map(|gig| FeedEntry {
                payout_cents: payout_for(&gig.payout, creator.follower_count),
                eligibility: check_eligibility(&gig, &creator, thresholds),
                gig,
            })
            .collect();

        debug!(creator_id = %creator_id, gigs = entries.len(), "Built gig feed");
        Ok(entries)
    }

    pub async fn accept_gig(&self, gig_id: &str, creator_id: &str) -> GigletResult<AcceptOutcome> {
        self.accept_gig_at(gig_id, creator_id, Utc::now()).await
    }

    /// Accept a gig on behalf of a creator.
    ///
    /// Everything before `store.accept_gig` reads unlocked snapshots and
    /// only exists to fail fast with a precise error. The store call
    /// re-checks capacity under lock.
    pub async fn accept_gig_at(
        &self,
        gig_id: &str,
        creator_id: &str,
        now: DateTime<Utc>,
    ) -> GigletResult<AcceptOutcome> {
        let gig = self.get_gig(gig_id).await?;
        if gig.status == GigStatus::Closed {
            return Err(GigletError::GigClosed);
        }
        if gig.deadline_passed(now) {
            return Err(GigletError::DeadlinePassed);
        }
        let creator = self.reputation.get_creator(creator_id).await?;

        if !gig.has_accepted(creator_id) {
            let thresholds = self.reputation.thresholds();
            match visibility_for(&gig, &creator, thresholds, now) {
                Visibility::Visible => {}
                Visibility::Hidden { reason } => return Err(GigletError::Forbidden(reason)),
                Visibility::Locked {
                    minutes_until_unlock,
                    ..
                } => {
                    return Err(GigletError::Forbidden(format!(
                        "Gig unlocks for this creator in {} minutes",
                        minutes_until_unlock
                    )));
                }
            }

            let report = check_eligibility(&gig, &creator, thresholds);
            if !report.eligible {
                return Err(GigletError::Ineligible(report.reasons));
            }

            if gig.is_single_slot() && gig.accepted_by.is_some() {
                return Err(GigletError::Conflict(
                    "Gig already accepted by another creator".to_string(),
                ));
            }
            let live = self.store.count_live_submissions(gig_id).await?;
            if live >= gig.accepted_submissions_limit {
                return Err(GigletError::Conflict(format!(
                    "Gig has reached its limit of {} submissions",
                    gig.accepted_submissions_limit
                )));
            }
        }

        let outcome = match self.store.accept_gig(gig_id, creator_id, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(gig_id = %gig_id, creator_id = %creator_id, error = %e, "Gig acceptance failed");
                return Err(e);
            }
        };

        if outcome.already_accepted {
            debug!(gig_id = %gig_id, creator_id = %creator_id, "Gig already accepted by creator");
        } else {
            info!(
                gig_id = %gig_id,
                creator_id = %creator_id,
                status = outcome.gig.status.as_str(),
                "Creator accepted gig"
            );
        }
        Ok(outcome)
    }

    pub async fn submit(
        &self,
        gig_id: &str,
        creator_id: &str,
        content_url: &str,
    ) -> GigletResult<Submission> {
        self.submit_at(gig_id, creator_id, content_url, Utc::now())
            .await
    }

    pub async fn submit_at(
        &self,
        gig_id: &str,
        creator_id: &str,
        content_url: &str,
        now: DateTime<Utc>,
    ) -> GigletResult<Submission> {
        let content_url = content_url.trim();
        if !(content_url.starts_with("https://") || content_url.starts_with("http://")) {
            return Err(GigletError::Validation(
                "content_url must be an http(s) URL".to_string(),
            ));
        }

        let submission = self
            .store
            .submit(gig_id, creator_id, content_url, now)
            .await?;
        info!(
            gig_id = %gig_id,
            creator_id = %creator_id,
            submission_id = %submission.id,
            "Received submission"
        );
        Ok(submission)
    }

    pub async fn get_submission(&self, submission_id: &str) -> GigletResult<Submission> {
        self.store
            .get_submission(submission_id)
            .await?
            .ok_or_else(|| GigletError::not_found("submission", submission_id))
    }

    /// Store the content evaluation and award its quality bonus.
    pub async fn record_evaluation(
        &self,
        submission_id: &str,
        quality_score: u8,
        summary: String,
    ) -> GigletResult<EvaluationOutcome> {
        if quality_score > 100 {
            return Err(GigletError::Validation(
                "quality_score must be between 0 and 100".to_string(),
            ));
        }

        let evaluation = AiEvaluation {
            quality_score,
            summary,
            evaluated_at: Utc::now(),
        };
        let to = if quality_score < NEEDS_CHANGES_BELOW {
            SubmissionStatus::NeedsChanges
        } else {
            SubmissionStatus::Submitted
        };

        let submission = self
            .store
            .transition_submission(
                submission_id,
                &[SubmissionStatus::Submitted],
                to,
                Some(&evaluation),
            )
            .await?;
        let rep = self
            .reputation
            .award_rep(
                &submission.creator_id,
                RepEvent::QualityScore {
                    score: quality_score,
                },
            )
            .await?;

        Ok(EvaluationOutcome { submission, rep })
    }

    pub async fn review(
        &self,
        submission_id: &str,
        request: ReviewRequest,
    ) -> GigletResult<ReviewOutcome> {
        let submission = self.get_submission(submission_id).await?;
        let gig = self.get_gig(&submission.gig_id).await?;
        self.authorize_reviewer(&gig, &request.reviewer_id).await?;

        let outcome = match request.decision {
            ReviewDecision::Approve => self.approve(&gig, &submission).await?,
            ReviewDecision::Reject => {
                let submission = self
                    .store
                    .transition_submission(
                        submission_id,
                        &REVIEWABLE,
                        SubmissionStatus::Rejected,
                        None,
                    )
                    .await?;
                let rep = self
                    .reputation
                    .award_rep(&submission.creator_id, RepEvent::SubmissionFailed)
                    .await?;
                ReviewOutcome {
                    submission,
                    payment: None,
                    gig_closed: false,
                    rep: Some(rep),
                }
            }
            ReviewDecision::NeedsChanges => {
                let submission = self
                    .store
                    .transition_submission(
                        submission_id,
                        &[SubmissionStatus::Submitted],
                        SubmissionStatus::NeedsChanges,
                        None,
                    )
                    .await?;
                ReviewOutcome {
                    submission,
                    payment: None,
                    gig_closed: false,
                    rep: None,
                }
            }
        };

        info!(
            submission_id = %submission_id,
            gig_id = %gig.id,
            status = outcome.submission.status.as_str(),
            "Reviewed submission"
        );
        Ok(outcome)
    }

    async fn approve(&self, gig: &Gig, submission: &Submission) -> GigletResult<ReviewOutcome> {
        let creator = self.reputation.get_creator(&submission.creator_id).await?;
        let amount_cents = payout_for(&gig.payout, creator.follower_count).ok_or_else(|| {
            GigletError::Ineligible(vec![format!(
                "Creator with {} followers is below every payout tier",
                creator.follower_count
            )])
        })?;

        let payment = Payment {
            id: new_id(),
            submission_id: submission.id.clone(),
            gig_id: gig.id.clone(),
            creator_id: creator.id.clone(),
            brand_id: gig.brand_id.clone(),
            amount_cents,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        };

        let ApprovalRecord {
            submission,
            payment,
            gig_closed,
            ..
        } = self.store.approve_submission(&submission.id, &payment).await?;

        let rep = self
            .reputation
            .award_rep(&submission.creator_id, RepEvent::GigCompleted)
            .await?;

        info!(
            payment_id = %payment.id,
            creator_id = %payment.creator_id,
            amount_cents = payment.amount_cents,
            gig_closed = gig_closed,
            "Approved submission"
        );
        Ok(ReviewOutcome {
            submission,
            payment: Some(payment),
            gig_closed,
            rep: Some(rep),
        })
    }

    async fn authorize_reviewer(&self, gig: &Gig, reviewer_id: &str) -> GigletResult<()> {
        if gig.brand_id == reviewer_id {
            return Ok(());
        }
        let reviewer = self
            .store
            .get_user(reviewer_id)
            .await?
            .ok_or_else(|| GigletError::not_found("user", reviewer_id))?;
        if reviewer.role == UserRole::Admin {
            Ok(())
        } else {
            Err(GigletError::Forbidden(
                "Only the gig's brand or an admin can review submissions".to_string(),
            ))
        }
    }

    pub async fn list_submissions(&self, gig_id: &str) -> GigletResult<Vec<Submission>> {
        self.store.list_submissions_for_gig(gig_id).await
    }

    pub async fn list_payments(&self, creator_id: &str) -> GigletResult<Vec<Payment>> {
        self.store.list_payments_for_creator(creator_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Creator, PayoutTier, User, VerificationFlags};
    use crate::reputation::ReputationThresholds;
    use crate::store::MemoryStore;
    use chrono::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: GigService,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_user(&User::new("brand".into(), "b@x.co".into(), UserRole::Brand))
            .await
            .unwrap();
        let reputation = Arc::new(ReputationManager::new(
            store.clone(),
            ReputationThresholds::default(),
        ));
        Fixture {
            service: GigService::new(store.clone(), reputation),
            store,
        }
    }

    async fn add_creator(store: &MemoryStore, id: &str, rep: u32) {
        store
            .insert_creator(
                &Creator::new(id.into(), id.into())
                    .with_rep(rep)
                    .with_followers(5_000),
            )
            .await
            .unwrap();
    }

    fn new_gig(limit: u32) -> NewGig {
        NewGig {
            brand_id: "brand".into(),
            title: "Morning routine".into(),
            description: String::new(),
            payout: PayoutStructure::Fixed { amount_cents: 4000 },
            visibility: GigVisibility::Open,
            deadline: Utc::now() + Duration::days(2),
            accepted_submissions_limit: limit,
            requirements: GigRequirements::default(),
            reimbursement: false,
            premium: false,
            compliance_required: false,
        }
    }

    #[tokio::test]
    async fn test_create_gig_validation() {
        let f = fixture().await;

        let mut bad = new_gig(1);
        bad.accepted_submissions_limit = 0;
        assert!(matches!(
            f.service.create_gig(bad).await,
            Err(GigletError::Validation(_))
        ));

        let mut past = new_gig(1);
        past.deadline = Utc::now() - Duration::hours(1);
        assert!(matches!(
            f.service.create_gig(past).await,
            Err(GigletError::Validation(_))
        ));

        add_creator(&f.store, "maya", 0).await;
        f.store
            .insert_user(&User::new("maya".into(), "m@x.co".into(), UserRole::Creator))
            .await
            .unwrap();
        let mut wrong_role = new_gig(1);
        wrong_role.brand_id = "maya".into();
        assert!(matches!(
            f.service.create_gig(wrong_role).await,
            Err(GigletError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_early_access_locks_new_gig() {
        let f = fixture().await;
        add_creator(&f.store, "rookie", 0).await;
        add_creator(&f.store, "legend", 3000).await;
        let gig = f.service.create_gig(new_gig(3)).await.unwrap();

        let err = f.service.accept_gig(&gig.id, "rookie").await.unwrap_err();
        assert!(matches!(err, GigletError::Forbidden(_)));

        let outcome = f.service.accept_gig(&gig.id, "legend").await.unwrap();
        assert!(!outcome.already_accepted);
        assert_eq!(outcome.gig.status, GigStatus::Accepted);

        // An hour later even a rookie is through the window.
        let later = Utc::now() + Duration::minutes(61);
        assert!(
            f.service
                .accept_gig_at(&gig.id, "rookie", later)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_ineligible_creator_sees_reasons() {
        let f = fixture().await;
        add_creator(&f.store, "legend", 3000).await;
        let mut request = new_gig(1);
        request.premium = true;
        let gig = f.service.create_gig(request).await.unwrap();

        let report = f
            .service
            .access_report(&gig.id, "legend", Utc::now())
            .await
            .unwrap();
        assert!(report.visibility.is_visible());
        assert!(!report.eligibility.eligible);

        let err = f.service.accept_gig(&gig.id, "legend").await.unwrap_err();
        assert!(matches!(err, GigletError::Ineligible(_)));
    }

    #[tokio::test]
    async fn test_submit_review_and_pay() {
        let f = fixture().await;
        add_creator(&f.store, "legend", 3000).await;
        let mut request = new_gig(1);
        request.payout = PayoutStructure::FollowerTiered {
            tiers: vec![
                PayoutTier {
                    min_followers: 1_000,
                    amount_cents: 2_000,
                },
                PayoutTier {
                    min_followers: 5_000,
                    amount_cents: 6_000,
                },
            ],
        };
        let gig = f.service.create_gig(request).await.unwrap();
        f.service.accept_gig(&gig.id, "legend").await.unwrap();

        assert!(matches!(
            f.service.submit(&gig.id, "legend", "ftp://nope").await,
            Err(GigletError::Validation(_))
        ));
        let submission = f
            .service
            .submit(&gig.id, "legend", "https://cdn.example/clip.mp4")
            .await
            .unwrap();

        let evaluated = f
            .service
            .record_evaluation(&submission.id, 92, "Great hook".into())
            .await
            .unwrap();
        assert_eq!(evaluated.submission.status, SubmissionStatus::Submitted);
        assert_eq!(evaluated.rep.change.applied_delta, 30);

        let outcome = f
            .service
            .review(
                &submission.id,
                ReviewRequest {
                    reviewer_id: "brand".into(),
                    decision: ReviewDecision::Approve,
                },
            )
            .await
            .unwrap();
        let payment = outcome.payment.unwrap();
        assert_eq!(payment.amount_cents, 6_000);
        assert!(outcome.gig_closed);
        assert_eq!(outcome.rep.unwrap().change.current, 3080);

        let gig = f.service.get_gig(&gig.id).await.unwrap();
        assert_eq!(gig.status, GigStatus::Closed);
        assert_eq!(f.service.list_payments("legend").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_low_score_requests_changes_and_resubmit() {
        let f = fixture().await;
        add_creator(&f.store, "legend", 3000).await;
        let gig = f.service.create_gig(new_gig(1)).await.unwrap();
        f.service.accept_gig(&gig.id, "legend").await.unwrap();
        let first = f
            .service
            .submit(&gig.id, "legend", "https://cdn.example/v1.mp4")
            .await
            .unwrap();

        let evaluated = f
            .service
            .record_evaluation(&first.id, 40, "Too dark".into())
            .await
            .unwrap();
        assert_eq!(evaluated.submission.status, SubmissionStatus::NeedsChanges);

        let second = f
            .service
            .submit(&gig.id, "legend", "https://cdn.example/v2.mp4")
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, SubmissionStatus::Submitted);
        assert_eq!(second.content_url, "https://cdn.example/v2.mp4");
        assert!(second.evaluation.is_none());
    }

    #[tokio::test]
    async fn test_quality_bonus_once_per_evaluation() {
        let f = fixture().await;
        add_creator(&f.store, "legend", 3000).await;
        let gig = f.service.create_gig(new_gig(1)).await.unwrap();
        f.service.accept_gig(&gig.id, "legend").await.unwrap();
        let submission = f
            .service
            .submit(&gig.id, "legend", "https://cdn.example/v1.mp4")
            .await
            .unwrap();

        let first = f
            .service
            .record_evaluation(&submission.id, 95, "Great hook".into())
            .await
            .unwrap();
        assert_eq!(first.rep.change.current, 3030);

        for _ in 0..3 {
            assert!(matches!(
                f.service
                    .record_evaluation(&submission.id, 95, "Again".into())
                    .await,
                Err(GigletError::Conflict(_))
            ));
        }
        let creator = f.store.get_creator("legend").await.unwrap().unwrap();
        assert_eq!(creator.rep, 3030);
        let stored = f.service.get_submission(&submission.id).await.unwrap();
        assert_eq!(stored.evaluation.unwrap().summary, "Great hook");
    }

    #[tokio::test]
    async fn test_reject_costs_rep_and_checks_reviewer() {
        let f = fixture().await;
        add_creator(&f.store, "legend", 3000).await;
        let mut verified = Creator::new("other".into(), "other".into());
        verified.verification = VerificationFlags::default();
        f.store.insert_creator(&verified).await.unwrap();
        f.store
            .insert_user(&User::new("other".into(), "o@x.co".into(), UserRole::Creator))
            .await
            .unwrap();

        let gig = f.service.create_gig(new_gig(1)).await.unwrap();
        f.service.accept_gig(&gig.id, "legend").await.unwrap();
        let submission = f
            .service
            .submit(&gig.id, "legend", "https://cdn.example/v1.mp4")
            .await
            .unwrap();

        let denied = f
            .service
            .review(
                &submission.id,
                ReviewRequest {
                    reviewer_id: "other".into(),
                    decision: ReviewDecision::Reject,
                },
            )
            .await;
        assert!(matches!(denied, Err(GigletError::Forbidden(_))));

        let outcome = f
            .service
            .review(
                &submission.id,
                ReviewRequest {
                    reviewer_id: "brand".into(),
                    decision: ReviewDecision::Reject,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.submission.status, SubmissionStatus::Rejected);
        assert_eq!(outcome.rep.unwrap().change.current, 2980);
    }
}
