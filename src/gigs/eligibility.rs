//! Creator eligibility for accepting a gig.
//!
//! Every failing rule is reported, so the client can show the creator the
//! complete list of what to fix.

use serde::Serialize;

use crate::gigs::payout::{max_payout, min_followers_for_payout};
use crate::models::{Creator, Gig};
use crate::reputation::{ReputationThresholds, TrustScore, level_for};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    pub trust_score: u8,
    pub reasons: Vec<String>,
}

pub fn check_eligibility(
    gig: &Gig,
    creator: &Creator,
    thresholds: &ReputationThresholds,
) -> EligibilityReport {
    let trust = TrustScore::for_creator(creator).total;
    let gates = &thresholds.trust;
    let mut reasons = Vec::new();

    if trust < gig.requirements.min_trust_score {
        reasons.push(format!(
            "Trust score {} is below the gig minimum of {}",
            trust, gig.requirements.min_trust_score
        ));
    }
    if gig.reimbursement && trust < gates.instant_payout {
        reasons.push(format!(
            "Reimbursement gigs require a trust score of {}",
            gates.instant_payout
        ));
    }
    if max_payout(&gig.payout) >= thresholds.high_payout_cents && trust < gates.high_payout {
        reasons.push(format!(
            "High-payout gigs require a trust score of {}",
            gates.high_payout
        ));
    }
    if gig.premium && trust < gates.premium {
        reasons.push(format!(
            "Premium gigs require a trust score of {}",
            gates.premium
        ));
    }

    let min_followers = gig
        .requirements
        .min_followers
        .max(min_followers_for_payout(&gig.payout));
    if creator.follower_count < min_followers {
        reasons.push(format!(
            "Requires {} followers, creator has {}",
            min_followers, creator.follower_count
        ));
    }

    let level = level_for(creator.rep);
    if level < gig.requirements.min_rep_level {
        reasons.push(format!(
            "Requires rep level {}, creator is level {}",
            gig.requirements.min_rep_level, level
        ));
    }

    EligibilityReport {
        eligible: reasons.is_empty(),
        trust_score: trust,
        reasons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        GigRequirements, GigStatus, GigVisibility, PayoutStructure, PayoutTier,
        SocialConnections, VerificationFlags,
    };
    use chrono::{Duration, Utc};

    fn gig() -> Gig {
        Gig {
            id: "g1".into(),
            brand_id: "b1".into(),
            title: "Review".into(),
            description: String::new(),
            payout: PayoutStructure::Fixed { amount_cents: 5_000 },
            visibility: GigVisibility::Open,
            deadline: Utc::now() + Duration::days(1),
            accepted_submissions_limit: 1,
            requirements: GigRequirements::default(),
            reimbursement: false,
            premium: false,
            compliance_required: false,
            status: GigStatus::Open,
            accepted_by: None,
            accepted_at: None,
            acceptances: vec![],
            created_at: Utc::now(),
        }
    }

    fn trusted_creator() -> Creator {
        Creator::new("c1".into(), "c1".into())
            .with_verification(VerificationFlags {
                email: true,
                phone: true,
                payment_setup: true,
                identity: true,
            })
            .with_socials(SocialConnections {
                tiktok: true,
                instagram: true,
                youtube: true,
                linkedin: true,
            })
    }

    #[test]
    fn test_plain_gig_is_open_to_everyone() {
        let report = check_eligibility(
            &gig(),
            &Creator::new("c1".into(), "c1".into()),
            &ReputationThresholds::default(),
        );
        assert!(report.eligible);
        assert_eq!(report.trust_score, 0);
    }

    #[test]
    fn test_trust_gates() {
        let thresholds = ReputationThresholds::default();
        let mut g = gig();
        g.reimbursement = true;
        g.premium = true;
        g.payout = PayoutStructure::Fixed { amount_cents: 100_000 };

        let newcomer = check_eligibility(&g, &Creator::new("c2".into(), "c2".into()), &thresholds);
        assert!(!newcomer.eligible);
        assert_eq!(newcomer.reasons.len(), 3);

        // 75 clears reimbursement and high payout, not premium
        let trusted = check_eligibility(&g, &trusted_creator(), &thresholds);
        assert_eq!(trusted.trust_score, 75);
        assert_eq!(trusted.reasons.len(), 1);
        assert!(trusted.reasons[0].contains("Premium"));
    }

    #[test]
    fn test_follower_and_experience_requirements() {
        let mut g = gig();
        g.requirements = GigRequirements {
            min_followers: 5_000,
            min_rep_level: 3,
            min_trust_score: 0,
        };
        let creator = trusted_creator().with_followers(1_000).with_rep(120);
        let report = check_eligibility(&g, &creator, &ReputationThresholds::default());
        assert_eq!(report.reasons.len(), 2);

        let seasoned = trusted_creator().with_followers(8_000).with_rep(300);
        assert!(check_eligibility(&g, &seasoned, &ReputationThresholds::default()).eligible);
    }

    #[test]
    fn test_tiered_payout_sets_follower_floor() {
        let mut g = gig();
        g.payout = PayoutStructure::FollowerTiered {
            tiers: vec![PayoutTier { min_followers: 2_000, amount_cents: 4_000 }],
        };
        let small = Creator::new("c1".into(), "c1".into()).with_followers(1_500);
        assert!(!check_eligibility(&g, &small, &ReputationThresholds::default()).eligible);
    }
}
