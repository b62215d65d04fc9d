//! Gig visibility
//!
//! Gates are evaluated in a fixed order:
//! 1. audience: squad gigs need squad membership, invite gigs need an invite
//! 2. early-access timer, skipped for squad gigs
//!
//! Eligibility is not part of visibility. An ineligible creator still sees
//! the gig and the reasons they cannot accept it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Creator, Gig, GigVisibility};
use crate::reputation::{GigAccess, ReputationThresholds, can_access_gig_with_step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "visibility", rename_all = "snake_case")]
pub enum Visibility {
    Visible,
    /// Not part of the gig's audience
    Hidden { reason: String },
    /// In the audience, waiting for the early-access window
    Locked {
        unlock_at: DateTime<Utc>,
        minutes_until_unlock: i64,
    },
}

impl Visibility {
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

pub fn in_audience(gig: &Gig, creator: &Creator) -> bool {
    match &gig.visibility {
        GigVisibility::Open => true,
        GigVisibility::Squad { squad_id } => creator.squad_id.as_deref() == Some(squad_id.as_str()),
        GigVisibility::Invite { creator_ids } => creator_ids.iter().any(|id| *id == creator.id),
    }
}

pub fn visibility_for(
    gig: &Gig,
    creator: &Creator,
    thresholds: &ReputationThresholds,
    now: DateTime<Utc>,
) -> Visibility {
    if !in_audience(gig, creator) {
        let reason = match &gig.visibility {
            GigVisibility::Squad { .. } => "Gig is limited to squad members",
            _ => "Gig is invite-only",
        };
        return Visibility::Hidden {
            reason: reason.to_string(),
        };
    }

    if gig.visibility.is_squad() {
        return Visibility::Visible;
    }

    let access: GigAccess = can_access_gig_with_step(
        creator.rep,
        gig.created_at,
        now,
        thresholds.early_access_step_minutes,
    );
    if access.can_access {
        Visibility::Visible
    } else {
        Visibility::Locked {
            unlock_at: access.unlock_at,
            minutes_until_unlock: access.minutes_until_unlock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GigRequirements, GigStatus, PayoutStructure};
    use chrono::Duration;

    fn gig_with(visibility: GigVisibility, created_at: DateTime<Utc>) -> Gig {
        Gig {
            id: "g1".into(),
            brand_id: "b1".into(),
            title: "Try-on haul".into(),
            description: String::new(),
            payout: PayoutStructure::Fixed { amount_cents: 3_000 },
            visibility,
            deadline: created_at + Duration::days(7),
            accepted_submissions_limit: 3,
            requirements: GigRequirements::default(),
            reimbursement: false,
            premium: false,
            compliance_required: false,
            status: GigStatus::Open,
            accepted_by: None,
            accepted_at: None,
            acceptances: vec![],
            created_at,
        }
    }

    #[test]
    fn test_new_open_gig_is_locked_for_rookies() {
        let now = Utc::now();
        let gig = gig_with(GigVisibility::Open, now);
        let rookie = Creator::new("c1".into(), "c1".into());
        let legend = Creator::new("c2".into(), "c2".into()).with_rep(3_000);

        let thresholds = ReputationThresholds::default();
        assert!(matches!(
            visibility_for(&gig, &rookie, &thresholds, now),
            Visibility::Locked { minutes_until_unlock: 60, .. }
        ));
        assert!(visibility_for(&gig, &legend, &thresholds, now).is_visible());
    }

    #[test]
    fn test_squad_gig_skips_timer_for_members_only() {
        let now = Utc::now();
        let gig = gig_with(
            GigVisibility::Squad {
                squad_id: "s1".into(),
            },
            now,
        );
        let mut member = Creator::new("c1".into(), "c1".into());
        member.squad_id = Some("s1".into());
        let outsider = Creator::new("c2".into(), "c2".into()).with_rep(3_000);

        let thresholds = ReputationThresholds::default();
        assert!(visibility_for(&gig, &member, &thresholds, now).is_visible());
        assert!(matches!(
            visibility_for(&gig, &outsider, &thresholds, now),
            Visibility::Hidden { .. }
        ));
    }

    #[test]
    fn test_invite_gig_still_respects_timer() {
        let now = Utc::now();
        let gig = gig_with(
            GigVisibility::Invite {
                creator_ids: vec!["c1".into()],
            },
            now,
        );
        let invited = Creator::new("c1".into(), "c1".into());
        let thresholds = ReputationThresholds::default();

        assert!(matches!(
            visibility_for(&gig, &invited, &thresholds, now),
            Visibility::Locked { .. }
        ));
        assert!(visibility_for(&gig, &invited, &thresholds, now + Duration::minutes(60)).is_visible());
        assert!(matches!(
            visibility_for(&gig, &Creator::new("c9".into(), "c9".into()), &thresholds, now),
            Visibility::Hidden { .. }
        ));
    }
}
