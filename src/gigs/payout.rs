//! Payout computation for fixed and follower-tiered gigs.

use crate::models::{PayoutStructure, PayoutTier};

/// Amount a creator with `followers` earns, `None` when below every tier.
pub fn payout_for(structure: &PayoutStructure, followers: u64) -> Option<i64> {
    match structure {
        PayoutStructure::Fixed { amount_cents } => Some(*amount_cents),
        PayoutStructure::FollowerTiered { tiers } => tiers
            .iter()
            .filter(|tier| tier.min_followers <= followers)
            .max_by_key(|tier| tier.min_followers)
            .map(|tier| tier.amount_cents),
    }
}

/// Largest amount the gig can pay anyone.
pub fn max_payout(structure: &PayoutStructure) -> i64 {
    match structure {
        PayoutStructure::Fixed { amount_cents } => *amount_cents,
        PayoutStructure::FollowerTiered { tiers } => {
            tiers.iter().map(|tier| tier.amount_cents).max().unwrap_or(0)
        }
    }
}

/// Followers needed for any payout at all.
pub fn min_followers_for_payout(structure: &PayoutStructure) -> u64 {
    match structure {
        PayoutStructure::Fixed { .. } => 0,
        PayoutStructure::FollowerTiered { tiers } => {
            tiers.iter().map(|tier| tier.min_followers).min().unwrap_or(0)
        }
    }
}

/// Reject malformed payout structures before a gig is stored.
pub fn validate_payout(structure: &PayoutStructure) -> Result<(), String> {
    match structure {
        PayoutStructure::Fixed { amount_cents } if *amount_cents <= 0 => {
            Err("Fixed payout must be positive".to_string())
        }
        PayoutStructure::Fixed { .. } => Ok(()),
        PayoutStructure::FollowerTiered { tiers } => {
            if tiers.is_empty() {
                return Err("Tiered payout needs at least one tier".to_string());
            }
            if tiers.iter().any(|t: &PayoutTier| t.amount_cents <= 0) {
                return Err("Tier amounts must be positive".to_string());
            }
            let mut thresholds: Vec<u64> = tiers.iter().map(|t| t.min_followers).collect();
            thresholds.sort_unstable();
            thresholds.dedup();
            if thresholds.len() != tiers.len() {
                return Err("Tier follower thresholds must be unique".to_string());
            }
            Ok(())
        }
    }
}
