//! Reputation Manager - Main Orchestrator
//!
//! Applies rep events through the store's atomic update and assembles a
//! creator's standing (level, trust score, unlocked gates).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{GigletError, GigletResult};
use crate::models::Creator;
use crate::reputation::{
    GigAccess, RepEvent, RepLevel, TrustGates, TrustScore, TrustThresholds,
    can_access_gig_with_step, level_for, rep_level,
};
use crate::store::{MarketplaceStore, RepChange};

/// Tunable policy values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationThresholds {
    /// Minutes of delay per level below the top tier
    pub early_access_step_minutes: i64,
    pub trust: TrustThresholds,
    /// Gigs paying at least this much need the high-payout trust gate
    pub high_payout_cents: i64,
}

impl Default for ReputationThresholds {
    fn default() -> Self {
        Self {
            early_access_step_minutes: 10,
            trust: TrustThresholds::default(),
            high_payout_cents: 50_000,
        }
    }
}

/// Rep change together with its level effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepAward {
    pub event: &'static str,
    pub change: RepChange,
    pub level_before: u8,
    pub level_after: u8,
}

impl RepAward {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }
}

/// Everything the product shows about a creator's reputation
#[derive(Debug, Clone, Serialize)]
pub struct CreatorStanding {
    pub creator_id: String,
    pub level: RepLevel,
    pub progress_percent: u8,
    pub trust: TrustScore,
    pub gates: TrustGates,
}

pub struct ReputationManager {
    store: Arc<dyn MarketplaceStore>,
    thresholds: ReputationThresholds,
}

impl ReputationManager {
    pub fn new(store: Arc<dyn MarketplaceStore>, thresholds: ReputationThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn thresholds(&self) -> &ReputationThresholds {
        &self.thresholds
    }

    pub async fn get_creator(&self, creator_id: &str) -> GigletResult<Creator> {
        self.store
            .get_creator(creator_id)
            .await?
            .ok_or_else(|| GigletError::not_found("creator", creator_id))
    }

    /// Apply a rep event. The clamp at zero happens inside the store's
    /// atomic update, so concurrent awards never lose an update.
    pub async fn award_rep(&self, creator_id: &str, event: RepEvent) -> GigletResult<RepAward> {
        let delta = event.delta();

        let change = if delta == 0 {
            let creator = self.get_creator(creator_id).await?;
            RepChange {
                creator_id: creator_id.to_string(),
                previous: creator.rep,
                current: creator.rep,
                applied_delta: 0,
            }
        } else {
            self.store.apply_rep_delta(creator_id, delta).await?
        };

        let award = RepAward {
            event: event.name(),
            level_before: level_for(change.previous),
            level_after: level_for(change.current),
            change,
        };

        debug!(
            creator_id = %creator_id,
            event = award.event,
            delta = delta,
            rep = award.change.current,
            "Applied rep event"
        );
        if award.leveled_up() {
            info!(
                creator_id = %creator_id,
                level = award.level_after,
                "Creator reached a new rep level"
            );
        }

        Ok(award)
    }

    pub async fn standing(&self, creator_id: &str) -> GigletResult<CreatorStanding> {
        let creator = self.get_creator(creator_id).await?;
        Ok(self.standing_for(&creator))
    }

    pub fn standing_for(&self, creator: &Creator) -> CreatorStanding {
        let level = rep_level(creator.rep);
        let trust = TrustScore::for_creator(creator);
        CreatorStanding {
            creator_id: creator.id.clone(),
            progress_percent: level.progress_percent(),
            level,
            gates: trust.gates(&self.thresholds.trust),
            trust,
        }
    }

    /// Early-access check using the configured delay step.
    pub fn early_access(&self, rep: u32, created_at: DateTime<Utc>, now: DateTime<Utc>) -> GigAccess {
        can_access_gig_with_step(
            rep,
            created_at,
            now,
            self.thresholds.early_access_step_minutes,
        )
    }
}
