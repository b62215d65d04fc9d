//! Squads: creator groups with their own squad-only gigs.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::{GigletError, GigletResult};
use crate::models::{Squad, SquadStats, new_id};
use crate::reputation::{RepAward, RepEvent, ReputationManager};
use crate::store::MarketplaceStore;

#[derive(Debug, Clone, Serialize)]
pub struct JoinOutcome {
    pub squad: Squad,
    pub newly_joined: bool,
    /// Present only on a creator's first join
    pub rep: Option<RepAward>,
}

pub struct SquadService {
    store: Arc<dyn MarketplaceStore>,
    reputation: Arc<ReputationManager>,
}

impl SquadService {
    pub fn new(store: Arc<dyn MarketplaceStore>, reputation: Arc<ReputationManager>) -> Self {
        Self { store, reputation }
    }

    /// Create a squad and enrol its owner as the first member, in one store
    /// operation.
    pub async fn create_squad(&self, owner_id: &str, name: &str) -> GigletResult<JoinOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GigletError::Validation("squad name is required".to_string()));
        }

        let squad = Squad {
            id: new_id(),
            name: name.to_string(),
            owner_id: owner_id.to_string(),
            member_ids: Vec::new(),
            stats: SquadStats::default(),
            created_at: Utc::now(),
        };
        let membership = self.store.create_squad(&squad).await?;
        info!(squad_id = %squad.id, owner_id = %owner_id, "Created squad");

        let rep = self
            .reputation
            .award_rep(owner_id, RepEvent::SquadJoined)
            .await?;
        Ok(JoinOutcome {
            squad: membership.squad,
            newly_joined: true,
            rep: Some(rep),
        })
    }

    pub async fn join_squad(&self, squad_id: &str, creator_id: &str) -> GigletResult<JoinOutcome> {
        let membership = self.store.join_squad(squad_id, creator_id).await?;

        let rep = if membership.newly_joined {
            info!(squad_id = %squad_id, creator_id = %creator_id, "Creator joined squad");
            Some(
                self.reputation
                    .award_rep(creator_id, RepEvent::SquadJoined)
                    .await?,
            )
        } else {
            None
        };

        Ok(JoinOutcome {
            squad: membership.squad,
            newly_joined: membership.newly_joined,
            rep,
        })
    }

    pub async fn get_squad(&self, squad_id: &str) -> GigletResult<Squad> {
        self.store
            .get_squad(squad_id)
            .await?
            .ok_or_else(|| GigletError::not_found("squad", squad_id))
    }
}
