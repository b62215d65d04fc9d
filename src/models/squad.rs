use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquadStats {
    pub gigs_completed: u32,
    pub total_earned_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub member_ids: Vec<String>,
    pub stats: SquadStats,
    pub created_at: DateTime<Utc>,
}

impl Squad {
    pub fn is_member(&self, creator_id: &str) -> bool {
        self.member_ids.iter().any(|m| m == creator_id)
    }
}
