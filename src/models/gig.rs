//! Gig record and its payout, visibility and requirement shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigStatus {
    /// Posted, nobody has accepted yet
    Open,
    /// At least one creator accepted
    Accepted,
    /// No further acceptances or submissions
    Closed,
}

impl GigStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GigStatus::Open => "open",
            GigStatus::Accepted => "accepted",
            GigStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(GigStatus::Open),
            "accepted" => Some(GigStatus::Accepted),
            "closed" => Some(GigStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutTier {
    pub min_followers: u64,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayoutStructure {
    Fixed { amount_cents: i64 },
    FollowerTiered { tiers: Vec<PayoutTier> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GigVisibility {
    Open,
    Squad { squad_id: String },
    Invite { creator_ids: Vec<String> },
}

impl GigVisibility {
    pub fn is_squad(&self) -> bool {
        matches!(self, GigVisibility::Squad { .. })
    }
}

/// Creator-side requirements set by the brand
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GigRequirements {
    pub min_followers: u64,
    /// Minimum rep level (1-7); 0 or 1 means no requirement
    pub min_rep_level: u8,
    pub min_trust_score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gig {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,

    pub payout: PayoutStructure,
    pub visibility: GigVisibility,
    pub deadline: DateTime<Utc>,

    /// Maximum number of live submissions
    pub accepted_submissions_limit: u32,
    pub requirements: GigRequirements,

    /// Creator buys the product and is reimbursed
    pub reimbursement: bool,
    pub premium: bool,
    pub compliance_required: bool,

    pub status: GigStatus,
    /// First creator to accept; the only acceptor for single-slot gigs
    pub accepted_by: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    /// Every creator that accepted, in acceptance order
    pub acceptances: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl Gig {
    pub fn is_single_slot(&self) -> bool {
        self.accepted_submissions_limit == 1
    }

    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    pub fn has_accepted(&self, creator_id: &str) -> bool {
        self.accepted_by.as_deref() == Some(creator_id)
            || self.acceptances.iter().any(|c| c == creator_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_serialization_is_tagged() {
        let payout = PayoutStructure::Fixed { amount_cents: 5000 };
        let json = serde_json::to_value(&payout).unwrap();
        assert_eq!(json["type"], "fixed");
        assert_eq!(json["amount_cents"], 5000);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(GigStatus::parse("accepted"), Some(GigStatus::Accepted));
        assert_eq!(GigStatus::parse("expired"), None);
        assert_eq!(GigStatus::Closed.as_str(), "closed");
    }
}
