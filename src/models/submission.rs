use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Submitted,
    NeedsChanges,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Statuses that occupy one of the gig's acceptance slots
    pub const LIVE: [SubmissionStatus; 3] = [
        SubmissionStatus::Submitted,
        SubmissionStatus::NeedsChanges,
        SubmissionStatus::Approved,
    ];

    pub fn is_live(&self) -> bool {
        Self::LIVE.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::NeedsChanges => "needs_changes",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "submitted" => Some(SubmissionStatus::Submitted),
            "needs_changes" => Some(SubmissionStatus::NeedsChanges),
            "approved" => Some(SubmissionStatus::Approved),
            "rejected" => Some(SubmissionStatus::Rejected),
            _ => None,
        }
    }
}

/// Result reported by the external content-evaluation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiEvaluation {
    /// 0-100
    pub quality_score: u8,
    pub summary: String,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub gig_id: String,
    pub creator_id: String,
    pub content_url: String,
    pub status: SubmissionStatus,
    pub evaluation: Option<AiEvaluation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(id: String, gig_id: String, creator_id: String, content_url: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            gig_id,
            creator_id,
            content_url,
            status: SubmissionStatus::Submitted,
            evaluation: None,
            created_at: now,
            updated_at: now,
        }
    }
}
