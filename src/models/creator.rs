use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity checks a creator has completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationFlags {
    pub email: bool,
    pub phone: bool,
    pub payment_setup: bool,
    pub identity: bool,
}

/// Connected social accounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialConnections {
    pub tiktok: bool,
    pub instagram: bool,
    pub youtube: bool,
    pub linkedin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    /// Same as the owning user's id
    pub id: String,
    pub username: String,

    /// Largest audience across connected platforms
    pub follower_count: u64,

    /// Cumulative reputation points, never negative
    pub rep: u32,

    pub verification: VerificationFlags,
    pub socials: SocialConnections,

    /// Earned, not yet withdrawn
    pub balance_cents: i64,

    pub squad_id: Option<String>,
    pub gigs_completed: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Creator {
    pub fn new(id: String, username: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            follower_count: 0,
            rep: 0,
            verification: VerificationFlags::default(),
            socials: SocialConnections::default(),
            balance_cents: 0,
            squad_id: None,
            gigs_completed: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_followers(mut self, follower_count: u64) -> Self {
        self.follower_count = follower_count;
        self
    }

    pub fn with_rep(mut self, rep: u32) -> Self {
        self.rep = rep;
        self
    }

    pub fn with_verification(mut self, verification: VerificationFlags) -> Self {
        self.verification = verification;
        self
    }

    pub fn with_socials(mut self, socials: SocialConnections) -> Self {
        self.socials = socials;
        self
    }
}
