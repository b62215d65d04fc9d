//! Trust Score
//!
//! Weighted sum over verification, social and performance buckets, each
//! clamped to its own cap, total clamped to 100. The score gates payout
//! features and higher-value gigs.

use serde::{Deserialize, Serialize};

use crate::models::{Creator, SocialConnections, VerificationFlags};

pub const VERIFICATION_CAP: u8 = 55;
pub const SOCIALS_CAP: u8 = 20;
pub const PERFORMANCE_CAP: u8 = 25;
pub const MAX_TRUST_SCORE: u8 = 100;

const EMAIL_WEIGHT: u8 = 10;
const PHONE_WEIGHT: u8 = 10;
const PAYMENT_SETUP_WEIGHT: u8 = 15;
const IDENTITY_WEIGHT: u8 = 20;

const TIKTOK_WEIGHT: u8 = 7;
const INSTAGRAM_WEIGHT: u8 = 7;
const YOUTUBE_WEIGHT: u8 = 5;
const LINKEDIN_WEIGHT: u8 = 1;

/// Score thresholds for each unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustThresholds {
    /// Instant payouts and reimbursement gigs
    pub instant_payout: u8,
    pub high_payout: u8,
    /// Premium / exclusive gigs
    pub premium: u8,
}

impl Default for TrustThresholds {
    fn default() -> Self {
        Self {
            instant_payout: 50,
            high_payout: 70,
            premium: 85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustScore {
    pub verification: u8,
    pub socials: u8,
    pub performance: u8,
    pub total: u8,
}

impl TrustScore {
    pub fn compute(
        verification: &VerificationFlags,
        socials: &SocialConnections,
        performance: u8,
    ) -> Self {
        let verification = verification_points(verification).min(VERIFICATION_CAP);
        let socials = social_points(socials).min(SOCIALS_CAP);
        let performance = performance.min(PERFORMANCE_CAP);
        let total = (verification as u16 + socials as u16 + performance as u16)
            .min(MAX_TRUST_SCORE as u16) as u8;

        Self {
            verification,
            socials,
            performance,
            total,
        }
    }

    /// Performance bucket is reserved and contributes nothing yet.
    pub fn for_creator(creator: &Creator) -> Self {
        Self::compute(&creator.verification, &creator.socials, 0)
    }

    pub fn gates(&self, thresholds: &TrustThresholds) -> TrustGates {
        TrustGates {
            instant_payout: self.total >= thresholds.instant_payout,
            reimbursement_gigs: self.total >= thresholds.instant_payout,
            high_payout_gigs: self.total >= thresholds.high_payout,
            premium_gigs: self.total >= thresholds.premium,
        }
    }
}

/// What a trust score unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustGates {
    pub instant_payout: bool,
    pub reimbursement_gigs: bool,
    pub high_payout_gigs: bool,
    pub premium_gigs: bool,
}

fn verification_points(flags: &VerificationFlags) -> u8 {
    let mut points = 0;
    if flags.email {
        points += EMAIL_WEIGHT;
    }
    if flags.phone {
        points += PHONE_WEIGHT;
    }
    if flags.payment_setup {
        points += PAYMENT_SETUP_WEIGHT;
    }
    if flags.identity {
        points += IDENTITY_WEIGHT;
    }
    points
}

fn social_points(socials: &SocialConnections) -> u8 {
    [
        (socials.tiktok, TIKTOK_WEIGHT),
        (socials.instagram, INSTAGRAM_WEIGHT),
        (socials.youtube, YOUTUBE_WEIGHT),
        (socials.linkedin, LINKEDIN_WEIGHT),
    ]
    .iter()
    .filter(|(connected, _)| *connected)
    .map(|(_, weight)| weight)
    .sum()
}
