//! Reputation & Access Gating
//!
//! Rep points decide a creator's level; the level decides how early a new
//! gig becomes visible. The trust score, built from verification and social
//! connections, decides which payout features and gig tiers unlock.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ RepEvent    │──►│ Reputation  │◄──│ TrustScore   │
//! │ (deltas)    │   │ Manager     │   │ (gates)      │
//! └─────────────┘   └──────┬──────┘   └──────────────┘
//!                          │
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!         rep_level (tiers)   can_access_gig (delay)
//! ```
//!
//! ## Score Model
//!
//! - Rep starts at 0 and never goes negative
//! - Seven levels, Rookie (0) to Legend (2500)
//! - Gig visibility delay is `(7 - level) * 10` minutes
//! - Trust score caps: verification 55, socials 20, performance 25, total 100

mod access;
mod events;
mod level;
mod manager;
mod trust;

pub use access::{
    DEFAULT_DELAY_STEP_MINUTES, GigAccess, can_access_gig, can_access_gig_with_step,
    delay_minutes, delay_minutes_with_step,
};
pub use events::{MAX_REP, RepEvent, apply_delta, quality_bonus, rep_difference};
pub use level::{MAX_LEVEL, REP_TIERS, RepLevel, RepTier, level_for, rep_level};
pub use manager::{CreatorStanding, RepAward, ReputationManager, ReputationThresholds};
pub use trust::{
    MAX_TRUST_SCORE, PERFORMANCE_CAP, SOCIALS_CAP, TrustGates, TrustScore, TrustThresholds,
    VERIFICATION_CAP,
};
