//! Early Access
//!
//! Higher levels see newly posted gigs sooner: a gig unlocks for a creator
//! at `created_at + (7 - level) * step`. The default step is 10 minutes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::level::{MAX_LEVEL, level_for};

pub const DEFAULT_DELAY_STEP_MINUTES: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GigAccess {
    pub can_access: bool,
    pub unlock_at: DateTime<Utc>,
    /// Rounded up; 0 once unlocked
    pub minutes_until_unlock: i64,
}

/// Delay in minutes for a level, with the default step.
pub fn delay_minutes(level: u8) -> i64 {
    delay_minutes_with_step(level, DEFAULT_DELAY_STEP_MINUTES)
}

pub fn delay_minutes_with_step(level: u8, step_minutes: i64) -> i64 {
    let level = level.clamp(1, MAX_LEVEL);
    (MAX_LEVEL - level) as i64 * step_minutes
}

/// Access check for a creator with `rep` against a gig posted at `created_at`.
pub fn can_access_gig(rep: u32, created_at: DateTime<Utc>, now: DateTime<Utc>) -> GigAccess {
    can_access_gig_with_step(rep, created_at, now, DEFAULT_DELAY_STEP_MINUTES)
}

pub fn can_access_gig_with_step(
    rep: u32,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    step_minutes: i64,
) -> GigAccess {
    let level = level_for(rep);
    let unlock_at = created_at + Duration::minutes(delay_minutes_with_step(level, step_minutes));

    if level == MAX_LEVEL || now >= unlock_at {
        return GigAccess {
            can_access: true,
            unlock_at,
            minutes_until_unlock: 0,
        };
    }

    let remaining = (unlock_at - now).num_seconds();
    GigAccess {
        can_access: false,
        unlock_at,
        minutes_until_unlock: (remaining + 59) / 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_formula() {
        for level in 1..=7u8 {
            assert_eq!(delay_minutes(level), (7 - level as i64) * 10);
        }
        assert_eq!(delay_minutes(1), 60);
        assert_eq!(delay_minutes(7), 0);
    }

    #[test]
    fn test_legend_always_has_access() {
        let now = Utc::now();
        for offset in [-600, 0, 600] {
            let access = can_access_gig(2500, now + Duration::minutes(offset), now);
            assert!(access.can_access);
            assert_eq!(access.minutes_until_unlock, 0);
        }
    }

    #[test]
    fn test_rookie_waits_an_hour() {
        let now = Utc::now();
        let access = can_access_gig(0, now, now);
        assert!(!access.can_access);
        assert_eq!(access.minutes_until_unlock, 60);
        assert_eq!(access.unlock_at, now + Duration::minutes(60));
    }

    #[test]
    fn test_rookie_unlocks_after_delay() {
        let now = Utc::now();
        let access = can_access_gig(0, now - Duration::minutes(61), now);
        assert!(access.can_access);

        let partial = can_access_gig(0, now - Duration::seconds(30 * 60 + 1), now);
        assert!(!partial.can_access);
        assert_eq!(partial.minutes_until_unlock, 30);
    }

    #[test]
    fn test_custom_step() {
        let now = Utc::now();
        let access = can_access_gig_with_step(600, now, now, 5);
        // level 4 -> 3 steps
        assert_eq!(access.minutes_until_unlock, 15);
    }
}
