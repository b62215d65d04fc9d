//! Rep Levels
//!
//! Seven fixed tiers keyed by the minimum cumulative rep needed to reach them.

use serde::{Deserialize, Serialize};

pub const MAX_LEVEL: u8 = 7;

/// One row of the level table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepTier {
    pub level: u8,
    pub title: &'static str,
    pub min_rep: u32,
}

pub const REP_TIERS: [RepTier; 7] = [
    RepTier { level: 1, title: "Rookie", min_rep: 0 },
    RepTier { level: 2, title: "Rising", min_rep: 100 },
    RepTier { level: 3, title: "Creator", min_rep: 300 },
    RepTier { level: 4, title: "Pro", min_rep: 600 },
    RepTier { level: 5, title: "Expert", min_rep: 1000 },
    RepTier { level: 6, title: "Elite", min_rep: 1500 },
    RepTier { level: 7, title: "Legend", min_rep: 2500 },
];

/// A creator's current level and progress toward the next one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepLevel {
    pub level: u8,
    pub title: String,
    pub rep: u32,
    /// Threshold of the current tier
    pub min_rep: u32,
    /// Threshold of the next tier; equals `min_rep` at the top tier
    pub next_level_rep: u32,
}

impl RepLevel {
    pub fn is_max(&self) -> bool {
        self.level == MAX_LEVEL
    }

    /// Progress through the current tier, 0-100. Always 100 at the top tier.
    pub fn progress_percent(&self) -> u8 {
        if self.is_max() || self.next_level_rep <= self.min_rep {
            return 100;
        }
        let span = (self.next_level_rep - self.min_rep) as u64;
        let done = (self.rep.saturating_sub(self.min_rep)) as u64;
        ((done * 100) / span).min(100) as u8
    }
}

/// Look up the tier for a rep total. Defined for every `rep`.
pub fn rep_level(rep: u32) -> RepLevel {
    let index = REP_TIERS
        .iter()
        .rposition(|tier| tier.min_rep <= rep)
        .unwrap_or(0);
    let tier = REP_TIERS[index];
    let next_level_rep = REP_TIERS
        .get(index + 1)
        .map(|next| next.min_rep)
        .unwrap_or(tier.min_rep);

    RepLevel {
        level: tier.level,
        title: tier.title.to_string(),
        rep,
        min_rep: tier.min_rep,
        next_level_rep,
    }
}

/// Level number only
pub fn level_for(rep: u32) -> u8 {
    rep_level(rep).level
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rookie_at_zero() {
        let level = rep_level(0);
        assert_eq!(level.level, 1);
        assert_eq!(level.title, "Rookie");
        assert_eq!(level.next_level_rep, 100);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(299), 2);
        assert_eq!(level_for(300), 3);
        assert_eq!(level_for(600), 4);
        assert_eq!(level_for(999), 4);
        assert_eq!(level_for(1000), 5);
        assert_eq!(level_for(1500), 6);
        assert_eq!(level_for(2499), 6);
    }

    #[test]
    fn test_legend_has_no_further_progress() {
        let level = rep_level(2500);
        assert_eq!(level.level, 7);
        assert_eq!(level.title, "Legend");
        assert_eq!(level.next_level_rep, 2500);
        assert_eq!(level.progress_percent(), 100);

        assert_eq!(level_for(u32::MAX), 7);
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(rep_level(0).progress_percent(), 0);
        assert_eq!(rep_level(50).progress_percent(), 50);
        assert_eq!(rep_level(450).progress_percent(), 50);
    }

    proptest! {
        #[test]
        fn level_is_monotonic(a in 0u32..10_000, b in 0u32..10_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for(lo) <= level_for(hi));
        }

        #[test]
        fn level_threshold_is_reached(rep in 0u32..100_000) {
            let level = rep_level(rep);
            prop_assert!(level.min_rep <= rep);
            prop_assert!((1..=MAX_LEVEL).contains(&level.level));
            if !level.is_max() {
                prop_assert!(rep < level.next_level_rep);
            }
        }
    }
}
