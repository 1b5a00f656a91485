//! Monster tier index.
//!
//! Groups monsters by tier so "strongest tier I can fight" and "which monsters
//! can I beat" are answered by walking tiers instead of every monster.

use super::models::Monster;
use serde::Serialize;
use std::collections::BTreeMap;

/// Monsters of a single tier
#[derive(Debug, Clone, Serialize)]
pub struct TierBucket {
    pub tier: i32,
    /// Lowest threshold among the tier's monsters
    pub min_threshold: i64,
    /// Sorted by threshold, then catalog id
    pub monsters: Vec<Monster>,
}

impl TierBucket {
    /// Monsters in this tier whose own threshold is within `power`
    pub fn beatable(&self, power: i64) -> impl Iterator<Item = &Monster> {
        self.monsters.iter().filter(move |m| m.threshold <= power)
    }
}

/// Tier index built from a monster list
#[derive(Debug, Clone, Default, Serialize)]
pub struct TierIndex {
    /// Ascending by tier
    buckets: Vec<TierBucket>,
}

impl TierIndex {
    /// Build the index
    ///
    /// # Arguments
    ///
    /// * `monsters` - Monster catalog
    ///
    /// # Returns
    ///
    /// * `TierIndex` - Index with tiers sorted ascending
    pub fn build(monsters: &[Monster]) -> Self {
        let mut grouped: BTreeMap<i32, Vec<Monster>> = BTreeMap::new();
        for monster in monsters {
            grouped.entry(monster.tier).or_default().push(monster.clone());
        }

        let buckets = grouped
            .into_iter()
            .map(|(tier, mut monsters)| {
                monsters.sort_by(|a, b| a.threshold.cmp(&b.threshold).then_with(|| a.id.cmp(&b.id)));
                let min_threshold = monsters.first().map(|m| m.threshold).unwrap_or(0);
                TierBucket {
                    tier,
                    min_threshold,
                    monsters,
                }
            })
            .collect();

        Self { buckets }
    }

    /// Tiers present in the index, ascending
    pub fn tiers(&self) -> impl Iterator<Item = i32> + '_ {
        self.buckets.iter().map(|b| b.tier)
    }

    pub fn buckets(&self) -> &[TierBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket for one tier
    pub fn bucket(&self, tier: i32) -> Option<&TierBucket> {
        self.buckets
            .binary_search_by_key(&tier, |b| b.tier)
            .ok()
            .map(|i| &self.buckets[i])
    }

    /// Lowest threshold of a tier
    pub fn min_threshold(&self, tier: i32) -> Option<i64> {
        self.bucket(tier).map(|b| b.min_threshold)
    }

    /// Highest tier a power value qualifies for.
    ///
    /// Tiers are walked ascending and the walk stops at the first tier whose
    /// floor is out of reach. Returns `None` when not even the lowest tier
    /// qualifies.
    pub fn best_tier(&self, power: i64) -> Option<&TierBucket> {
        let mut best = None;
        for bucket in &self.buckets {
            if bucket.min_threshold > power {
                break;
            }
            best = Some(bucket);
        }
        best
    }

    /// Every monster the power value can challenge, grouped by tier.
    ///
    /// Filters on each monster's own threshold, so a tier can be partially
    /// reachable. Tiers with nothing reachable are left out.
    pub fn eligible_monsters(&self, power: i64) -> BTreeMap<i32, Vec<&Monster>> {
        self.buckets
            .iter()
            .filter_map(|bucket| {
                let reachable: Vec<&Monster> = bucket.beatable(power).collect();
                (!reachable.is_empty()).then_some((bucket.tier, reachable))
            })
            .collect()
    }
}
