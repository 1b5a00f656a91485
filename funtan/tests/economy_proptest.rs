/// Property-based tests for the economy rules and the monster tier index
///
/// These check the invariants every reward path relies on: balances never go
/// negative, streaks stay within their caps, and tier selection never picks
/// a monster the player cannot reach.
use chrono::{Duration, TimeZone, Utc};
use funtan::catalog::{Catalog, Monster, TierIndex};
use funtan::game::{
    models::{Balance, Currency, CurrencyDeltas},
    rules::{daily_reward, format_duration, hunt_chance, next_streak, remaining_secs, work_bonus},
};
use proptest::prelude::*;

// Strategy to generate a currency
fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop::sample::select(Currency::ALL.to_vec())
}

// Strategy to generate a batch of signed deltas
fn deltas_strategy() -> impl Strategy<Value = CurrencyDeltas> {
    prop::collection::vec((currency_strategy(), -1_000_000i64..=1_000_000), 1..6).prop_map(
        |pairs| {
            pairs
                .into_iter()
                .fold(CurrencyDeltas::new(), |acc, (c, a)| acc.with(c, a))
        },
    )
}

// Strategy to generate a monster list with arbitrary tiers and thresholds
fn monsters_strategy() -> impl Strategy<Value = Vec<Monster>> {
    prop::collection::vec((0i32..12, 0i64..1000, 1i64..30), 1..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (tier, threshold, gems))| Monster {
                id: format!("m{i}"),
                name: format!("Monster {i}"),
                tier,
                threshold,
                gems,
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_balances_never_negative(batches in prop::collection::vec(deltas_strategy(), 1..20)) {
        let mut balance = Balance::default();
        for deltas in &batches {
            balance.apply(deltas);
            for currency in Currency::ALL {
                prop_assert!(balance.get(currency) >= 0);
            }
        }
    }

    #[test]
    fn test_positive_deltas_add_exactly(start in 0i64..1_000_000, add in 0i64..1_000_000) {
        let mut balance = Balance::default();
        balance.apply(&CurrencyDeltas::single(Currency::Gems, start));
        balance.apply(&CurrencyDeltas::single(Currency::Gems, add));
        prop_assert_eq!(balance.gems, start + add);
    }

    #[test]
    fn test_streak_within_bounds(
        previous in 0i32..400,
        gap_secs in 0i64..400_000,
        cap in 1i32..400,
    ) {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let last = now - Duration::seconds(gap_secs);
        let window = Duration::hours(48);

        let streak = next_streak(previous, Some(last), now, window, cap);
        prop_assert!(streak >= 1);
        prop_assert!(streak <= cap.max(1));

        if gap_secs > window.num_seconds() || previous == 0 {
            prop_assert_eq!(streak, 1);
        }
    }

    #[test]
    fn test_daily_reward_grows_with_streak(streak in 1i32..365) {
        prop_assert!(daily_reward(50, 5, streak + 1) > daily_reward(50, 5, streak));
        prop_assert_eq!(daily_reward(50, 5, streak), 50 + 5 * i64::from(streak - 1));
    }

    #[test]
    fn test_work_bonus_capped(streak in 1i32..1000, per_day in 0i64..50, cap in 0i64..500) {
        let bonus = work_bonus(per_day, streak, cap);
        prop_assert!(bonus >= 0);
        prop_assert!(bonus <= cap);
    }

    #[test]
    fn test_hunt_chance_bounds(power in 0i64..10_000, threshold in -10i64..10_000) {
        let chance = hunt_chance(power, threshold);
        prop_assert!((0.05..=0.95).contains(&chance));
    }

    #[test]
    fn test_remaining_secs_never_negative(offset in -100_000i64..100_000, millis in 0i64..1000) {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let deadline = now + Duration::seconds(offset) + Duration::milliseconds(millis);
        let left = remaining_secs(deadline, now);
        prop_assert!(left >= 0);
        // Waiting the reported time is always enough
        prop_assert!(now + Duration::seconds(left) >= deadline);
    }

    #[test]
    fn test_format_duration_never_empty(secs in -10i64..1_000_000) {
        let text = format_duration(secs);
        prop_assert!(!text.is_empty());
        prop_assert_eq!(text.contains("second"), secs <= 0 || secs % 60 != 0);
    }

    #[test]
    fn test_best_tier_is_reachable(monsters in monsters_strategy(), power in 0i64..1200) {
        let index = TierIndex::build(&monsters);

        match index.best_tier(power) {
            Some(bucket) => {
                // Every tier up to the chosen one is reachable
                for lower in index.buckets().iter().take_while(|b| b.tier <= bucket.tier) {
                    prop_assert!(lower.min_threshold <= power);
                }
                prop_assert!(bucket.beatable(power).next().is_some());
                prop_assert!(bucket.beatable(power).all(|m| m.threshold <= power));
            }
            None => {
                let lowest = index.buckets().first().map(|b| b.min_threshold);
                prop_assert!(lowest.is_some_and(|t| t > power));
            }
        }
    }

    #[test]
    fn test_eligible_monsters_match_thresholds(monsters in monsters_strategy(), power in 0i64..1200) {
        let index = TierIndex::build(&monsters);
        let eligible = index.eligible_monsters(power);

        let expected = monsters.iter().filter(|m| m.threshold <= power).count();
        let found: usize = eligible.values().map(Vec::len).sum();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn test_standard_catalog_best_tier(power in 0i64..2000) {
        let catalog = Catalog::standard();
        let bucket = catalog.tier_index().best_tier(power);
        // The training dummy keeps tier 0 reachable at any power
        prop_assert!(bucket.is_some());
    }
}
