//! Monster hunts.

use super::GameEngine;
use crate::catalog::Monster;
use crate::game::{
    config::{HuntPolicy, TargetSelection},
    errors::{GameError, GameResult},
    models::{Currency, CurrencyDeltas, HuntCooldown, HuntOutcome, HuntRecord, HuntReport},
    rules,
};

impl GameEngine {
    /// Hunt a monster, or the best reachable one when `monster_id` is `None`
    ///
    /// # Arguments
    ///
    /// * `player_id` - Hunting player
    /// * `monster_id` - Explicit target, optional
    ///
    /// # Returns
    ///
    /// * `GameResult<HuntReport>` - Monster, outcome, gems paid and kills in its tier
    ///
    /// # Errors
    ///
    /// * `GameError::MissingEquipment` - Weapon or gear slot empty
    /// * `GameError::NotFound` - Unknown monster, or nothing reachable
    /// * `GameError::Cooldown` - Tier hunted too recently
    /// * `GameError::ThresholdNotMet` - Power below the threshold (threshold policy)
    pub async fn hunt(&self, player_id: &str, monster_id: Option<&str>) -> GameResult<HuntReport> {
        let result = self.try_hunt(player_id, monster_id).await;
        self.finish("hunt", player_id, result)
    }

    async fn try_hunt(&self, player_id: &str, monster_id: Option<&str>) -> GameResult<HuntReport> {
        let mut tx = self.store.begin().await?;
        let mut player = self.load_or_create_player(tx.as_mut(), player_id).await?;

        let equipped = self.resolve_equipped(tx.as_mut(), &player).await?;
        if !equipped.is_complete() {
            return Err(GameError::MissingEquipment {
                weapon_missing: equipped.weapon.is_none(),
                gear_missing: equipped.gear.is_none(),
            });
        }
        let power = equipped.power;

        let monster = match monster_id {
            Some(id) => self
                .catalog
                .monster(id.trim())
                .cloned()
                .ok_or_else(|| GameError::not_found("monster", id))?,
            None => self.select_target(power)?,
        };

        let now = self.now();
        if let Some(cooldown) = tx.lock_hunt_cooldown(&player.id, monster.tier).await? {
            let ready_at = self.deadline(cooldown.last_hunt_at, self.config.hunt_cooldown())?;
            if now < ready_at {
                return Err(GameError::Cooldown {
                    action: "Hunting",
                    remaining_secs: rules::remaining_secs(ready_at, now),
                });
            }
        }

        let outcome = match self.config.hunt_policy {
            HuntPolicy::Threshold => {
                if power < monster.threshold {
                    return Err(GameError::ThresholdNotMet {
                        monster_id: monster.id.clone(),
                        power,
                        threshold: monster.threshold,
                    });
                }
                HuntOutcome::Victory
            }
            HuntPolicy::Chance => {
                if self.roll() < rules::hunt_chance(power, monster.threshold) {
                    HuntOutcome::Victory
                } else {
                    HuntOutcome::Defeat
                }
            }
        };

        let (gems_awarded, consolation_bronze, kills_in_tier) = match outcome {
            HuntOutcome::Victory => {
                let kills = tx.increment_kills(&player.id, monster.tier).await?;
                (monster.gems, 0, kills)
            }
            HuntOutcome::Defeat => {
                let kills = tx
                    .list_hunt_records(&player.id)
                    .await?
                    .into_iter()
                    .find(|r| r.tier == monster.tier)
                    .map_or(0, |r| r.kills);
                (0, self.config.hunt_consolation_bronze, kills)
            }
        };

        let deltas = CurrencyDeltas::new()
            .with(Currency::Gems, gems_awarded)
            .with(Currency::Bronze, consolation_bronze);
        let balance = self.credit(&mut player, &deltas);
        tx.save_player(&player).await?;
        tx.save_hunt_cooldown(&HuntCooldown {
            player_id: player.id.clone(),
            tier: monster.tier,
            last_hunt_at: now,
        })
        .await?;
        tx.commit().await?;

        log::info!(
            "Player {} hunted {} (tier {}, power {}): {:?}, {} gems",
            player.id,
            monster.id,
            monster.tier,
            power,
            outcome,
            gems_awarded
        );

        Ok(HuntReport {
            monster,
            outcome,
            power,
            gems_awarded,
            consolation_bronze,
            new_gem_balance: balance.gems,
            kills_in_tier,
        })
    }

    /// Pick a target from the best tier the power qualifies for
    fn select_target(&self, power: i64) -> GameResult<Monster> {
        let bucket = self
            .catalog
            .tier_index()
            .best_tier(power)
            .ok_or_else(|| GameError::not_found("monster", format!("any within power {power}")))?;

        let candidates: Vec<&Monster> = bucket.beatable(power).collect();
        let picked = match self.config.hunt_target {
            TargetSelection::Weakest => candidates.first().copied(),
            TargetSelection::Random if candidates.is_empty() => None,
            TargetSelection::Random => Some(candidates[self.pick_index(candidates.len())]),
        };

        picked.cloned().ok_or_else(|| {
            GameError::not_found("monster", format!("tier {} within power {power}", bucket.tier))
        })
    }

    /// Kill counters per tier
    pub async fn hunt_records(&self, player_id: &str) -> GameResult<Vec<HuntRecord>> {
        let result = self.try_hunt_records(player_id).await;
        self.finish("hunt_records", player_id, result)
    }

    async fn try_hunt_records(&self, player_id: &str) -> GameResult<Vec<HuntRecord>> {
        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let records = tx.list_hunt_records(&player.id).await?;
        tx.commit().await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::catalog::ItemKind;
    use crate::game::{
        config::{GameConfig, HuntPolicy, TargetSelection},
        errors::GameError,
        models::HuntOutcome,
    };
    use chrono::Duration;

    async fn equip_best(h: &Harness, player: &str, weapon: &str, gear: &str) {
        let w = h.engine.give_item(player, ItemKind::Weapon, weapon, 1).await.unwrap();
        let g = h.engine.give_item(player, ItemKind::Gear, gear, 1).await.unwrap();
        h.engine.equip(player, w.id, ItemKind::Weapon).await.unwrap();
        h.engine.equip(player, g.id, ItemKind::Gear).await.unwrap();
    }

    #[tokio::test]
    async fn test_starter_hunts_training_dummy() {
        let h = harness();
        let report = h.engine.hunt("1", None).await.unwrap();
        assert_eq!(report.monster.id, "m0");
        assert_eq!(report.outcome, HuntOutcome::Victory);
        assert_eq!(report.gems_awarded, 1);
        assert_eq!(report.new_gem_balance, 1);
        assert_eq!(report.kills_in_tier, 1);
    }

    #[tokio::test]
    async fn test_auto_target_uses_best_tier() {
        let h = harness();
        // w5 (16) + g5 (12) = 28 -> tier 1
        equip_best(&h, "1", "w5", "g5").await;
        let report = h.engine.hunt("1", None).await.unwrap();
        assert_eq!(report.power, 28);
        assert_eq!(report.monster.tier, 1);
        assert_eq!(report.monster.id, "m1");
    }

    #[tokio::test]
    async fn test_missing_equipment() {
        let h = harness_with(GameConfig {
            starter_kit: None,
            ..GameConfig::default()
        });
        match h.engine.hunt("1", None).await {
            Err(GameError::MissingEquipment {
                weapon_missing,
                gear_missing,
            }) => assert!(weapon_missing && gear_missing),
            other => panic!("Expected MissingEquipment, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_threshold_not_met_changes_nothing() {
        let h = harness();
        match h.engine.hunt("1", Some("m5")).await {
            Err(GameError::ThresholdNotMet {
                power, threshold, ..
            }) => assert_eq!((power, threshold), (8, 75)),
            other => panic!("Expected ThresholdNotMet, got {other:?}"),
        }
        assert_eq!(h.engine.get_balance("1").await.unwrap().gems, 0);
        assert!(h.engine.hunt_records("1").await.unwrap().is_empty());
        // No cooldown was stamped
        assert!(h.engine.hunt("1", Some("m0")).await.is_ok());
    }

    #[tokio::test]
    async fn test_threshold_boundary() {
        let h = harness();
        // w6 (18) + g8 (22) = 40, exactly the Giant Spider threshold
        equip_best(&h, "1", "w6", "g8").await;
        let report = h.engine.hunt("1", Some("m3")).await.unwrap();
        assert_eq!(report.power, 40);
        assert_eq!(report.outcome, HuntOutcome::Victory);
        assert_eq!(report.kills_in_tier, 1);

        // w3 (9) + g9 (30) = 39, one short
        equip_best(&h, "2", "w3", "g9").await;
        match h.engine.hunt("2", Some("m3")).await {
            Err(GameError::ThresholdNotMet {
                power, threshold, ..
            }) => assert_eq!((power, threshold), (39, 40)),
            other => panic!("Expected ThresholdNotMet, got {other:?}"),
        }
        assert_eq!(h.engine.get_balance("2").await.unwrap().gems, 0);
        assert!(h.engine.hunt_records("2").await.unwrap().is_empty());

        // Same instant, enough power: no cooldown was left behind
        equip_best(&h, "2", "w6", "g8").await;
        let report = h.engine.hunt("2", Some("m3")).await.unwrap();
        assert_eq!(report.kills_in_tier, 1);
        assert_eq!(report.new_gem_balance, 1);
    }

    #[tokio::test]
    async fn test_cooldown_is_per_tier() {
        let h = harness();
        equip_best(&h, "1", "w5", "g5").await;

        h.engine.hunt("1", Some("m1")).await.unwrap();
        h.clock.advance(Duration::seconds(20));

        match h.engine.hunt("1", Some("m2")).await {
            Err(GameError::Cooldown { remaining_secs, .. }) => assert_eq!(remaining_secs, 40),
            other => panic!("Expected Cooldown, got {other:?}"),
        }
        assert!(h.engine.hunt("1", Some("m0")).await.is_ok());

        h.clock.advance(Duration::seconds(40));
        let report = h.engine.hunt("1", Some("m2")).await.unwrap();
        assert_eq!(report.kills_in_tier, 2);

        let records = h.engine.hunt_records("1").await.unwrap();
        let tiers: Vec<(i32, i64)> = records.iter().map(|r| (r.tier, r.kills)).collect();
        assert_eq!(tiers, vec![(0, 1), (1, 2)]);
    }

    #[tokio::test]
    async fn test_unknown_monster() {
        let h = harness();
        assert!(matches!(
            h.engine.hunt("1", Some("m999")).await,
            Err(GameError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_random_target_stays_in_best_tier() {
        let h = harness_with(GameConfig {
            hunt_target: TargetSelection::Random,
            hunt_cooldown_secs: 0,
            ..GameConfig::default()
        });
        equip_best(&h, "1", "w7", "g7").await;
        for _ in 0..10 {
            let report = h.engine.hunt("1", None).await.unwrap();
            assert_eq!(report.monster.tier, 2);
        }
    }

    #[tokio::test]
    async fn test_chance_policy_pays_consolation_on_defeat() {
        let h = harness_with(GameConfig {
            hunt_policy: HuntPolicy::Chance,
            hunt_cooldown_secs: 0,
            ..GameConfig::default()
        });

        let mut victories = 0;
        let mut defeats = 0;
        for _ in 0..40 {
            // Power 8 vs threshold 715: 5% win chance
            let report = h.engine.hunt("1", Some("m20")).await.unwrap();
            match report.outcome {
                HuntOutcome::Victory => {
                    victories += 1;
                    assert_eq!(report.gems_awarded, 24);
                }
                HuntOutcome::Defeat => {
                    defeats += 1;
                    assert_eq!(report.gems_awarded, 0);
                    assert_eq!(report.consolation_bronze, 1);
                }
            }
        }
        assert!(defeats > victories);
        let balance = h.engine.get_balance("1").await.unwrap();
        assert_eq!(balance.bronze, defeats);
        assert_eq!(balance.gems, victories * 24);
    }

    #[tokio::test]
    async fn test_chance_policy_stamps_cooldown_on_defeat() {
        let h = harness_with(GameConfig {
            hunt_policy: HuntPolicy::Chance,
            ..GameConfig::default()
        });
        h.engine.hunt("1", Some("m20")).await.unwrap();
        assert!(matches!(
            h.engine.hunt("1", Some("m20")).await,
            Err(GameError::Cooldown { .. })
        ));
    }
}
