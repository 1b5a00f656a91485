//! Daily bronze claim.

use super::GameEngine;
use crate::game::{
    errors::{GameError, GameResult},
    models::{Currency, CurrencyDeltas, DailyClaim, DailyReward},
    rules,
};

impl GameEngine {
    /// Claim the daily bronze reward
    ///
    /// # Arguments
    ///
    /// * `player_id` - Claiming player
    ///
    /// # Returns
    ///
    /// * `GameResult<DailyReward>` - Bronze paid, new streak and new bronze balance
    ///
    /// # Errors
    ///
    /// * `GameError::Cooldown` - Claimed less than a cooldown ago
    pub async fn claim_daily(&self, player_id: &str) -> GameResult<DailyReward> {
        let result = self.try_claim_daily(player_id).await;
        self.finish("claim_daily", player_id, result)
    }

    async fn try_claim_daily(&self, player_id: &str) -> GameResult<DailyReward> {
        let mut tx = self.store.begin().await?;
        let mut player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let now = self.now();

        let claim = tx
            .lock_daily_claim(&player.id)
            .await?
            .unwrap_or_else(|| DailyClaim {
                player_id: player.id.clone(),
                last_claim_at: None,
                streak: 0,
            });

        if let Some(last) = claim.last_claim_at {
            let ready_at = self.deadline(last, self.config.daily_cooldown())?;
            if now < ready_at {
                return Err(GameError::Cooldown {
                    action: "Daily claim",
                    remaining_secs: rules::remaining_secs(ready_at, now),
                });
            }
        }

        let streak = rules::next_streak(
            claim.streak,
            claim.last_claim_at,
            now,
            self.config.daily_streak_window(),
            self.config.daily_streak_cap,
        );
        let bronze = rules::daily_reward(
            self.config.daily_base_bronze,
            self.config.daily_streak_bonus,
            streak,
        );

        let balance = self.credit(&mut player, &CurrencyDeltas::single(Currency::Bronze, bronze));
        tx.save_player(&player).await?;
        tx.save_daily_claim(&DailyClaim {
            player_id: player.id.clone(),
            last_claim_at: Some(now),
            streak,
        })
        .await?;
        tx.commit().await?;

        log::info!(
            "Player {} claimed daily: {} bronze (streak {})",
            player.id,
            bronze,
            streak
        );

        Ok(DailyReward {
            bronze,
            streak,
            new_bronze: balance.bronze,
        })
    }
}
