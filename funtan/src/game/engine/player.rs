//! Player ledger operations.

use super::GameEngine;
use crate::game::{
    config::PRESTIGE_MAX_LEVEL,
    errors::{GameError, GameResult},
    models::{Balance, CurrencyDeltas, Player},
};

impl GameEngine {
    /// Get or create a player
    ///
    /// A newly created player receives the starter kit when one is configured.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidUser` - Empty player id
    pub async fn ensure_player(&self, player_id: &str) -> GameResult<Player> {
        let result = self.try_ensure_player(player_id).await;
        self.finish("ensure_player", player_id, result)
    }

    async fn try_ensure_player(&self, player_id: &str) -> GameResult<Player> {
        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        tx.commit().await?;
        Ok(player)
    }

    /// Current balances (creates the player on first interaction)
    pub async fn get_balance(&self, player_id: &str) -> GameResult<Balance> {
        self.ensure_player(player_id).await.map(|p| p.balance)
    }

    /// Apply signed currency deltas in one transaction
    ///
    /// # Arguments
    ///
    /// * `player_id` - Player to adjust
    /// * `deltas` - Per-currency signed amounts; results are clamped at zero
    ///
    /// # Returns
    ///
    /// * `GameResult<Balance>` - Balances after the adjustment
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidInput` - No deltas
    /// * `GameError::InvalidUser` - Empty player id
    pub async fn adjust_currency(
        &self,
        player_id: &str,
        deltas: &CurrencyDeltas,
    ) -> GameResult<Balance> {
        let result = self.try_adjust_currency(player_id, deltas).await;
        self.finish("adjust_currency", player_id, result)
    }

    pub(super) async fn try_adjust_currency(
        &self,
        player_id: &str,
        deltas: &CurrencyDeltas,
    ) -> GameResult<Balance> {
        if deltas.is_empty() {
            return Err(GameError::InvalidInput(
                "No currency deltas provided".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;
        let mut player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let balance = self.credit(&mut player, deltas);
        tx.save_player(&player).await?;
        tx.commit().await?;

        log::info!("Adjusted currency for player {}: {:?}", player.id, deltas);
        Ok(balance)
    }

    /// Raise prestige by one level, up to [`PRESTIGE_MAX_LEVEL`]
    ///
    /// # Returns
    ///
    /// * `GameResult<i32>` - Prestige after the call
    pub async fn add_prestige(&self, player_id: &str) -> GameResult<i32> {
        let result = self.try_add_prestige(player_id).await;
        self.finish("add_prestige", player_id, result)
    }

    async fn try_add_prestige(&self, player_id: &str) -> GameResult<i32> {
        let mut tx = self.store.begin().await?;
        let mut player = self.load_or_create_player(tx.as_mut(), player_id).await?;

        if player.prestige < PRESTIGE_MAX_LEVEL {
            player.prestige += 1;
            player.updated_at = self.now();
            tx.save_player(&player).await?;
            log::info!("Player {} reached prestige {}", player.id, player.prestige);
        }

        tx.commit().await?;
        Ok(player.prestige)
    }
}
