//! Game engine: every player-facing operation as one store transaction.
//!
//! Each public method opens a transaction, locks the player row first (which
//! serializes everything one player does), validates state and timing,
//! mutates, and commits. Returning early with an error drops the transaction,
//! so a failed call never leaves partial writes behind.

mod admin;
mod daily;
mod hunt;
mod inventory;
mod player;
mod work;

pub use admin::DEMO_PLAYER_ID;

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{Arc, Mutex};

use super::{
    clock::{Clock, SystemClock},
    config::GameConfig,
    errors::{GameError, GameResult},
    models::{Balance, CurrencyDeltas, Player},
    rules,
};
use crate::catalog::Catalog;
use crate::db::{GameStore, StoreTx};

/// Economy engine shared by every dispatcher
#[derive(Clone)]
pub struct GameEngine {
    store: Arc<dyn GameStore>,
    catalog: Arc<Catalog>,
    config: GameConfig,
    clock: Arc<dyn Clock>,
    rng: Arc<Mutex<StdRng>>,
}

impl GameEngine {
    /// Create an engine on the wall clock with an OS-seeded RNG
    ///
    /// # Arguments
    ///
    /// * `store` - Transactional store
    /// * `catalog` - Validated catalog
    /// * `config` - Rule configuration
    pub fn new(store: Arc<dyn GameStore>, catalog: Arc<Catalog>, config: GameConfig) -> Self {
        Self {
            store,
            catalog,
            config,
            clock: Arc::new(SystemClock),
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Deterministic RNG for random target selection and the chance policy
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// `start + after`, failing instead of overflowing the date range
    fn deadline(&self, start: DateTime<Utc>, after: Duration) -> GameResult<DateTime<Utc>> {
        rules::deadline(start, after).ok_or_else(|| {
            GameError::Store(format!("Deadline {start} + {after} is out of range"))
        })
    }

    /// Uniform roll in `[0, 1)`
    fn roll(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .random::<f64>()
    }

    fn pick_index(&self, len: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .random_range(0..len)
    }

    /// Lock a player row, creating it (and running the starter hook) on first
    /// interaction.
    async fn load_or_create_player(
        &self,
        tx: &mut dyn StoreTx,
        player_id: &str,
    ) -> GameResult<Player> {
        let player_id = validate_player_id(player_id)?;

        if let Some(player) = tx.lock_player(player_id).await? {
            return Ok(player);
        }

        let created = tx.insert_player(&Player::new(player_id, self.now())).await?;

        let mut player = tx
            .lock_player(player_id)
            .await?
            .ok_or_else(|| GameError::Store(format!("Player {player_id} vanished after insert")))?;

        if created {
            log::info!("Created player {player_id}");
            self.apply_starter_kit(tx, &mut player).await?;
        }

        Ok(player)
    }

    /// Single credit/debit path for every reward and adjustment
    fn credit(&self, player: &mut Player, deltas: &CurrencyDeltas) -> Balance {
        player.balance.apply(deltas);
        player.updated_at = self.now();
        player.balance
    }

    /// Log a failed operation at a level matching its reason
    fn finish<T>(
        &self,
        operation: &'static str,
        player_id: &str,
        result: GameResult<T>,
    ) -> GameResult<T> {
        if let Err(err) = &result {
            if err.is_internal() {
                log::error!("{operation} failed for player {player_id}: {err}");
            } else if err.reason().is_informational() {
                log::debug!("{operation} not ready for player {player_id}: {err}");
            } else {
                log::warn!("{operation} rejected for player {player_id}: {err}");
            }
        }
        result
    }
}

fn validate_player_id(player_id: &str) -> GameResult<&str> {
    let trimmed = player_id.trim();
    if trimmed.is_empty() {
        return Err(GameError::InvalidUser("Player id is empty".to_string()));
    }
    Ok(trimmed)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_empty_player_id_rejected() {
        let h = harness();
        assert!(matches!(
            h.engine.ensure_player("  ").await,
            Err(GameError::InvalidUser(_))
        ));
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_internal() {
        let h = harness();
        h.store.fail_operation("begin");
        let err = h.engine.get_balance("1").await.unwrap_err();
        assert!(err.is_internal());
    }
}
