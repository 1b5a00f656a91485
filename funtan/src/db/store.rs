//! Transactional store abstraction.
//!
//! The engine never talks to a pool directly: it opens a [`StoreTx`], locks
//! the rows it needs, mutates them and commits. Dropping a transaction
//! without calling [`StoreTx::commit`] discards every change made through it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::catalog::{ItemKind, ItemTemplate};
use crate::game::{
    GameResult,
    models::{
        DailyClaim, HuntCooldown, HuntRecord, InventoryId, InventoryItem, Player, PlayerId,
        ServerAdmin, WorkSession,
    },
};

/// Factory for store transactions
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Open a transaction
    async fn begin(&self) -> GameResult<Box<dyn StoreTx>>;
}

/// One store transaction.
///
/// `lock_*` methods take a row lock that is held until commit or drop, so
/// two transactions touching the same player are serialized.
#[async_trait]
pub trait StoreTx: Send {
    // Players

    /// Lock a player row
    async fn lock_player(&mut self, id: &str) -> GameResult<Option<Player>>;

    /// Insert a player unless it exists. Returns `true` if this call created it.
    async fn insert_player(&mut self, player: &Player) -> GameResult<bool>;

    /// Write back balances, prestige, equipment and work streak
    async fn save_player(&mut self, player: &Player) -> GameResult<()>;

    /// Every player id, ascending
    async fn list_player_ids(&mut self) -> GameResult<Vec<PlayerId>>;

    // Inventory

    async fn lock_item(&mut self, id: InventoryId) -> GameResult<Option<InventoryItem>>;

    /// Lock the stacked row of one catalog entry
    async fn lock_stack(
        &mut self,
        player_id: &str,
        kind: ItemKind,
        catalog_id: &str,
    ) -> GameResult<Option<InventoryItem>>;

    /// Create a stack with denormalized catalog stats
    async fn insert_item(
        &mut self,
        player_id: &str,
        template: &ItemTemplate,
        count: i64,
    ) -> GameResult<InventoryItem>;

    async fn update_item_count(&mut self, id: InventoryId, count: i64) -> GameResult<()>;

    async fn delete_item(&mut self, id: InventoryId) -> GameResult<()>;

    /// A player's stacks, weapons first, then by tier and row id
    async fn list_items(
        &mut self,
        player_id: &str,
        kind: Option<ItemKind>,
    ) -> GameResult<Vec<InventoryItem>>;

    // Daily claims

    async fn lock_daily_claim(&mut self, player_id: &str) -> GameResult<Option<DailyClaim>>;

    /// Upsert
    async fn save_daily_claim(&mut self, claim: &DailyClaim) -> GameResult<()>;

    // Work sessions

    /// The player's `working` session, if any
    async fn lock_active_session(&mut self, player_id: &str) -> GameResult<Option<WorkSession>>;

    /// Most recently started session of any status
    async fn lock_latest_session(&mut self, player_id: &str) -> GameResult<Option<WorkSession>>;

    /// Create a `working` session
    async fn insert_session(
        &mut self,
        player_id: &str,
        started_at: DateTime<Utc>,
        finish_at: DateTime<Utc>,
    ) -> GameResult<WorkSession>;

    /// Write back status and collection time
    async fn update_session(&mut self, session: &WorkSession) -> GameResult<()>;

    // Hunting

    async fn lock_hunt_cooldown(
        &mut self,
        player_id: &str,
        tier: i32,
    ) -> GameResult<Option<HuntCooldown>>;

    /// Upsert
    async fn save_hunt_cooldown(&mut self, cooldown: &HuntCooldown) -> GameResult<()>;

    /// Add one kill for the tier and return the new total
    async fn increment_kills(&mut self, player_id: &str, tier: i32) -> GameResult<i64>;

    /// Kill counters ordered by tier
    async fn list_hunt_records(&mut self, player_id: &str) -> GameResult<Vec<HuntRecord>>;

    // Server admins

    /// Insert or update the role; `created_at` of an existing row is kept
    async fn upsert_server_admin(&mut self, admin: &ServerAdmin) -> GameResult<ServerAdmin>;

    /// Returns `true` if a row was removed
    async fn delete_server_admin(&mut self, scope_id: &str, player_id: &str) -> GameResult<bool>;

    /// Admins of a scope, oldest first
    async fn list_server_admins(&mut self, scope_id: &str) -> GameResult<Vec<ServerAdmin>>;

    async fn find_server_admin(
        &mut self,
        scope_id: &str,
        player_id: &str,
    ) -> GameResult<Option<ServerAdmin>>;

    /// Make every change of this transaction visible
    async fn commit(self: Box<Self>) -> GameResult<()>;
}
