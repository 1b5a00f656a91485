//! Privileged primitives. Callers decide who may use them; the engine only
//! records who did.

use super::{GameEngine, validate_player_id};
use crate::catalog::ItemKind;
use crate::game::{
    errors::{GameError, GameResult},
    models::{Balance, Currency, CurrencyDeltas, DemoSeed, InventoryItem, ServerAdmin},
};

/// Player id used by [`GameEngine::seed_demo`] when none is given
pub const DEMO_PLAYER_ID: &str = "demo-user";

const DEFAULT_ADMIN_ROLE: &str = "admin";

impl GameEngine {
    /// Adjust another player's currencies on behalf of `actor_id`
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidUser` - Empty actor or target
    /// * `GameError::InvalidInput` - No deltas
    pub async fn admin_adjust_currency(
        &self,
        actor_id: &str,
        target_id: &str,
        deltas: &CurrencyDeltas,
    ) -> GameResult<Balance> {
        let result = self.try_admin_adjust_currency(actor_id, target_id, deltas).await;
        self.finish("admin_adjust_currency", target_id, result)
    }

    async fn try_admin_adjust_currency(
        &self,
        actor_id: &str,
        target_id: &str,
        deltas: &CurrencyDeltas,
    ) -> GameResult<Balance> {
        let actor = validate_player_id(actor_id)?;
        let balance = self.try_adjust_currency(target_id, deltas).await?;
        log::info!("Admin {actor} adjusted currency of {target_id}: {deltas:?}");
        Ok(balance)
    }

    /// Grant items to another player on behalf of `actor_id`
    pub async fn admin_grant_item(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: ItemKind,
        catalog_id: &str,
        quantity: i64,
    ) -> GameResult<InventoryItem> {
        let result = self
            .try_admin_grant_item(actor_id, target_id, kind, catalog_id, quantity)
            .await;
        self.finish("admin_grant_item", target_id, result)
    }

    async fn try_admin_grant_item(
        &self,
        actor_id: &str,
        target_id: &str,
        kind: ItemKind,
        catalog_id: &str,
        quantity: i64,
    ) -> GameResult<InventoryItem> {
        let actor = validate_player_id(actor_id)?;
        let item = self
            .try_give_item(target_id, kind, catalog_id, quantity)
            .await?;
        log::info!("Admin {actor} granted {quantity} x {kind} {catalog_id} to {target_id}");
        Ok(item)
    }

    /// Add or re-role a server admin
    ///
    /// # Arguments
    ///
    /// * `scope_id` - Chat server id
    /// * `player_id` - Player to promote
    /// * `role` - Role label, `"admin"` when `None`
    pub async fn add_server_admin(
        &self,
        scope_id: &str,
        player_id: &str,
        role: Option<&str>,
    ) -> GameResult<ServerAdmin> {
        let result = self.try_add_server_admin(scope_id, player_id, role).await;
        self.finish("add_server_admin", player_id, result)
    }

    async fn try_add_server_admin(
        &self,
        scope_id: &str,
        player_id: &str,
        role: Option<&str>,
    ) -> GameResult<ServerAdmin> {
        let scope_id = validate_scope_id(scope_id)?;
        let player_id = validate_player_id(player_id)?;
        let role = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ADMIN_ROLE);

        let mut tx = self.store.begin().await?;
        let admin = tx
            .upsert_server_admin(&ServerAdmin {
                scope_id: scope_id.to_string(),
                player_id: player_id.to_string(),
                role: role.to_string(),
                created_at: self.now(),
            })
            .await?;
        tx.commit().await?;

        log::info!("Player {player_id} is now {role} of scope {scope_id}");
        Ok(admin)
    }

    /// Remove a server admin. Returns `false` if they were not one.
    pub async fn remove_server_admin(&self, scope_id: &str, player_id: &str) -> GameResult<bool> {
        let result = self.try_remove_server_admin(scope_id, player_id).await;
        self.finish("remove_server_admin", player_id, result)
    }

    async fn try_remove_server_admin(&self, scope_id: &str, player_id: &str) -> GameResult<bool> {
        let scope_id = validate_scope_id(scope_id)?;
        let player_id = validate_player_id(player_id)?;

        let mut tx = self.store.begin().await?;
        let removed = tx.delete_server_admin(scope_id, player_id).await?;
        tx.commit().await?;

        if removed {
            log::info!("Player {player_id} is no longer an admin of scope {scope_id}");
        }
        Ok(removed)
    }

    /// Admins of a scope, oldest first
    pub async fn list_server_admins(&self, scope_id: &str) -> GameResult<Vec<ServerAdmin>> {
        let result = self.try_list_server_admins(scope_id).await;
        self.finish("list_server_admins", scope_id, result)
    }

    async fn try_list_server_admins(&self, scope_id: &str) -> GameResult<Vec<ServerAdmin>> {
        let scope_id = validate_scope_id(scope_id)?;
        let mut tx = self.store.begin().await?;
        let admins = tx.list_server_admins(scope_id).await?;
        tx.commit().await?;
        Ok(admins)
    }

    pub async fn is_server_admin(&self, scope_id: &str, player_id: &str) -> GameResult<bool> {
        let result = self.try_is_server_admin(scope_id, player_id).await;
        self.finish("is_server_admin", player_id, result)
    }

    async fn try_is_server_admin(&self, scope_id: &str, player_id: &str) -> GameResult<bool> {
        let scope_id = validate_scope_id(scope_id)?;
        let player_id = validate_player_id(player_id)?;
        let mut tx = self.store.begin().await?;
        let found = tx.find_server_admin(scope_id, player_id).await?.is_some();
        tx.commit().await?;
        Ok(found)
    }

    /// Seed a demo player with tier-1 items and some currency
    pub async fn seed_demo(&self, player_id: Option<&str>) -> GameResult<DemoSeed> {
        let player_id = player_id.unwrap_or(DEMO_PLAYER_ID);
        let result = self.try_seed_demo(player_id).await;
        self.finish("seed_demo", player_id, result)
    }

    async fn try_seed_demo(&self, player_id: &str) -> GameResult<DemoSeed> {
        let weapon = self.try_give_item(player_id, ItemKind::Weapon, "w1", 1).await?;
        let gear = self.try_give_item(player_id, ItemKind::Gear, "g1", 1).await?;
        let deltas = CurrencyDeltas::new()
            .with(Currency::Bronze, 500)
            .with(Currency::Silver, 200)
            .with(Currency::Gems, 5);
        let balance = self.try_adjust_currency(player_id, &deltas).await?;

        log::info!("Seeded demo data for player {}", weapon.player_id);
        Ok(DemoSeed {
            player_id: weapon.player_id.clone(),
            balance,
            items: vec![weapon, gear],
        })
    }
}

fn validate_scope_id(scope_id: &str) -> GameResult<&str> {
    let trimmed = scope_id.trim();
    if trimmed.is_empty() {
        return Err(GameError::InvalidInput("Scope id is empty".to_string()));
    }
    Ok(trimmed)
}
