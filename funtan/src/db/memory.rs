//! In-process game store.
//!
//! A transaction holds the whole store lock from `begin` until commit or drop
//! and works on a private copy of the state; commit swaps the copy in. That
//! gives the same serialization and rollback behaviour as the PostgreSQL
//! store, only coarser.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::store::{GameStore, StoreTx};
use crate::catalog::{ItemKind, ItemTemplate};
use crate::game::{
    GameError, GameResult,
    models::{
        DailyClaim, HuntCooldown, HuntRecord, InventoryId, InventoryItem, Player, PlayerId,
        ServerAdmin, WorkSession, WorkStatus,
    },
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    players: BTreeMap<PlayerId, Player>,
    items: BTreeMap<InventoryId, InventoryItem>,
    next_item_id: InventoryId,
    daily_claims: BTreeMap<PlayerId, DailyClaim>,
    sessions: BTreeMap<i64, WorkSession>,
    next_session_id: i64,
    hunt_cooldowns: BTreeMap<(PlayerId, i32), DateTime<Utc>>,
    hunt_records: BTreeMap<(PlayerId, i32), i64>,
    server_admins: BTreeMap<(String, PlayerId), ServerAdmin>,
}

/// Store kept entirely in memory
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    state: Arc<AsyncMutex<MemoryState>>,
    faults: Arc<Mutex<HashSet<&'static str>>>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of the named store operation fail with
    /// `GameError::Store` until [`MemoryGameStore::clear_faults`].
    ///
    /// Names are the [`StoreTx`] method names, plus `"begin"` and `"commit"`.
    pub fn fail_operation(&self, operation: &'static str) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(operation);
    }

    pub fn clear_faults(&self) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn check(faults: &Mutex<HashSet<&'static str>>, operation: &'static str) -> GameResult<()> {
        if faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(operation)
        {
            return Err(GameError::Store(format!("Injected failure in {operation}")));
        }
        Ok(())
    }
}

#[async_trait]
impl GameStore for MemoryGameStore {
    async fn begin(&self) -> GameResult<Box<dyn StoreTx>> {
        Self::check(&self.faults, "begin")?;
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            faults: Arc::clone(&self.faults),
        }))
    }
}

/// Open in-memory transaction
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Arc<Mutex<HashSet<&'static str>>>,
}

impl MemoryTx {
    fn check(&self, operation: &'static str) -> GameResult<()> {
        MemoryGameStore::check(&self.faults, operation)
    }

    fn latest_session<'a>(
        &'a self,
        player_id: &str,
        filter: impl Fn(&WorkSession) -> bool,
    ) -> Option<&'a WorkSession> {
        self.working
            .sessions
            .values()
            .filter(|s| s.player_id == player_id && filter(s))
            .max_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)))
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn lock_player(&mut self, id: &str) -> GameResult<Option<Player>> {
        self.check("lock_player")?;
        Ok(self.working.players.get(id).cloned())
    }

    async fn insert_player(&mut self, player: &Player) -> GameResult<bool> {
        self.check("insert_player")?;
        if self.working.players.contains_key(&player.id) {
            return Ok(false);
        }
        self.working
            .players
            .insert(player.id.clone(), player.clone());
        Ok(true)
    }

    async fn save_player(&mut self, player: &Player) -> GameResult<()> {
        self.check("save_player")?;
        match self.working.players.get_mut(&player.id) {
            Some(stored) => {
                *stored = player.clone();
                Ok(())
            }
            None => Err(GameError::Store(format!("Player {} does not exist", player.id))),
        }
    }

    async fn list_player_ids(&mut self) -> GameResult<Vec<PlayerId>> {
        self.check("list_player_ids")?;
        Ok(self.working.players.keys().cloned().collect())
    }

    async fn lock_item(&mut self, id: InventoryId) -> GameResult<Option<InventoryItem>> {
        self.check("lock_item")?;
        Ok(self.working.items.get(&id).cloned())
    }

    async fn lock_stack(
        &mut self,
        player_id: &str,
        kind: ItemKind,
        catalog_id: &str,
    ) -> GameResult<Option<InventoryItem>> {
        self.check("lock_stack")?;
        Ok(self
            .working
            .items
            .values()
            .find(|i| i.player_id == player_id && i.kind == kind && i.catalog_id == catalog_id)
            .cloned())
    }

    async fn insert_item(
        &mut self,
        player_id: &str,
        template: &ItemTemplate,
        count: i64,
    ) -> GameResult<InventoryItem> {
        self.check("insert_item")?;
        self.working.next_item_id += 1;
        let item = InventoryItem {
            id: self.working.next_item_id,
            player_id: player_id.to_string(),
            kind: template.kind,
            catalog_id: template.catalog_id.clone(),
            tier: template.tier,
            rarity: template.rarity.clone(),
            name: template.name.clone(),
            attack: template.attack,
            defense: template.defense,
            count,
        };
        self.working.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item_count(&mut self, id: InventoryId, count: i64) -> GameResult<()> {
        self.check("update_item_count")?;
        if let Some(item) = self.working.items.get_mut(&id) {
            item.count = count;
        }
        Ok(())
    }

    async fn delete_item(&mut self, id: InventoryId) -> GameResult<()> {
        self.check("delete_item")?;
        self.working.items.remove(&id);
        Ok(())
    }

    async fn list_items(
        &mut self,
        player_id: &str,
        kind: Option<ItemKind>,
    ) -> GameResult<Vec<InventoryItem>> {
        self.check("list_items")?;
        let mut items: Vec<InventoryItem> = self
            .working
            .items
            .values()
            .filter(|i| i.player_id == player_id && kind.is_none_or(|k| i.kind == k))
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.kind != ItemKind::Weapon, i.tier, i.id));
        Ok(items)
    }

    async fn lock_daily_claim(&mut self, player_id: &str) -> GameResult<Option<DailyClaim>> {
        self.check("lock_daily_claim")?;
        Ok(self.working.daily_claims.get(player_id).cloned())
    }

    async fn save_daily_claim(&mut self, claim: &DailyClaim) -> GameResult<()> {
        self.check("save_daily_claim")?;
        self.working
            .daily_claims
            .insert(claim.player_id.clone(), claim.clone());
        Ok(())
    }

    async fn lock_active_session(&mut self, player_id: &str) -> GameResult<Option<WorkSession>> {
        self.check("lock_active_session")?;
        Ok(self
            .latest_session(player_id, |s| s.status == WorkStatus::Working)
            .cloned())
    }

    async fn lock_latest_session(&mut self, player_id: &str) -> GameResult<Option<WorkSession>> {
        self.check("lock_latest_session")?;
        Ok(self.latest_session(player_id, |_| true).cloned())
    }

    async fn insert_session(
        &mut self,
        player_id: &str,
        started_at: DateTime<Utc>,
        finish_at: DateTime<Utc>,
    ) -> GameResult<WorkSession> {
        self.check("insert_session")?;
        self.working.next_session_id += 1;
        let session = WorkSession {
            id: self.working.next_session_id,
            player_id: player_id.to_string(),
            started_at,
            finish_at,
            collected_at: None,
            status: WorkStatus::Working,
        };
        self.working.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn update_session(&mut self, session: &WorkSession) -> GameResult<()> {
        self.check("update_session")?;
        if let Some(stored) = self.working.sessions.get_mut(&session.id) {
            stored.status = session.status;
            stored.collected_at = session.collected_at;
        }
        Ok(())
    }

    async fn lock_hunt_cooldown(
        &mut self,
        player_id: &str,
        tier: i32,
    ) -> GameResult<Option<HuntCooldown>> {
        self.check("lock_hunt_cooldown")?;
        Ok(self
            .working
            .hunt_cooldowns
            .get(&(player_id.to_string(), tier))
            .map(|&last_hunt_at| HuntCooldown {
                player_id: player_id.to_string(),
                tier,
                last_hunt_at,
            }))
    }

    async fn save_hunt_cooldown(&mut self, cooldown: &HuntCooldown) -> GameResult<()> {
        self.check("save_hunt_cooldown")?;
        self.working.hunt_cooldowns.insert(
            (cooldown.player_id.clone(), cooldown.tier),
            cooldown.last_hunt_at,
        );
        Ok(())
    }

    async fn increment_kills(&mut self, player_id: &str, tier: i32) -> GameResult<i64> {
        self.check("increment_kills")?;
        let kills = self
            .working
            .hunt_records
            .entry((player_id.to_string(), tier))
            .or_insert(0);
        *kills += 1;
        Ok(*kills)
    }

    async fn list_hunt_records(&mut self, player_id: &str) -> GameResult<Vec<HuntRecord>> {
        self.check("list_hunt_records")?;
        Ok(self
            .working
            .hunt_records
            .iter()
            .filter(|((owner, _), _)| owner == player_id)
            .map(|((owner, tier), kills)| HuntRecord {
                player_id: owner.clone(),
                tier: *tier,
                kills: *kills,
            })
            .collect())
    }

    async fn upsert_server_admin(&mut self, admin: &ServerAdmin) -> GameResult<ServerAdmin> {
        self.check("upsert_server_admin")?;
        let stored = self
            .working
            .server_admins
            .entry((admin.scope_id.clone(), admin.player_id.clone()))
            .and_modify(|existing| existing.role = admin.role.clone())
            .or_insert_with(|| admin.clone());
        Ok(stored.clone())
    }

    async fn delete_server_admin(&mut self, scope_id: &str, player_id: &str) -> GameResult<bool> {
        self.check("delete_server_admin")?;
        Ok(self
            .working
            .server_admins
            .remove(&(scope_id.to_string(), player_id.to_string()))
            .is_some())
    }

    async fn list_server_admins(&mut self, scope_id: &str) -> GameResult<Vec<ServerAdmin>> {
        self.check("list_server_admins")?;
        let mut admins: Vec<ServerAdmin> = self
            .working
            .server_admins
            .values()
            .filter(|a| a.scope_id == scope_id)
            .cloned()
            .collect();
        admins.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        Ok(admins)
    }

    async fn find_server_admin(
        &mut self,
        scope_id: &str,
        player_id: &str,
    ) -> GameResult<Option<ServerAdmin>> {
        self.check("find_server_admin")?;
        Ok(self
            .working
            .server_admins
            .get(&(scope_id.to_string(), player_id.to_string()))
            .cloned())
    }

    async fn commit(self: Box<Self>) -> GameResult<()> {
        self.check("commit")?;
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> ItemTemplate {
        ItemTemplate {
            kind: ItemKind::Weapon,
            catalog_id: "w1".to_string(),
            name: "Rusty Sword".to_string(),
            tier: 1,
            rarity: "common".to_string(),
            attack: 5,
            defense: 0,
        }
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryGameStore::new();
        let now = Utc::now();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.insert_player(&Player::new("1", now)).await.unwrap());
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.lock_player("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = MemoryGameStore::new();
        let now = Utc::now();

        let mut tx = store.begin().await.unwrap();
        tx.insert_player(&Player::new("1", now)).await.unwrap();
        let item = tx.insert_item("1", &template(), 2).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(!tx.insert_player(&Player::new("1", now)).await.unwrap());
        let stack = tx.lock_stack("1", ItemKind::Weapon, "w1").await.unwrap();
        assert_eq!(stack.map(|s| (s.id, s.count)), Some((item.id, 2)));
    }

    #[tokio::test]
    async fn test_injected_fault() {
        let store = MemoryGameStore::new();
        store.fail_operation("commit");

        let mut tx = store.begin().await.unwrap();
        tx.insert_player(&Player::new("1", Utc::now())).await.unwrap();
        assert!(matches!(tx.commit().await, Err(GameError::Store(_))));

        store.clear_faults();
        let mut tx = store.begin().await.unwrap();
        assert!(tx.lock_player("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_session_orders_by_start() {
        let store = MemoryGameStore::new();
        let now = Utc::now();

        let mut tx = store.begin().await.unwrap();
        let first = tx
            .insert_session("1", now, now + chrono::Duration::hours(9))
            .await
            .unwrap();
        let mut cancelled = first.clone();
        cancelled.status = WorkStatus::Cancelled;
        tx.update_session(&cancelled).await.unwrap();
        let second = tx
            .insert_session("1", now + chrono::Duration::hours(1), now + chrono::Duration::hours(10))
            .await
            .unwrap();

        let latest = tx.lock_latest_session("1").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
        let active = tx.lock_active_session("1").await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert!(tx.lock_active_session("2").await.unwrap().is_none());
    }
}
