//! PostgreSQL implementation of the game store.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::time::Duration;

use super::{
    store::{GameStore, StoreTx},
    timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_timeout},
};
use crate::catalog::{ItemKind, ItemTemplate};
use crate::game::{
    GameError, GameResult,
    models::{
        Balance, DailyClaim, HuntCooldown, HuntRecord, InventoryId, InventoryItem, Player,
        PlayerId, ServerAdmin, WorkSession,
    },
};

const PLAYER_COLUMNS: &str = "id, bronze, silver, gold, gems, prestige, equipped_weapon_id, \
     equipped_gear_id, work_streak, last_work_collected_at, created_at, updated_at";

const ITEM_COLUMNS: &str =
    "id, player_id, kind, catalog_id, tier, rarity, name, attack, defense, count";

const SESSION_COLUMNS: &str = "id, player_id, started_at, finish_at, collected_at, status";

/// Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
    begin_timeout: Duration,
}

impl PgGameStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            begin_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Bound on waiting for a pooled connection
    pub fn with_begin_timeout(mut self, timeout: Duration) -> Self {
        self.begin_timeout = timeout;
        self
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn begin(&self) -> GameResult<Box<dyn StoreTx>> {
        let tx = with_timeout(self.begin_timeout, self.pool.begin()).await?;
        Ok(Box::new(PgStoreTx { tx }))
    }
}

/// Open PostgreSQL transaction
pub struct PgStoreTx {
    tx: Transaction<'static, Postgres>,
}

fn utc(row: &PgRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    Ok(row.try_get::<NaiveDateTime, _>(column)?.and_utc())
}

fn utc_opt(row: &PgRow, column: &str) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    Ok(row
        .try_get::<Option<NaiveDateTime>, _>(column)?
        .map(|t| t.and_utc()))
}

fn player_from_row(row: &PgRow) -> GameResult<Player> {
    Ok(Player {
        id: row.try_get("id")?,
        balance: Balance {
            bronze: row.try_get("bronze")?,
            silver: row.try_get("silver")?,
            gold: row.try_get("gold")?,
            gems: row.try_get("gems")?,
        },
        prestige: row.try_get("prestige")?,
        equipped_weapon_id: row.try_get("equipped_weapon_id")?,
        equipped_gear_id: row.try_get("equipped_gear_id")?,
        work_streak: row.try_get("work_streak")?,
        last_work_collected_at: utc_opt(row, "last_work_collected_at")?,
        created_at: utc(row, "created_at")?,
        updated_at: utc(row, "updated_at")?,
    })
}

fn item_from_row(row: &PgRow) -> GameResult<InventoryItem> {
    let kind: String = row.try_get("kind")?;
    Ok(InventoryItem {
        id: row.try_get("id")?,
        player_id: row.try_get("player_id")?,
        kind: kind
            .parse()
            .map_err(|e: crate::catalog::CatalogError| GameError::Store(e.to_string()))?,
        catalog_id: row.try_get("catalog_id")?,
        tier: row.try_get("tier")?,
        rarity: row.try_get("rarity")?,
        name: row.try_get("name")?,
        attack: row.try_get("attack")?,
        defense: row.try_get("defense")?,
        count: row.try_get("count")?,
    })
}

fn session_from_row(row: &PgRow) -> GameResult<WorkSession> {
    let status: String = row.try_get("status")?;
    Ok(WorkSession {
        id: row.try_get("id")?,
        player_id: row.try_get("player_id")?,
        started_at: utc(row, "started_at")?,
        finish_at: utc(row, "finish_at")?,
        collected_at: utc_opt(row, "collected_at")?,
        status: status.parse()?,
    })
}

fn admin_from_row(row: &PgRow) -> GameResult<ServerAdmin> {
    Ok(ServerAdmin {
        scope_id: row.try_get("scope_id")?,
        player_id: row.try_get("player_id")?,
        role: row.try_get("role")?,
        created_at: utc(row, "created_at")?,
    })
}

#[async_trait]
impl StoreTx for PgStoreTx {
    async fn lock_player(&mut self, id: &str) -> GameResult<Option<Player>> {
        let row = sqlx::query(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(player_from_row).transpose()
    }

    async fn insert_player(&mut self, player: &Player) -> GameResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO players (id, created_at, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&player.id)
        .bind(player.created_at.naive_utc())
        .bind(player.updated_at.naive_utc())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn save_player(&mut self, player: &Player) -> GameResult<()> {
        sqlx::query(
            r#"
            UPDATE players
            SET bronze = $2, silver = $3, gold = $4, gems = $5, prestige = $6,
                equipped_weapon_id = $7, equipped_gear_id = $8, work_streak = $9,
                last_work_collected_at = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(&player.id)
        .bind(player.balance.bronze)
        .bind(player.balance.silver)
        .bind(player.balance.gold)
        .bind(player.balance.gems)
        .bind(player.prestige)
        .bind(player.equipped_weapon_id)
        .bind(player.equipped_gear_id)
        .bind(player.work_streak)
        .bind(player.last_work_collected_at.map(|t| t.naive_utc()))
        .bind(player.updated_at.naive_utc())
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn list_player_ids(&mut self) -> GameResult<Vec<PlayerId>> {
        let ids: Vec<PlayerId> = sqlx::query_scalar("SELECT id FROM players ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(ids)
    }

    async fn lock_item(&mut self, id: InventoryId) -> GameResult<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn lock_stack(
        &mut self,
        player_id: &str,
        kind: ItemKind,
        catalog_id: &str,
    ) -> GameResult<Option<InventoryItem>> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory \
             WHERE player_id = $1 AND kind = $2 AND catalog_id = $3 FOR UPDATE"
        ))
        .bind(player_id)
        .bind(kind.as_str())
        .bind(catalog_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn insert_item(
        &mut self,
        player_id: &str,
        template: &ItemTemplate,
        count: i64,
    ) -> GameResult<InventoryItem> {
        let row = sqlx::query(&format!(
            "INSERT INTO inventory \
             (player_id, kind, catalog_id, tier, rarity, name, attack, defense, count) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(player_id)
        .bind(template.kind.as_str())
        .bind(&template.catalog_id)
        .bind(template.tier)
        .bind(&template.rarity)
        .bind(&template.name)
        .bind(template.attack)
        .bind(template.defense)
        .bind(count)
        .fetch_one(&mut *self.tx)
        .await?;

        item_from_row(&row)
    }

    async fn update_item_count(&mut self, id: InventoryId, count: i64) -> GameResult<()> {
        sqlx::query("UPDATE inventory SET count = $2 WHERE id = $1")
            .bind(id)
            .bind(count)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_item(&mut self, id: InventoryId) -> GameResult<()> {
        sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn list_items(
        &mut self,
        player_id: &str,
        kind: Option<ItemKind>,
    ) -> GameResult<Vec<InventoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory \
             WHERE player_id = $1 AND ($2::TEXT IS NULL OR kind = $2) \
             ORDER BY kind DESC, tier, id"
        ))
        .bind(player_id)
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn lock_daily_claim(&mut self, player_id: &str) -> GameResult<Option<DailyClaim>> {
        let row = sqlx::query(
            r#"
            SELECT player_id, last_claim_at, streak
            FROM daily_claims
            WHERE player_id = $1
            FOR UPDATE
            "#,
        )
        .bind(player_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(|row| -> GameResult<DailyClaim> {
            Ok(DailyClaim {
                player_id: row.try_get("player_id")?,
                last_claim_at: utc_opt(&row, "last_claim_at")?,
                streak: row.try_get("streak")?,
            })
        })
        .transpose()
    }

    async fn save_daily_claim(&mut self, claim: &DailyClaim) -> GameResult<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_claims (player_id, last_claim_at, streak)
            VALUES ($1, $2, $3)
            ON CONFLICT (player_id)
            DO UPDATE SET last_claim_at = EXCLUDED.last_claim_at, streak = EXCLUDED.streak
            "#,
        )
        .bind(&claim.player_id)
        .bind(claim.last_claim_at.map(|t| t.naive_utc()))
        .bind(claim.streak)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn lock_active_session(&mut self, player_id: &str) -> GameResult<Option<WorkSession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions \
             WHERE player_id = $1 AND status = 'working' \
             ORDER BY started_at DESC, id DESC LIMIT 1 FOR UPDATE"
        ))
        .bind(player_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn lock_latest_session(&mut self, player_id: &str) -> GameResult<Option<WorkSession>> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions \
             WHERE player_id = $1 \
             ORDER BY started_at DESC, id DESC LIMIT 1 FOR UPDATE"
        ))
        .bind(player_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn insert_session(
        &mut self,
        player_id: &str,
        started_at: DateTime<Utc>,
        finish_at: DateTime<Utc>,
    ) -> GameResult<WorkSession> {
        let row = sqlx::query(&format!(
            "INSERT INTO work_sessions (player_id, started_at, finish_at, status) \
             VALUES ($1, $2, $3, 'working') RETURNING {SESSION_COLUMNS}"
        ))
        .bind(player_id)
        .bind(started_at.naive_utc())
        .bind(finish_at.naive_utc())
        .fetch_one(&mut *self.tx)
        .await?;

        session_from_row(&row)
    }

    async fn update_session(&mut self, session: &WorkSession) -> GameResult<()> {
        sqlx::query("UPDATE work_sessions SET status = $2, collected_at = $3 WHERE id = $1")
            .bind(session.id)
            .bind(session.status.as_str())
            .bind(session.collected_at.map(|t| t.naive_utc()))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn lock_hunt_cooldown(
        &mut self,
        player_id: &str,
        tier: i32,
    ) -> GameResult<Option<HuntCooldown>> {
        let row = sqlx::query(
            r#"
            SELECT player_id, monster_tier, last_hunt_at
            FROM hunt_cooldowns
            WHERE player_id = $1 AND monster_tier = $2
            FOR UPDATE
            "#,
        )
        .bind(player_id)
        .bind(tier)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(|row| -> GameResult<HuntCooldown> {
            Ok(HuntCooldown {
                player_id: row.try_get("player_id")?,
                tier: row.try_get("monster_tier")?,
                last_hunt_at: utc(&row, "last_hunt_at")?,
            })
        })
        .transpose()
    }

    async fn save_hunt_cooldown(&mut self, cooldown: &HuntCooldown) -> GameResult<()> {
        sqlx::query(
            r#"
            INSERT INTO hunt_cooldowns (player_id, monster_tier, last_hunt_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (player_id, monster_tier)
            DO UPDATE SET last_hunt_at = EXCLUDED.last_hunt_at
            "#,
        )
        .bind(&cooldown.player_id)
        .bind(cooldown.tier)
        .bind(cooldown.last_hunt_at.naive_utc())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn increment_kills(&mut self, player_id: &str, tier: i32) -> GameResult<i64> {
        let kills: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO hunt_records (player_id, monster_tier, kills)
            VALUES ($1, $2, 1)
            ON CONFLICT (player_id, monster_tier)
            DO UPDATE SET kills = hunt_records.kills + 1
            RETURNING kills
            "#,
        )
        .bind(player_id)
        .bind(tier)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(kills)
    }

    async fn list_hunt_records(&mut self, player_id: &str) -> GameResult<Vec<HuntRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT player_id, monster_tier, kills
            FROM hunt_records
            WHERE player_id = $1
            ORDER BY monster_tier
            "#,
        )
        .bind(player_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter()
            .map(|row| -> GameResult<HuntRecord> {
                Ok(HuntRecord {
                    player_id: row.try_get("player_id")?,
                    tier: row.try_get("monster_tier")?,
                    kills: row.try_get("kills")?,
                })
            })
            .collect()
    }

    async fn upsert_server_admin(&mut self, admin: &ServerAdmin) -> GameResult<ServerAdmin> {
        let row = sqlx::query(
            r#"
            INSERT INTO server_admins (scope_id, player_id, role, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (scope_id, player_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING scope_id, player_id, role, created_at
            "#,
        )
        .bind(&admin.scope_id)
        .bind(&admin.player_id)
        .bind(&admin.role)
        .bind(admin.created_at.naive_utc())
        .fetch_one(&mut *self.tx)
        .await?;

        admin_from_row(&row)
    }

    async fn delete_server_admin(&mut self, scope_id: &str, player_id: &str) -> GameResult<bool> {
        let result = sqlx::query("DELETE FROM server_admins WHERE scope_id = $1 AND player_id = $2")
            .bind(scope_id)
            .bind(player_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_server_admins(&mut self, scope_id: &str) -> GameResult<Vec<ServerAdmin>> {
        let rows = sqlx::query(
            r#"
            SELECT scope_id, player_id, role, created_at
            FROM server_admins
            WHERE scope_id = $1
            ORDER BY created_at, player_id
            "#,
        )
        .bind(scope_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(admin_from_row).collect()
    }

    async fn find_server_admin(
        &mut self,
        scope_id: &str,
        player_id: &str,
    ) -> GameResult<Option<ServerAdmin>> {
        let row = sqlx::query(
            r#"
            SELECT scope_id, player_id, role, created_at
            FROM server_admins
            WHERE scope_id = $1 AND player_id = $2
            "#,
        )
        .bind(scope_id)
        .bind(player_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(admin_from_row).transpose()
    }

    async fn commit(self: Box<Self>) -> GameResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
