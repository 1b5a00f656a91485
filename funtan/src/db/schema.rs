//! PostgreSQL schema for the game state.

/// Complete schema, safe to apply repeatedly.
pub const SCHEMA_V1: &str = r#"
-- Player ledger
CREATE TABLE IF NOT EXISTS players (
    id TEXT PRIMARY KEY,
    bronze BIGINT NOT NULL DEFAULT 0 CHECK (bronze >= 0),
    silver BIGINT NOT NULL DEFAULT 0 CHECK (silver >= 0),
    gold BIGINT NOT NULL DEFAULT 0 CHECK (gold >= 0),
    gems BIGINT NOT NULL DEFAULT 0 CHECK (gems >= 0),
    prestige INTEGER NOT NULL DEFAULT 0 CHECK (prestige >= 0),
    equipped_weapon_id BIGINT,
    equipped_gear_id BIGINT,
    work_streak INTEGER NOT NULL DEFAULT 0,
    last_work_collected_at TIMESTAMP,
    created_at TIMESTAMP NOT NULL,
    updated_at TIMESTAMP NOT NULL
);

-- Stacked inventory, one row per (player, catalog id, kind)
CREATE TABLE IF NOT EXISTS inventory (
    id BIGSERIAL PRIMARY KEY,
    player_id TEXT NOT NULL REFERENCES players(id),
    kind TEXT NOT NULL CHECK (kind IN ('weapon', 'gear')),
    catalog_id TEXT NOT NULL,
    tier INTEGER NOT NULL,
    rarity TEXT NOT NULL,
    name TEXT NOT NULL,
    attack BIGINT NOT NULL DEFAULT 0,
    defense BIGINT NOT NULL DEFAULT 0,
    count BIGINT NOT NULL CHECK (count > 0),
    UNIQUE (player_id, catalog_id, kind)
);

CREATE INDEX IF NOT EXISTS idx_inventory_player ON inventory(player_id);

CREATE TABLE IF NOT EXISTS daily_claims (
    player_id TEXT PRIMARY KEY REFERENCES players(id),
    last_claim_at TIMESTAMP,
    streak INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS work_sessions (
    id BIGSERIAL PRIMARY KEY,
    player_id TEXT NOT NULL REFERENCES players(id),
    started_at TIMESTAMP NOT NULL,
    finish_at TIMESTAMP NOT NULL,
    collected_at TIMESTAMP,
    status TEXT NOT NULL CHECK (status IN ('working', 'finished', 'collected', 'cancelled'))
);

CREATE INDEX IF NOT EXISTS idx_work_sessions_player_started
    ON work_sessions(player_id, started_at DESC);

CREATE TABLE IF NOT EXISTS hunt_cooldowns (
    player_id TEXT NOT NULL REFERENCES players(id),
    monster_tier INTEGER NOT NULL,
    last_hunt_at TIMESTAMP NOT NULL,
    PRIMARY KEY (player_id, monster_tier)
);

CREATE TABLE IF NOT EXISTS hunt_records (
    player_id TEXT NOT NULL REFERENCES players(id),
    monster_tier INTEGER NOT NULL,
    kills BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (player_id, monster_tier)
);

-- Per-scope (chat server) admin roles
CREATE TABLE IF NOT EXISTS server_admins (
    scope_id TEXT NOT NULL,
    player_id TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'admin',
    created_at TIMESTAMP NOT NULL,
    PRIMARY KEY (scope_id, player_id)
);
"#;
