//! # Funtan
//!
//! Game-state engine for the Funtan economy bot.
//!
//! The engine owns every stateful rule of the game: daily claims with
//! streaks, timed work sessions, monster hunts gated by equipment power,
//! inventory and equipment, multi-currency balances and admin primitives.
//! Chat front ends stay thin: they parse a command, call one
//! [`GameEngine`] method and render the returned [`Outcome`].
//!
//! ## Architecture
//!
//! - [`catalog`]: Static weapons, gear and monsters with the derived tier index
//! - [`game`]: Models, pure rules, error taxonomy and the engine itself
//! - [`db`]: Transactional store trait with Postgres and in-memory backends
//!
//! Every engine operation runs inside a single store transaction that locks
//! the player row first, so concurrent calls for one player are serialized
//! and a failed call leaves nothing behind.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use funtan::{Catalog, GameConfig, GameEngine, MemoryGameStore};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let engine = GameEngine::new(
//!     Arc::new(MemoryGameStore::new()),
//!     Arc::new(Catalog::standard()),
//!     GameConfig::default(),
//! );
//!
//! let reward = engine.claim_daily("1234").await.unwrap();
//! assert_eq!(reward.streak, 1);
//! # });
//! ```

/// Static game catalog and monster tier index.
pub mod catalog;
pub use catalog::{Catalog, CatalogError, ItemKind, TierIndex};

/// Persistence: store trait, Postgres and in-memory backends, schema.
pub mod db;
pub use db::{Database, DatabaseConfig, GameStore, MemoryGameStore, PgGameStore};

/// Game rules, models and the transactional engine.
pub mod game;
pub use game::{
    ConfigError, GameConfig, GameEngine, GameError, GameResult, Outcome, ReasonCode,
    models::{Balance, Currency, CurrencyDeltas},
    rules::format_duration,
};
