//! Persistence: PostgreSQL pool, schema and the transactional game store.
//!
//! Engine code only sees the [`GameStore`] / [`StoreTx`] traits. Two
//! implementations exist: [`PgGameStore`] for production and
//! [`MemoryGameStore`] for tests and throwaway sessions.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod memory;
pub mod postgres;
pub mod schema;
pub mod store;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::MemoryGameStore;
pub use postgres::PgGameStore;
pub use store::{GameStore, StoreTx};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Returns
    ///
    /// * `Result<Database, sqlx::Error>` - Database instance or error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use funtan::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let db = Database::new(&DatabaseConfig::development()).await?;
    ///     db.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the game schema (idempotent)
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(schema::SCHEMA_V1).execute(&self.pool).await?;
        log::info!("Game schema is up to date");
        Ok(())
    }

    /// Game store over this pool
    pub fn store(&self) -> PgGameStore {
        PgGameStore::new(self.pool.clone())
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
