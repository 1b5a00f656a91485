//! Operator CLI configuration.
//!
//! Consolidates every environment read of the CLI and validates it once at
//! startup. Game rule constants come from [`GameConfig::from_env`].

use funtan::{
    Catalog, CatalogError, DatabaseConfig,
    game::{ConfigError, GameConfig},
};
use std::{collections::BTreeSet, path::PathBuf};

/// Where game state lives
#[derive(Debug, Clone)]
pub enum Backend {
    Postgres(DatabaseConfig),
    /// Throwaway in-process store
    Memory,
}

/// Complete CLI configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub backend: Backend,
    /// Global operator ids, always authorized for privileged commands
    pub admin_ids: BTreeSet<String>,
    /// JSON catalog file, built-in catalog when `None`
    pub catalog_path: Option<PathBuf>,
    pub game: GameConfig,
}

/// Values taken from command line flags, which win over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub memory: bool,
    pub catalog_path: Option<PathBuf>,
}

impl AdminConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from command line flags
    ///
    /// # Returns
    ///
    /// * `Result<AdminConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// * `ConfigError::MissingRequired` - No database URL and `--memory` not given
    /// * `ConfigError::Invalid` - Malformed `ADMIN_IDS` or game rule values
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let backend = if overrides.memory {
            Backend::Memory
        } else {
            match overrides.database_url {
                Some(url) => Backend::Postgres(DatabaseConfig::with_url(url)),
                None => Backend::Postgres(DatabaseConfig::from_env()?),
            }
        };

        let admin_ids = parse_admin_ids(&std::env::var("ADMIN_IDS").unwrap_or_default())?;

        let catalog_path = overrides.catalog_path.or_else(|| {
            std::env::var("CATALOG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
        });

        Ok(Self {
            backend,
            admin_ids,
            catalog_path,
            game: GameConfig::from_env()?,
        })
    }

    /// Build the catalog, from file when configured
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => {
                let catalog = Catalog::load(path)?;
                log::info!("Loaded catalog from {}", path.display());
                Ok(catalog)
            }
            None => Ok(Catalog::standard()),
        }
    }

    pub fn is_global_admin(&self, player_id: &str) -> bool {
        self.admin_ids.contains(player_id.trim())
    }
}

/// Parse a comma separated list of numeric chat user ids
///
/// # Errors
///
/// * `ConfigError::Invalid` - An entry is not all digits
pub fn parse_admin_ids(raw: &str) -> Result<BTreeSet<String>, ConfigError> {
    let mut ids = BTreeSet::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if !entry.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Invalid {
                var: "ADMIN_IDS".to_string(),
                reason: format!("`{entry}` is not a numeric user id"),
            });
        }
        ids.insert(entry.to_string());
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_admin_ids() {
        let ids = parse_admin_ids(" 123, 456 ,,789").unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("456"));
        assert!(parse_admin_ids("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_admin_ids_rejects_names() {
        let err = parse_admin_ids("123,alice").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "ADMIN_IDS"));
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    #[serial]
    fn test_memory_backend_needs_no_database() {
        unsafe {
            std::env::remove_var("DATABASE_URL");
            std::env::set_var("ADMIN_IDS", "42");
        }

        let config = AdminConfig::from_env(Overrides {
            memory: true,
            ..Overrides::default()
        })
        .unwrap();
        assert!(matches!(config.backend, Backend::Memory));
        assert!(config.is_global_admin("42"));
        assert!(!config.is_global_admin("43"));

        unsafe {
            std::env::remove_var("ADMIN_IDS");
        }
    }

    #[test]
    #[serial]
    fn test_missing_database_url() {
        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
        let err = AdminConfig::from_env(Overrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    #[serial]
    fn test_flag_url_wins() {
        unsafe {
            std::env::set_var("DATABASE_URL", "postgres://env/db");
        }
        let config = AdminConfig::from_env(Overrides {
            database_url: Some("postgres://flag/db".to_string()),
            ..Overrides::default()
        })
        .unwrap();
        match config.backend {
            Backend::Postgres(db) => assert_eq!(db.database_url, "postgres://flag/db"),
            Backend::Memory => panic!("Expected Postgres backend"),
        }
        unsafe {
            std::env::remove_var("DATABASE_URL");
        }
    }

    #[test]
    fn test_builtin_catalog_without_path() {
        let config = AdminConfig {
            backend: Backend::Memory,
            admin_ids: BTreeSet::new(),
            catalog_path: None,
            game: GameConfig::default(),
        };
        let catalog = config.load_catalog().unwrap();
        assert!(catalog.monster("m0").is_some());
    }
}
