//! Game rule configuration.
//!
//! Every rule constant can be overridden from the environment; unset or
//! unparsable variables fall back to the defaults below.

use crate::catalog::CatalogId;
use chrono::Duration;
use std::{fmt, str::FromStr};

/// Hard ceiling for the prestige counter
pub const PRESTIGE_MAX_LEVEL: i32 = 999;

/// Longest accepted duration for any `*_SECS` setting (ten years)
pub const MAX_DURATION_SECS: i64 = 10 * 365 * 24 * 3600;

/// How a hunt against a chosen monster is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HuntPolicy {
    /// Deterministic: win if power meets the threshold, otherwise reject
    #[default]
    Threshold,
    /// Random roll weighted by power / threshold
    Chance,
}

impl FromStr for HuntPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "threshold" => Ok(HuntPolicy::Threshold),
            "chance" => Ok(HuntPolicy::Chance),
            other => Err(ConfigError::Invalid {
                var: "HUNT_POLICY".to_string(),
                reason: format!("Expected threshold or chance, got {other}"),
            }),
        }
    }
}

/// How the target is picked when the player names no monster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSelection {
    /// Lowest threshold, then catalog id
    #[default]
    Weakest,
    Random,
}

impl FromStr for TargetSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weakest" => Ok(TargetSelection::Weakest),
            "random" => Ok(TargetSelection::Random),
            other => Err(ConfigError::Invalid {
                var: "HUNT_TARGET".to_string(),
                reason: format!("Expected weakest or random, got {other}"),
            }),
        }
    }
}

/// Items granted and equipped when a player row is first created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterKit {
    pub weapon: CatalogId,
    pub gear: CatalogId,
}

impl Default for StarterKit {
    fn default() -> Self {
        Self {
            weapon: "w0".to_string(),
            gear: "g0".to_string(),
        }
    }
}

impl StarterKit {
    /// Parse `weapon:gear`, or `off` / `none` for no kit
    pub fn parse(value: &str) -> Result<Option<Self>, ConfigError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("off") || value.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        match value.split_once(':') {
            Some((weapon, gear)) if !weapon.trim().is_empty() && !gear.trim().is_empty() => {
                Ok(Some(Self {
                    weapon: weapon.trim().to_string(),
                    gear: gear.trim().to_string(),
                }))
            }
            _ => Err(ConfigError::Invalid {
                var: "STARTER_KIT".to_string(),
                reason: format!("Expected weapon:gear or off, got {value}"),
            }),
        }
    }
}

/// Reward, streak and timing rules
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Bronze for a streak-1 daily claim
    pub daily_base_bronze: i64,
    /// Extra bronze per consecutive day
    pub daily_streak_bonus: i64,
    pub daily_cooldown_secs: i64,
    /// Max gap between claims that keeps the streak
    pub daily_streak_window_secs: i64,
    pub daily_streak_cap: i32,

    pub work_duration_secs: i64,
    pub work_cooldown_after_collect_secs: i64,
    pub work_reward_silver: i64,
    pub work_streak_window_secs: i64,
    pub work_streak_bonus_per_day: i64,
    pub work_streak_cap_days: i32,

    /// Per-(player, tier) cooldown
    pub hunt_cooldown_secs: i64,
    pub hunt_policy: HuntPolicy,
    pub hunt_target: TargetSelection,
    /// Bronze paid on a lost roll under [`HuntPolicy::Chance`]
    pub hunt_consolation_bronze: i64,

    /// `None` disables the starter hook
    pub starter_kit: Option<StarterKit>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            daily_base_bronze: 50,
            daily_streak_bonus: 5,
            daily_cooldown_secs: 24 * 3600,
            daily_streak_window_secs: 48 * 3600,
            daily_streak_cap: 365,
            work_duration_secs: 9 * 3600,
            work_cooldown_after_collect_secs: 3 * 3600,
            work_reward_silver: 100,
            work_streak_window_secs: 48 * 3600,
            work_streak_bonus_per_day: 5,
            work_streak_cap_days: 30,
            hunt_cooldown_secs: 60,
            hunt_policy: HuntPolicy::Threshold,
            hunt_target: TargetSelection::Weakest,
            hunt_consolation_bronze: 1,
            starter_kit: Some(StarterKit::default()),
        }
    }
}

impl GameConfig {
    /// Load rules from environment variables
    ///
    /// # Errors
    ///
    /// * `ConfigError::Invalid` - `HUNT_POLICY`, `HUNT_TARGET` or `STARTER_KIT`
    ///   is set to an unknown value, or the result fails [`GameConfig::validate`]
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let hunt_policy = match std::env::var("HUNT_POLICY") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.hunt_policy,
        };
        let hunt_target = match std::env::var("HUNT_TARGET") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.hunt_target,
        };
        let starter_kit = match std::env::var("STARTER_KIT") {
            Ok(v) => StarterKit::parse(&v)?,
            Err(_) => defaults.starter_kit.clone(),
        };

        let config = Self {
            daily_base_bronze: parse_env_or("DAILY_BASE_BRONZE", defaults.daily_base_bronze),
            daily_streak_bonus: parse_env_or("DAILY_STREAK_BONUS", defaults.daily_streak_bonus),
            daily_cooldown_secs: parse_env_or("DAILY_COOLDOWN_SECS", defaults.daily_cooldown_secs),
            daily_streak_window_secs: parse_env_or(
                "DAILY_STREAK_WINDOW_SECS",
                defaults.daily_streak_window_secs,
            ),
            daily_streak_cap: parse_env_or("DAILY_STREAK_CAP", defaults.daily_streak_cap),
            work_duration_secs: parse_env_or("WORK_DURATION_SECS", defaults.work_duration_secs),
            work_cooldown_after_collect_secs: parse_env_or(
                "WORK_COOLDOWN_AFTER_COLLECT_SECS",
                defaults.work_cooldown_after_collect_secs,
            ),
            work_reward_silver: parse_env_or("WORK_REWARD_SILVER", defaults.work_reward_silver),
            work_streak_window_secs: parse_env_or(
                "WORK_STREAK_WINDOW_SECS",
                defaults.work_streak_window_secs,
            ),
            work_streak_bonus_per_day: parse_env_or(
                "WORK_STREAK_BONUS_PER_DAY",
                defaults.work_streak_bonus_per_day,
            ),
            work_streak_cap_days: parse_env_or(
                "WORK_STREAK_CAP_DAYS",
                defaults.work_streak_cap_days,
            ),
            hunt_cooldown_secs: parse_env_or("HUNT_COOLDOWN_SECS", defaults.hunt_cooldown_secs),
            hunt_policy,
            hunt_target,
            hunt_consolation_bronze: parse_env_or(
                "HUNT_CONSOLATION_BRONZE",
                defaults.hunt_consolation_bronze,
            ),
            starter_kit,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("DAILY_BASE_BRONZE", self.daily_base_bronze),
            ("DAILY_STREAK_BONUS", self.daily_streak_bonus),
            ("DAILY_COOLDOWN_SECS", self.daily_cooldown_secs),
            ("WORK_DURATION_SECS", self.work_duration_secs),
            (
                "WORK_COOLDOWN_AFTER_COLLECT_SECS",
                self.work_cooldown_after_collect_secs,
            ),
            ("WORK_REWARD_SILVER", self.work_reward_silver),
            ("WORK_STREAK_BONUS_PER_DAY", self.work_streak_bonus_per_day),
            ("HUNT_COOLDOWN_SECS", self.hunt_cooldown_secs),
            ("HUNT_CONSOLATION_BRONZE", self.hunt_consolation_bronze),
        ];
        for (var, value) in non_negative {
            if value < 0 {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must not be negative".to_string(),
                });
            }
        }

        let durations = [
            ("DAILY_COOLDOWN_SECS", self.daily_cooldown_secs),
            ("DAILY_STREAK_WINDOW_SECS", self.daily_streak_window_secs),
            ("WORK_DURATION_SECS", self.work_duration_secs),
            (
                "WORK_COOLDOWN_AFTER_COLLECT_SECS",
                self.work_cooldown_after_collect_secs,
            ),
            ("WORK_STREAK_WINDOW_SECS", self.work_streak_window_secs),
            ("HUNT_COOLDOWN_SECS", self.hunt_cooldown_secs),
        ];
        for (var, value) in durations {
            if value > MAX_DURATION_SECS {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: format!("Must be at most {MAX_DURATION_SECS} seconds"),
                });
            }
        }

        if self.daily_streak_window_secs < self.daily_cooldown_secs {
            return Err(ConfigError::Invalid {
                var: "DAILY_STREAK_WINDOW_SECS".to_string(),
                reason: format!(
                    "Must be at least the daily cooldown ({}s)",
                    self.daily_cooldown_secs
                ),
            });
        }

        if self.work_streak_window_secs < self.work_cooldown_after_collect_secs {
            return Err(ConfigError::Invalid {
                var: "WORK_STREAK_WINDOW_SECS".to_string(),
                reason: format!(
                    "Must be at least the post-collect cooldown ({}s)",
                    self.work_cooldown_after_collect_secs
                ),
            });
        }

        if self.daily_streak_cap < 1 {
            return Err(ConfigError::Invalid {
                var: "DAILY_STREAK_CAP".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        if self.work_streak_cap_days < 1 {
            return Err(ConfigError::Invalid {
                var: "WORK_STREAK_CAP_DAYS".to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Largest work streak bonus: `bonus_per_day * (cap_days - 1)`
    pub fn work_bonus_cap(&self) -> i64 {
        self.work_streak_bonus_per_day
            .saturating_mul(i64::from(self.work_streak_cap_days - 1))
    }

    pub fn daily_cooldown(&self) -> Duration {
        secs(self.daily_cooldown_secs)
    }

    pub fn daily_streak_window(&self) -> Duration {
        secs(self.daily_streak_window_secs)
    }

    pub fn work_duration(&self) -> Duration {
        secs(self.work_duration_secs)
    }

    pub fn work_cooldown_after_collect(&self) -> Duration {
        secs(self.work_cooldown_after_collect_secs)
    }

    pub fn work_streak_window(&self) -> Duration {
        secs(self.work_streak_window_secs)
    }

    pub fn hunt_cooldown(&self) -> Duration {
        secs(self.hunt_cooldown_secs)
    }
}

fn secs(value: i64) -> Duration {
    Duration::try_seconds(value).unwrap_or(Duration::MAX)
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
pub fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl fmt::Display for HuntPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HuntPolicy::Threshold => f.write_str("threshold"),
            HuntPolicy::Chance => f.write_str("chance"),
        }
    }
}
