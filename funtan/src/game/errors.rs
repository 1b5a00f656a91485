//! Game error types and the reason-code vocabulary shown to dispatchers.

use super::models::WorkSession;
use super::rules::format_duration;
use crate::catalog::{CatalogError, ItemKind};
use crate::db::timeouts::TimeoutError;
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use thiserror::Error;

/// Machine-readable failure reason.
///
/// Dispatchers branch on this, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    InvalidInput,
    InvalidUser,
    InvalidCurrencyType,
    NotFound,
    Forbidden,
    InvalidType,
    Cooldown,
    AlreadyWorking,
    CooldownAfterCollect,
    StillWorking,
    AlreadyCollected,
    NoSession,
    NoFinishedSession,
    MissingEquipment,
    ThresholdNotMet,
    Error,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::InvalidInput => "InvalidInput",
            ReasonCode::InvalidUser => "InvalidUser",
            ReasonCode::InvalidCurrencyType => "InvalidCurrencyType",
            ReasonCode::NotFound => "NotFound",
            ReasonCode::Forbidden => "Forbidden",
            ReasonCode::InvalidType => "InvalidType",
            ReasonCode::Cooldown => "Cooldown",
            ReasonCode::AlreadyWorking => "AlreadyWorking",
            ReasonCode::CooldownAfterCollect => "CooldownAfterCollect",
            ReasonCode::StillWorking => "StillWorking",
            ReasonCode::AlreadyCollected => "AlreadyCollected",
            ReasonCode::NoSession => "NoSession",
            ReasonCode::NoFinishedSession => "NoFinishedSession",
            ReasonCode::MissingEquipment => "MissingEquipment",
            ReasonCode::ThresholdNotMet => "ThresholdNotMet",
            ReasonCode::Error => "Error",
        }
    }

    /// Timing and state reasons that should render as "not yet" rather than as failures
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            ReasonCode::Cooldown
                | ReasonCode::AlreadyWorking
                | ReasonCode::CooldownAfterCollect
                | ReasonCode::StillWorking
                | ReasonCode::AlreadyCollected
        )
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game engine errors
#[derive(Debug, Error)]
pub enum GameError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store operation timed out
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Store-level failure that is not a driver error (bad row data, injected fault)
    #[error("Store error: {0}")]
    Store(String),

    /// Bad or missing input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing or malformed player / actor id
    #[error("Invalid user: {0}")]
    InvalidUser(String),

    /// Unknown currency key
    #[error("Invalid currency type: {0}")]
    InvalidCurrencyType(String),

    /// Catalog entry or row does not exist
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// Inventory row owned by someone else
    #[error("Inventory item {inventory_id} does not belong to the player")]
    Forbidden { inventory_id: i64 },

    /// Inventory row of the wrong kind for the slot
    #[error("Inventory item {inventory_id} is {actual}, not {expected}")]
    InvalidType {
        inventory_id: i64,
        expected: ItemKind,
        actual: ItemKind,
    },

    /// Daily claim or hunt tier still cooling down
    #[error("{action} on cooldown for {remaining_secs}s")]
    Cooldown {
        action: &'static str,
        remaining_secs: i64,
    },

    /// A work session is already running
    #[error("Already working (session {})", .session.id)]
    AlreadyWorking { session: Box<WorkSession> },

    /// Post-collect rest period
    #[error("Work on cooldown after collect for {remaining_secs}s")]
    CooldownAfterCollect { remaining_secs: i64 },

    /// Work session not finished yet
    #[error("Still working for {remaining_secs}s")]
    StillWorking { remaining_secs: i64 },

    /// Latest session already paid out
    #[error("Work session already collected")]
    AlreadyCollected { remaining_secs: i64 },

    /// Player never started a session
    #[error("No work session")]
    NoSession,

    /// Latest session cannot be collected
    #[error("No finished work session")]
    NoFinishedSession,

    /// Hunting needs both slots filled
    #[error("Missing equipment (weapon: {weapon_missing}, gear: {gear_missing})")]
    MissingEquipment {
        weapon_missing: bool,
        gear_missing: bool,
    },

    /// Power below the monster's threshold
    #[error("Power {power} below threshold {threshold} of {monster_id}")]
    ThresholdNotMet {
        monster_id: String,
        power: i64,
        threshold: i64,
    },
}

impl GameError {
    pub fn not_found(what: &'static str, id: impl fmt::Display) -> Self {
        GameError::NotFound {
            what,
            id: id.to_string(),
        }
    }

    /// Reason code for dispatchers
    pub fn reason(&self) -> ReasonCode {
        match self {
            GameError::Database(_) | GameError::Timeout(_) | GameError::Store(_) => {
                ReasonCode::Error
            }
            GameError::InvalidInput(_) => ReasonCode::InvalidInput,
            GameError::InvalidUser(_) => ReasonCode::InvalidUser,
            GameError::InvalidCurrencyType(_) => ReasonCode::InvalidCurrencyType,
            GameError::NotFound { .. } => ReasonCode::NotFound,
            GameError::Forbidden { .. } => ReasonCode::Forbidden,
            GameError::InvalidType { .. } => ReasonCode::InvalidType,
            GameError::Cooldown { .. } => ReasonCode::Cooldown,
            GameError::AlreadyWorking { .. } => ReasonCode::AlreadyWorking,
            GameError::CooldownAfterCollect { .. } => ReasonCode::CooldownAfterCollect,
            GameError::StillWorking { .. } => ReasonCode::StillWorking,
            GameError::AlreadyCollected { .. } => ReasonCode::AlreadyCollected,
            GameError::NoSession => ReasonCode::NoSession,
            GameError::NoFinishedSession => ReasonCode::NoFinishedSession,
            GameError::MissingEquipment { .. } => ReasonCode::MissingEquipment,
            GameError::ThresholdNotMet { .. } => ReasonCode::ThresholdNotMet,
        }
    }

    /// Seconds to wait before retrying, for timing errors
    pub fn remaining_secs(&self) -> Option<i64> {
        match self {
            GameError::Cooldown { remaining_secs, .. }
            | GameError::CooldownAfterCollect { remaining_secs }
            | GameError::StillWorking { remaining_secs }
            | GameError::AlreadyCollected { remaining_secs } => Some(*remaining_secs),
            _ => None,
        }
    }

    /// Internal failures (store, driver, timeout)
    pub fn is_internal(&self) -> bool {
        self.reason() == ReasonCode::Error
    }

    /// Get a client-safe message.
    ///
    /// Internal errors are reduced to a generic apology, timing errors read as
    /// "wait" messages with a human duration.
    pub fn client_message(&self) -> String {
        match self {
            GameError::Database(_) | GameError::Timeout(_) | GameError::Store(_) => {
                "Something went wrong on our side. Please try again later.".to_string()
            }
            GameError::InvalidInput(msg) => msg.clone(),
            GameError::InvalidUser(_) => "A valid player is required.".to_string(),
            GameError::InvalidCurrencyType(key) => format!(
                "Unknown currency `{key}`. Use bronze, silver, gold or gems."
            ),
            GameError::NotFound { what, id } => format!("{what} `{id}` was not found."),
            GameError::Forbidden { .. } => "That item is not in your inventory.".to_string(),
            GameError::InvalidType {
                expected, actual, ..
            } => format!("That item is a {actual}; equip it in the {actual} slot, not {expected}."),
            GameError::Cooldown {
                action,
                remaining_secs,
            } => format!(
                "{action} is not ready yet. Try again in {}.",
                format_duration(*remaining_secs)
            ),
            GameError::AlreadyWorking { session } => format!(
                "You are already working. Your shift ends at {}.",
                session.finish_at.format("%Y-%m-%d %H:%M UTC")
            ),
            GameError::CooldownAfterCollect { remaining_secs } => format!(
                "You need some rest before working again. Try again in {}.",
                format_duration(*remaining_secs)
            ),
            GameError::StillWorking { remaining_secs } => format!(
                "Still working. Come back in {}.",
                format_duration(*remaining_secs)
            ),
            GameError::AlreadyCollected { remaining_secs } => format!(
                "This work session has already been collected. You can start again in {}.",
                format_duration(*remaining_secs)
            ),
            GameError::NoSession => "You have no work session. Start one first.".to_string(),
            GameError::NoFinishedSession => {
                "You have no finished work session to collect.".to_string()
            }
            GameError::MissingEquipment { .. } => {
                "Equip 1 weapon and 1 gear before hunting.".to_string()
            }
            GameError::ThresholdNotMet {
                power, threshold, ..
            } => format!(
                "That monster is too strong. Your power is {power}, you need {threshold}."
            ),
        }
    }
}

impl From<TimeoutError> for GameError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => GameError::Timeout(duration),
            TimeoutError::Database(e) => GameError::Database(e),
        }
    }
}

impl From<CatalogError> for GameError {
    fn from(err: CatalogError) -> Self {
        GameError::InvalidInput(err.to_string())
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
