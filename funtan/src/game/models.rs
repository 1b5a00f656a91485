//! Game data models: player ledger, inventory rows, timers and operation payloads.

use super::errors::{GameError, GameResult};
use crate::catalog::{ItemKind, Monster};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

/// Player ID type (chat platform user id)
pub type PlayerId = String;

/// Inventory row ID type
pub type InventoryId = i64;

/// Equipment slots match item kinds one to one
pub type EquipSlot = ItemKind;

/// Currency kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Bronze,
    Silver,
    Gold,
    Gems,
}

impl Currency {
    pub const ALL: [Currency; 4] = [
        Currency::Bronze,
        Currency::Silver,
        Currency::Gold,
        Currency::Gems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Bronze => "bronze",
            Currency::Silver => "silver",
            Currency::Gold => "gold",
            Currency::Gems => "gems",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bronze" => Ok(Currency::Bronze),
            "silver" => Ok(Currency::Silver),
            "gold" => Ok(Currency::Gold),
            "gems" => Ok(Currency::Gems),
            other => Err(GameError::InvalidCurrencyType(other.to_string())),
        }
    }
}

/// Validated signed currency deltas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDeltas(BTreeMap<Currency, i64>);

impl CurrencyDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-currency delta
    pub fn single(currency: Currency, amount: i64) -> Self {
        Self::new().with(currency, amount)
    }

    /// Add a delta (summed with any existing delta for the currency)
    pub fn with(mut self, currency: Currency, amount: i64) -> Self {
        let entry = self.0.entry(currency).or_insert(0);
        *entry = entry.saturating_add(amount);
        self
    }

    /// Parse raw `(currency, amount)` pairs coming from a dispatcher.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidCurrencyType` - Unknown currency key
    /// * `GameError::InvalidInput` - No pairs, or an amount that is not a finite whole number
    pub fn parse<I, K>(pairs: I) -> GameResult<Self>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut deltas = Self::new();
        for (key, amount) in pairs {
            let currency: Currency = key.as_ref().parse()?;
            if !amount.is_finite() || amount.fract() != 0.0 {
                return Err(GameError::InvalidInput(format!(
                    "Invalid delta for {currency}: {amount}"
                )));
            }
            if amount.abs() > i64::MAX as f64 {
                return Err(GameError::InvalidInput(format!(
                    "Delta for {currency} is out of range"
                )));
            }
            deltas = deltas.with(currency, amount as i64);
        }

        if deltas.is_empty() {
            return Err(GameError::InvalidInput(
                "No currency deltas provided".to_string(),
            ));
        }
        Ok(deltas)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, currency: Currency) -> i64 {
        self.0.get(&currency).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, i64)> + '_ {
        self.0.iter().map(|(c, a)| (*c, *a))
    }
}

/// The four currency balances of a player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub bronze: i64,
    pub silver: i64,
    pub gold: i64,
    pub gems: i64,
}

impl Balance {
    pub fn get(&self, currency: Currency) -> i64 {
        match currency {
            Currency::Bronze => self.bronze,
            Currency::Silver => self.silver,
            Currency::Gold => self.gold,
            Currency::Gems => self.gems,
        }
    }

    fn slot(&mut self, currency: Currency) -> &mut i64 {
        match currency {
            Currency::Bronze => &mut self.bronze,
            Currency::Silver => &mut self.silver,
            Currency::Gold => &mut self.gold,
            Currency::Gems => &mut self.gems,
        }
    }

    /// Apply deltas, clamping every balance at zero.
    ///
    /// All reward and spend paths go through here.
    pub fn apply(&mut self, deltas: &CurrencyDeltas) {
        for (currency, delta) in deltas.iter() {
            let slot = self.slot(currency);
            *slot = slot.saturating_add(delta).max(0);
        }
    }
}

/// Player ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub balance: Balance,
    pub prestige: i32,
    pub equipped_weapon_id: Option<InventoryId>,
    pub equipped_gear_id: Option<InventoryId>,
    pub work_streak: i32,
    pub last_work_collected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Fresh player row
    pub fn new(id: impl Into<PlayerId>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            balance: Balance::default(),
            prestige: 0,
            equipped_weapon_id: None,
            equipped_gear_id: None,
            work_streak: 0,
            last_work_collected_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn equipped(&self, slot: EquipSlot) -> Option<InventoryId> {
        match slot {
            ItemKind::Weapon => self.equipped_weapon_id,
            ItemKind::Gear => self.equipped_gear_id,
        }
    }

    pub fn set_equipped(&mut self, slot: EquipSlot, inventory_id: Option<InventoryId>) {
        match slot {
            ItemKind::Weapon => self.equipped_weapon_id = inventory_id,
            ItemKind::Gear => self.equipped_gear_id = inventory_id,
        }
    }
}

/// Stacked inventory row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryId,
    pub player_id: PlayerId,
    pub kind: ItemKind,
    pub catalog_id: String,
    pub tier: i32,
    pub rarity: String,
    pub name: String,
    pub attack: i64,
    pub defense: i64,
    pub count: i64,
}

impl InventoryItem {
    /// Power contributed when equipped in its own slot
    pub fn power(&self) -> i64 {
        match self.kind {
            ItemKind::Weapon => self.attack,
            ItemKind::Gear => self.defense,
        }
    }
}

/// Daily claim tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClaim {
    pub player_id: PlayerId,
    pub last_claim_at: Option<DateTime<Utc>>,
    pub streak: i32,
}

/// Work session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Working,
    Finished,
    Collected,
    Cancelled,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Working => "working",
            WorkStatus::Finished => "finished",
            WorkStatus::Collected => "collected",
            WorkStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkStatus {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "working" => Ok(WorkStatus::Working),
            "finished" => Ok(WorkStatus::Finished),
            "collected" => Ok(WorkStatus::Collected),
            "cancelled" => Ok(WorkStatus::Cancelled),
            other => Err(GameError::Store(format!("Unknown work status: {other}"))),
        }
    }
}

/// Work session row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: i64,
    pub player_id: PlayerId,
    pub started_at: DateTime<Utc>,
    pub finish_at: DateTime<Utc>,
    pub collected_at: Option<DateTime<Utc>>,
    pub status: WorkStatus,
}

/// Per-(player, tier) hunt cooldown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntCooldown {
    pub player_id: PlayerId,
    pub tier: i32,
    pub last_hunt_at: DateTime<Utc>,
}

/// Per-(player, tier) kill counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntRecord {
    pub player_id: PlayerId,
    pub tier: i32,
    pub kills: i64,
}

/// Per-scope admin role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAdmin {
    pub scope_id: String,
    pub player_id: PlayerId,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Operation payloads
// ============================================================================

/// Result of a daily claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReward {
    pub bronze: i64,
    pub streak: i32,
    pub new_bronze: i64,
}

/// Result of a work collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkPayout {
    pub session_id: i64,
    pub base_reward: i64,
    pub bonus: i64,
    pub total_reward: i64,
    pub new_silver: i64,
    pub streak: i32,
}

/// Latest work session with its timing, for status displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkStatusReport {
    pub session: Option<WorkSession>,
    /// Seconds until the session can be collected
    pub remaining_secs: i64,
    /// Seconds until a new session may start
    pub cooldown_secs: i64,
}

/// Both equipped items and resulting power
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipped {
    pub weapon: Option<InventoryItem>,
    pub gear: Option<InventoryItem>,
    pub power: i64,
}

impl Equipped {
    pub fn from_items(weapon: Option<InventoryItem>, gear: Option<InventoryItem>) -> Self {
        let power = weapon.as_ref().map_or(0, |w| w.attack) + gear.as_ref().map_or(0, |g| g.defense);
        Self { weapon, gear, power }
    }

    pub fn is_complete(&self) -> bool {
        self.weapon.is_some() && self.gear.is_some()
    }
}

/// Result of an equip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipReport {
    pub item: InventoryItem,
    pub slot: EquipSlot,
    pub power: i64,
}

/// Result of removing items from a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalReport {
    pub inventory_id: InventoryId,
    pub removed: i64,
    /// `None` when the stack was emptied and deleted
    pub remaining: Option<InventoryItem>,
}

/// How an encounter ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HuntOutcome {
    Victory,
    Defeat,
}

/// Result of a resolved hunt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntReport {
    pub monster: Monster,
    pub outcome: HuntOutcome,
    pub power: i64,
    pub gems_awarded: i64,
    /// Bronze paid on a defeat under the chance policy
    pub consolation_bronze: i64,
    pub new_gem_balance: i64,
    pub kills_in_tier: i64,
}

/// Starter items granted to a player by the backfill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarterGrant {
    pub player_id: PlayerId,
    pub weapon: Option<InventoryItem>,
    pub gear: Option<InventoryItem>,
}

/// Demo data written by the seed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSeed {
    pub player_id: PlayerId,
    pub balance: Balance,
    pub items: Vec<InventoryItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_parse() {
        assert_eq!("Gems".parse::<Currency>().unwrap(), Currency::Gems);
        assert!(matches!(
            "platinum".parse::<Currency>(),
            Err(GameError::InvalidCurrencyType(_))
        ));
    }

    #[test]
    fn test_deltas_parse_rejects_bad_amounts() {
        assert!(matches!(
            CurrencyDeltas::parse([("bronze", f64::NAN)]),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            CurrencyDeltas::parse([("bronze", f64::INFINITY)]),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            CurrencyDeltas::parse([("silver", 1.5)]),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            CurrencyDeltas::parse(Vec::<(&str, f64)>::new()),
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            CurrencyDeltas::parse([("bronze", 1.0), ("rubies", 1.0)]),
            Err(GameError::InvalidCurrencyType(_))
        ));
    }

    #[test]
    fn test_deltas_parse_sums_repeated_keys() {
        let deltas = CurrencyDeltas::parse([("gold", 10.0), ("GOLD", -3.0)]).unwrap();
        assert_eq!(deltas.get(Currency::Gold), 7);
        assert_eq!(deltas.get(Currency::Gems), 0);
    }

    #[test]
    fn test_balance_apply_clamps_at_zero() {
        let mut balance = Balance {
            bronze: 10,
            silver: 5,
            gold: 0,
            gems: 3,
        };
        balance.apply(
            &CurrencyDeltas::new()
                .with(Currency::Bronze, -25)
                .with(Currency::Silver, 7)
                .with(Currency::Gems, -3),
        );
        assert_eq!(balance.bronze, 0);
        assert_eq!(balance.silver, 12);
        assert_eq!(balance.gems, 0);
    }

    #[test]
    fn test_balance_apply_saturates() {
        let mut balance = Balance {
            gold: i64::MAX - 1,
            ..Balance::default()
        };
        balance.apply(&CurrencyDeltas::single(Currency::Gold, 10));
        assert_eq!(balance.gold, i64::MAX);
    }

    #[test]
    fn test_equipped_power_is_plain_sum() {
        let item = |kind, attack, defense| InventoryItem {
            id: 1,
            player_id: "p".to_string(),
            kind,
            catalog_id: "x".to_string(),
            tier: 3,
            rarity: "rare".to_string(),
            name: "X".to_string(),
            attack,
            defense,
            count: 1,
        };
        let equipped = Equipped::from_items(
            Some(item(ItemKind::Weapon, 16, 0)),
            Some(item(ItemKind::Gear, 0, 12)),
        );
        assert_eq!(equipped.power, 28);
        assert!(equipped.is_complete());
        assert_eq!(Equipped::from_items(None, None).power, 0);
    }
}
