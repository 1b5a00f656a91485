//! Catalog data models.

use super::errors::CatalogError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Catalog entry ID type
pub type CatalogId = String;

/// Weapon definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: CatalogId,
    pub name: String,
    pub tier: i32,
    pub rarity: String,
    pub attack: i64,
    #[serde(default)]
    pub gems: i64,
}

/// Gear (armor) definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gear {
    pub id: CatalogId,
    pub name: String,
    pub tier: i32,
    pub rarity: String,
    pub defense: i64,
    #[serde(default)]
    pub gems: i64,
}

/// Monster definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: CatalogId,
    pub name: String,
    pub tier: i32,
    /// Minimum power needed to fight this monster
    pub threshold: i64,
    /// Gems paid out on a kill
    pub gems: i64,
}

/// Item kind, which doubles as the equipment slot it fits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Weapon,
    Gear,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "weapon",
            ItemKind::Gear => "gear",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weapon" => Ok(ItemKind::Weapon),
            "gear" => Ok(ItemKind::Gear),
            other => Err(CatalogError::UnknownItemKind(other.to_string())),
        }
    }
}

/// Stats copied onto an inventory row when an item is granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub kind: ItemKind,
    pub catalog_id: CatalogId,
    pub name: String,
    pub tier: i32,
    pub rarity: String,
    pub attack: i64,
    pub defense: i64,
}

impl From<&Weapon> for ItemTemplate {
    fn from(weapon: &Weapon) -> Self {
        Self {
            kind: ItemKind::Weapon,
            catalog_id: weapon.id.clone(),
            name: weapon.name.clone(),
            tier: weapon.tier,
            rarity: weapon.rarity.clone(),
            attack: weapon.attack,
            defense: 0,
        }
    }
}

impl From<&Gear> for ItemTemplate {
    fn from(gear: &Gear) -> Self {
        Self {
            kind: ItemKind::Gear,
            catalog_id: gear.id.clone(),
            name: gear.name.clone(),
            tier: gear.tier,
            rarity: gear.rarity.clone(),
            attack: 0,
            defense: gear.defense,
        }
    }
}
