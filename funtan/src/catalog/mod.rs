//! Static game catalog: weapons, gear and monsters.
//!
//! The catalog is built once at startup, validated, and then shared read-only
//! (usually behind an `Arc`). The monster [`TierIndex`] is derived when the
//! catalog is constructed, so it can never drift from the monster list.
//!
//! ## Example
//!
//! ```
//! use funtan::catalog::{Catalog, ItemKind};
//!
//! let catalog = Catalog::standard();
//! let starter = catalog.item_template(ItemKind::Weapon, "w0").unwrap();
//! assert_eq!(starter.tier, 0);
//!
//! let best = catalog.tier_index().best_tier(40).unwrap();
//! assert_eq!(best.tier, 2);
//! ```

mod data;
pub mod errors;
pub mod models;
pub mod tier_index;

pub use errors::{CatalogError, CatalogResult};
pub use models::{CatalogId, Gear, ItemKind, ItemTemplate, Monster, Weapon};
pub use tier_index::{TierBucket, TierIndex};

use serde::Deserialize;
use std::{collections::HashSet, path::Path};

/// Immutable catalog with its derived tier index
#[derive(Debug, Clone)]
pub struct Catalog {
    weapons: Vec<Weapon>,
    gear: Vec<Gear>,
    monsters: Vec<Monster>,
    tier_index: TierIndex,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    weapons: Vec<Weapon>,
    #[serde(default)]
    gear: Vec<Gear>,
    #[serde(default)]
    monsters: Vec<Monster>,
}

impl Catalog {
    /// Create a validated catalog
    ///
    /// # Errors
    ///
    /// * `CatalogError::DuplicateId` - Two entries of one list share an ID
    /// * `CatalogError::EmptyId` - An entry has an empty ID
    /// * `CatalogError::NegativeStat` - A stat or reward is negative
    pub fn new(weapons: Vec<Weapon>, gear: Vec<Gear>, monsters: Vec<Monster>) -> CatalogResult<Self> {
        check_ids("weapon", weapons.iter().map(|w| w.id.as_str()))?;
        check_ids("gear", gear.iter().map(|g| g.id.as_str()))?;
        check_ids("monster", monsters.iter().map(|m| m.id.as_str()))?;

        for w in &weapons {
            check_non_negative(&w.id, "attack", w.attack)?;
            check_non_negative(&w.id, "gems", w.gems)?;
        }
        for g in &gear {
            check_non_negative(&g.id, "defense", g.defense)?;
            check_non_negative(&g.id, "gems", g.gems)?;
        }
        for m in &monsters {
            check_non_negative(&m.id, "threshold", m.threshold)?;
            check_non_negative(&m.id, "gems", m.gems)?;
        }

        let tier_index = TierIndex::build(&monsters);

        Ok(Self {
            weapons,
            gear,
            monsters,
            tier_index,
        })
    }

    /// The built-in catalog shipped with the bot
    pub fn standard() -> Self {
        let weapons: Vec<Weapon> = data::WEAPONS
            .iter()
            .map(|&(id, name, tier, attack, gems, rarity)| Weapon {
                id: id.to_string(),
                name: name.to_string(),
                tier,
                rarity: rarity.to_string(),
                attack,
                gems,
            })
            .collect();
        let gear: Vec<Gear> = data::GEAR
            .iter()
            .map(|&(id, name, tier, defense, gems, rarity)| Gear {
                id: id.to_string(),
                name: name.to_string(),
                tier,
                rarity: rarity.to_string(),
                defense,
                gems,
            })
            .collect();
        let monsters: Vec<Monster> = data::MONSTERS
            .iter()
            .map(|&(id, name, tier, threshold, gems)| Monster {
                id: id.to_string(),
                name: name.to_string(),
                tier,
                threshold,
                gems,
            })
            .collect();

        let tier_index = TierIndex::build(&monsters);

        Self {
            weapons,
            gear,
            monsters,
            tier_index,
        }
    }

    /// Parse a catalog from JSON (`{"weapons": [...], "gear": [...], "monsters": [...]}`)
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.weapons, file.gear, file.monsters)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn gear(&self) -> &[Gear] {
        &self.gear
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn tier_index(&self) -> &TierIndex {
        &self.tier_index
    }

    pub fn weapon(&self, id: &str) -> Option<&Weapon> {
        self.weapons.iter().find(|w| w.id == id)
    }

    pub fn gear_item(&self, id: &str) -> Option<&Gear> {
        self.gear.iter().find(|g| g.id == id)
    }

    pub fn monster(&self, id: &str) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    /// Monsters of one tier, sorted by threshold
    pub fn monsters_in_tier(&self, tier: i32) -> &[Monster] {
        self.tier_index
            .bucket(tier)
            .map(|b| b.monsters.as_slice())
            .unwrap_or(&[])
    }

    /// Inventory stats for a weapon or gear entry
    pub fn item_template(&self, kind: ItemKind, id: &str) -> Option<ItemTemplate> {
        match kind {
            ItemKind::Weapon => self.weapon(id).map(ItemTemplate::from),
            ItemKind::Gear => self.gear_item(id).map(ItemTemplate::from),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn check_ids<'a>(list: &'static str, ids: impl Iterator<Item = &'a str>) -> CatalogResult<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(CatalogError::EmptyId(list));
        }
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                list,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn check_non_negative(id: &str, stat: &'static str, value: i64) -> CatalogResult<()> {
    if value < 0 {
        return Err(CatalogError::NegativeStat {
            id: id.to_string(),
            stat,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let standard = Catalog::standard();
        let rebuilt = Catalog::new(
            standard.weapons().to_vec(),
            standard.gear().to_vec(),
            standard.monsters().to_vec(),
        );
        assert!(rebuilt.is_ok(), "Standard catalog should validate: {:?}", rebuilt.err());
    }

    #[test]
    fn test_standard_catalog_has_starters() {
        let catalog = Catalog::standard();
        let weapon = catalog.item_template(ItemKind::Weapon, "w0").unwrap();
        let gear = catalog.item_template(ItemKind::Gear, "g0").unwrap();
        assert_eq!(weapon.tier, 0);
        assert_eq!(gear.tier, 0);
        assert!(weapon.attack > 0);
        assert_eq!(catalog.tier_index().min_threshold(0), Some(0));
    }

    #[test]
    fn test_item_template_kind_mismatch() {
        let catalog = Catalog::standard();
        assert!(catalog.item_template(ItemKind::Gear, "w1").is_none());
        assert!(catalog.item_template(ItemKind::Weapon, "nope").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let m = Monster {
            id: "m1".to_string(),
            name: "Rat".to_string(),
            tier: 1,
            threshold: 15,
            gems: 1,
        };
        let err = Catalog::new(vec![], vec![], vec![m.clone(), m]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { list: "monster", .. }));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "weapons": [{"id": "w0", "name": "Stick", "tier": 0, "rarity": "brown", "attack": 2}],
            "monsters": [{"id": "m0", "name": "Slime", "tier": 0, "threshold": 0, "gems": 1}]
        }"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.weapons().len(), 1);
        assert!(catalog.gear().is_empty());
        assert_eq!(catalog.monsters_in_tier(0).len(), 1);
    }

    #[test]
    fn test_negative_stat_rejected() {
        let json = r#"{"monsters": [{"id": "m0", "name": "Slime", "tier": 0, "threshold": -1, "gems": 1}]}"#;
        assert!(matches!(
            Catalog::from_json_str(json),
            Err(CatalogError::NegativeStat { .. })
        ));
    }
}
