//! Inventory stacks, equipment and the starter kit.

use super::GameEngine;
use crate::catalog::ItemKind;
use crate::db::StoreTx;
use crate::game::{
    errors::{GameError, GameResult},
    models::{
        EquipReport, EquipSlot, Equipped, InventoryId, InventoryItem, Player, RemovalReport,
        StarterGrant,
    },
};

impl GameEngine {
    /// Grant catalog items, stacking onto an existing row
    ///
    /// # Arguments
    ///
    /// * `player_id` - Receiving player
    /// * `kind` - Weapon or gear
    /// * `catalog_id` - Catalog entry id
    /// * `quantity` - At least 1
    ///
    /// # Returns
    ///
    /// * `GameResult<InventoryItem>` - The stack after the grant
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidInput` - Quantity below 1
    /// * `GameError::NotFound` - Unknown catalog entry
    pub async fn give_item(
        &self,
        player_id: &str,
        kind: ItemKind,
        catalog_id: &str,
        quantity: i64,
    ) -> GameResult<InventoryItem> {
        let result = self.try_give_item(player_id, kind, catalog_id, quantity).await;
        self.finish("give_item", player_id, result)
    }

    pub(super) async fn try_give_item(
        &self,
        player_id: &str,
        kind: ItemKind,
        catalog_id: &str,
        quantity: i64,
    ) -> GameResult<InventoryItem> {
        if quantity < 1 {
            return Err(GameError::InvalidInput(format!(
                "Quantity must be at least 1, got {quantity}"
            )));
        }

        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let item = self
            .grant_in_tx(tx.as_mut(), &player.id, kind, catalog_id, quantity)
            .await?;
        tx.commit().await?;

        log::info!(
            "Gave {} x {} {} to player {}",
            quantity,
            kind,
            catalog_id,
            player.id
        );
        Ok(item)
    }

    /// Find-or-create the stack under a row lock and add `quantity`
    async fn grant_in_tx(
        &self,
        tx: &mut dyn StoreTx,
        player_id: &str,
        kind: ItemKind,
        catalog_id: &str,
        quantity: i64,
    ) -> GameResult<InventoryItem> {
        let template = self
            .catalog
            .item_template(kind, catalog_id)
            .ok_or_else(|| GameError::not_found(kind.as_str(), catalog_id))?;

        match tx.lock_stack(player_id, kind, &template.catalog_id).await? {
            Some(mut stack) => {
                stack.count = stack.count.saturating_add(quantity);
                tx.update_item_count(stack.id, stack.count).await?;
                Ok(stack)
            }
            None => tx.insert_item(player_id, &template, quantity).await,
        }
    }

    /// Remove `quantity` items from a stack, deleting it when it empties
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidInput` - Quantity below 1 or above the stack count
    /// * `GameError::NotFound` - No such inventory row
    pub async fn remove_inventory_count(
        &self,
        inventory_id: InventoryId,
        quantity: i64,
    ) -> GameResult<RemovalReport> {
        let result = self.try_remove_inventory_count(inventory_id, quantity).await;
        self.finish("remove_inventory_count", &format!("item:{inventory_id}"), result)
    }

    async fn try_remove_inventory_count(
        &self,
        inventory_id: InventoryId,
        quantity: i64,
    ) -> GameResult<RemovalReport> {
        if quantity < 1 {
            return Err(GameError::InvalidInput(format!(
                "Quantity must be at least 1, got {quantity}"
            )));
        }

        let mut tx = self.store.begin().await?;
        let mut item = tx
            .lock_item(inventory_id)
            .await?
            .ok_or_else(|| GameError::not_found("inventory item", inventory_id))?;

        if quantity > item.count {
            return Err(GameError::InvalidInput(format!(
                "Cannot remove {quantity}, only {} in the stack",
                item.count
            )));
        }

        item.count -= quantity;
        let remaining = if item.count == 0 {
            tx.delete_item(item.id).await?;
            None
        } else {
            tx.update_item_count(item.id, item.count).await?;
            Some(item)
        };
        tx.commit().await?;

        log::info!("Removed {quantity} from inventory item {inventory_id}");
        Ok(RemovalReport {
            inventory_id,
            removed: quantity,
            remaining,
        })
    }

    /// Equip an owned inventory row in its slot
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - No such inventory row
    /// * `GameError::Forbidden` - Row belongs to another player
    /// * `GameError::InvalidType` - Row kind does not match the slot
    pub async fn equip(
        &self,
        player_id: &str,
        inventory_id: InventoryId,
        slot: EquipSlot,
    ) -> GameResult<EquipReport> {
        let result = self.try_equip(player_id, inventory_id, slot).await;
        self.finish("equip", player_id, result)
    }

    async fn try_equip(
        &self,
        player_id: &str,
        inventory_id: InventoryId,
        slot: EquipSlot,
    ) -> GameResult<EquipReport> {
        let mut tx = self.store.begin().await?;
        let mut player = self.load_or_create_player(tx.as_mut(), player_id).await?;

        let item = tx
            .lock_item(inventory_id)
            .await?
            .ok_or_else(|| GameError::not_found("inventory item", inventory_id))?;

        if item.player_id != player.id {
            return Err(GameError::Forbidden { inventory_id });
        }
        if item.kind != slot {
            return Err(GameError::InvalidType {
                inventory_id,
                expected: slot,
                actual: item.kind,
            });
        }

        player.set_equipped(slot, Some(item.id));
        player.updated_at = self.now();
        tx.save_player(&player).await?;
        let equipped = self.resolve_equipped(tx.as_mut(), &player).await?;
        tx.commit().await?;

        log::info!("Player {} equipped {} in {} slot", player.id, item.catalog_id, slot);
        Ok(EquipReport {
            item,
            slot,
            power: equipped.power,
        })
    }

    /// Both equipped items and the resulting power
    pub async fn get_equipped(&self, player_id: &str) -> GameResult<Equipped> {
        let result = self.try_get_equipped(player_id).await;
        self.finish("get_equipped", player_id, result)
    }

    async fn try_get_equipped(&self, player_id: &str) -> GameResult<Equipped> {
        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let equipped = self.resolve_equipped(tx.as_mut(), &player).await?;
        tx.commit().await?;
        Ok(equipped)
    }

    /// Resolve equipment refs; anything missing, foreign or mistyped counts as empty
    pub(super) async fn resolve_equipped(
        &self,
        tx: &mut dyn StoreTx,
        player: &Player,
    ) -> GameResult<Equipped> {
        let mut slots = [None, None];
        for (index, slot) in [ItemKind::Weapon, ItemKind::Gear].into_iter().enumerate() {
            if let Some(id) = player.equipped(slot) {
                slots[index] = tx
                    .lock_item(id)
                    .await?
                    .filter(|item| item.player_id == player.id && item.kind == slot);
            }
        }
        let [weapon, gear] = slots;
        Ok(Equipped::from_items(weapon, gear))
    }

    /// A player's stacks, optionally one kind only
    pub async fn inventory(
        &self,
        player_id: &str,
        kind: Option<ItemKind>,
    ) -> GameResult<Vec<InventoryItem>> {
        let result = self.try_inventory(player_id, kind).await;
        self.finish("inventory", player_id, result)
    }

    async fn try_inventory(
        &self,
        player_id: &str,
        kind: Option<ItemKind>,
    ) -> GameResult<Vec<InventoryItem>> {
        let mut tx = self.store.begin().await?;
        let player = self.load_or_create_player(tx.as_mut(), player_id).await?;
        let items = tx.list_items(&player.id, kind).await?;
        tx.commit().await?;
        Ok(items)
    }

    /// Grant and equip the configured starter items on a fresh player row
    pub(super) async fn apply_starter_kit(
        &self,
        tx: &mut dyn StoreTx,
        player: &mut Player,
    ) -> GameResult<()> {
        let Some(kit) = self.config.starter_kit.clone() else {
            return Ok(());
        };

        for (slot, catalog_id) in [(ItemKind::Weapon, &kit.weapon), (ItemKind::Gear, &kit.gear)] {
            if self.catalog.item_template(slot, catalog_id).is_none() {
                log::warn!("Starter {slot} {catalog_id} is not in the catalog, skipping");
                continue;
            }
            let item = self.grant_in_tx(tx, &player.id, slot, catalog_id, 1).await?;
            player.set_equipped(slot, Some(item.id));
        }

        tx.save_player(player).await?;
        Ok(())
    }

    /// Give the starter weapon and gear to every player that owns no item of
    /// that kind, equipping it when the slot is empty.
    ///
    /// Each player is handled in its own transaction.
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidInput` - No starter kit is configured
    pub async fn grant_missing_starters(&self) -> GameResult<Vec<StarterGrant>> {
        let result = self.try_grant_missing_starters().await;
        self.finish("grant_missing_starters", "*", result)
    }

    async fn try_grant_missing_starters(&self) -> GameResult<Vec<StarterGrant>> {
        let kit = self
            .config
            .starter_kit
            .clone()
            .ok_or_else(|| GameError::InvalidInput("Starter kit is disabled".to_string()))?;

        let mut tx = self.store.begin().await?;
        let player_ids = tx.list_player_ids().await?;
        drop(tx);

        let mut grants = Vec::new();
        for player_id in player_ids {
            let mut tx = self.store.begin().await?;
            let mut player = self.load_or_create_player(tx.as_mut(), &player_id).await?;
            let items = tx.list_items(&player.id, None).await?;

            let mut grant = StarterGrant {
                player_id: player.id.clone(),
                weapon: None,
                gear: None,
            };

            for (slot, catalog_id) in [(ItemKind::Weapon, &kit.weapon), (ItemKind::Gear, &kit.gear)]
            {
                if items.iter().any(|i| i.kind == slot) {
                    continue;
                }
                let item = self.grant_in_tx(tx.as_mut(), &player.id, slot, catalog_id, 1).await?;
                if player.equipped(slot).is_none() {
                    player.set_equipped(slot, Some(item.id));
                }
                match slot {
                    ItemKind::Weapon => grant.weapon = Some(item),
                    ItemKind::Gear => grant.gear = Some(item),
                }
            }

            if grant.weapon.is_some() || grant.gear.is_some() {
                player.updated_at = self.now();
                tx.save_player(&player).await?;
                tx.commit().await?;
                log::info!("Granted missing starter items to player {}", player.id);
                grants.push(grant);
            }
        }

        Ok(grants)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::catalog::ItemKind;
    use crate::game::{config::GameConfig, errors::GameError};

    #[tokio::test]
    async fn test_give_item_stacks() {
        let h = harness();
        let first = h.engine.give_item("1", ItemKind::Weapon, "w5", 1).await.unwrap();
        let second = h.engine.give_item("1", ItemKind::Weapon, "w5", 2).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.count, 3);
        assert_eq!(second.attack, 16);
        assert_eq!(second.tier, 3);
    }

    #[tokio::test]
    async fn test_give_item_validation() {
        let h = harness();
        assert!(matches!(
            h.engine.give_item("1", ItemKind::Weapon, "w5", 0).await,
            Err(GameError::InvalidInput(_))
        ));
        assert!(matches!(
            h.engine.give_item("1", ItemKind::Weapon, "g5", 1).await,
            Err(GameError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_count() {
        let h = harness();
        let stack = h.engine.give_item("1", ItemKind::Gear, "g3", 3).await.unwrap();

        let report = h.engine.remove_inventory_count(stack.id, 2).await.unwrap();
        assert_eq!(report.remaining.map(|i| i.count), Some(1));

        assert!(matches!(
            h.engine.remove_inventory_count(stack.id, 2).await,
            Err(GameError::InvalidInput(_))
        ));

        let report = h.engine.remove_inventory_count(stack.id, 1).await.unwrap();
        assert!(report.remaining.is_none());
        assert!(matches!(
            h.engine.remove_inventory_count(stack.id, 1).await,
            Err(GameError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_equip_checks_owner_and_kind() {
        let h = harness();
        let sword = h.engine.give_item("1", ItemKind::Weapon, "w5", 1).await.unwrap();

        assert!(matches!(
            h.engine.equip("2", sword.id, ItemKind::Weapon).await,
            Err(GameError::Forbidden { .. })
        ));
        assert!(matches!(
            h.engine.equip("1", sword.id, ItemKind::Gear).await,
            Err(GameError::InvalidType { .. })
        ));
        assert!(matches!(
            h.engine.equip("1", 9_999, ItemKind::Weapon).await,
            Err(GameError::NotFound { .. })
        ));

        let report = h.engine.equip("1", sword.id, ItemKind::Weapon).await.unwrap();
        // w5 attack 16 + starter g0 defense 3
        assert_eq!(report.power, 19);

        // Equipping does not consume the stack
        let items = h.engine.inventory("1", Some(ItemKind::Weapon)).await.unwrap();
        assert!(items.iter().any(|i| i.id == sword.id && i.count == 1));
    }

    #[tokio::test]
    async fn test_removed_equipped_item_counts_as_unequipped() {
        let h = harness();
        let equipped = h.engine.get_equipped("1").await.unwrap();
        let weapon = equipped.weapon.unwrap();
        assert_eq!(equipped.power, 8);

        h.engine.remove_inventory_count(weapon.id, 1).await.unwrap();
        let equipped = h.engine.get_equipped("1").await.unwrap();
        assert!(equipped.weapon.is_none());
        assert_eq!(equipped.power, 3);
    }

    #[tokio::test]
    async fn test_grant_missing_starters() {
        let h = harness_with(GameConfig {
            starter_kit: None,
            ..GameConfig::default()
        });
        h.engine.ensure_player("1").await.unwrap();
        h.engine.give_item("2", ItemKind::Weapon, "w3", 1).await.unwrap();
        assert!(matches!(
            h.engine.grant_missing_starters().await,
            Err(GameError::InvalidInput(_))
        ));

        let h2 = super::super::GameEngine::new(
            std::sync::Arc::new(h.store.clone()),
            std::sync::Arc::new(crate::catalog::Catalog::standard()),
            GameConfig::default(),
        );
        let grants = h2.grant_missing_starters().await.unwrap();
        assert_eq!(grants.len(), 2);

        let p1 = grants.iter().find(|g| g.player_id == "1").unwrap();
        assert!(p1.weapon.is_some() && p1.gear.is_some());
        let p2 = grants.iter().find(|g| g.player_id == "2").unwrap();
        assert!(p2.weapon.is_none() && p2.gear.is_some());

        assert!(h2.grant_missing_starters().await.unwrap().is_empty());
        let equipped = h2.get_equipped("1").await.unwrap();
        assert!(equipped.is_complete());
    }
}
