//! Shop system: item catalog and gem-priced purchases.

use crate::progress::UserProgress;
use chrono::{DateTime, Utc};
use quizquest_common::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Shop error types.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Insufficient gems
    #[error("Insufficient gems: need {needed}, have {have}")]
    InsufficientGems {
        /// Gems needed
        needed: u32,
        /// Gems available
        have: u32,
    },
    /// Item not found in catalog
    #[error("Item not found in catalog: {0:?}")]
    ItemNotFound(ItemId),
    /// Item exists but is not purchasable
    #[error("Item is inactive: {0:?}")]
    ItemInactive(ItemId),
}

/// Result type for shop operations.
pub type ShopResult<T> = Result<T, ShopError>;

/// What a shop item grants when purchased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Hearts, credited to the balance immediately.
    Hearts,
    /// Gems, credited to the balance immediately (a gem pack).
    Gems,
    /// A cosmetic, held in the inventory only.
    Cosmetic,
}

/// An item offered in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    /// Item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// What the item grants.
    pub kind: ItemKind,
    /// Price in gems.
    pub price: u32,
    /// Quantity granted per purchase (hearts or gems credited).
    pub quantity: u32,
    /// Whether the item is currently purchasable.
    pub active: bool,
}

impl ShopItem {
    /// Creates a new active shop item.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, kind: ItemKind, price: u32, quantity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            price,
            quantity,
            active: true,
        }
    }

    /// Marks the item inactive.
    #[must_use]
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Receipt for a completed purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Item purchased.
    pub item: ItemId,
    /// Gems spent.
    pub price: u32,
    /// Gem balance after the purchase.
    pub gems_remaining: u32,
}

/// The shop: a catalog of items plus the purchase operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Shop {
    /// Catalog items by ID.
    items: HashMap<ItemId, ShopItem>,
}

impl Shop {
    /// Creates an empty shop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an item in the catalog.
    pub fn stock(&mut self, item: ShopItem) {
        self.items.insert(item.id, item);
    }

    /// Gets an item by ID.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ShopItem> {
        self.items.get(&id)
    }

    /// Returns all purchasable items.
    pub fn active_items(&self) -> impl Iterator<Item = &ShopItem> {
        self.items.values().filter(|i| i.active)
    }

    /// Returns the catalog size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Executes a purchase against a user's gem balance.
    ///
    /// Debits the price, records the item in the inventory, and credits
    /// consumable grants (hearts or gems) immediately. State is untouched
    /// on any failure.
    pub fn purchase(
        &self,
        progress: &mut UserProgress,
        id: ItemId,
        at: DateTime<Utc>,
    ) -> ShopResult<PurchaseReceipt> {
        let item = self.items.get(&id).ok_or(ShopError::ItemNotFound(id))?;
        if !item.active {
            return Err(ShopError::ItemInactive(id));
        }
        if progress.gems < item.price {
            return Err(ShopError::InsufficientGems {
                needed: item.price,
                have: progress.gems,
            });
        }

        progress.gems -= item.price;
        progress.add_to_inventory(item.id, item.quantity, at);

        match item.kind {
            ItemKind::Hearts => progress.hearts += item.quantity,
            ItemKind::Gems => progress.gems += item.quantity,
            ItemKind::Cosmetic => {}
        }

        debug!(
            user = progress.user.raw(),
            item = id.raw(),
            price = item.price,
            "purchase"
        );

        Ok(PurchaseReceipt {
            item: id,
            price: item.price,
            gems_remaining: progress.gems,
        })
    }
}
