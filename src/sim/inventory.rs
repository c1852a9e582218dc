//! Carried items
//!
//! The inventory only stores items and reports what using one should do.
//! Applying the effect (healing, speed boost) is left to the session, which
//! owns the health and motion components.

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// Item categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Heal,
    SpeedBoost,
    /// Placeholder category; using it has no gameplay effect yet
    Shield,
    /// Placeholder category; using it has no gameplay effect yet
    SpecialAbility,
}

/// A catalog entry (and the copy held in a slot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    /// Heal amount or speed multiplier, depending on kind
    pub magnitude: f32,
    #[serde(default)]
    pub duration_seconds: f32,
}

/// Effect to apply after an item is used
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemEffect {
    Heal { amount: i32 },
    SpeedBoost { multiplier: f32, duration: f32 },
    None,
}

impl Item {
    /// Effect this item produces when used
    pub fn effect(&self) -> ItemEffect {
        match self.kind {
            ItemKind::Heal => ItemEffect::Heal {
                amount: self.magnitude.round() as i32,
            },
            ItemKind::SpeedBoost => ItemEffect::SpeedBoost {
                multiplier: self.magnitude,
                duration: self.duration_seconds,
            },
            ItemKind::Shield | ItemKind::SpecialAbility => ItemEffect::None,
        }
    }
}

/// Inventory tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryTuning {
    pub max_slots: usize,
    /// Catalog ids granted at the start of every run
    pub starting_items: Vec<String>,
}

impl Default for InventoryTuning {
    fn default() -> Self {
        Self {
            max_slots: 4,
            starting_items: Vec::new(),
        }
    }
}

/// Immutable list of every known item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }
}

/// Bounded, ordered item slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<Item>,
    max_slots: usize,
}

impl Inventory {
    pub fn new(max_slots: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_slots),
            max_slots,
        }
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.max_slots
    }

    /// Append an item; rejected without side effects when full
    pub fn add_item(&mut self, item: Item) -> Result<(), InventoryError> {
        if self.is_full() {
            return Err(InventoryError::Full {
                capacity: self.max_slots,
            });
        }
        self.slots.push(item);
        Ok(())
    }

    /// Look `id` up in `catalog` and add a copy
    pub fn add_from_catalog(&mut self, catalog: &ItemCatalog, id: &str) -> Result<(), InventoryError> {
        let item = catalog
            .get(id)
            .ok_or_else(|| InventoryError::UnknownItem(id.to_string()))?;
        self.add_item(item.clone())
    }

    /// Remove the item in `slot` and return the effect to apply
    pub fn use_item(&mut self, slot: usize) -> Option<(Item, ItemEffect)> {
        if slot >= self.slots.len() {
            return None;
        }
        let item = self.slots.remove(slot);
        let effect = item.effect();
        Some((item, effect))
    }

    /// Remove an item without using it
    pub fn remove_item(&mut self, slot: usize) -> Option<Item> {
        (slot < self.slots.len()).then(|| self.slots.remove(slot))
    }

    /// Read-only view of the held items
    pub fn available_items(&self) -> &[Item] {
        &self.slots
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
