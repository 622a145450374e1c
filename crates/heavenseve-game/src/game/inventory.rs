//! Inventory: four fixed slots of collected gifts
//!
//!   - Adding fills the first empty slot; a full bag rejects the item
//!   - An item identity occupies at most one slot
//!   - Removal by identity or by display name (first match)
//!   - The panel toggles open/closed; clicking a slot shows the item detail

use thiserror::Error;

use heavenseve_common::config::GiftData;

/// Number of inventory slots
pub const SLOT_COUNT: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Inventory full (4/4), '{0}' not added")]
    Full(String),

    #[error("'{0}' is already in the inventory")]
    AlreadyHeld(String),
}

/// Four-slot gift inventory plus its panel state
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    slots: [Option<GiftData>; SLOT_COUNT],
    open: bool,
    /// Slot whose detail is shown
    detail: Option<usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a gift in the first empty slot. Returns the slot index.
    pub fn add(&mut self, gift: GiftData) -> Result<usize, InventoryError> {
        if self.contains_id(&gift.id) {
            return Err(InventoryError::AlreadyHeld(gift.id));
        }
        match self.slots.iter().position(Option::is_none) {
            Some(i) => {
                tracing::debug!("Inventory: '{}' -> slot {}", gift.name, i);
                self.slots[i] = Some(gift);
                Ok(i)
            }
            None => {
                tracing::info!("Inventory full ({}/{})", SLOT_COUNT, SLOT_COUNT);
                Err(InventoryError::Full(gift.name))
            }
        }
    }

    /// Remove the item with this identity
    pub fn remove(&mut self, id: &str) -> Option<GiftData> {
        let idx = self.slots.iter().position(|s| s.as_ref().is_some_and(|g| g.id == id));
        match idx {
            Some(i) => self.take_slot(i),
            None => {
                tracing::debug!("Inventory: '{}' not held", id);
                None
            }
        }
    }

    /// Remove the first item with this display name
    pub fn remove_by_name(&mut self, name: &str) -> Option<GiftData> {
        if name.is_empty() {
            return None;
        }
        let idx = self.slots.iter().position(|s| s.as_ref().is_some_and(|g| g.name == name));
        match idx {
            Some(i) => self.take_slot(i),
            None => {
                tracing::debug!("Inventory: no '{}' to remove", name);
                None
            }
        }
    }

    fn take_slot(&mut self, i: usize) -> Option<GiftData> {
        let gift = self.slots[i].take();
        if self.detail == Some(i) {
            self.clear_detail();
        }
        if let Some(g) = &gift {
            tracing::debug!("Inventory: '{}' removed from slot {}", g.name, i);
        }
        gift
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.items().any(|g| g.id == id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.items().any(|g| g.name == name)
    }

    pub fn slot(&self, index: usize) -> Option<&GiftData> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn items(&self) -> impl Iterator<Item = &GiftData> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.items().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == SLOT_COUNT
    }

    /// Empty every slot and close the panel
    pub fn clear(&mut self) {
        self.slots = Default::default();
        self.open = false;
        self.detail = None;
    }

    // -----------------------------------------------------------------------
    // Panel
    // -----------------------------------------------------------------------

    /// Open or close the panel. Returns the new open state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show the detail of the item in `index`; empty or invalid slots are ignored
    pub fn select_slot(&mut self, index: usize) {
        if self.slot(index).is_some() {
            self.detail = Some(index);
        }
    }

    pub fn clear_detail(&mut self) {
        self.detail = None;
    }

    /// Item shown in the detail area
    pub fn detail(&self) -> Option<&GiftData> {
        self.detail.and_then(|i| self.slot(i))
    }
}
