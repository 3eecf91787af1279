use crate::{CardSlot, CatalogError, Gift, GiftCatalog, GiftCategory, RngState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// How many cards the player may reveal in one session.
pub const PICK_LIMIT: usize = 3;

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("expected {expected} slots, found {found}")]
    SlotCount { expected: usize, found: usize },
    #[error("slot gifts do not match the catalog")]
    GiftMismatch,
    #[error("pick limit {limit} exceeds slot count {slots}")]
    BadPickLimit { limit: usize, slots: usize },
}

/// The persisted aggregate: every board slot plus the pick budget. Owned
/// exclusively by the session controller for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub slots: Vec<CardSlot>,
    pub pick_limit: usize,
    #[serde(default)]
    pub ended: bool,
}

impl Session {
    /// Fresh session: one slot per catalog gift, assignment shuffled.
    pub fn deal(catalog: &GiftCatalog, rng: &mut RngState) -> Result<Self, CatalogError> {
        if PICK_LIMIT > catalog.len() {
            return Err(CatalogError::PickLimitTooLarge {
                limit: PICK_LIMIT,
                size: catalog.len(),
            });
        }
        let mut gifts: Vec<Gift> = catalog.gifts().to_vec();
        rng.shuffle(&mut gifts);
        let slots = gifts
            .into_iter()
            .enumerate()
            .map(|(slot_index, gift)| CardSlot::new(slot_index, gift))
            .collect();
        Ok(Self {
            slots,
            pick_limit: PICK_LIMIT,
            ended: false,
        })
    }

    pub fn picks_made(&self) -> usize {
        self.slots.iter().filter(|slot| slot.selected).count()
    }

    pub fn main_picks(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.selected && slot.gift.category == GiftCategory::Main)
            .count()
    }

    pub fn picks_remaining(&self) -> usize {
        self.pick_limit.saturating_sub(self.picks_made())
    }

    /// All allowed picks made and every one of them fully revealed.
    pub fn is_complete(&self) -> bool {
        self.slots
            .iter()
            .filter(|slot| slot.selected && slot.fully_revealed())
            .count()
            == self.pick_limit
    }

    /// Exchange the gift assignment between two slots. Physical identity,
    /// reveal progress and selection stay with the slot.
    pub fn swap_gifts(&mut self, a: usize, b: usize) {
        if a == b || a >= self.slots.len() || b >= self.slots.len() {
            return;
        }
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (left, right) = self.slots.split_at_mut(hi);
        std::mem::swap(&mut left[lo].gift, &mut right[0].gift);
    }

    /// First unselected slot matching `category` (any category when `None`),
    /// skipping `exclude`.
    pub fn find_unselected(
        &self,
        category: Option<GiftCategory>,
        exclude: usize,
    ) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| {
                !slot.selected
                    && slot.slot_index != exclude
                    && category.map_or(true, |wanted| slot.gift.category == wanted)
            })
    }

    /// The gifts the player has committed to, in board order.
    pub fn won_gifts(&self) -> Vec<&Gift> {
        self.slots
            .iter()
            .filter(|slot| slot.selected)
            .map(|slot| &slot.gift)
            .collect()
    }

    /// Structural check for restored sessions: board size matches the catalog
    /// and the slot gifts are still a bijection onto it.
    pub fn validate_against(&self, catalog: &GiftCatalog) -> Result<(), RestoreError> {
        if self.slots.len() != catalog.len() {
            return Err(RestoreError::SlotCount {
                expected: catalog.len(),
                found: self.slots.len(),
            });
        }
        if self.pick_limit > self.slots.len() {
            return Err(RestoreError::BadPickLimit {
                limit: self.pick_limit,
                slots: self.slots.len(),
            });
        }
        let mut ids: HashSet<&str> = self
            .slots
            .iter()
            .map(|slot| slot.gift.id.as_str())
            .collect();
        if ids.len() != self.slots.len() {
            return Err(RestoreError::GiftMismatch);
        }
        for gift in catalog.gifts() {
            if !ids.remove(gift.id.as_str()) {
                return Err(RestoreError::GiftMismatch);
            }
        }
        Ok(())
    }

    /// Slots whose gift is still hidden after the session ended, for the
    /// "reveal everything" affordance.
    pub fn unselected_slots(&self) -> impl Iterator<Item = &CardSlot> {
        self.slots.iter().filter(|slot| !slot.selected)
    }
}
