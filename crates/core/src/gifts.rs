use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GiftCategory {
    Main,
    Side,
    /// Reserved for a future jackpot tier; never part of the builtin catalog.
    Jackpot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Gift {
    pub id: String,
    pub name: String,
    pub category: GiftCategory,
    pub image: String,
}

impl Gift {
    pub fn new(id: &str, name: &str, category: GiftCategory, image: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            image: image.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog must contain exactly one main gift, found {0}")]
    MainCount(usize),
    #[error("duplicate gift id {0}")]
    DuplicateId(String),
    #[error("pick limit {limit} exceeds catalog size {size}")]
    PickLimitTooLarge { limit: usize, size: usize },
}

/// The fixed, read-only prize catalog. One slot per gift, so the catalog size
/// is also the board size.
#[derive(Debug, Clone)]
pub struct GiftCatalog {
    gifts: Vec<Gift>,
}

impl GiftCatalog {
    /// Validates the structural invariant the distribution guarantee relies
    /// on: exactly one main gift, unique ids.
    pub fn new(gifts: Vec<Gift>) -> Result<Self, CatalogError> {
        let mains = gifts
            .iter()
            .filter(|gift| gift.category == GiftCategory::Main)
            .count();
        if mains != 1 {
            return Err(CatalogError::MainCount(mains));
        }
        let mut seen = HashSet::new();
        for gift in &gifts {
            if !seen.insert(gift.id.as_str()) {
                return Err(CatalogError::DuplicateId(gift.id.clone()));
            }
        }
        Ok(Self { gifts })
    }

    pub fn builtin() -> Self {
        Self {
            gifts: vec![
                Gift::new(
                    "main1",
                    "Bean Bag Chair",
                    GiftCategory::Main,
                    "images/bean-bag.jpg",
                ),
                Gift::new(
                    "side1",
                    "Mystery Box",
                    GiftCategory::Side,
                    "images/deco-box.png",
                ),
                Gift::new("side2", "Hoodie", GiftCategory::Side, "images/hoodie.jpg"),
                Gift::new(
                    "side3",
                    "Customised Tumbler",
                    GiftCategory::Side,
                    "images/tumbler.jpg",
                ),
                Gift::new("side4", "Perfume", GiftCategory::Side, "images/perfume.jpg"),
            ],
        }
    }

    pub fn gifts(&self) -> &[Gift] {
        &self.gifts
    }

    pub fn len(&self) -> usize {
        self.gifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gifts.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Gift> {
        self.gifts.iter().find(|gift| gift.id == id)
    }
}
