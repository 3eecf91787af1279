use anyhow::bail;
use scratch_core::{CardSlot, Gift, GiftCatalog, GiftCategory, RevealState, Session, PICK_LIMIT};
use serde::{Deserialize, Serialize};

/// Persisted slot record. Field names are the wire contract; older payloads
/// with a different shape are rejected and treated as "no session".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSlot {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_ref: String,
    pub slot_index: usize,
    pub selected: bool,
    pub fully_revealed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedSession {
    pub gifts: Vec<SavedSlot>,
}

fn category_tag(category: GiftCategory) -> &'static str {
    match category {
        GiftCategory::Main => "main",
        GiftCategory::Side => "side",
        GiftCategory::Jackpot => "jackpot",
    }
}

fn parse_category(raw: &str) -> Option<GiftCategory> {
    match raw {
        "main" => Some(GiftCategory::Main),
        "side" => Some(GiftCategory::Side),
        "jackpot" => Some(GiftCategory::Jackpot),
        _ => None,
    }
}

impl SavedSession {
    pub fn from_session(session: &Session) -> Self {
        Self {
            gifts: session
                .slots
                .iter()
                .map(|slot| SavedSlot {
                    id: slot.gift.id.clone(),
                    name: slot.gift.name.clone(),
                    category: category_tag(slot.gift.category).to_string(),
                    image_ref: slot.gift.image.clone(),
                    slot_index: slot.slot_index,
                    selected: slot.selected,
                    fully_revealed: slot.reveal == RevealState::FullyRevealed,
                })
                .collect(),
        }
    }

    /// Rebuild the session aggregate, re-checking everything the core relies
    /// on: category tags, slot indices forming 0..N, and the gift bijection
    /// against the catalog.
    pub fn into_session(self, catalog: &GiftCatalog) -> anyhow::Result<Session> {
        let mut slots: Vec<Option<CardSlot>> = vec![None; self.gifts.len()];
        for saved in self.gifts {
            let Some(category) = parse_category(&saved.category) else {
                bail!("unknown gift category {:?}", saved.category);
            };
            if saved.slot_index >= slots.len() {
                bail!("slot index {} out of range", saved.slot_index);
            }
            if slots[saved.slot_index].is_some() {
                bail!("duplicate slot index {}", saved.slot_index);
            }
            let reveal = if saved.fully_revealed {
                RevealState::FullyRevealed
            } else if saved.selected {
                RevealState::Revealing
            } else {
                RevealState::Hidden
            };
            slots[saved.slot_index] = Some(CardSlot {
                slot_index: saved.slot_index,
                gift: Gift {
                    id: saved.id,
                    name: saved.name,
                    category,
                    image: saved.image_ref,
                },
                reveal,
                selected: saved.selected,
            });
        }
        let slots: Vec<CardSlot> = slots.into_iter().flatten().collect();
        let mut session = Session {
            slots,
            pick_limit: PICK_LIMIT,
            ended: false,
        };
        session.validate_against(catalog)?;
        session.ended = session.picks_made() >= session.pick_limit;
        Ok(session)
    }
}
