use crate::Gift;
use serde::{Deserialize, Serialize};

/// Reveal progress of a slot's scratch surface. Only ever advances.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub enum RevealState {
    #[default]
    Hidden,
    Revealing,
    FullyRevealed,
}

/// One fixed board position. The slot index is the physical identity; the
/// gift assignment is what a swap exchanges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardSlot {
    pub slot_index: usize,
    pub gift: Gift,
    #[serde(default)]
    pub reveal: RevealState,
    #[serde(default)]
    pub selected: bool,
}

impl CardSlot {
    pub fn new(slot_index: usize, gift: Gift) -> Self {
        Self {
            slot_index,
            gift,
            reveal: RevealState::Hidden,
            selected: false,
        }
    }

    /// Forward-only transition; a regression request is ignored.
    pub fn advance_reveal(&mut self, next: RevealState) {
        if next > self.reveal {
            self.reveal = next;
        }
    }

    pub fn fully_revealed(&self) -> bool {
        self.reveal == RevealState::FullyRevealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Gift, GiftCategory};

    fn slot() -> CardSlot {
        CardSlot::new(0, Gift::new("g", "Gift", GiftCategory::Side, "images/g.png"))
    }

    #[test]
    fn reveal_never_regresses() {
        let mut slot = slot();
        slot.advance_reveal(RevealState::Revealing);
        assert_eq!(slot.reveal, RevealState::Revealing);
        slot.advance_reveal(RevealState::Hidden);
        assert_eq!(slot.reveal, RevealState::Revealing);
        slot.advance_reveal(RevealState::FullyRevealed);
        slot.advance_reveal(RevealState::Revealing);
        assert_eq!(slot.reveal, RevealState::FullyRevealed);
    }
}
