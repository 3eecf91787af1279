use crate::SwapReason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    SessionStarted {
        fresh: bool,
        picks_remaining: usize,
        ended: bool,
    },
    CardSelected {
        slot: usize,
        gift_id: String,
        picks_remaining: usize,
    },
    GiftsSwapped {
        from: usize,
        to: usize,
        reason: SwapReason,
        fallback: bool,
    },
    CardFullyRevealed {
        slot: usize,
        gift_id: String,
    },
    SessionEnded {
        won_gift_ids: Vec<String>,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
