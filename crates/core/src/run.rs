use crate::{
    enforce_distribution, evaluate_reveal, CatalogError, Event, EventBus, GiftCatalog,
    MaskSampler, RestoreError, RevealState, RngState, Session, SwapDecision,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("slot {0} does not exist")]
    NoSuchSlot(usize),
    #[error("slot {0} is already selected")]
    AlreadySelected(usize),
    #[error("slot {0} is not selected")]
    NotSelected(usize),
    #[error("session has ended")]
    Ended,
    #[error("pick limit reached")]
    PickLimitReached,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Ended,
}

/// Whether a call committed a state change the caller must persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Outcome {
    Changed,
    Unchanged,
}

/// Top-level session controller. Owns the session aggregate exclusively;
/// every transition happens through a method here, and every method that
/// returns [`Outcome::Changed`] expects the driving layer to persist before
/// dispatching the next stimulus.
#[derive(Debug)]
pub struct SessionRun {
    catalog: GiftCatalog,
    rng: RngState,
    session: Session,
}

impl SessionRun {
    /// Fresh session with a shuffled gift assignment.
    pub fn new(
        catalog: GiftCatalog,
        seed: u64,
        events: &mut EventBus,
    ) -> Result<Self, CatalogError> {
        let mut rng = RngState::from_seed(seed);
        let session = Session::deal(&catalog, &mut rng)?;
        events.push(Event::SessionStarted {
            fresh: true,
            picks_remaining: session.picks_remaining(),
            ended: false,
        });
        Ok(Self {
            catalog,
            rng,
            session,
        })
    }

    /// Adopt a restored session. A snapshot that already spent all its picks
    /// classifies straight to `Ended`; its selected slots count as fully
    /// revealed even if the final reveal never hit the threshold before the
    /// restart.
    pub fn resume(
        catalog: GiftCatalog,
        mut session: Session,
        seed: u64,
        events: &mut EventBus,
    ) -> Result<Self, RestoreError> {
        session.validate_against(&catalog)?;
        if session.picks_made() >= session.pick_limit {
            for slot in &mut session.slots {
                if slot.selected {
                    slot.advance_reveal(RevealState::FullyRevealed);
                }
            }
            session.ended = true;
        }
        events.push(Event::SessionStarted {
            fresh: false,
            picks_remaining: session.picks_remaining(),
            ended: session.ended,
        });
        Ok(Self {
            catalog,
            rng: RngState::from_seed(seed),
            session,
        })
    }

    pub fn phase(&self) -> Phase {
        if self.session.ended {
            Phase::Ended
        } else {
            Phase::InProgress
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn catalog(&self) -> &GiftCatalog {
        &self.catalog
    }

    /// Confirm a pick. Distribution enforcement runs first, before the slot
    /// is marked selected, so any swap happens while the surface is still
    /// covered.
    pub fn select(&mut self, slot: usize, events: &mut EventBus) -> Result<Outcome, SessionError> {
        if slot >= self.session.slots.len() {
            return Err(SessionError::NoSuchSlot(slot));
        }
        if self.session.ended {
            return Err(SessionError::Ended);
        }
        if self.session.slots[slot].selected {
            return Err(SessionError::AlreadySelected(slot));
        }
        if self.session.picks_made() >= self.session.pick_limit {
            return Err(SessionError::PickLimitReached);
        }

        if let SwapDecision::Swapped {
            with,
            reason,
            fallback,
        } = enforce_distribution(&mut self.session, slot)
        {
            events.push(Event::GiftsSwapped {
                from: slot,
                to: with,
                reason,
                fallback,
            });
        }

        let card = &mut self.session.slots[slot];
        card.selected = true;
        card.advance_reveal(RevealState::Revealing);
        let gift_id = card.gift.id.clone();
        events.push(Event::CardSelected {
            slot,
            gift_id,
            picks_remaining: self.session.picks_remaining(),
        });
        Ok(Outcome::Changed)
    }

    /// Feed the current reveal mask for a selected slot through the detector.
    /// Only a threshold crossing commits state (and so only a crossing asks
    /// for a save); partial progress is the in-flight loss a crash accepts.
    pub fn report_reveal(
        &mut self,
        slot: usize,
        sampler: &dyn MaskSampler,
        events: &mut EventBus,
    ) -> Result<Outcome, SessionError> {
        let card = self
            .session
            .slots
            .get(slot)
            .ok_or(SessionError::NoSuchSlot(slot))?;
        if !card.selected {
            return Err(SessionError::NotSelected(slot));
        }
        if card.fully_revealed() {
            return Ok(Outcome::Unchanged);
        }
        if evaluate_reveal(card.reveal, sampler) != RevealState::FullyRevealed {
            return Ok(Outcome::Unchanged);
        }

        let card = &mut self.session.slots[slot];
        card.advance_reveal(RevealState::FullyRevealed);
        let gift_id = card.gift.id.clone();
        events.push(Event::CardFullyRevealed { slot, gift_id });

        if self.session.is_complete() {
            self.session.ended = true;
            events.push(Event::SessionEnded {
                won_gift_ids: self
                    .session
                    .won_gifts()
                    .iter()
                    .map(|gift| gift.id.clone())
                    .collect(),
            });
        }
        Ok(Outcome::Changed)
    }

    /// Explicit fresh start; the only way a session is ever replaced.
    pub fn restart(&mut self, seed: u64, events: &mut EventBus) -> Result<Outcome, CatalogError> {
        self.rng = RngState::from_seed(seed);
        self.session = Session::deal(&self.catalog, &mut self.rng)?;
        events.push(Event::SessionStarted {
            fresh: true,
            picks_remaining: self.session.picks_remaining(),
            ended: false,
        });
        Ok(Outcome::Changed)
    }
}
