use crate::{GiftCategory, Session};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SwapReason {
    /// The chosen slot held the main gift but one was already won.
    BlockSecondMain,
    /// Final pick with no main won yet; it is now or never.
    ForceFinalMain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDecision {
    NoSwap,
    Swapped {
        with: usize,
        reason: SwapReason,
        fallback: bool,
    },
}

/// Distribution enforcement, run the instant a pick is confirmed and before
/// any reveal, so the exchange is invisible to the player. The chosen slot is
/// not yet marked selected when this runs.
pub fn enforce_distribution(session: &mut Session, chosen: usize) -> SwapDecision {
    let main_picks = session.main_picks();
    let chosen_is_main = session.slots[chosen].gift.category == GiftCategory::Main;

    if main_picks == 1 && chosen_is_main {
        swap_towards(session, chosen, GiftCategory::Side, SwapReason::BlockSecondMain)
    } else if session.picks_made() == session.pick_limit - 1
        && main_picks == 0
        && !chosen_is_main
    {
        swap_towards(session, chosen, GiftCategory::Main, SwapReason::ForceFinalMain)
    } else {
        SwapDecision::NoSwap
    }
}

fn swap_towards(
    session: &mut Session,
    chosen: usize,
    wanted: GiftCategory,
    reason: SwapReason,
) -> SwapDecision {
    if let Some(target) = session.find_unselected(Some(wanted), chosen) {
        session.swap_gifts(chosen, target);
        return SwapDecision::Swapped {
            with: target,
            reason,
            fallback: false,
        };
    }
    // Cannot happen with a validated catalog; accepted degradation otherwise.
    if let Some(target) = session.find_unselected(None, chosen) {
        log::warn!(
            "no unselected {:?} slot to swap with, falling back to slot {}",
            wanted,
            target
        );
        session.swap_gifts(chosen, target);
        return SwapDecision::Swapped {
            with: target,
            reason,
            fallback: true,
        };
    }
    log::warn!("no slot available to swap with (wanted {:?})", wanted);
    SwapDecision::NoSwap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CardSlot, Gift, GiftCatalog, RngState};

    fn session_with_seed(seed: u64) -> Session {
        let mut rng = RngState::from_seed(seed);
        Session::deal(&GiftCatalog::builtin(), &mut rng).expect("deal")
    }

    fn slot_of(session: &Session, category: GiftCategory) -> usize {
        session
            .slots
            .iter()
            .position(|slot| !slot.selected && slot.gift.category == category)
            .expect("slot of requested category")
    }

    fn select(session: &mut Session, slot: usize) {
        session.slots[slot].selected = true;
    }

    #[test]
    fn early_side_pick_needs_no_swap() {
        let mut session = session_with_seed(1);
        let side = slot_of(&session, GiftCategory::Side);
        assert_eq!(enforce_distribution(&mut session, side), SwapDecision::NoSwap);
    }

    #[test]
    fn early_main_pick_is_allowed() {
        let mut session = session_with_seed(1);
        let main = slot_of(&session, GiftCategory::Main);
        assert_eq!(enforce_distribution(&mut session, main), SwapDecision::NoSwap);
        assert_eq!(
            session.slots[main].gift.category,
            GiftCategory::Main
        );
    }

    #[test]
    fn final_pick_forces_main_when_none_won() {
        let mut session = session_with_seed(3);
        let first = slot_of(&session, GiftCategory::Side);
        select(&mut session, first);
        let second = slot_of(&session, GiftCategory::Side);
        select(&mut session, second);

        let third = slot_of(&session, GiftCategory::Side);
        let main_before = slot_of(&session, GiftCategory::Main);
        match enforce_distribution(&mut session, third) {
            SwapDecision::Swapped {
                with,
                reason,
                fallback,
            } => {
                assert_eq!(with, main_before);
                assert_eq!(reason, SwapReason::ForceFinalMain);
                assert!(!fallback);
            }
            SwapDecision::NoSwap => panic!("final pick must force the main gift"),
        }
        assert_eq!(session.slots[third].gift.category, GiftCategory::Main);
        assert_eq!(
            session.slots[main_before].gift.category,
            GiftCategory::Side
        );
        assert!(!session.slots[main_before].selected);
    }

    // A two-main board cannot come from GiftCatalog::new; built by hand to
    // exercise the second-main code path.
    fn two_main_session() -> Session {
        let gifts = vec![
            Gift::new("main1", "Main A", GiftCategory::Main, "images/a.png"),
            Gift::new("main2", "Main B", GiftCategory::Main, "images/b.png"),
            Gift::new("side1", "Side A", GiftCategory::Side, "images/c.png"),
            Gift::new("side2", "Side B", GiftCategory::Side, "images/d.png"),
            Gift::new("side3", "Side C", GiftCategory::Side, "images/e.png"),
        ];
        Session {
            slots: gifts
                .into_iter()
                .enumerate()
                .map(|(index, gift)| CardSlot::new(index, gift))
                .collect(),
            pick_limit: 3,
            ended: false,
        }
    }

    #[test]
    fn second_main_is_swapped_to_side() {
        let mut session = two_main_session();
        select(&mut session, 0); // first main won

        match enforce_distribution(&mut session, 1) {
            SwapDecision::Swapped {
                reason, fallback, ..
            } => {
                assert_eq!(reason, SwapReason::BlockSecondMain);
                assert!(!fallback);
            }
            SwapDecision::NoSwap => panic!("second main must be swapped away"),
        }
        assert_eq!(session.slots[1].gift.category, GiftCategory::Side);
        assert_eq!(session.main_picks(), 1);
    }

    #[test]
    fn no_swap_when_no_target_remains() {
        let mut session = two_main_session();
        select(&mut session, 0);
        select(&mut session, 2);
        select(&mut session, 3);
        // Only slots 1 (main) and 4 (side) left; mark 4 selected too so no
        // side target remains.
        select(&mut session, 4);

        match enforce_distribution(&mut session, 1) {
            SwapDecision::NoSwap => {}
            other => panic!("no unselected slot remains, got {:?}", other),
        }
    }

    #[test]
    fn fallback_picks_non_ideal_target_when_sides_are_gone() {
        let mut session = two_main_session();
        // Select every side slot; the only swap candidate left is main2.
        select(&mut session, 2);
        select(&mut session, 3);
        select(&mut session, 4);
        session.slots[2].gift.category = GiftCategory::Main;
        // Now picking slot 0 (main) with main already "won" via slot 2.
        match enforce_distribution(&mut session, 0) {
            SwapDecision::Swapped { fallback, .. } => assert!(fallback),
            SwapDecision::NoSwap => panic!("fallback swap expected"),
        }
    }
}
