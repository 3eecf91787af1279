use scratch_core::{
    EventBus, GiftCatalog, GiftCategory, MaskSampler, Outcome, Phase, SessionRun,
};
use scratch_store::{MemoryStore, SessionStore};

struct FullSampler;

impl MaskSampler for FullSampler {
    fn cleared_fraction(&self) -> f64 {
        1.0
    }
}

fn checkpoint(store: &mut SessionStore<MemoryStore>, run: &SessionRun) {
    store.save(run.session()).expect("save");
}

#[test]
fn crash_after_two_picks_resumes_midgame() {
    let mut store = SessionStore::new(MemoryStore::new());
    let mut events = EventBus::default();
    let mut run = SessionRun::new(GiftCatalog::builtin(), 31, &mut events).expect("run");

    for slot in [0, 4] {
        assert_eq!(run.select(slot, &mut events).expect("select"), Outcome::Changed);
        checkpoint(&mut store, &run);
        assert_eq!(
            run.report_reveal(slot, &FullSampler, &mut events)
                .expect("reveal"),
            Outcome::Changed
        );
        checkpoint(&mut store, &run);
    }

    // Process restart: reload from the store and keep playing.
    let session = store.load(&GiftCatalog::builtin()).expect("load");
    let mut resumed =
        SessionRun::resume(GiftCatalog::builtin(), session, 77, &mut events).expect("resume");
    assert_eq!(resumed.phase(), Phase::InProgress);
    assert_eq!(resumed.session().picks_remaining(), 1);

    let free = resumed
        .session()
        .slots
        .iter()
        .position(|slot| !slot.selected)
        .expect("free slot");
    let _ = resumed.select(free, &mut events).expect("select");
    checkpoint(&mut store, &resumed);
    let _ = resumed
        .report_reveal(free, &FullSampler, &mut events)
        .expect("reveal");
    checkpoint(&mut store, &resumed);
    assert_eq!(resumed.phase(), Phase::Ended);

    let won = resumed.session().won_gifts();
    let mains = won
        .iter()
        .filter(|gift| gift.category == GiftCategory::Main)
        .count();
    assert_eq!((mains, won.len()), (1, 3));
}

#[test]
fn finished_session_reloads_straight_into_ended() {
    let mut store = SessionStore::new(MemoryStore::new());
    let mut events = EventBus::default();
    let mut run = SessionRun::new(GiftCatalog::builtin(), 13, &mut events).expect("run");
    for slot in [2, 3, 1] {
        let _ = run.select(slot, &mut events).expect("select");
        let _ = run
            .report_reveal(slot, &FullSampler, &mut events)
            .expect("reveal");
        checkpoint(&mut store, &run);
    }
    assert_eq!(run.phase(), Phase::Ended);

    let session = store.load(&GiftCatalog::builtin()).expect("load");
    let resumed =
        SessionRun::resume(GiftCatalog::builtin(), session, 99, &mut events).expect("resume");
    assert_eq!(resumed.phase(), Phase::Ended);
    assert_eq!(resumed.session().won_gifts().len(), 3);
}

#[test]
fn swap_committed_by_save_survives_reload() {
    // Steer into the forced-main path: pick two side slots, then a third
    // side-looking slot. The persisted payload must already show the swap.
    let mut store = SessionStore::new(MemoryStore::new());
    let mut events = EventBus::default();
    let mut run = SessionRun::new(GiftCatalog::builtin(), 17, &mut events).expect("run");
    let sides: Vec<usize> = run
        .session()
        .slots
        .iter()
        .filter(|slot| slot.gift.category == GiftCategory::Side)
        .map(|slot| slot.slot_index)
        .take(3)
        .collect();

    for &slot in &sides[..2] {
        let _ = run.select(slot, &mut events).expect("select");
        let _ = run
            .report_reveal(slot, &FullSampler, &mut events)
            .expect("reveal");
        checkpoint(&mut store, &run);
    }
    let _ = run.select(sides[2], &mut events).expect("third select");
    checkpoint(&mut store, &run);

    let session = store.load(&GiftCatalog::builtin()).expect("load");
    assert_eq!(
        session.slots[sides[2]].gift.category,
        GiftCategory::Main,
        "forced main swap must be in the persisted snapshot"
    );
}
