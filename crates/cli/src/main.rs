use scratch_core::{
    Event, EventBus, GiftCatalog, Outcome, Phase, RevealMask, RevealState, SessionRun,
};
use scratch_store::{FileStore, SessionStore};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

const MASK_WIDTH: usize = 240;
const MASK_HEIGHT: usize = 150;

struct Cli {
    run: SessionRun,
    store: SessionStore<FileStore>,
}

fn main() {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let mut seed = None;
    let mut save_dir = PathBuf::from("save");
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                seed = args.next().and_then(|value| value.parse::<u64>().ok());
            }
            "--save-dir" => {
                if let Some(dir) = args.next() {
                    save_dir = PathBuf::from(dir);
                }
            }
            other => {
                eprintln!("unknown argument: {}", other);
                eprintln!("usage: scratch-cli [--seed N] [--save-dir DIR]");
                return;
            }
        }
    }

    let catalog = GiftCatalog::builtin();
    let store = SessionStore::new(FileStore::new(save_dir));
    let mut events = EventBus::default();
    let run = match store.load(&catalog) {
        Some(session) => {
            match SessionRun::resume(catalog, session, entropy_seed(seed), &mut events) {
                Ok(run) => run,
                Err(err) => {
                    log::warn!("saved session rejected ({}), starting fresh", err);
                    start_fresh(seed, &mut events)
                }
            }
        }
        None => start_fresh(seed, &mut events),
    };

    let mut cli = Cli { run, store };
    cli.print_events(&mut events);
    cli.print_board();
    cli.repl();
}

fn start_fresh(seed: Option<u64>, events: &mut EventBus) -> SessionRun {
    match SessionRun::new(GiftCatalog::builtin(), entropy_seed(seed), events) {
        Ok(run) => run,
        Err(err) => {
            // The builtin catalog always validates; only a miswired build gets here.
            eprintln!("cannot start a session: {}", err);
            std::process::exit(1);
        }
    }
}

fn entropy_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0)
    })
}

impl Cli {
    fn repl(&mut self) {
        let stdin = io::stdin();
        loop {
            print!("> ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            let mut parts = input.split_whitespace();
            let cmd = parts.next().unwrap_or("");
            let args: Vec<&str> = parts.collect();
            match cmd {
                "help" | "h" | "?" => print_help(),
                "quit" | "exit" | "q" => break,
                "board" | "ls" => self.print_board(),
                "gifts" => self.print_winnings(),
                "pick" | "p" => self.cmd_pick(&args),
                "reveal" => self.cmd_reveal_all(),
                "reset" => self.cmd_reset(),
                other => println!("unknown command: {} (try 'help')", other),
            }
        }
    }

    fn cmd_pick(&mut self, args: &[&str]) {
        let Some(slot) = args.first().and_then(|value| value.parse::<usize>().ok()) else {
            println!("usage: pick <slot 0-{}>", self.run.session().slots.len() - 1);
            return;
        };
        if self.run.phase() == Phase::Ended {
            println!("the session is over; 'gifts' shows your winnings");
            return;
        }
        println!(
            "Scratch card {}? {} choice(s) remaining. [y/N]",
            slot,
            self.run.session().picks_remaining()
        );
        if !confirm() {
            println!("kept the card covered");
            return;
        }

        let mut events = EventBus::default();
        match self.run.select(slot, &mut events) {
            Ok(Outcome::Changed) => self.checkpoint(),
            Ok(Outcome::Unchanged) => {}
            Err(err) => {
                println!("cannot pick that card: {}", err);
                return;
            }
        }
        self.print_events(&mut events);
        self.scratch(slot);
    }

    /// Simulated scratching: sweep strokes across the slot's mask until the
    /// detector latches.
    fn scratch(&mut self, slot: usize) {
        let mut mask = RevealMask::new(MASK_WIDTH, MASK_HEIGHT);
        let mut events = EventBus::default();
        'strokes: for y in (0..MASK_HEIGHT).step_by(18) {
            for x in (0..MASK_WIDTH).step_by(18) {
                mask.stamp(x as f64, y as f64);
                match self.run.report_reveal(slot, &mask, &mut events) {
                    Ok(Outcome::Changed) => {
                        self.checkpoint();
                        break 'strokes;
                    }
                    Ok(Outcome::Unchanged) => {}
                    Err(err) => {
                        println!("cannot scratch: {}", err);
                        return;
                    }
                }
            }
        }
        self.print_events(&mut events);
        self.print_board();
    }

    fn cmd_reveal_all(&mut self) {
        if self.run.phase() != Phase::Ended {
            println!("finish your picks first");
            return;
        }
        println!("the cards you left behind:");
        for slot in self.run.session().unselected_slots() {
            println!("  card {}: {}", slot.slot_index, slot.gift.name);
        }
    }

    fn cmd_reset(&mut self) {
        println!("Throw away this session and start over? [y/N]");
        if !confirm() {
            return;
        }
        let mut events = EventBus::default();
        match self.run.restart(entropy_seed(None), &mut events) {
            Ok(_) => self.checkpoint(),
            Err(err) => {
                println!("cannot restart: {}", err);
                return;
            }
        }
        self.print_events(&mut events);
        self.print_board();
    }

    /// Persist after every committed change; a failed write keeps the
    /// in-memory session authoritative.
    fn checkpoint(&mut self) {
        if let Err(err) = self.store.save(self.run.session()) {
            log::warn!("failed to persist session: {:#}", err);
        }
    }

    fn print_events(&self, events: &mut EventBus) {
        for event in events.drain() {
            match event {
                Event::SessionStarted {
                    fresh,
                    picks_remaining,
                    ended,
                } => {
                    if ended {
                        println!("Welcome back! Here are your gifts:");
                        self.print_winnings();
                    } else if fresh {
                        println!("Pick {} card(s) to scratch...", picks_remaining);
                    } else {
                        println!("Welcome back! Pick {} more card(s)...", picks_remaining);
                    }
                }
                Event::CardSelected {
                    slot,
                    picks_remaining,
                    ..
                } => {
                    if picks_remaining > 0 {
                        println!("card {} picked; {} more after this", slot, picks_remaining);
                    } else {
                        println!("card {} picked; last one!", slot);
                    }
                }
                Event::GiftsSwapped { .. } => {
                    // Never shown; the swap stays invisible to the player.
                }
                Event::CardFullyRevealed { slot, .. } => {
                    let name = &self.run.session().slots[slot].gift.name;
                    println!("card {} revealed: {}", slot, name);
                }
                Event::SessionEnded { .. } => {
                    println!("Here are your gifts!");
                    self.print_winnings();
                }
            }
        }
    }

    fn print_board(&self) {
        println!("+----- scratch cards -----+");
        for slot in &self.run.session().slots {
            let face = match (slot.selected, slot.reveal) {
                (_, RevealState::FullyRevealed) => slot.gift.name.clone(),
                (true, _) => "[scratching...]".to_string(),
                (false, _) => "[covered]".to_string(),
            };
            println!("  card {}: {}", slot.slot_index, face);
        }
        match self.run.phase() {
            Phase::InProgress => println!(
                "picks remaining: {}",
                self.run.session().picks_remaining()
            ),
            Phase::Ended => println!("session complete: try 'gifts' or 'reveal'"),
        }
    }

    fn print_winnings(&self) {
        for gift in self.run.session().won_gifts() {
            println!("  {} ({})", gift.name, gift.image);
        }
    }
}

fn confirm() -> bool {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes")
}

fn print_help() {
    println!("commands:");
    println!("  board            show the card board");
    println!("  pick <n>         scratch card n (asks for confirmation)");
    println!("  gifts            list the gifts you have won");
    println!("  reveal           after the session ends, show the cards you skipped");
    println!("  reset            abandon the session and reshuffle");
    println!("  help             this text");
    println!("  quit             leave (progress is saved)");
}
