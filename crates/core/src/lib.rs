//! Core game logic for the scratch-card draw. Keep this crate free of IO and
//! platform concerns.

pub mod allocate;
pub mod events;
pub mod gifts;
pub mod reveal;
pub mod rng;
pub mod run;
pub mod session;
pub mod slots;

pub use allocate::*;
pub use events::*;
pub use gifts::*;
pub use reveal::*;
pub use rng::*;
pub use run::*;
pub use session::*;
pub use slots::*;
