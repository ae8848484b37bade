//! Domain model and game rules of the Dedaena alphabet primer.
//!
//! Everything in this crate is synchronous and free of I/O.

#![forbid(unsafe_code)]

pub mod analysis;
pub mod charges;
pub mod error;
pub mod game;
pub mod model;
pub mod normalize;
pub mod progress;
pub mod progression;
pub mod time;
pub mod validate;

pub use error::Error;
pub use game::{GameState, InputClearPolicy, RevealError};
pub use progress::{Marked, TourProgress};
pub use progression::{AdvanceOutcome, ProgressionError};
pub use time::Clock;
pub use validate::ValidationResult;
