//! Evaluation, search, and time management for petrel.

pub mod eval;
pub mod search;
pub mod time;

pub use eval::{GameProgress, evaluate, game_progress, piece_value};
pub use search::control::SearchControl;
pub use search::dispatch::{Dispatcher, DispatcherHandle, PvLine, SearchOutcome, SearchRequest};
pub use search::see::see;
