//! Time management: turn UCI clock parameters into one wall-clock budget.

use std::time::Duration;

use petrel_core::Color;

/// Effectively no deadline, used for `go infinite` and depth-capped
/// searches.
pub const NO_DEADLINE: Duration = Duration::from_secs(100_000_000);

/// Hard ceiling on any single move's allocation.
const MOVE_CAP: Duration = Duration::from_secs(30);

/// Safety margin kept for protocol latency.
const MARGIN: Duration = Duration::from_millis(50);

/// Clock state from a `go` command.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movestogo: Option<u32>,
    pub movetime: Option<Duration>,
    pub depth: Option<i32>,
    pub infinite: bool,
    pub ponder: bool,
}

/// Moves-remaining estimate from the game ply: expect a long game early,
/// level off at twenty moves once the opening is behind us.
pub fn moves_to_go(game_ply: u16) -> u32 {
    (40 - (game_ply as i64 / 2)).max(20) as u32
}

/// The wall-clock budget for one search.
///
/// `movetime` is taken literally; `infinite`, `ponder`, and depth-capped
/// searches get no deadline. Otherwise the side's remaining time is spread
/// over the expected number of moves, capped at thirty seconds, and floored
/// at the increment (plus a margin) since that much comes back for free.
pub fn budget(clock: &Clock, side: Color, game_ply: u16) -> Duration {
    if let Some(movetime) = clock.movetime {
        return movetime;
    }
    if clock.infinite || clock.ponder {
        return NO_DEADLINE;
    }

    let (remaining, increment) = match side {
        Color::White => (clock.wtime, clock.winc),
        Color::Black => (clock.btime, clock.binc),
    };
    let Some(remaining) = remaining else {
        // Bare `go` or `go depth N`.
        return NO_DEADLINE;
    };

    let mtg = clock.movestogo.unwrap_or_else(|| moves_to_go(game_ply)).max(1);
    let share = (remaining / mtg).min(MOVE_CAP);
    let floor = increment.unwrap_or(Duration::ZERO) + MARGIN;
    let allocation = share.max(floor);

    // Never budget more than is actually on the clock.
    allocation
        .min(remaining.saturating_sub(MARGIN))
        .max(Duration::from_millis(1))
}
