//! Contract for an external NNUE evaluator.
//!
//! The network itself is an opaque collaborator; petrel only defines the
//! interface it must expose. An implementation keeps an incremental
//! accumulator in sync with the board:
//!
//! - [`attach`](NnueEvaluator::attach) rebuilds the accumulator from a full
//!   board snapshot (done once at the search root).
//! - [`activate`](NnueEvaluator::activate) and
//!   [`deactivate`](NnueEvaluator::deactivate) mirror every piece placement
//!   and removal during make/unmake. The pairing must be exact or the
//!   accumulator drifts.
//! - Null moves change no piece placement, so they must not touch the
//!   accumulator at all.

use petrel_core::{Board, Color, PieceType, Square};

/// An efficiently-updatable network evaluator.
pub trait NnueEvaluator {
    /// Rebuild the accumulator for `board` from scratch.
    fn attach(&mut self, board: &Board);

    /// A piece appeared on `sq`.
    fn activate(&mut self, pt: PieceType, color: Color, sq: Square);

    /// A piece left `sq`.
    fn deactivate(&mut self, pt: PieceType, color: Color, sq: Square);

    /// Centipawn score from `side_to_move`'s perspective.
    fn evaluate(&self, side_to_move: Color) -> i32;
}
