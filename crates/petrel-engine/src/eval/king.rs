//! King placement.
//!
//! In the midgame the king belongs in a corner: each square is scored by its
//! Euclidean distance to the nearer of the side's two back-rank corners,
//! scaled by -4 and rounded. Endgame king activity is paid for indirectly by
//! the passed-pawn terms, so the table is midgame-only.

use petrel_core::{Board, Color};

use crate::eval::GameProgress;

/// `KING_TABLE[color][square]`: 0 in the corners, about -30 in the far
/// corner of the board.
static KING_TABLE: [[i32; 64]; 2] = {
    let mut table = [[0i32; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let rank = (sq / 8) as i64;
        let file = (sq % 8) as i64;

        // White corners a1/h1, Black corners a8/h8.
        let d2_white = min_i64(
            file * file + rank * rank,
            (7 - file) * (7 - file) + rank * rank,
        );
        let d2_black = min_i64(
            file * file + (7 - rank) * (7 - rank),
            (7 - file) * (7 - file) + (7 - rank) * (7 - rank),
        );

        table[0][sq] = -round_sqrt(16 * d2_white);
        table[1][sq] = -round_sqrt(16 * d2_black);
        sq += 1;
    }
    table
};

const fn min_i64(a: i64, b: i64) -> i64 {
    if a < b { a } else { b }
}

/// Integer `round(sqrt(x))`.
const fn round_sqrt(x: i64) -> i32 {
    let mut n = 0i64;
    while (n + 1) * (n + 1) <= x {
        n += 1;
    }
    // Round up when x is past the midpoint between n^2 and (n+1)^2.
    if x - n * n > n { (n + 1) as i32 } else { n as i32 }
}

/// Midgame king placement, differenced between the sides.
pub fn king_placement(board: &Board, us: Color, progress: GameProgress) -> i32 {
    if progress != GameProgress::Midgame {
        return 0;
    }
    let ours = KING_TABLE[us.index()][board.king_square(us).index()];
    let theirs = KING_TABLE[!us as usize][board.king_square(!us).index()];
    ours - theirs
}
