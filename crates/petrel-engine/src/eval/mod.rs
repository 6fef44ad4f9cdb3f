//! Static evaluation.
//!
//! [`evaluate`] returns centipawns from the side-to-move's perspective:
//! positive means the player about to move stands better. Every term is
//! computed for both sides and differenced, so the function stays
//! antisymmetric up to the White-only tempo bonus.

pub mod king;
pub mod material;
pub mod pawns;
pub mod rooks;

#[cfg(feature = "nnue")]
pub mod nnue;

use petrel_core::{Bitboard, Board, Color, PieceType};

/// Piece values in centipawns, indexed by [`PieceType::index()`].
///
/// The king's value doubles as the mate anchor: mate scores live in a band
/// just below it, and it bounds the search window.
pub const PIECE_VALUES: [i32; 6] = [100, 300, 305, 500, 900, 20_000];

/// The value of one piece type.
#[inline]
pub const fn piece_value(pt: PieceType) -> i32 {
    PIECE_VALUES[pt.index()]
}

/// Coarse game phase. Gates the tempo bonus, king placement, isolated pawn,
/// and passed pawn terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameProgress {
    Midgame,
    Endgame,
}

/// Non-king, non-pawn-promotion material for one side, in centipawns.
fn side_material(board: &Board, color: Color) -> i32 {
    PieceType::ALL[..5]
        .iter()
        .map(|&pt| board.pieces_of(color, pt).count() as i32 * piece_value(pt))
        .sum()
}

/// Endgame begins when both sides are down to 1300 centipawns of material.
pub fn game_progress(board: &Board) -> GameProgress {
    let white = side_material(board, Color::White);
    let black = side_material(board, Color::Black);
    if white <= 1300 && black <= 1300 {
        GameProgress::Endgame
    } else {
        GameProgress::Midgame
    }
}

/// Center occupancy: ±25 per occupied center square. In the midgame a king
/// on a center square is ignored, so an exposed king is not rewarded for the
/// very placement other terms punish; in the endgame king activity counts.
fn center_control(board: &Board, us: Color, progress: GameProgress) -> i32 {
    let mut score = 0;
    for sq in Bitboard::CENTER {
        let Some(piece) = board.piece_on(sq) else {
            continue;
        };
        if progress == GameProgress::Midgame && piece.piece_type() == PieceType::King {
            continue;
        }
        score += if piece.color() == us { 25 } else { -25 };
    }
    score
}

/// Check status: being in check costs 20, giving it earns 20. The second
/// half is nearly unreachable from a legal position but kept deliberately.
fn check_status(board: &Board, us: Color) -> i32 {
    let them = !us;
    let mut score = 0;
    if board.is_attacked(board.king_square(us), them) {
        score -= 20;
    }
    if board.is_attacked(board.king_square(them), us) {
        score += 20;
    }
    score
}

/// Full static evaluation, side-to-move relative.
pub fn evaluate(board: &Board) -> i32 {
    let us = board.side_to_move();
    let them = !us;
    let progress = game_progress(board);

    let mut score = side_material(board, us) - side_material(board, them);

    // First-move tempo, White's by right, meaningless once material thins out.
    if progress == GameProgress::Midgame {
        score += match us {
            Color::White => 15,
            Color::Black => -15,
        };
    }

    score += center_control(board, us, progress);
    score += material::knight_rim(board, us);
    score += material::bishop_pair(board, us);
    score += rooks::rook_terms(board, us);
    score += king::king_placement(board, us, progress);
    score += pawns::pawn_structure(board, us, progress);
    score += check_status(board, us);

    score
}
