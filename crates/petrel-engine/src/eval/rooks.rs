//! Rook terms: the seventh rank and file pawn structure.

use petrel_core::{Bitboard, Board, Color, PieceType};

/// Rook on the opponent's second rank (+30) and the file term, both
/// differenced between the sides.
pub fn rook_terms(board: &Board, us: Color) -> i32 {
    side_score(board, us) - side_score(board, !us)
}

fn side_score(board: &Board, color: Color) -> i32 {
    let rooks = board.pieces_of(color, PieceType::Rook);
    let own_pawns = board.pieces_of(color, PieceType::Pawn);
    let enemy_pawns = board.pieces_of(!color, PieceType::Pawn);

    let mut score = 0;

    // Relative rank 7: the rank enemy pawns start on.
    let seventh = match color {
        Color::White => Bitboard::RANK_7,
        Color::Black => Bitboard::RANK_2,
    };
    score += (rooks & seventh).count() as i32 * 30;

    // File term, sign preserved from the original system: a rook whose file
    // holds enemy pawns costs its own side 5, and 5 more when its own pawns
    // crowd the file too.
    for rook_sq in rooks {
        let file = Bitboard::file_bb(rook_sq.file());
        if (file & enemy_pawns).any() {
            score -= 5;
            if (file & own_pawns).any() {
                score -= 5;
            }
        }
    }

    score
}
