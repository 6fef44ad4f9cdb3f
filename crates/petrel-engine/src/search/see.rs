//! Static exchange evaluation: resolve the capture sequence on one square.
//!
//! Both sides recapture with their least valuable attacker until one runs
//! out; sliders revealed by a departing piece join the fray (x-rays); a king
//! may only recapture when the square is no longer defended. The result is
//! the net material swing from the initial mover's perspective.

use petrel_core::{
    Bitboard, Board, Color, Move, PieceType, Square, bishop_attacks, king_attacks, knight_attacks,
    pawn_attacks, rook_attacks,
};

use crate::eval::piece_value;

/// Captures with a SEE at or above this are "good" for ordering purposes.
pub const GOOD_CAPTURE_FLOOR: i32 = -100;

/// Every piece of either side attacking `sq` under the given occupancy.
fn attackers_to(board: &Board, sq: Square, occ: Bitboard) -> Bitboard {
    let knights = knight_attacks(sq) & board.pieces(PieceType::Knight);
    let kings = king_attacks(sq) & board.pieces(PieceType::King);
    let orthogonal = rook_attacks(sq, occ)
        & (board.pieces(PieceType::Rook) | board.pieces(PieceType::Queen));
    let diagonal = bishop_attacks(sq, occ)
        & (board.pieces(PieceType::Bishop) | board.pieces(PieceType::Queen));
    let white_pawns = pawn_attacks(Color::Black, sq)
        & board.pieces_of(Color::White, PieceType::Pawn);
    let black_pawns = pawn_attacks(Color::White, sq)
        & board.pieces_of(Color::Black, PieceType::Pawn);

    knights | kings | orthogonal | diagonal | white_pawns | black_pawns
}

/// The cheapest piece of `side` within `attackers`, if any.
fn least_valuable(
    board: &Board,
    attackers: Bitboard,
    side: Color,
) -> Option<(Square, PieceType)> {
    let candidates = attackers & board.side(side);
    for pt in PieceType::ALL {
        if let Some(sq) = (candidates & board.pieces(pt)).first() {
            return Some((sq, pt));
        }
    }
    None
}

/// Net material outcome of the exchange `mv` starts, in centipawns, from the
/// mover's point of view. Non-captures score the swap-off of moving to an
/// empty square (0 when unchallenged, negative when the mover hangs).
pub fn see(board: &Board, mv: Move) -> i32 {
    let from = mv.from();
    let to = mv.to();
    let mut occ = board.occupied();

    let first_victim = if mv.is_en_passant() {
        piece_value(PieceType::Pawn)
    } else {
        board.piece_type_on(to).map_or(0, piece_value)
    };

    // What ends up standing on the target square after the first capture.
    let mut occupant_value = match mv.promotion_target() {
        Some(target) => piece_value(target),
        None => board
            .piece_type_on(from)
            .map_or(piece_value(PieceType::Pawn), piece_value),
    };

    occ = occ.without(from);
    if mv.is_en_passant() {
        let victim_index = match board.side_to_move() {
            Color::White => to.index() - 8,
            Color::Black => to.index() + 8,
        };
        occ = occ.without(Square::from_index(victim_index as u8).expect("on-board"));
    }

    let mut attackers = attackers_to(board, to, occ) & occ;
    let mut side = !board.side_to_move();

    let mut gain = [0i32; 32];
    let mut depth = 0usize;
    gain[0] = first_victim;

    loop {
        let Some((sq, pt)) = least_valuable(board, attackers, side) else {
            break;
        };

        // The king may only wade in when nothing defends the square.
        if pt == PieceType::King && (attackers & board.side(!side)).any() {
            break;
        }

        depth += 1;
        if depth >= gain.len() {
            break;
        }
        gain[depth] = occupant_value - gain[depth - 1];

        occupant_value = piece_value(pt);
        occ = occ.without(sq);

        // A departing pawn, bishop, or queen can reveal a diagonal slider;
        // rook or queen, an orthogonal one.
        if matches!(pt, PieceType::Pawn | PieceType::Bishop | PieceType::Queen) {
            attackers |= bishop_attacks(to, occ)
                & (board.pieces(PieceType::Bishop) | board.pieces(PieceType::Queen));
        }
        if matches!(pt, PieceType::Rook | PieceType::Queen) {
            attackers |= rook_attacks(to, occ)
                & (board.pieces(PieceType::Rook) | board.pieces(PieceType::Queen));
        }
        attackers &= occ;

        side = !side;
    }

    // Resolve backwards: each side recaptures only when it profits.
    while depth > 0 {
        depth -= 1;
        gain[depth] = -((-gain[depth]).max(gain[depth + 1]));
    }

    gain[0]
}
