//! King move and castling generation.

use crate::attacks::king_attacks;
use crate::board::Board;
use crate::castling::CastleRights;
use crate::chess_move::{Move, MoveFlag};
use crate::color::Color;
use crate::square::Square;

use super::MoveList;

pub(super) fn gen_king<const NOISY: bool>(
    board: &Board,
    king_sq: Square,
    in_check: bool,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let them = !us;
    let friendly = board.side(us);
    let enemy = board.side(them);
    // Sliders must see through the king when testing its escape squares.
    let occupied_sans_king = board.occupied() ^ king_sq.bb();

    let mut targets = king_attacks(king_sq) & !friendly;
    if NOISY {
        targets &= enemy;
    }
    for to in targets {
        if !board.is_attacked_with(to, them, occupied_sans_king) {
            let flag = if enemy.contains(to) {
                MoveFlag::Capture
            } else {
                MoveFlag::Quiet
            };
            list.push(Move::new(king_sq, to, flag));
        }
    }

    // Castling is quiet and never legal out of check.
    if NOISY || in_check {
        return;
    }

    let rights = board.castling();
    let occupied = board.occupied();

    // Transit and landing squares per color and wing. The long-castle b-file
    // square must be empty but may be attacked.
    let (home, f_sq, g_sq, d_sq, c_sq, b_sq) = match us {
        Color::White => (
            Square::E1,
            Square::F1,
            Square::G1,
            Square::D1,
            Square::C1,
            Square::B1,
        ),
        Color::Black => (
            Square::E8,
            Square::F8,
            Square::G8,
            Square::D8,
            Square::C8,
            Square::B8,
        ),
    };

    if rights.contains(CastleRights::short(us))
        && !occupied.contains(f_sq)
        && !occupied.contains(g_sq)
        && !board.is_attacked(f_sq, them)
        && !board.is_attacked(g_sq, them)
    {
        list.push(Move::new(home, g_sq, MoveFlag::CastleShort));
    }

    if rights.contains(CastleRights::long(us))
        && !occupied.contains(d_sq)
        && !occupied.contains(c_sq)
        && !occupied.contains(b_sq)
        && !board.is_attacked(d_sq, them)
        && !board.is_attacked(c_sq, them)
    {
        list.push(Move::new(home, c_sq, MoveFlag::CastleLong));
    }
}
