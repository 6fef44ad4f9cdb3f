//! Knight and slider move generation.

use crate::attacks::{bishop_attacks, knight_attacks, line, queen_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, MoveFlag};
use crate::piece_type::PieceType;
use crate::square::Square;

use super::MoveList;

pub(super) fn gen_knights<const NOISY: bool>(
    board: &Board,
    pinned: Bitboard,
    check_mask: Bitboard,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let friendly = board.side(us);
    let enemy = board.side(!us);

    for from in board.pieces_of(us, PieceType::Knight) {
        // A pinned knight never has a legal move: no knight jump stays on a line.
        if pinned.contains(from) {
            continue;
        }
        let mut targets = knight_attacks(from) & !friendly & check_mask;
        if NOISY {
            targets &= enemy;
        }
        push_all(list, from, targets, enemy);
    }
}

pub(super) fn gen_sliders<const NOISY: bool>(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    check_mask: Bitboard,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let friendly = board.side(us);
    let enemy = board.side(!us);
    let occupied = board.occupied();

    let kinds: [(PieceType, fn(Square, Bitboard) -> Bitboard); 3] = [
        (PieceType::Bishop, bishop_attacks),
        (PieceType::Rook, rook_attacks),
        (PieceType::Queen, queen_attacks),
    ];

    for (kind, attacks) in kinds {
        for from in board.pieces_of(us, kind) {
            let mut targets = attacks(from, occupied) & !friendly & check_mask;
            if pinned.contains(from) {
                targets &= line(king_sq, from);
            }
            if NOISY {
                targets &= enemy;
            }
            push_all(list, from, targets, enemy);
        }
    }
}

#[inline]
fn push_all(list: &mut MoveList, from: Square, targets: Bitboard, enemy: Bitboard) {
    for to in targets {
        let flag = if enemy.contains(to) {
            MoveFlag::Capture
        } else {
            MoveFlag::Quiet
        };
        list.push(Move::new(from, to, flag));
    }
}
