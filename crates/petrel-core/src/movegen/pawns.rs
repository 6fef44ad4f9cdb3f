//! Pawn move generation: pushes, captures, promotions, en passant.

use crate::attacks::{bishop_attacks, line, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::chess_move::{Move, MoveFlag};
use crate::color::Color;
use crate::piece_type::PieceType;
use crate::square::Square;

use super::MoveList;

const PROMOTION_TARGETS: [PieceType; 4] = [
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
];

pub(super) fn gen_pawns<const NOISY: bool>(
    board: &Board,
    king_sq: Square,
    pinned: Bitboard,
    check_mask: Bitboard,
    in_check: bool,
    list: &mut MoveList,
) {
    let us = board.side_to_move();
    let them = !us;
    let enemy = board.side(them);
    let occupied = board.occupied();
    let empty = !occupied;
    let our_pawns = board.pieces_of(us, PieceType::Pawn);

    let forward = us.forward();
    let promo_rank = match us {
        Color::White => Bitboard::RANK_8,
        Color::Black => Bitboard::RANK_1,
    };

    // A pinned pawn may only move along the king-pin line.
    let pin_ok = |from: Square, to: Square| !pinned.contains(from) || line(king_sq, from).contains(to);

    let single = match us {
        Color::White => (our_pawns << 8) & empty,
        Color::Black => (our_pawns >> 8) & empty,
    };

    if !NOISY {
        for to in single & !promo_rank & check_mask {
            let from = Square::from_index_unchecked((to.index() as i8 - forward) as u8);
            if pin_ok(from, to) {
                list.push(Move::new(from, to, MoveFlag::Quiet));
            }
        }

        let double = match us {
            Color::White => (single << 8) & empty & Bitboard::RANK_4,
            Color::Black => (single >> 8) & empty & Bitboard::RANK_5,
        };
        for to in double & check_mask {
            let from = Square::from_index_unchecked((to.index() as i8 - 2 * forward) as u8);
            if pin_ok(from, to) {
                list.push(Move::new(from, to, MoveFlag::DoublePush));
            }
        }
    }

    // Promotion pushes count as noisy: they are generated in both modes.
    for to in single & promo_rank & check_mask {
        let from = Square::from_index_unchecked((to.index() as i8 - forward) as u8);
        if pin_ok(from, to) {
            for target in PROMOTION_TARGETS {
                list.push(Move::new(from, to, MoveFlag::promotion(target, false)));
            }
        }
    }

    for from in our_pawns {
        for to in pawn_attacks(us, from) & enemy & check_mask {
            if !pin_ok(from, to) {
                continue;
            }
            if promo_rank.contains(to) {
                for target in PROMOTION_TARGETS {
                    list.push(Move::new(from, to, MoveFlag::promotion(target, true)));
                }
            } else {
                list.push(Move::new(from, to, MoveFlag::Capture));
            }
        }
    }

    if let Some(ep) = board.en_passant() {
        // Our pawns that could capture toward the en-passant square.
        for from in pawn_attacks(them, ep) & our_pawns {
            let victim_index = match us {
                Color::White => ep.index() - 8,
                Color::Black => ep.index() + 8,
            };
            let victim_sq = Square::from_index_unchecked(victim_index as u8);

            // Under check the capture must take the checker or block the ray.
            if in_check && !check_mask.contains(ep) && !check_mask.contains(victim_sq) {
                continue;
            }

            if !pin_ok(from, ep) {
                continue;
            }

            // Two pawns leave their squares at once; re-test sliders against
            // the king with the post-capture occupancy to catch the rank
            // (and the rarer diagonal) discovered check.
            let after = (occupied ^ from.bb() ^ victim_sq.bb()) | ep.bb();
            let their_orthogonal =
                (board.pieces(PieceType::Rook) | board.pieces(PieceType::Queen)) & board.side(them);
            if (rook_attacks(king_sq, after) & their_orthogonal).any() {
                continue;
            }
            let their_diagonal =
                (board.pieces(PieceType::Bishop) | board.pieces(PieceType::Queen)) & board.side(them);
            if (bishop_attacks(king_sq, after) & their_diagonal).any() {
                continue;
            }

            list.push(Move::new(from, ep, MoveFlag::EnPassant));
        }
    }
}
