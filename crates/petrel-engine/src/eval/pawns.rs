//! Pawn structure: doubled, passed, and isolated pawns.

use petrel_core::{Bitboard, Board, Color, File, PieceType, Square};

use crate::eval::GameProgress;

/// Adjacent-file masks: file a gets b only, file h gets g only.
static NEIGHBOR_FILES: [Bitboard; 8] = {
    let mut table = [Bitboard::EMPTY; 8];
    let mut f = 0usize;
    while f < 8 {
        let mut bits = 0u64;
        if f > 0 {
            bits |= Bitboard::FILES[f - 1].bits();
        }
        if f < 7 {
            bits |= Bitboard::FILES[f + 1].bits();
        }
        table[f] = Bitboard::new(bits);
        f += 1;
    }
    table
};

/// For `[color][square]`: same and adjacent files, ranks strictly ahead of
/// the pawn. A pawn is passed when this mask holds no enemy pawn.
static FRONT_SPAN: [[Bitboard; 64]; 2] = {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0usize;
    while sq < 64 {
        let rank = sq / 8;
        let file = sq % 8;
        let span = Bitboard::FILES[file].bits() | NEIGHBOR_FILES[file].bits();

        let mut ahead_white = 0u64;
        let mut r = rank + 1;
        while r < 8 {
            ahead_white |= Bitboard::RANKS[r].bits();
            r += 1;
        }
        table[0][sq] = Bitboard::new(span & ahead_white);

        let mut ahead_black = 0u64;
        let mut r = 0usize;
        while r < rank {
            ahead_black |= Bitboard::RANKS[r].bits();
            r += 1;
        }
        table[1][sq] = Bitboard::new(span & ahead_black);

        sq += 1;
    }
    table
};

/// True when no enemy pawn stands ahead of `sq` on the same or an adjacent
/// file.
pub fn is_passed(sq: Square, color: Color, enemy_pawns: Bitboard) -> bool {
    (FRONT_SPAN[color.index()][sq.index()] & enemy_pawns).is_empty()
}

/// Full pawn-structure score for `us`, mirrored against the opponent.
pub fn pawn_structure(board: &Board, us: Color, progress: GameProgress) -> i32 {
    side_score(board, us, progress) - side_score(board, !us, progress)
}

fn side_score(board: &Board, color: Color, progress: GameProgress) -> i32 {
    let own = board.pieces_of(color, PieceType::Pawn);
    let enemy = board.pieces_of(!color, PieceType::Pawn);
    let mut score = 0;

    // Doubled pawns: every pawn beyond the first on a file costs 75.
    for file in File::ALL {
        let on_file = (Bitboard::file_bb(file) & own).count() as i32;
        if on_file > 1 {
            score -= (on_file - 1) * 75;
        }
    }

    for sq in own {
        if is_passed(sq, color, enemy) {
            match progress {
                GameProgress::Midgame => score += 30,
                GameProgress::Endgame => {
                    // Pawns start on their second rank; reward every rank
                    // gained beyond it.
                    let advanced = sq.relative_rank(color) as i32 - 1;
                    score += advanced * 50;
                }
            }
        }

        if progress == GameProgress::Midgame
            && (NEIGHBOR_FILES[sq.file().index()] & own).is_empty()
        {
            score -= 15;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::{is_passed, pawn_structure};
    use crate::eval::GameProgress;
    use petrel_core::{Board, Color, PieceType, Square};

    fn pawns(board: &Board, color: Color) -> petrel_core::Bitboard {
        board.pieces_of(color, PieceType::Pawn)
    }

    #[test]
    fn passed_pawn_detection() {
        // White pawn e5 vs black pawn d6: d6 is on an adjacent file ahead.
        let board: Board = "4k3/8/3p4/4P3/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(!is_passed(Square::E5, Color::White, pawns(&board, Color::Black)));
        // The black pawn is passed the other way: e5 is ahead of d6 for
        // Black on an adjacent file, so no.
        assert!(!is_passed(Square::D6, Color::Black, pawns(&board, Color::White)));

        // A pawn already past the enemy pawn's rank is passed.
        let board: Board = "4k3/8/8/4P3/3p4/8/8/4K3 w - - 0 1".parse().unwrap();
        assert!(is_passed(Square::E5, Color::White, pawns(&board, Color::Black)));
        assert!(is_passed(Square::D4, Color::Black, pawns(&board, Color::White)));
    }

    #[test]
    fn doubled_pawns_cost_75_each() {
        // Tripled pawns on the e-file: two extra pawns.
        let board: Board = "4k3/8/8/4P3/4P3/4P3/8/4K3 w - - 0 1".parse().unwrap();
        let score = pawn_structure(&board, Color::White, GameProgress::Midgame);
        // Three passed pawns (+90), two doubled (-150), all isolated (-45).
        assert_eq!(score, 90 - 150 - 45);
    }

    #[test]
    fn midgame_passed_bonus_is_flat() {
        let near: Board = "4k3/8/8/8/8/4P3/8/4K3 w - - 0 1".parse().unwrap();
        let far: Board = "4k3/8/4P3/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        // Wherever it stands, a midgame passer is worth the same 30.
        assert_eq!(
            pawn_structure(&near, Color::White, GameProgress::Midgame),
            pawn_structure(&far, Color::White, GameProgress::Midgame),
        );
    }

    #[test]
    fn endgame_passed_bonus_scales_with_advancement() {
        // Pawn on e3: one rank beyond its start, +50. Isolated costs nothing
        // in the endgame.
        let e3: Board = "4k3/8/8/8/8/4P3/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(pawn_structure(&e3, Color::White, GameProgress::Endgame), 50);

        // Pawn on e7: five ranks beyond its start.
        let e7: Board = "4k3/4P3/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(pawn_structure(&e7, Color::White, GameProgress::Endgame), 250);

        // A pawn still on its starting square earns nothing.
        let e2: Board = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(pawn_structure(&e2, Color::White, GameProgress::Endgame), 0);
    }

    #[test]
    fn isolated_pawns_midgame_only() {
        // e4 pawn with no neighbors: isolated (-15) and passed (+30).
        let board: Board = "4k3/8/8/8/4P3/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(
            pawn_structure(&board, Color::White, GameProgress::Midgame),
            30 - 15
        );

        // With a d-file neighbor, neither pawn is isolated.
        let board: Board = "4k3/8/8/8/3PP3/8/8/4K3 w - - 0 1".parse().unwrap();
        assert_eq!(
            pawn_structure(&board, Color::White, GameProgress::Midgame),
            60
        );
    }

    #[test]
    fn structure_is_differenced() {
        // Symmetric structures cancel exactly.
        let board = Board::startpos();
        assert_eq!(
            pawn_structure(&board, Color::White, GameProgress::Midgame),
            0
        );
        assert_eq!(
            pawn_structure(&board, Color::Black, GameProgress::Midgame),
            0
        );
    }
}
