//! Move ordering.
//!
//! Every move gets an integer key; the picker yields them by descending key
//! via selection sort. The key bands, highest first: hash move, promotions,
//! winning captures, en passant, killers, castling, plain quiets by history,
//! and losing captures at the bottom.

use petrel_core::{Board, Color, Move, MoveList, PieceType};

use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::see::{GOOD_CAPTURE_FLOOR, see};

/// The hash move outranks everything else.
pub const HASH_MOVE_KEY: i32 = 25_000;

/// Most-valuable-victim / least-valuable-attacker key for a capture.
#[inline]
pub fn mvv_lva(victim: PieceType, attacker: PieceType) -> i32 {
    100 * victim.index() as i32 + (5 - attacker.index() as i32)
}

/// Ordering key for one move.
#[allow(clippy::too_many_arguments)]
fn score_move(
    board: &Board,
    mv: Move,
    hash_move: Move,
    killers: Option<&KillerTable>,
    history: Option<&HistoryTable>,
    us: Color,
    ply: usize,
) -> i32 {
    if mv == hash_move {
        return HASH_MOVE_KEY;
    }

    if let Some(target) = mv.promotion_target() {
        return match target {
            PieceType::Queen => 8000,
            PieceType::Rook => 7000,
            PieceType::Bishop => 6000,
            _ => 5000,
        };
    }

    if mv.is_en_passant() {
        return 10;
    }

    if mv.is_capture() {
        let victim = board
            .piece_type_on(mv.to())
            .unwrap_or(PieceType::Pawn);
        let attacker = board
            .piece_type_on(mv.from())
            .unwrap_or(PieceType::Pawn);
        let key = mvv_lva(victim, attacker);
        return if see(board, mv) >= GOOD_CAPTURE_FLOOR {
            key + 10
        } else {
            key - 30_001
        };
    }

    if let Some(killers) = killers
        && killers.is_killer(us, ply, mv)
    {
        return 2;
    }

    if mv.is_castle() {
        return 1;
    }

    history.map_or(-30_000, |h| -30_000 + h.score(mv.from(), mv.to()))
}

/// Selection-sort move picker. Construction scores every move once; each
/// [`next`](MovePicker::next) pulls the best remaining one.
pub struct MovePicker {
    moves: [Move; 256],
    keys: [i32; 256],
    len: usize,
    cursor: usize,
    /// Yielding stops when the best remaining key drops below this.
    floor: i32,
}

impl MovePicker {
    /// Picker for the main search: yields every move.
    pub fn new(
        moves: &MoveList,
        board: &Board,
        hash_move: Move,
        killers: &KillerTable,
        history: &HistoryTable,
        us: Color,
        ply: usize,
    ) -> MovePicker {
        Self::build(moves, board, hash_move, Some(killers), Some(history), us, ply, i32::MIN)
    }

    /// Picker for quiescence: stops at the first losing capture, which also
    /// cuts everything ranked below it.
    pub fn new_quiescence(moves: &MoveList, board: &Board, hash_move: Move) -> MovePicker {
        Self::build(
            moves,
            board,
            hash_move,
            None,
            None,
            board.side_to_move(),
            0,
            0,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        moves: &MoveList,
        board: &Board,
        hash_move: Move,
        killers: Option<&KillerTable>,
        history: Option<&HistoryTable>,
        us: Color,
        ply: usize,
        floor: i32,
    ) -> MovePicker {
        let mut picker = MovePicker {
            moves: [Move::NULL; 256],
            keys: [0; 256],
            len: moves.len(),
            cursor: 0,
            floor,
        };
        for i in 0..moves.len() {
            picker.moves[i] = moves[i];
            picker.keys[i] = score_move(board, moves[i], hash_move, killers, history, us, ply);
        }
        picker
    }

    /// The best remaining move, or `None` once exhausted or below the floor.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Move> {
        if self.cursor >= self.len {
            return None;
        }

        let mut best = self.cursor;
        for i in (self.cursor + 1)..self.len {
            if self.keys[i] > self.keys[best] {
                best = i;
            }
        }

        if self.keys[best] < self.floor {
            return None;
        }

        self.moves.swap(self.cursor, best);
        self.keys.swap(self.cursor, best);
        let mv = self.moves[self.cursor];
        self.cursor += 1;
        Some(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::{HASH_MOVE_KEY, MovePicker, mvv_lva, score_move};
    use crate::search::heuristics::{HistoryTable, KillerTable};
    use petrel_core::{Board, Color, Move, MoveFlag, PieceType, Square, generate_moves};

    fn score_plain(board: &Board, mv: Move, hash_move: Move) -> i32 {
        score_move(board, mv, hash_move, None, None, board.side_to_move(), 0)
    }

    #[test]
    fn mvv_lva_prefers_big_victims_and_small_attackers() {
        // Pawn takes queen far outranks queen takes pawn.
        assert!(
            mvv_lva(PieceType::Queen, PieceType::Pawn) > mvv_lva(PieceType::Pawn, PieceType::Queen)
        );
        // Same victim: the lighter attacker goes first.
        assert!(
            mvv_lva(PieceType::Rook, PieceType::Pawn) > mvv_lva(PieceType::Rook, PieceType::Knight)
        );
        assert_eq!(mvv_lva(PieceType::Pawn, PieceType::Pawn), 5);
        assert_eq!(mvv_lva(PieceType::Queen, PieceType::Pawn), 405);
    }

    #[test]
    fn hash_move_is_always_first() {
        let board = Board::startpos();
        let moves = generate_moves(&board);
        let hash_move = moves[7];
        let killers = KillerTable::new();
        let history = HistoryTable::new();
        let mut picker =
            MovePicker::new(&moves, &board, hash_move, &killers, &history, Color::White, 0);
        assert_eq!(picker.next(), Some(hash_move));
    }

    #[test]
    fn key_bands() {
        // White pawn e4 can capture the d5 pawn (defended by nothing) or
        // push; a knight sits on b1.
        let board: Board = "4k3/8/8/3p4/4P3/8/8/1N2K3 w - - 0 1".parse().unwrap();

        let good_capture = Move::new(Square::E4, Square::D5, MoveFlag::Capture);
        let quiet = Move::new(Square::B1, Square::C3, MoveFlag::Quiet);
        assert!(score_plain(&board, good_capture, Move::NULL) > score_plain(&board, quiet, Move::NULL));
        // Pawn takes pawn, SEE fine: mvv_lva + 10.
        assert_eq!(score_plain(&board, good_capture, Move::NULL), 5 + 10);
        // A hash move beats it regardless.
        assert_eq!(score_plain(&board, good_capture, good_capture), HASH_MOVE_KEY);
    }

    #[test]
    fn promotion_keys_by_target() {
        let board: Board = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let scores: Vec<i32> = [
            PieceType::Queen,
            PieceType::Rook,
            PieceType::Bishop,
            PieceType::Knight,
        ]
        .into_iter()
        .map(|t| {
            score_plain(
                &board,
                Move::new(Square::A7, Square::A8, MoveFlag::promotion(t, false)),
                Move::NULL,
            )
        })
        .collect();
        assert_eq!(scores, vec![8000, 7000, 6000, 5000]);
    }

    #[test]
    fn losing_capture_sinks_below_quiets() {
        // Queen takes a pawn defended by a pawn: SEE is -800.
        let board: Board = "4k3/8/3p4/2p5/8/4Q3/8/4K3 w - - 0 1".parse().unwrap();
        let bad_capture = Move::new(Square::E3, Square::C5, MoveFlag::Capture);
        let quiet = Move::new(Square::E3, Square::E4, MoveFlag::Quiet);
        let bad = score_plain(&board, bad_capture, Move::NULL);
        assert_eq!(bad, mvv_lva(PieceType::Pawn, PieceType::Queen) - 30_001);
        assert!(bad < score_plain(&board, quiet, Move::NULL));
    }

    #[test]
    fn killer_beats_fresh_quiets() {
        let board = Board::startpos();
        let killer = Move::new(Square::G1, Square::F3, MoveFlag::Quiet);
        let mut killers = KillerTable::new();
        killers.store(Color::White, 3, killer);
        let history = HistoryTable::new();

        let key = score_move(
            &board,
            killer,
            Move::NULL,
            Some(&killers),
            Some(&history),
            Color::White,
            3,
        );
        assert_eq!(key, 2);

        let other = Move::new(Square::B1, Square::C3, MoveFlag::Quiet);
        let other_key = score_move(
            &board,
            other,
            Move::NULL,
            Some(&killers),
            Some(&history),
            Color::White,
            3,
        );
        assert!(key > other_key);
    }

    #[test]
    fn castling_scores_one() {
        let board: Board = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1"
            .parse()
            .unwrap();
        let castle = Move::new(Square::E1, Square::G1, MoveFlag::CastleShort);
        assert_eq!(score_plain(&board, castle, Move::NULL), 1);
    }

    #[test]
    fn en_passant_scores_ten() {
        let board: Board = "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1".parse().unwrap();
        let ep = Move::new(Square::E5, Square::D6, MoveFlag::EnPassant);
        assert_eq!(score_plain(&board, ep, Move::NULL), 10);
    }

    #[test]
    fn history_lifts_quiets_within_their_band() {
        let board = Board::startpos();
        let mut history = HistoryTable::new();
        let hot = Move::new(Square::G1, Square::F3, MoveFlag::Quiet);
        history.reward(hot.from(), hot.to(), 4);
        let killers = KillerTable::new();

        let hot_key = score_move(
            &board,
            hot,
            Move::NULL,
            Some(&killers),
            Some(&history),
            Color::White,
            0,
        );
        let cold = Move::new(Square::B1, Square::C3, MoveFlag::Quiet);
        let cold_key = score_move(
            &board,
            cold,
            Move::NULL,
            Some(&killers),
            Some(&history),
            Color::White,
            0,
        );
        assert_eq!(hot_key, -30_000 + 16);
        assert_eq!(cold_key, -30_000);
        assert!(hot_key > cold_key);
    }

    #[test]
    fn quiescence_picker_stops_before_losing_captures() {
        // One good capture (pawn takes knight) and one losing capture
        // (queen takes defended pawn).
        let board: Board = "4k3/8/3p4/2p1n3/3P4/4Q3/8/4K3 w - - 0 1".parse().unwrap();
        let moves = petrel_core::generate_captures(&board);
        let mut picker = MovePicker::new_quiescence(&moves, &board, Move::NULL);
        let mut yielded = Vec::new();
        while let Some(mv) = picker.next() {
            yielded.push(mv);
        }
        assert!(!yielded.is_empty());
        // Every yielded capture is non-losing; the queen grab of c5 stays
        // buried.
        for mv in &yielded {
            assert!(
                crate::search::see::see(&board, *mv) >= crate::search::see::GOOD_CAPTURE_FLOOR,
                "{mv} should not have been yielded"
            );
        }
    }

    #[test]
    fn picker_yields_everything_in_descending_key_order() {
        let board: Board = "r1bqkbnr/pppp1ppp/2n5/4p3/3PP3/8/PPP2PPP/RNBQKBNR b KQkq - 0 3"
            .parse()
            .unwrap();
        let moves = generate_moves(&board);
        let killers = KillerTable::new();
        let history = HistoryTable::new();
        let mut picker = MovePicker::new(
            &moves,
            &board,
            Move::NULL,
            &killers,
            &history,
            Color::Black,
            0,
        );
        let mut count = 0;
        let mut last_key = i32::MAX;
        while let Some(mv) = picker.next() {
            let key = score_move(
                &board,
                mv,
                Move::NULL,
                Some(&killers),
                Some(&history),
                Color::Black,
                0,
            );
            assert!(key <= last_key, "{mv} out of order");
            last_key = key;
            count += 1;
        }
        assert_eq!(count, moves.len());
    }
}
