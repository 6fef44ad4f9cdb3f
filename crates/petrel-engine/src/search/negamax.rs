//! Negamax alpha-beta with principal variation search, and the quiescence
//! tail that settles captures before a leaf is trusted.

use petrel_core::{Board, Move, PieceType, generate_captures, generate_moves};

use crate::eval::{GameProgress, evaluate, game_progress, piece_value};
use crate::search::control::SearchControl;
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::ordering::MovePicker;
use crate::search::tt::{Flag, TranspositionTable};
use crate::search::{MATE_VALUE, MAX_PLY};

/// Reverse futility margin per ply of remaining depth.
const RFP_MARGIN: i32 = 120;

/// Depth ceiling for reverse futility pruning.
const RFP_MAX_DEPTH: i32 = 8;

/// Quiescence delta pruning margin.
const DELTA_MARGIN: i32 = 200;

/// Per-iteration counters, one set per worker.
pub struct SearchInfo {
    /// The iterative-deepening depth this iteration was started at.
    pub starting_depth: i32,
    /// Nodes entered, alpha-beta and quiescence both.
    pub nodes: u64,
    /// Deepest ply touched.
    pub seldepth: usize,
}

impl SearchInfo {
    pub fn new(starting_depth: i32) -> SearchInfo {
        SearchInfo {
            starting_depth,
            nodes: 0,
            seldepth: 0,
        }
    }
}

/// Worker-local search state threaded through the recursion.
pub struct SearchContext<'a> {
    /// Shared transposition table.
    pub tt: &'a TranspositionTable,
    /// Shared stop flag and clock.
    pub control: &'a SearchControl,
    /// Killer slots, this worker's only.
    pub killers: KillerTable,
    /// Butterfly history, this worker's only.
    pub history: HistoryTable,
    /// Hashes of every position on the path here: game history first, then
    /// the search path. Repetition detection scans this backwards.
    pub visited: Vec<u64>,
    /// Counters for the current iteration.
    pub info: SearchInfo,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        tt: &'a TranspositionTable,
        control: &'a SearchControl,
        game_history: Vec<u64>,
    ) -> SearchContext<'a> {
        SearchContext {
            tt,
            control,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            visited: game_history,
            info: SearchInfo::new(1),
        }
    }

    /// Twofold repetition against the path and game history, scanned no
    /// further back than the fifty-move clock allows.
    fn is_repetition(&self, board: &Board) -> bool {
        let lookback = (board.halfmove_clock() as usize).min(self.visited.len());
        let hash = board.hash();
        self.visited
            .iter()
            .rev()
            .take(lookback)
            .any(|&seen| seen == hash)
    }
}

/// The threshold for "enough material to try a null move": any non-pawn
/// piece besides the king.
fn has_non_pawn_material(board: &Board) -> bool {
    let us = board.side_to_move();
    (board.pieces_of(us, PieceType::Knight)
        | board.pieces_of(us, PieceType::Bishop)
        | board.pieces_of(us, PieceType::Rook)
        | board.pieces_of(us, PieceType::Queen))
    .any()
}

/// Ordered-move index past which late-move reductions kick in. Shrinks as
/// the iteration deepens.
pub fn lmr_threshold(starting_depth: i32) -> usize {
    let sigmoid = 6.0 / (1.0 + (starting_depth as f64 / 4.0).exp());
    sigmoid.round() as usize + 3
}

/// Reduction in plies for the `index`-th ordered move at `depth`.
fn lmr_reduction(index: usize, threshold: usize, depth: i32) -> i32 {
    let moves_past = (index - threshold + 1) as f64;
    (moves_past.ln() * (depth as f64).ln()).round() as i32
}

/// Negamax alpha-beta. Fail-hard: the return value is clamped to the
/// window. `allow_null` forbids back-to-back null moves.
pub fn alpha_beta(
    board: &Board,
    mut alpha: i32,
    mut beta: i32,
    depth: i32,
    ply: usize,
    allow_null: bool,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.info.nodes += 1;
    if ply > ctx.info.seldepth {
        ctx.info.seldepth = ply;
    }

    if ctx.control.is_stopping(ctx.info.starting_depth, ctx.info.nodes) {
        return 0;
    }

    if ply >= MAX_PLY {
        return evaluate(board);
    }

    let is_pv = beta - alpha > 1;

    // Terminal checks, mate before the draw rules: a mate delivered on the
    // move that also reaches the fifty-move mark is still a mate.
    // Generating up front makes mate and stalemate exact at every node.
    let moves = generate_moves(board);
    let in_check = board.in_check();
    if moves.is_empty() {
        return if in_check {
            -(MATE_VALUE - ply as i32)
        } else {
            0
        };
    }

    if board.halfmove_clock() >= 100
        || board.is_insufficient_material()
        || ctx.is_repetition(board)
    {
        return 0;
    }

    // Mate-distance pruning: even a mate here cannot beat a shorter one
    // already found.
    let mate_value = MATE_VALUE - ply as i32;
    alpha = alpha.max(-mate_value);
    beta = beta.min(mate_value - 1);
    if alpha >= beta {
        return alpha;
    }

    let mut depth = depth;
    if in_check {
        depth += 1;
    }

    let mut hash_move = Move::NULL;
    if let Some(hit) = ctx.tt.probe(board.hash(), ply) {
        hash_move = hit.best_move;
        if hit.depth as i32 >= depth {
            match hit.flag {
                Flag::Exact => return hit.score,
                Flag::Lower => alpha = alpha.max(hit.score),
                Flag::Upper => beta = beta.min(hit.score),
                Flag::None => {}
            }
            if alpha >= beta {
                return hit.score;
            }
        }
    }

    if depth <= 0 {
        return quiesce(board, alpha, beta, depth - 1, ply, ctx);
    }

    let static_eval = evaluate(board);

    // Reverse futility: far enough above beta that a quiet reply keeps us
    // there.
    if !is_pv
        && !in_check
        && depth <= RFP_MAX_DEPTH
        && static_eval - RFP_MARGIN * depth >= beta
    {
        return static_eval;
    }

    // Null move: hand over the turn; if the opponent cannot get back below
    // beta even moving twice in a row, the node is a cutoff.
    if allow_null
        && !is_pv
        && !in_check
        && depth >= 2
        && static_eval >= beta
        && has_non_pawn_material(board)
    {
        let reduction = 3 + (depth - 2) / 4;
        let null_board = board.make_null_move();
        ctx.visited.push(board.hash());
        let score = -alpha_beta(
            &null_board,
            -beta,
            -beta + 1,
            depth - 1 - reduction,
            ply + 1,
            false,
            ctx,
        );
        ctx.visited.pop();
        if score >= beta {
            return beta;
        }
    }

    let us = board.side_to_move();
    let threshold = lmr_threshold(ctx.info.starting_depth);
    let original_alpha = alpha;
    let mut best_move = Move::NULL;
    let mut picker = MovePicker::new(
        &moves,
        board,
        hash_move,
        &ctx.killers,
        &ctx.history,
        us,
        ply,
    );

    ctx.visited.push(board.hash());
    let mut index = 0usize;
    while let Some(mv) = picker.next() {
        let i = index;
        index += 1;
        let child = board.make_move(mv);

        // Late-move reduction: probe late quiet moves at reduced depth with
        // a null window; ones that fail low are dropped without a re-search.
        if moves.len() > 1 && depth >= 2 && i > threshold && mv.is_quiet() {
            let reduced = depth - 1 - lmr_reduction(i, threshold, depth);
            let probe = -alpha_beta(&child, -alpha - 1, -alpha, reduced, ply + 1, true, ctx);
            if probe <= alpha {
                continue;
            }
        }

        // Principal variation search: the expected-best move gets the full
        // window, the rest must first beat alpha in a null window.
        let score = if i == 0 || mv == hash_move || hash_move.is_null() {
            -alpha_beta(&child, -beta, -alpha, depth - 1, ply + 1, true, ctx)
        } else {
            let trial = -alpha_beta(&child, -alpha - 1, -alpha, depth - 1, ply + 1, true, ctx);
            if alpha < trial && trial < beta {
                -alpha_beta(&child, -beta, -alpha, depth - 1, ply + 1, true, ctx)
            } else {
                trial
            }
        };

        if score >= beta {
            best_move = mv;
            alpha = beta;
            if mv.is_quiet() {
                ctx.killers.store(us, ply, mv);
                ctx.history.reward(mv.from(), mv.to(), depth);
            }
            break;
        }
        if score > alpha {
            alpha = score;
            best_move = mv;
        }
    }
    ctx.visited.pop();

    if !ctx.control.is_stopping(ctx.info.starting_depth, ctx.info.nodes) {
        let flag = if alpha <= original_alpha {
            Flag::Upper
        } else if alpha >= beta {
            Flag::Lower
        } else {
            Flag::Exact
        };
        ctx.tt
            .store(board.hash(), depth as i16, alpha, best_move, flag, ply);
    }

    alpha
}

/// Quiescence: stand pat or keep capturing until the position is quiet.
pub(crate) fn quiesce(
    board: &Board,
    mut alpha: i32,
    beta: i32,
    depth: i32,
    ply: usize,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.info.nodes += 1;
    if ply > ctx.info.seldepth {
        ctx.info.seldepth = ply;
    }

    if ctx.control.is_stopping(ctx.info.starting_depth, ctx.info.nodes) {
        return 0;
    }

    if ply >= MAX_PLY {
        return evaluate(board);
    }

    let stand_pat = evaluate(board);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    // The table move is only an ordering hint down here.
    let hash_move = ctx
        .tt
        .probe(board.hash(), ply)
        .map_or(Move::NULL, |hit| hit.best_move);

    let captures = generate_captures(board);
    if captures.is_empty() {
        return alpha;
    }

    let progress = game_progress(board);
    let mut picker = MovePicker::new_quiescence(&captures, board, hash_move);

    while let Some(mv) = picker.next() {
        // Delta pruning: if even banking the victim plus a margin cannot
        // reach alpha, skip. Endgames are exempt: down there a capture can
        // swing the game beyond any margin.
        if progress != GameProgress::Endgame {
            let victim_value = if mv.is_en_passant() {
                piece_value(PieceType::Pawn)
            } else {
                board.piece_type_on(mv.to()).map_or(0, piece_value)
            };
            if stand_pat + victim_value + DELTA_MARGIN < alpha {
                continue;
            }
        }

        let child = board.make_move(mv);
        let score = -quiesce(&child, -beta, -alpha, depth - 1, ply + 1, ctx);
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}
