//! The root dispatcher.
//!
//! A dedicated thread owns the transposition table and consumes
//! [`SearchRequest`]s from a single-producer channel. Each request runs
//! iterative deepening over the root moves with aspiration windows and
//! optional MultiPV, fanning out to silent Lazy-SMP helpers that share the
//! table. Results flow back through two callbacks: one per completed
//! iteration, one final best move.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use petrel_core::{Board, Move, MoveList, generate_moves};

use crate::search::control::SearchControl;
use crate::search::negamax::{SearchContext, SearchInfo, alpha_beta};
use crate::search::ordering::MovePicker;
use crate::search::tt::TranspositionTable;
use crate::search::{MATE_THRESHOLD, MATE_VALUE, MAX_PLY, PV_WALK_LIMIT};

/// One search order for the dispatcher.
pub struct SearchRequest {
    pub board: Board,
    /// Zobrist hashes of every position the game passed through before
    /// `board`, for repetition detection.
    pub history: Vec<u64>,
    /// Number of principal variations to report (>= 1).
    pub multipv: usize,
    /// Transposition table size; a change reallocates the table.
    pub hash_mb: usize,
    /// Worker thread count for Lazy SMP.
    pub threads: usize,
    /// Wall-clock budget for this search.
    pub budget: Duration,
    /// Depth cap; negative means unbounded.
    pub target_depth: i32,
    /// Clear the table before searching.
    pub new_game: bool,
    /// Shut the dispatcher down instead of searching.
    pub quit: bool,
    /// Stop flag, shared with whoever may want to interrupt.
    pub stop: Arc<AtomicBool>,
}

impl SearchRequest {
    /// A plain depth-limited request with default settings.
    pub fn depth_limited(board: Board, depth: i32) -> SearchRequest {
        SearchRequest {
            board,
            history: Vec::new(),
            multipv: 1,
            hash_mb: 16,
            threads: 1,
            budget: crate::time::NO_DEADLINE,
            target_depth: depth,
            new_game: false,
            quit: false,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The shutdown sentinel.
    pub fn quit() -> SearchRequest {
        let mut req = SearchRequest::depth_limited(Board::startpos(), 0);
        req.quit = true;
        req
    }
}

/// One ranked root line.
#[derive(Debug, Clone)]
pub struct PvLine {
    /// The root move.
    pub mv: Move,
    /// Its score in centipawns (mate band near the king value).
    pub score: i32,
    /// Principal variation starting with `mv`.
    pub pv: Vec<Move>,
}

/// Everything a completed iteration reports.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub depth: i32,
    pub seldepth: usize,
    /// Nodes across all workers since the search began.
    pub nodes: u64,
    pub elapsed: Duration,
    /// Best lines, MultiPV-ordered (best first).
    pub lines: Vec<PvLine>,
}

/// Per-iteration callback.
pub type InfoSink = Box<dyn FnMut(&SearchOutcome) + Send>;

/// Final callback: best move and optional ponder move; `None` when the side
/// to move has no legal reply.
pub type BestMoveSink = Box<dyn FnMut(Option<Move>, Option<Move>) + Send>;

/// Handle owned by the front-end: submit requests, then shut down.
pub struct DispatcherHandle {
    tx: SyncSender<SearchRequest>,
    thread: Option<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// Queue a search. Returns false if the dispatcher is gone.
    pub fn submit(&self, request: SearchRequest) -> bool {
        self.tx.send(request).is_ok()
    }

    /// Send the quit sentinel and wait for the dispatcher to finish.
    pub fn shutdown(mut self) {
        let _ = self.tx.send(SearchRequest::quit());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// The dispatcher state living on its own thread.
pub struct Dispatcher {
    tt: TranspositionTable,
    hash_mb: usize,
    on_iteration: InfoSink,
    on_best_move: BestMoveSink,
}

impl Dispatcher {
    /// Start the dispatcher thread.
    pub fn spawn(
        hash_mb: usize,
        on_iteration: InfoSink,
        on_best_move: BestMoveSink,
    ) -> DispatcherHandle {
        let (tx, rx) = sync_channel::<SearchRequest>(1);
        let mut dispatcher = Dispatcher {
            tt: TranspositionTable::new(hash_mb),
            hash_mb,
            on_iteration,
            on_best_move,
        };
        let thread = std::thread::Builder::new()
            .name("petrel-search".into())
            .spawn(move || dispatcher.run(rx))
            .expect("search thread spawns");
        DispatcherHandle {
            tx,
            thread: Some(thread),
        }
    }

    fn run(&mut self, rx: Receiver<SearchRequest>) {
        while let Ok(request) = rx.recv() {
            if request.quit {
                break;
            }
            self.handle(request);
        }
        debug!("search dispatcher shutting down");
    }

    fn handle(&mut self, req: SearchRequest) {
        if req.hash_mb != self.hash_mb {
            self.tt = TranspositionTable::new(req.hash_mb);
            self.hash_mb = req.hash_mb;
        }
        if req.new_game {
            self.tt.clear();
        }

        let roots = generate_moves(&req.board);
        if roots.is_empty() {
            (self.on_best_move)(None, None);
            return;
        }
        if roots.len() == 1 {
            (self.on_best_move)(Some(roots[0]), None);
            return;
        }

        let control = SearchControl::new(Arc::clone(&req.stop), req.budget);
        let max_depth = if req.target_depth < 0 {
            MAX_PLY as i32 - 1
        } else {
            req.target_depth.clamp(1, MAX_PLY as i32 - 1)
        };

        let helper_count = req.threads.saturating_sub(1);
        let helper_nodes: Vec<AtomicU64> = (0..helper_count).map(|_| AtomicU64::new(0)).collect();

        // Split borrows: helpers share the table while the coordinator also
        // drives the info callback.
        let tt = &self.tt;
        let on_iteration = &mut self.on_iteration;

        let mut best = (roots[0], None);
        std::thread::scope(|scope| {
            for (index, counter) in helper_nodes.iter().enumerate() {
                let board = &req.board;
                let history = &req.history;
                let control = &control;
                scope.spawn(move || {
                    run_helper(index, tt, board, control, history, max_depth, counter);
                });
            }

            best = deepen(
                tt,
                on_iteration,
                &req,
                &roots,
                &control,
                max_depth,
                &helper_nodes,
            );

            // Helpers follow no clock of their own; wave them home.
            control.request_stop();
        });

        (self.on_best_move)(Some(best.0), best.1);
    }
}

/// The iterative-deepening loop on the coordinating thread.
fn deepen(
    tt: &TranspositionTable,
    on_iteration: &mut InfoSink,
    req: &SearchRequest,
    roots: &MoveList,
    control: &SearchControl,
    max_depth: i32,
    helper_nodes: &[AtomicU64],
) -> (Move, Option<Move>) {
    let root_draw = is_root_draw(&req.board, &req.history);
    let mut ctx = SearchContext::new(tt, control, req.history.clone());

    // Degrade path: should every iteration be cut short, still answer with
    // a legal move.
    let mut best_move = roots[0];
    let mut ponder = None;
    let mut prev_score = 0;
    let mut total_nodes: u64 = 0;

    for depth in 1..=max_depth {
        if depth > 1 && (control.stop_requested() || control.elapsed() > control.budget()) {
            break;
        }

        ctx.info = SearchInfo::new(depth);
        let mut lines = search_root(tt, req, roots, depth, prev_score, &mut ctx);

        // Anything computed after the stop observer fired is tainted.
        if depth > 1 && control.stop_requested() {
            break;
        }

        total_nodes += ctx.info.nodes;
        if root_draw {
            for line in &mut lines {
                line.score = 0;
            }
        }
        prev_score = lines[0].score;
        best_move = lines[0].mv;
        ponder = lines[0].pv.get(1).copied();

        let helper_total: u64 = helper_nodes.iter().map(|c| c.load(Ordering::Relaxed)).sum();
        let outcome = SearchOutcome {
            depth,
            seldepth: ctx.info.seldepth,
            nodes: total_nodes + helper_total,
            elapsed: control.elapsed(),
            lines,
        };
        on_iteration(&outcome);
    }

    (best_move, ponder)
}

/// One full depth: aspiration windows around the previous score, except on
/// the first iteration and in MultiPV mode, which use the full window.
fn search_root(
    tt: &TranspositionTable,
    req: &SearchRequest,
    roots: &MoveList,
    depth: i32,
    prev_score: i32,
    ctx: &mut SearchContext<'_>,
) -> Vec<PvLine> {
    if depth <= 1 || req.multipv > 1 || prev_score.abs() > MATE_THRESHOLD {
        return root_pass(tt, req, roots, depth, -MATE_VALUE, MATE_VALUE, ctx);
    }

    let mut below = aspiration_width(depth);
    let mut above = below;
    loop {
        let alpha = (prev_score - below).max(-MATE_VALUE);
        let beta = (prev_score + above).min(MATE_VALUE);
        let lines = root_pass(tt, req, roots, depth, alpha, beta, ctx);

        if ctx.control.stop_requested() || ctx.control.elapsed() > ctx.control.budget() {
            return lines;
        }

        let best = lines[0].score;
        if best <= alpha {
            below = below.saturating_mul(2);
        } else if best >= beta {
            above = above.saturating_mul(2);
        } else {
            return lines;
        }
    }
}

/// Search every root move once against the given window and rank the
/// results.
fn root_pass(
    tt: &TranspositionTable,
    req: &SearchRequest,
    roots: &MoveList,
    depth: i32,
    alpha0: i32,
    beta0: i32,
    ctx: &mut SearchContext<'_>,
) -> Vec<PvLine> {
    let board = &req.board;
    let hash_move = tt
        .probe(board.hash(), 0)
        .map_or(Move::NULL, |hit| hit.best_move);

    let mut picker = MovePicker::new(
        roots,
        board,
        hash_move,
        &ctx.killers,
        &ctx.history,
        board.side_to_move(),
        0,
    );

    let mut alpha = alpha0;
    let mut scored: Vec<(Move, i32)> = Vec::with_capacity(roots.len());

    ctx.visited.push(board.hash());
    let mut index = 0usize;
    while let Some(mv) = picker.next() {
        let child = board.make_move(mv);
        let score = if req.multipv > 1 {
            // Comparable scores need the same full window for everyone.
            -alpha_beta(&child, -beta0, -alpha0, depth - 1, 1, true, ctx)
        } else if index == 0 {
            -alpha_beta(&child, -beta0, -alpha, depth - 1, 1, true, ctx)
        } else {
            let trial = -alpha_beta(&child, -alpha - 1, -alpha, depth - 1, 1, true, ctx);
            if trial > alpha && trial < beta0 {
                -alpha_beta(&child, -beta0, -alpha, depth - 1, 1, true, ctx)
            } else {
                trial
            }
        };
        index += 1;
        scored.push((mv, score));

        if req.multipv == 1 {
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta0 {
                // Fail high at the root; the aspiration loop rewidens.
                break;
            }
        }
    }
    ctx.visited.pop();

    scored.sort_by_key(|&(_, score)| std::cmp::Reverse(score));
    scored
        .into_iter()
        .take(req.multipv.max(1))
        .map(|(mv, score)| PvLine {
            mv,
            score,
            pv: extract_pv(tt, board, mv, ctx.info.seldepth),
        })
        .collect()
}

/// Recover the principal variation by walking best moves out of the table,
/// vetting each against the legal moves of the position it is played in.
/// Bounded against cycles and clipped to the selective depth.
fn extract_pv(tt: &TranspositionTable, board: &Board, first: Move, seldepth: usize) -> Vec<Move> {
    let mut pv = vec![first];
    let mut position = board.make_move(first);

    for _ in 0..PV_WALK_LIMIT {
        if pv.len() >= seldepth.max(1) {
            break;
        }
        let Some(hit) = tt.probe(position.hash(), 0) else {
            break;
        };
        if hit.best_move.is_null() || !generate_moves(&position).contains(hit.best_move) {
            break;
        }
        pv.push(hit.best_move);
        position = position.make_move(hit.best_move);
    }

    pv
}

/// Silent Lazy-SMP helper: the same deepening loop, no reporting, no clock.
/// Divergence comes from the staggered start depth and timing jitter; the
/// shared table carries its findings to the main thread.
fn run_helper(
    index: usize,
    tt: &TranspositionTable,
    board: &Board,
    control: &SearchControl,
    history: &[u64],
    max_depth: i32,
    nodes: &AtomicU64,
) {
    let mut ctx = SearchContext::new(tt, control, history.to_vec());
    let mut total: u64 = 0;

    let first_depth = 1 + (index % 2) as i32;
    for depth in first_depth..=max_depth {
        if depth > 1 && control.stop_requested() {
            break;
        }
        ctx.info = SearchInfo::new(depth);
        let _ = alpha_beta(board, -MATE_VALUE, MATE_VALUE, depth, 0, true, &mut ctx);
        total += ctx.info.nodes;
        nodes.store(total, Ordering::Relaxed);
    }
}

/// Is the root position already drawn by rule? Threefold needs the position
/// to have stood twice before this occurrence.
fn is_root_draw(board: &Board, history: &[u64]) -> bool {
    if board.halfmove_clock() >= 100 || board.is_insufficient_material() {
        return true;
    }
    let hash = board.hash();
    history.iter().filter(|&&seen| seen == hash).count() >= 2
}

/// Initial aspiration half-width for an iteration: wide while shallow
/// results still wobble, tightening toward 25 as the score settles.
fn aspiration_width(depth: i32) -> i32 {
    let d = depth as f64;
    (-150.0 / (1.0 + (-(d - 1.0) / 3.0).exp()) + 175.0).round() as i32
}
