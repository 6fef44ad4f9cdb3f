//! The UCI event loop.
//!
//! One thread reads stdin, the search dispatcher lives on another, and this
//! loop multiplexes both over a single channel. All protocol output goes to
//! stdout; logging goes through `tracing` (stderr) so the two never mix.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use tracing::{debug, info, warn};

use petrel_core::{Board, Move, divide};
use petrel_engine::time::{Clock, budget};
use petrel_engine::{
    Dispatcher, DispatcherHandle, SearchOutcome, SearchRequest, evaluate, see,
};

use crate::command::{Command, parse_command};
use crate::error::UciError;

const ENGINE_NAME: &str = "petrel";
const ENGINE_AUTHOR: &str = "the petrel authors";

const DEFAULT_HASH_MB: usize = 64;

/// Per-request lifecycle: searching positions come back to idle through the
/// bestmove emission, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle,
    Searching,
}

/// Option state mirrored from `setoption`.
struct Options {
    hash_mb: usize,
    multipv: usize,
    threads: usize,
    analyse_mode: bool,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            hash_mb: DEFAULT_HASH_MB,
            multipv: 1,
            threads: 1,
            analyse_mode: false,
        }
    }
}

/// Everything the event loop reacts to.
enum EngineEvent {
    Command(Result<Command, UciError>),
    Iteration(SearchOutcome),
    SearchDone(Option<Move>, Option<Move>),
    InputClosed,
}

/// The engine front-end: board state, options, and the search dispatcher.
pub struct UciEngine {
    board: Board,
    history: Vec<u64>,
    options: Options,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    new_game: bool,
}

impl UciEngine {
    pub fn new() -> UciEngine {
        UciEngine {
            board: Board::startpos(),
            history: Vec::new(),
            options: Options::default(),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            new_game: false,
        }
    }

    /// Run until `quit` or stdin closes. Returns cleanly in both cases.
    pub fn run(mut self) {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        // stdin reader thread
        let input_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                debug!(line = trimmed, "uci input");
                if input_tx
                    .send(EngineEvent::Command(parse_command(trimmed)))
                    .is_err()
                {
                    break;
                }
            }
            let _ = input_tx.send(EngineEvent::InputClosed);
        });

        // Search dispatcher with callbacks feeding the same event queue.
        let info_tx = tx.clone();
        let done_tx = tx.clone();
        let dispatcher = Dispatcher::spawn(
            self.options.hash_mb,
            Box::new(move |outcome: &SearchOutcome| {
                let _ = info_tx.send(EngineEvent::Iteration(outcome.clone()));
            }),
            Box::new(move |best, ponder| {
                let _ = done_tx.send(EngineEvent::SearchDone(best, ponder));
            }),
        );

        for event in &rx {
            match event {
                EngineEvent::Command(Ok(command)) => {
                    if !self.handle_command(command, &dispatcher, &rx) {
                        break;
                    }
                }
                EngineEvent::Command(Err(error)) => {
                    // Protocol errors are logged and life goes on; the board
                    // keeps its previous state.
                    warn!(%error, "ignoring command");
                }
                EngineEvent::Iteration(outcome) => print_iteration(&outcome),
                EngineEvent::SearchDone(best, ponder) => {
                    print_best_move(best, ponder);
                    self.state = EngineState::Idle;
                }
                EngineEvent::InputClosed => break,
            }
        }

        self.abort_search(&rx);
        dispatcher.shutdown();
        info!("petrel exiting");
    }

    /// Dispatch one command. Returns false to terminate the loop.
    fn handle_command(
        &mut self,
        command: Command,
        dispatcher: &DispatcherHandle,
        rx: &mpsc::Receiver<EngineEvent>,
    ) -> bool {
        match command {
            Command::Uci => {
                println!("id name {ENGINE_NAME}");
                println!("id author {ENGINE_AUTHOR}");
                println!("option name Hash type spin default {DEFAULT_HASH_MB} min 1 max 65535");
                println!("option name MultiPV type spin default 1 min 1 max 255");
                println!("option name Threads type spin default 1 min 1 max 256");
                println!("option name UCI_AnalyseMode type check default false");
                println!("uciok");
            }
            Command::IsReady => println!("readyok"),
            Command::UciNewGame => {
                self.board = Board::startpos();
                self.history.clear();
                self.new_game = true;
            }
            Command::Position { board, history } => {
                if self.state == EngineState::Searching {
                    warn!("position while searching, ignored");
                } else {
                    self.board = board;
                    self.history = history;
                }
            }
            Command::SetOption { name, value } => self.set_option(&name, &value),
            Command::Go(clock) => self.start_search(clock, dispatcher),
            Command::Stop => self.stop_flag.store(true, Ordering::Relaxed),
            Command::PonderHit => {
                // Pondering runs on an open clock; the move landing changes
                // nothing the dispatcher needs to hear about.
                debug!("ponderhit");
            }
            Command::Quit => {
                self.abort_search(rx);
                return false;
            }
            Command::Show => {
                println!("{}", self.board.render());
                println!("fen: {}", self.board);
            }
            Command::Eval => {
                println!("static evaluation: {} cp", evaluate(&self.board));
            }
            Command::See { uci_move } => match Move::parse_uci(&uci_move, &self.board) {
                Some(mv) => println!("see {}: {}", mv, see(&self.board, mv)),
                None => warn!(mv = %uci_move, "unparseable move for see"),
            },
            Command::Perft { depth } => {
                let start = std::time::Instant::now();
                let split = divide(&self.board, depth);
                let mut total = 0u64;
                for (mv, nodes) in &split {
                    println!("{mv}: {nodes}");
                    total += nodes;
                }
                println!("nodes {total} time {} ms", start.elapsed().as_millis());
            }
            Command::Unknown(token) => debug!(token = %token, "unknown command"),
        }
        true
    }

    fn set_option(&mut self, name: &str, value: &str) {
        match name {
            "Hash" => match value.parse::<usize>() {
                Ok(mb) => self.options.hash_mb = mb.clamp(1, 65_535),
                Err(_) => warn!(value, "bad Hash value"),
            },
            "MultiPV" => match value.parse::<usize>() {
                Ok(n) => self.options.multipv = n.clamp(1, 255),
                Err(_) => warn!(value, "bad MultiPV value"),
            },
            "Threads" => match value.parse::<usize>() {
                Ok(n) => self.options.threads = n.clamp(1, 256),
                Err(_) => warn!(value, "bad Threads value"),
            },
            "UCI_AnalyseMode" => {
                // Accepted for GUI compatibility; nothing is keyed off it.
                self.options.analyse_mode = value.eq_ignore_ascii_case("true");
                debug!(analyse = self.options.analyse_mode, "analyse mode set");
            }
            other => warn!(option = other, "unknown option"),
        }
    }

    fn start_search(&mut self, clock: Clock, dispatcher: &DispatcherHandle) {
        if self.state == EngineState::Searching {
            warn!("go while already searching, ignored");
            return;
        }

        // A fresh flag per search: a stale `stop` can never leak into the
        // next request.
        self.stop_flag = Arc::new(AtomicBool::new(false));

        let request = SearchRequest {
            board: self.board,
            history: self.history.clone(),
            multipv: self.options.multipv,
            hash_mb: self.options.hash_mb,
            threads: self.options.threads,
            budget: budget(&clock, self.board.side_to_move(), self.board.game_ply()),
            target_depth: clock.depth.unwrap_or(-1),
            new_game: std::mem::take(&mut self.new_game),
            quit: false,
            stop: Arc::clone(&self.stop_flag),
        };

        if dispatcher.submit(request) {
            self.state = EngineState::Searching;
        } else {
            warn!("search dispatcher unavailable");
        }
    }

    /// Stop a running search and drain events until its bestmove lands.
    fn abort_search(&mut self, rx: &mpsc::Receiver<EngineEvent>) {
        if self.state != EngineState::Searching {
            return;
        }
        self.stop_flag.store(true, Ordering::Relaxed);
        for event in rx {
            match event {
                EngineEvent::Iteration(outcome) => print_iteration(&outcome),
                EngineEvent::SearchDone(best, ponder) => {
                    print_best_move(best, ponder);
                    self.state = EngineState::Idle;
                    return;
                }
                _ => {}
            }
        }
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a score for `info`: centipawns, or moves-to-mate inside the mate
/// band.
fn div_ceil_i32(lhs: i32, rhs: i32) -> i32 {
    let d = lhs / rhs;
    let r = lhs % rhs;
    if (r > 0 && rhs > 0) || (r < 0 && rhs < 0) {
        d + 1
    } else {
        d
    }
}

fn score_string(score: i32) -> String {
    use petrel_engine::search::{MATE_THRESHOLD, MATE_VALUE};
    if score > MATE_THRESHOLD {
        let plies = MATE_VALUE - score;
        format!("mate {}", div_ceil_i32(plies, 2))
    } else if score < -MATE_THRESHOLD {
        let plies = MATE_VALUE + score;
        format!("mate -{}", div_ceil_i32(plies, 2))
    } else {
        format!("cp {score}")
    }
}

fn print_iteration(outcome: &SearchOutcome) {
    let millis = outcome.elapsed.as_millis().max(1);
    let nps = outcome.nodes as u128 * 1000 / millis;
    for (rank, line) in outcome.lines.iter().enumerate() {
        let pv: Vec<String> = line.pv.iter().map(|m| m.uci()).collect();
        println!(
            "info depth {} seldepth {} score {} nodes {} time {} nps {} multipv {} pv {}",
            outcome.depth,
            outcome.seldepth,
            score_string(line.score),
            outcome.nodes,
            millis,
            nps,
            rank + 1,
            pv.join(" "),
        );
    }
}

fn print_best_move(best: Option<Move>, ponder: Option<Move>) {
    match (best, ponder) {
        (Some(best), Some(ponder)) => println!("bestmove {} ponder {}", best.uci(), ponder.uci()),
        (Some(best), None) => println!("bestmove {}", best.uci()),
        (None, _) => println!("bestmove 0000"),
    }
}
