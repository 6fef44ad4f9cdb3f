//! UCI command parsing.

use std::time::Duration;

use petrel_core::{Board, Move};
use petrel_engine::time::Clock;

use crate::error::UciError;

/// A parsed line of UCI input.
#[derive(Debug)]
pub enum Command {
    /// `uci`: identify and list options.
    Uci,
    /// `isready`: synchronization ping.
    IsReady,
    /// `ucinewgame`: forget the previous game.
    UciNewGame,
    /// `position ...`: the board to search, plus the Zobrist hashes of
    /// every position the move list passed through (for repetitions).
    Position {
        board: Board,
        history: Vec<u64>,
    },
    /// `setoption name <N> [value <V>]`.
    SetOption {
        name: String,
        value: String,
    },
    /// `go ...` with its clock parameters.
    Go(Clock),
    /// `stop`: abort the running search.
    Stop,
    /// `ponderhit`: the pondered move was played; the search keeps running
    /// on its clock.
    PonderHit,
    /// `quit`: shut the engine down.
    Quit,
    /// `show`: print the board (debug helper).
    Show,
    /// `eval`: print the static evaluation (debug helper).
    Eval,
    /// `see <move>`: print the static exchange score (debug helper).
    See {
        uci_move: String,
    },
    /// `perft <depth>`: movegen node count (debug helper).
    Perft {
        depth: u32,
    },
    /// Anything unrecognized; ignored per protocol.
    Unknown(String),
}

/// Parse one line of input.
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "ponderhit" => Ok(Command::PonderHit),
        "quit" => Ok(Command::Quit),
        "show" | "d" => Ok(Command::Show),
        "eval" | "evaluate" => Ok(Command::Eval),
        "position" => parse_position(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "see" => match tokens.get(1) {
            Some(&mv) => Ok(Command::See {
                uci_move: mv.to_string(),
            }),
            None => Ok(Command::Unknown(line.to_string())),
        },
        "perft" => {
            let depth = tokens
                .get(1)
                .and_then(|t| t.parse().ok())
                .unwrap_or(1);
            Ok(Command::Perft { depth })
        }
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

/// `position [startpos | fen <6 fields>] [moves <m>...]`
///
/// The returned history holds the hash of every position before each
/// played move, oldest first; the final board is the one to search.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let (mut board, rest): (Board, &[&str]) = match tokens.first() {
        Some(&"startpos") => (Board::startpos(), &tokens[1..]),
        Some(&"fen") => {
            if tokens.len() < 7 {
                return Err(UciError::MalformedPosition);
            }
            let fen = tokens[1..7].join(" ");
            let board = fen.parse().map_err(|source| UciError::InvalidFen {
                fen: fen.clone(),
                source,
            })?;
            (board, &tokens[7..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    let mut history = Vec::new();
    if let Some(&"moves") = rest.first() {
        for token in &rest[1..] {
            let mv = Move::parse_uci(token, &board)
                .filter(|&mv| petrel_core::generate_moves(&board).contains(mv))
                .ok_or_else(|| UciError::IllegalMove {
                    uci_move: token.to_string(),
                })?;
            history.push(board.hash());
            board = board.make_move(mv);
        }
    }

    Ok(Command::Position { board, history })
}

/// `setoption name <Name...> [value <Value...>]`
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.first() != Some(&"name") {
        return Err(UciError::MissingOptionName);
    }
    let value_at = tokens.iter().position(|&t| t == "value");
    let (name_tokens, value_tokens) = match value_at {
        Some(at) => (&tokens[1..at], &tokens[at + 1..]),
        None => (&tokens[1..], &[][..]),
    };
    if name_tokens.is_empty() {
        return Err(UciError::MissingOptionName);
    }
    Ok(Command::SetOption {
        name: name_tokens.join(" "),
        value: value_tokens.join(" "),
    })
}

fn parse_millis(value: &str, what: &'static str) -> Result<Duration, UciError> {
    // Some GUIs send negative clocks when flagging; floor them at zero.
    let ms: i64 = value.parse().map_err(|_| UciError::InvalidNumber {
        what,
        value: value.to_string(),
    })?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

/// `go [movetime N | wtime N btime N winc N binc N movestogo N | depth N |
/// infinite | ponder]`
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut clock = Clock::default();

    let mut iter = tokens.iter();
    while let Some(&token) = iter.next() {
        let mut next_value = |what: &'static str| -> Result<&str, UciError> {
            iter.next().copied().ok_or(UciError::InvalidNumber {
                what,
                value: String::new(),
            })
        };
        match token {
            "wtime" => clock.wtime = Some(parse_millis(next_value("wtime")?, "wtime")?),
            "btime" => clock.btime = Some(parse_millis(next_value("btime")?, "btime")?),
            "winc" => clock.winc = Some(parse_millis(next_value("winc")?, "winc")?),
            "binc" => clock.binc = Some(parse_millis(next_value("binc")?, "binc")?),
            "movetime" => clock.movetime = Some(parse_millis(next_value("movetime")?, "movetime")?),
            "movestogo" => {
                let raw = next_value("movestogo")?;
                clock.movestogo = Some(raw.parse().map_err(|_| UciError::InvalidNumber {
                    what: "movestogo",
                    value: raw.to_string(),
                })?);
            }
            "depth" => {
                let raw = next_value("depth")?;
                clock.depth = Some(raw.parse().map_err(|_| UciError::InvalidNumber {
                    what: "depth",
                    value: raw.to_string(),
                })?);
            }
            "infinite" => clock.infinite = true,
            "ponder" => clock.ponder = true,
            _ => {} // unsupported go parameters are skipped
        }
    }

    Ok(Command::Go(clock))
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_command};
    use std::time::Duration;

    #[test]
    fn bare_commands() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(
            parse_command("ucinewgame").unwrap(),
            Command::UciNewGame
        ));
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
        assert!(matches!(parse_command("show").unwrap(), Command::Show));
        assert!(matches!(parse_command("eval").unwrap(), Command::Eval));
    }

    #[test]
    fn unknown_and_empty_lines_pass_through() {
        assert!(matches!(
            parse_command("xyzzy").unwrap(),
            Command::Unknown(_)
        ));
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
        assert!(matches!(parse_command("   ").unwrap(), Command::Unknown(_)));
    }

    #[test]
    fn position_startpos() {
        let Command::Position { board, history } = parse_command("position startpos").unwrap()
        else {
            panic!("expected Position");
        };
        assert_eq!(board, petrel_core::Board::startpos());
        assert!(history.is_empty());
    }

    #[test]
    fn position_with_moves_collects_history() {
        let Command::Position { board, history } =
            parse_command("position startpos moves e2e4 e7e5 g1f3").unwrap()
        else {
            panic!("expected Position");
        };
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], petrel_core::Board::startpos().hash());
        assert_eq!(board.game_ply(), 3);
    }

    #[test]
    fn position_fen() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let line = format!("position fen {fen}");
        let Command::Position { board, .. } = parse_command(&line).unwrap() else {
            panic!("expected Position");
        };
        assert_eq!(board.to_string(), fen);
    }

    #[test]
    fn position_rejects_bad_input() {
        assert!(parse_command("position").is_err());
        assert!(parse_command("position fen no").is_err());
        assert!(parse_command("position startpos moves e2e5").is_err());
        assert!(parse_command("position startpos moves zzzz").is_err());
    }

    #[test]
    fn setoption_forms() {
        let Command::SetOption { name, value } =
            parse_command("setoption name Hash value 128").unwrap()
        else {
            panic!("expected SetOption");
        };
        assert_eq!(name, "Hash");
        assert_eq!(value, "128");

        let Command::SetOption { name, value } =
            parse_command("setoption name UCI_AnalyseMode value true").unwrap()
        else {
            panic!("expected SetOption");
        };
        assert_eq!(name, "UCI_AnalyseMode");
        assert_eq!(value, "true");

        assert!(parse_command("setoption value 3").is_err());
    }

    #[test]
    fn go_depth() {
        let Command::Go(clock) = parse_command("go depth 6").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(clock.depth, Some(6));
        assert!(!clock.infinite);
    }

    #[test]
    fn go_clock_parameters() {
        let Command::Go(clock) =
            parse_command("go wtime 300000 btime 290000 winc 2000 binc 2000 movestogo 35").unwrap()
        else {
            panic!("expected Go");
        };
        assert_eq!(clock.wtime, Some(Duration::from_secs(300)));
        assert_eq!(clock.btime, Some(Duration::from_millis(290_000)));
        assert_eq!(clock.winc, Some(Duration::from_secs(2)));
        assert_eq!(clock.movestogo, Some(35));
    }

    #[test]
    fn go_movetime_and_infinite() {
        let Command::Go(clock) = parse_command("go movetime 100").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(clock.movetime, Some(Duration::from_millis(100)));

        let Command::Go(clock) = parse_command("go infinite").unwrap() else {
            panic!("expected Go");
        };
        assert!(clock.infinite);
    }

    #[test]
    fn go_negative_clock_floors_to_zero() {
        let Command::Go(clock) = parse_command("go wtime -50 btime 1000").unwrap() else {
            panic!("expected Go");
        };
        assert_eq!(clock.wtime, Some(Duration::ZERO));
    }

    #[test]
    fn go_rejects_garbage_numbers() {
        assert!(parse_command("go depth x").is_err());
        assert!(parse_command("go wtime").is_err());
    }

    #[test]
    fn see_and_perft() {
        let Command::See { uci_move } = parse_command("see c3d5").unwrap() else {
            panic!("expected See");
        };
        assert_eq!(uci_move, "c3d5");

        let Command::Perft { depth } = parse_command("perft 4").unwrap() else {
            panic!("expected Perft");
        };
        assert_eq!(depth, 4);
    }
}
