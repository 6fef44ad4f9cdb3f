//! UCI protocol errors.
//!
//! These never abort the engine: the event loop logs them and keeps
//! reading, per the protocol's forgiveness rule.

/// Failures while interpreting a UCI command line.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// `position` without `startpos` or `fen`.
    #[error("position command needs startpos or fen")]
    MalformedPosition,

    /// The FEN in a `position` command did not parse.
    #[error("invalid FEN \"{fen}\": {source}")]
    InvalidFen {
        /// The offending FEN text.
        fen: String,
        /// Why the core rejected it.
        source: petrel_core::FenError,
    },

    /// A move token in a `position` command is not legal in its position.
    #[error("illegal move \"{uci_move}\" in position command")]
    IllegalMove {
        /// The offending move text.
        uci_move: String,
    },

    /// `setoption` without a name.
    #[error("setoption needs a name")]
    MissingOptionName,

    /// A numeric parameter failed to parse.
    #[error("invalid value \"{value}\" for {what}")]
    InvalidNumber {
        /// What was being parsed ("depth", "wtime", ...).
        what: &'static str,
        /// The offending text.
        value: String,
    },
}
