//! Error types for FEN parsing and board validation.

/// Errors from parsing a FEN string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    /// The string does not have exactly 6 whitespace-separated fields.
    #[error("expected 6 FEN fields, found {found}")]
    FieldCount {
        /// Number of fields found.
        found: usize,
    },
    /// The placement section does not describe exactly 8 ranks.
    #[error("expected 8 ranks in piece placement, found {found}")]
    RankCount {
        /// Number of ranks found.
        found: usize,
    },
    /// A placement rank covers more or fewer than 8 files.
    #[error("rank {rank} of the piece placement covers {files} files")]
    RankWidth {
        /// One-based rank number as written in the FEN (8 first).
        rank: usize,
        /// Number of files the rank covered.
        files: usize,
    },
    /// An unknown character in the piece placement.
    #[error("invalid piece character '{character}'")]
    InvalidPiece {
        /// The offending character.
        character: char,
    },
    /// The side-to-move field is neither `w` nor `b`.
    #[error("invalid side to move \"{found}\"")]
    InvalidSideToMove {
        /// The offending field.
        found: String,
    },
    /// An unknown character in the castling field.
    #[error("invalid castling character '{character}'")]
    InvalidCastling {
        /// The offending character.
        character: char,
    },
    /// The en-passant field is neither `-` nor a square.
    #[error("invalid en passant square \"{found}\"")]
    InvalidEnPassant {
        /// The offending field.
        found: String,
    },
    /// A move counter failed to parse as a number.
    #[error("invalid {field} \"{found}\"")]
    InvalidCounter {
        /// Which counter ("halfmove clock" or "fullmove number").
        field: &'static str,
        /// The offending field.
        found: String,
    },
    /// The described position fails structural validation.
    #[error("invalid board: {source}")]
    InvalidBoard {
        /// The underlying validation failure.
        #[from]
        source: BoardError,
    },
}

/// Structural problems with a board position.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// A side does not have exactly one king.
    #[error("{color} must have exactly 1 king, found {count}")]
    KingCount {
        /// The side in question.
        color: &'static str,
        /// How many kings it has.
        count: u32,
    },
    /// Pawns stand on rank 1 or rank 8.
    #[error("pawns on a back rank")]
    PawnsOnBackRank,
    /// Two piece-type bitboards claim the same square.
    #[error("piece bitboards overlap")]
    OverlappingPieces,
    /// The two side bitboards claim the same square.
    #[error("side bitboards overlap")]
    OverlappingSides,
}
