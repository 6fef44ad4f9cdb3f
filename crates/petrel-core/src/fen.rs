//! FEN parsing and serialization.

use std::fmt;
use std::str::FromStr;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castling::CastleRights;
use crate::color::Color;
use crate::error::FenError;
use crate::piece::Piece;
use crate::piece_type::PieceType;
use crate::square::{File, Rank, Square};

/// The standard starting position.
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl FromStr for Board {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenError::FieldCount {
                found: fields.len(),
            });
        }

        let placement: Vec<&str> = fields[0].split('/').collect();
        if placement.len() != 8 {
            return Err(FenError::RankCount {
                found: placement.len(),
            });
        }

        let mut types = [Bitboard::EMPTY; PieceType::COUNT];
        let mut sides = [Bitboard::EMPTY; Color::COUNT];

        for (row, row_str) in placement.iter().enumerate() {
            // FEN rows run from rank 8 down to rank 1.
            let rank = Rank::from_index(7 - row as u8).expect("row < 8");
            let mut file_index: u8 = 0;

            for c in row_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::InvalidPiece { character: c });
                    }
                    file_index += skip as u8;
                } else {
                    let piece =
                        Piece::from_letter(c).ok_or(FenError::InvalidPiece { character: c })?;
                    if file_index >= 8 {
                        return Err(FenError::RankWidth {
                            rank: 8 - row,
                            files: file_index as usize + 1,
                        });
                    }
                    let sq = Square::new(File::from_index(file_index).expect("file < 8"), rank);
                    types[piece.piece_type().index()] |= sq.bb();
                    sides[piece.color().index()] |= sq.bb();
                    file_index += 1;
                }
            }

            if file_index != 8 {
                return Err(FenError::RankWidth {
                    rank: 8 - row,
                    files: file_index as usize,
                });
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                });
            }
        };

        let castling = CastleRights::from_fen(fields[2])?;

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(
                Square::parse(fields[3]).ok_or_else(|| FenError::InvalidEnPassant {
                    found: fields[3].to_string(),
                })?,
            )
        };

        let halfmove_clock = fields[4].parse::<u16>().map_err(|_| FenError::InvalidCounter {
            field: "halfmove clock",
            found: fields[4].to_string(),
        })?;

        let fullmove_number = fields[5].parse::<u16>().map_err(|_| FenError::InvalidCounter {
            field: "fullmove number",
            found: fields[5].to_string(),
        })?;

        let board = Board::from_parts(
            types,
            sides,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number.max(1),
        );
        board.validate()?;
        Ok(board)
    }
}

impl fmt::Display for Board {
    /// Writes the position as a FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank_index in (0u8..8).rev() {
            let mut run = 0;
            for file_index in 0u8..8 {
                let sq = Square::new(
                    File::from_index(file_index).expect("file < 8"),
                    Rank::from_index(rank_index).expect("rank < 8"),
                );
                match self.piece_on(sq) {
                    Some(piece) => {
                        if run > 0 {
                            write!(f, "{run}")?;
                            run = 0;
                        }
                        write!(f, "{}", piece.letter())?;
                    }
                    None => run += 1,
                }
            }
            if run > 0 {
                write!(f, "{run}")?;
            }
            if rank_index > 0 {
                write!(f, "/")?;
            }
        }

        write!(f, " {} {}", self.side_to_move(), self.castling())?;
        match self.en_passant() {
            Some(sq) => write!(f, " {sq}")?,
            None => write!(f, " -")?,
        }
        write!(f, " {} {}", self.halfmove_clock(), self.fullmove_number())
    }
}

#[cfg(test)]
mod tests {
    use super::STARTPOS_FEN;
    use crate::board::Board;
    use crate::color::Color;
    use crate::square::Square;

    #[test]
    fn startpos_roundtrip() {
        let board: Board = STARTPOS_FEN.parse().unwrap();
        assert_eq!(board.to_string(), STARTPOS_FEN);
    }

    #[test]
    fn kiwipete_roundtrip() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board: Board = fen.parse().unwrap();
        assert_eq!(board.to_string(), fen);
    }

    #[test]
    fn fields_are_read() {
        let board: Board = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
            .parse()
            .unwrap();
        assert_eq!(board.side_to_move(), Color::Black);
        assert_eq!(board.en_passant(), Some(Square::E3));
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.fullmove_number(), 1);
    }

    #[test]
    fn rejects_malformed_fens() {
        assert!("".parse::<Board>().is_err());
        assert!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"
            .parse::<Board>()
            .is_err());
        assert!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1"
            .parse::<Board>()
            .is_err());
        assert!("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
            .parse::<Board>()
            .is_err());
        assert!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1"
            .parse::<Board>()
            .is_err());
        assert!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XQkq - 0 1"
            .parse::<Board>()
            .is_err());
        assert!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1"
            .parse::<Board>()
            .is_err());
        assert!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1"
            .parse::<Board>()
            .is_err());
    }

    #[test]
    fn rejects_structurally_broken_positions() {
        // Two white kings.
        assert!("4k3/8/8/8/8/8/8/3KK3 w - - 0 1".parse::<Board>().is_err());
        // Pawn on the eighth rank.
        assert!("P3k3/8/8/8/8/8/8/4K3 w - - 0 1".parse::<Board>().is_err());
    }
}
