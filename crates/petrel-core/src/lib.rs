//! Board representation, legal move generation, and chess rules for petrel.

mod attacks;
mod bitboard;
mod board;
mod castling;
mod chess_move;
mod color;
mod error;
mod fen;
mod make_move;
mod movegen;
mod perft;
mod piece;
mod piece_type;
mod square;
mod zobrist;

pub use attacks::{
    between, bishop_attacks, king_attacks, knight_attacks, line, pawn_attacks, queen_attacks,
    rook_attacks,
};
pub use bitboard::Bitboard;
pub use board::Board;
pub use castling::CastleRights;
pub use chess_move::{Move, MoveFlag};
pub use color::Color;
pub use error::{BoardError, FenError};
pub use fen::STARTPOS_FEN;
pub use movegen::{MoveList, generate_captures, generate_moves};
pub use perft::{divide, perft};
pub use piece::Piece;
pub use piece_type::PieceType;
pub use square::{File, Rank, Square};
