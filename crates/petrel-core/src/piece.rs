//! A colored piece, packed into one byte.

use std::fmt;

use crate::color::Color;
use crate::piece_type::PieceType;

/// A piece with its color. Bits 0-2 hold the [`PieceType`], bit 3 the color.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece(u8);

impl Piece {
    pub const COUNT: usize = 12;

    #[inline]
    pub const fn new(pt: PieceType, color: Color) -> Piece {
        Piece(((color as u8) << 3) | pt as u8)
    }

    #[inline]
    pub const fn piece_type(self) -> PieceType {
        match PieceType::from_index(self.0 & 0x07) {
            Some(pt) => pt,
            None => PieceType::King,
        }
    }

    #[inline]
    pub const fn color(self) -> Color {
        if self.0 & 0x08 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    /// A dense 0..12 index: White pieces 0-5, Black pieces 6-11.
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 >> 3) as usize * 6 + (self.0 & 0x07) as usize
    }

    /// Parse a FEN letter: uppercase is White, lowercase is Black.
    pub fn from_letter(c: char) -> Option<Piece> {
        let pt = PieceType::from_letter(c)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(pt, color))
    }

    /// The FEN letter: uppercase for White, lowercase for Black.
    pub fn letter(self) -> char {
        match self.color() {
            Color::White => self.piece_type().letter().to_ascii_uppercase(),
            Color::Black => self.piece_type().letter(),
        }
    }

    /// All twelve pieces, White first, in type order.
    pub fn all() -> impl Iterator<Item = Piece> {
        Color::ALL
            .into_iter()
            .flat_map(|c| PieceType::ALL.into_iter().map(move |pt| Piece::new(pt, c)))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Piece({})", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::Piece;
    use crate::color::Color;
    use crate::piece_type::PieceType;

    #[test]
    fn pack_roundtrip() {
        for color in Color::ALL {
            for pt in PieceType::ALL {
                let p = Piece::new(pt, color);
                assert_eq!(p.piece_type(), pt);
                assert_eq!(p.color(), color);
            }
        }
    }

    #[test]
    fn dense_index_covers_0_to_11() {
        let mut seen = [false; 12];
        for p in Piece::all() {
            assert!(!seen[p.index()]);
            seen[p.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn letter_roundtrip() {
        for p in Piece::all() {
            assert_eq!(Piece::from_letter(p.letter()), Some(p));
        }
        assert_eq!(Piece::from_letter('x'), None);
    }

    #[test]
    fn letter_case_encodes_color() {
        assert_eq!(
            Piece::from_letter('Q'),
            Some(Piece::new(PieceType::Queen, Color::White))
        );
        assert_eq!(
            Piece::from_letter('q'),
            Some(Piece::new(PieceType::Queen, Color::Black))
        );
    }
}
