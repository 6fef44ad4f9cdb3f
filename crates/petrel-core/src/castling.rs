//! Castling rights, one bit per right.

use std::fmt;

use crate::color::Color;
use crate::error::FenError;

/// Four castling rights packed into the low nibble of a `u8`:
/// bit 0 = White short, bit 1 = White long, bit 2 = Black short, bit 3 = Black long.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastleRights(u8);

impl CastleRights {
    pub const NONE: CastleRights = CastleRights(0);
    pub const ALL: CastleRights = CastleRights(0b1111);

    pub const WHITE_SHORT: CastleRights = CastleRights(0b0001);
    pub const WHITE_LONG: CastleRights = CastleRights(0b0010);
    pub const BLACK_SHORT: CastleRights = CastleRights(0b0100);
    pub const BLACK_LONG: CastleRights = CastleRights(0b1000);

    pub const WHITE_BOTH: CastleRights = CastleRights(0b0011);
    pub const BLACK_BOTH: CastleRights = CastleRights(0b1100);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, rights: CastleRights) -> bool {
        self.0 & rights.0 == rights.0
    }

    #[inline]
    pub const fn remove(self, rights: CastleRights) -> CastleRights {
        CastleRights(self.0 & !rights.0)
    }

    /// The short-castle right for `color`.
    #[inline]
    pub const fn short(color: Color) -> CastleRights {
        match color {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        }
    }

    /// The long-castle right for `color`.
    #[inline]
    pub const fn long(color: Color) -> CastleRights {
        match color {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        }
    }

    /// Parse the FEN castling field (`KQkq`, any subset, or `-`).
    pub fn from_fen(field: &str) -> Result<CastleRights, FenError> {
        if field == "-" {
            return Ok(Self::NONE);
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            let bit = match c {
                'K' => Self::WHITE_SHORT,
                'Q' => Self::WHITE_LONG,
                'k' => Self::BLACK_SHORT,
                'q' => Self::BLACK_LONG,
                _ => return Err(FenError::InvalidCastling { character: c }),
            };
            rights = CastleRights(rights.0 | bit.0);
        }
        Ok(rights)
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        if self.contains(Self::WHITE_SHORT) {
            write!(f, "K")?;
        }
        if self.contains(Self::WHITE_LONG) {
            write!(f, "Q")?;
        }
        if self.contains(Self::BLACK_SHORT) {
            write!(f, "k")?;
        }
        if self.contains(Self::BLACK_LONG) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastleRights({self})")
    }
}
