//! Shared transposition table.
//!
//! Lockless: each slot is two `AtomicU64` words accessed with `Relaxed`
//! ordering. Torn writes from racing threads are caught by an XOR check
//! word and treated as misses, so correctness never depends on whole-entry
//! atomicity.
//!
//! ```text
//! word0: [63:32] key (upper hash half) | [31:16] depth (i16) | [15:0] move
//! word1: [63:32] check = key ^ low32(word0) | [31:16] score (i16) | [15:0] flag
//! ```
//!
//! Replacement is depth-preferred: a write lands iff its depth is at least
//! the incumbent's (empty slots always lose).

use std::sync::atomic::{AtomicU64, Ordering};

use petrel_core::Move;

use crate::search::MATE_THRESHOLD;

// The table is handed by reference to every search thread.
const _: () = {
    const fn assert_sync<T: Sync>() {}
    assert_sync::<TranspositionTable>();
};

/// What the stored score means relative to the search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Flag {
    /// Slot never written.
    None = 0,
    /// Exact score of a PV node.
    Exact = 1,
    /// Lower bound: the node failed high.
    Lower = 2,
    /// Upper bound: the node failed low.
    Upper = 3,
}

impl Flag {
    const fn from_bits(bits: u64) -> Flag {
        match bits & 0x03 {
            1 => Flag::Exact,
            2 => Flag::Lower,
            3 => Flag::Upper,
            _ => Flag::None,
        }
    }
}

/// A decoded, validated table hit.
#[derive(Debug, Clone, Copy)]
pub struct TtHit {
    /// Best move recorded for this position (may be null for fail-lows).
    pub best_move: Move,
    /// Depth the stored score was searched to.
    pub depth: i16,
    pub flag: Flag,
    /// Score, already converted back to root-relative mate distances.
    pub score: i32,
}

/// Fold a mate score for storage: mate distances are kept relative to the
/// storing node rather than the root, so an entry is valid anywhere along
/// any path.
fn score_to_tt(score: i32, ply: usize) -> i16 {
    if score.abs() > MATE_THRESHOLD {
        (score + ply as i32) as i16
    } else {
        score as i16
    }
}

/// Undo [`score_to_tt`] at the probing node's ply.
fn score_from_tt(raw: i16, ply: usize) -> i32 {
    let score = raw as i32;
    if score.abs() > MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

struct Slot {
    word0: AtomicU64,
    word1: AtomicU64,
}

impl Slot {
    const fn empty() -> Slot {
        Slot {
            word0: AtomicU64::new(0),
            word1: AtomicU64::new(0),
        }
    }

    fn pack(key: u32, depth: i16, mv: Move, score: i16, flag: Flag) -> (u64, u64) {
        let w0 = ((key as u64) << 32) | (((depth as u16) as u64) << 16) | mv.raw() as u64;
        let check = key ^ (w0 as u32);
        let w1 = ((check as u64) << 32) | (((score as u16) as u64) << 16) | flag as u64;
        (w0, w1)
    }
}

/// The table proper. All methods take `&self`; sharing across threads is the
/// point.
pub struct TranspositionTable {
    slots: Box<[Slot]>,
    /// `slot_count - 1`; the count is a power of two, so masking the hash is
    /// the modulo.
    mask: u64,
}

impl TranspositionTable {
    /// Allocate with the given size in megabytes (rounded down to a power of
    /// two of entries, minimum one).
    pub fn new(megabytes: usize) -> TranspositionTable {
        let bytes = megabytes.max(1) * 1024 * 1024;
        let slots = (bytes / std::mem::size_of::<Slot>()).next_power_of_two() >> 1;
        let slots = slots.max(1);
        TranspositionTable {
            slots: (0..slots).map(|_| Slot::empty()).collect(),
            mask: (slots - 1) as u64,
        }
    }

    /// Size in entries.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Wipe every slot. Done on `ucinewgame`.
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.word0.store(0, Ordering::Relaxed);
            slot.word1.store(0, Ordering::Relaxed);
        }
    }

    /// Look the position up. `None` on a miss, a key mismatch, or a torn
    /// write.
    pub fn probe(&self, hash: u64, ply: usize) -> Option<TtHit> {
        let slot = &self.slots[(hash & self.mask) as usize];
        let w0 = slot.word0.load(Ordering::Relaxed);
        let w1 = slot.word1.load(Ordering::Relaxed);

        let stored_key = (w0 >> 32) as u32;
        if stored_key != (hash >> 32) as u32 {
            return None;
        }
        // Torn-write detection: word1 must carry key ^ low32(word0).
        if (w1 >> 32) as u32 != stored_key ^ (w0 as u32) {
            return None;
        }

        let flag = Flag::from_bits(w1);
        if flag == Flag::None {
            return None;
        }

        Some(TtHit {
            best_move: Move::from_raw(w0 as u16),
            depth: (w0 >> 16) as u16 as i16,
            flag,
            score: score_from_tt((w1 >> 16) as u16 as i16, ply),
        })
    }

    /// Record a search result. Depth-preferred replacement: shallower
    /// results never evict deeper ones.
    pub fn store(&self, hash: u64, depth: i16, score: i32, best_move: Move, flag: Flag, ply: usize) {
        let slot = &self.slots[(hash & self.mask) as usize];

        let incumbent_w0 = slot.word0.load(Ordering::Relaxed);
        let incumbent_w1 = slot.word1.load(Ordering::Relaxed);
        let incumbent_depth = (incumbent_w0 >> 16) as u16 as i16;
        if Flag::from_bits(incumbent_w1) != Flag::None && depth < incumbent_depth {
            return;
        }

        let (w0, w1) = Slot::pack(
            (hash >> 32) as u32,
            depth,
            best_move,
            score_to_tt(score, ply),
            flag,
        );
        slot.word0.store(w0, Ordering::Relaxed);
        slot.word1.store(w1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .finish()
    }
}
