//! Packed per-position flags
//!
//! Each [`FlagKind`] is a bitset over positions `1..=size`, kept as 64-bit words.
//! The number of `Active` positions is maintained on every transition and is never
//! recomputed by scanning.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

/// A board slot, numbered from 1.
pub type Position = u32;

/// Bits per storage word.
pub const WORD_BITS: u32 = 64;

/// The flags tracked for every position of the current game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Encode, Decode, MaxEncodedLen, TypeInfo)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase"))]
pub enum FlagKind {
    /// Eligible to trade and to survive elimination
    Active,
    /// Has a marketplace listing
    Listed,
    /// Has an outstanding offer
    HasOffer,
    /// Declared winner of the game
    Winner,
}

impl FlagKind {
    pub const ALL: [FlagKind; 4] = [
        FlagKind::Active,
        FlagKind::Listed,
        FlagKind::HasOffer,
        FlagKind::Winner,
    ];
}

/// Word index and bit mask for a position. `position` must be at least 1.
pub fn locate(position: Position) -> (u32, u64) {
    let bit = position.saturating_sub(1);
    (bit / WORD_BITS, 1u64 << (bit % WORD_BITS))
}

/// Iterate the positions whose bits are set in one word, ascending.
pub fn positions_in_word(index: u32, word: u64) -> SetBits {
    SetBits {
        base: index.saturating_mul(WORD_BITS),
        rest: word,
    }
}

/// Iterator over the set bits of a word, yielding positions.
pub struct SetBits {
    base: u32,
    rest: u64,
}

impl Iterator for SetBits {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.rest == 0 {
            return None;
        }
        let offset = self.rest.trailing_zeros();
        self.rest &= self.rest - 1;
        Some(self.base + offset + 1)
    }
}

/// Backing storage for a [`Board`].
///
/// Implementations only move words around; all flag semantics, including the
/// active-count accounting, live in [`Board`].
pub trait FlagStore {
    fn word(&self, kind: FlagKind, index: u32) -> u64;
    fn set_word(&mut self, kind: FlagKind, index: u32, word: u64);
    fn active_count(&self) -> u32;
    fn set_active_count(&mut self, count: u32);
}

/// Flag operations over a fixed-size position space.
pub struct Board<S> {
    store: S,
    size: u32,
}

impl<S: FlagStore> Board<S> {
    pub fn new(store: S, size: u32) -> Self {
        Self { store, size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn contains(&self, position: Position) -> bool {
        position >= 1 && position <= self.size
    }

    pub fn get(&self, kind: FlagKind, position: Position) -> bool {
        if !self.contains(position) {
            return false;
        }
        let (index, mask) = locate(position);
        self.store.word(kind, index) & mask != 0
    }

    /// Set or clear one flag. Returns `true` if the flag changed.
    ///
    /// Positions outside the board are ignored.
    pub fn set(&mut self, kind: FlagKind, position: Position, value: bool) -> bool {
        if !self.contains(position) {
            return false;
        }
        let (index, mask) = locate(position);
        let word = self.store.word(kind, index);
        if (word & mask != 0) == value {
            return false;
        }
        let word = if value { word | mask } else { word & !mask };
        self.store.set_word(kind, index, word);

        if kind == FlagKind::Active {
            let count = self.store.active_count();
            let count = if value {
                count.saturating_add(1)
            } else {
                count.saturating_sub(1)
            };
            self.store.set_active_count(count);
        }
        true
    }

    /// Clear every flag of a position.
    pub fn clear_all(&mut self, position: Position) {
        for kind in FlagKind::ALL {
            self.set(kind, position, false);
        }
    }

    pub fn active_count(&self) -> u32 {
        self.store.active_count()
    }

    /// Positions in `from..=to` with `kind` set, ascending.
    ///
    /// Touches only the words overlapping the range, so callers bound the cost by
    /// bounding the range.
    pub fn positions_in_range(&self, kind: FlagKind, from: Position, to: Position) -> Vec<Position> {
        let from = from.max(1);
        let to = to.min(self.size);
        if from > to {
            return Vec::new();
        }
        let (first, _) = locate(from);
        let (last, _) = locate(to);

        let mut found = Vec::new();
        for index in first..=last {
            let word = self.store.word(kind, index);
            found.extend(positions_in_word(index, word).filter(|p| *p >= from && *p <= to));
        }
        found
    }

    /// Every position with `kind` set, ascending.
    pub fn positions_with(&self, kind: FlagKind) -> Vec<Position> {
        self.positions_in_range(kind, 1, self.size)
    }

    /// Every active position, ascending. Yields exactly `active_count()` entries.
    pub fn enumerate_active(&self) -> Vec<Position> {
        self.positions_with(FlagKind::Active)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

/// Heap-backed flag store for off-chain simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFlags {
    words: BTreeMap<(FlagKind, u32), u64>,
    active: u32,
}

impl FlagStore for MemoryFlags {
    fn word(&self, kind: FlagKind, index: u32) -> u64 {
        self.words.get(&(kind, index)).copied().unwrap_or(0)
    }

    fn set_word(&mut self, kind: FlagKind, index: u32, word: u64) {
        if word == 0 {
            self.words.remove(&(kind, index));
        } else {
            self.words.insert((kind, index), word);
        }
    }

    fn active_count(&self) -> u32 {
        self.active
    }

    fn set_active_count(&mut self, count: u32) {
        self.active = count;
    }
}

impl Board<MemoryFlags> {
    /// An empty in-memory board of `size` positions.
    pub fn in_memory(size: u32) -> Self {
        Self::new(MemoryFlags::default(), size)
    }
}
