//! Checkpoint-resumable elimination
//!
//! An elimination runs in two phases, each advanced by bounded steps:
//!
//! 1. **Collection** scans the position space in chunks and appends every active
//!    position to a working list.
//! 2. **Selection** runs a partial Fisher-Yates shuffle over the first
//!    `floor(total / 2)` slots of that list, clearing `Active` on each slot as it is
//!    fixed.
//!
//! All progress lives in [`EliminationProgress`] plus the working list, both owned
//! by the caller, so steps can be spread over any number of independent calls.

use alloc::vec::Vec;
use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

use crate::board::{Board, FlagKind, FlagStore, Position};
use crate::error::{EliminationError, EliminationResult};
use crate::rng::SeedDraw;

/// Which half of the algorithm is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, MaxEncodedLen, TypeInfo)]
pub enum EliminationPhase {
    #[default]
    Idle,
    Collecting,
    Selecting,
}

/// How a round ended once elimination resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, MaxEncodedLen, TypeInfo)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(tag = "type", rename_all = "camelCase"))]
pub enum RoundOutcome {
    /// Nothing was active when collection finished.
    NoSurvivors,
    /// Exactly one ticket remains.
    Winner(Position),
    /// More than one ticket remains; the game goes on.
    Continue { survivors: u32 },
}

/// Result of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Collection advanced but has not reached the end of the board.
    Collecting { scanned: Position, found: u32 },
    /// Collection finished; selection will remove `target` of `total` tickets.
    Collected { total: u32, target: u32 },
    /// A selection batch ran; more batches remain.
    Eliminated(Vec<Position>),
    /// The elimination is over. The checkpoint has been reset.
    Resolved {
        eliminated: Vec<Position>,
        outcome: RoundOutcome,
    },
}

/// Persisted checkpoint of a running elimination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, MaxEncodedLen, TypeInfo)]
pub struct EliminationProgress {
    pub phase: EliminationPhase,
    /// Seed every draw of this elimination derives from.
    pub seed: [u8; 32],
    /// Last position examined by collection.
    pub scanned: Position,
    /// Length of the working list.
    pub total: u32,
    /// Slots to eliminate, `floor(total / 2)`.
    pub target: u32,
    /// Next shuffle slot to fix.
    pub cursor: u32,
}

impl EliminationProgress {
    /// A fresh checkpoint at the start of collection.
    pub fn start(seed: [u8; 32]) -> Self {
        Self {
            phase: EliminationPhase::Collecting,
            seed,
            ..Default::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase != EliminationPhase::Idle
    }

    /// Scan the next `chunk` positions and append the active ones to `collected`.
    ///
    /// With zero or one ticket collected the elimination resolves right here and
    /// `collected` is cleared; no draw is ever made.
    pub fn collect_chunk<S: FlagStore>(
        &mut self,
        board: &Board<S>,
        collected: &mut Vec<Position>,
        chunk: u32,
    ) -> EliminationResult<Step> {
        if self.phase != EliminationPhase::Collecting {
            return Err(EliminationError::NotCollecting);
        }
        if chunk == 0 {
            return Err(EliminationError::ZeroStep);
        }
        self.check_list(collected.len())?;

        let from = self.scanned.saturating_add(1);
        let to = self.scanned.saturating_add(chunk).min(board.size());
        let found = board.positions_in_range(FlagKind::Active, from, to);
        let found_count = found.len() as u32;
        collected.extend(found);
        self.scanned = to;
        self.total = collected.len() as u32;

        if to < board.size() {
            return Ok(Step::Collecting {
                scanned: to,
                found: found_count,
            });
        }

        let outcome = match collected.as_slice() {
            [] => Some(RoundOutcome::NoSurvivors),
            [only] => Some(RoundOutcome::Winner(*only)),
            _ => None,
        };
        if let Some(outcome) = outcome {
            *self = Self::default();
            collected.clear();
            return Ok(Step::Resolved {
                eliminated: Vec::new(),
                outcome,
            });
        }

        self.target = self.total / 2;
        self.cursor = 0;
        self.phase = EliminationPhase::Selecting;
        Ok(Step::Collected {
            total: self.total,
            target: self.target,
        })
    }

    /// Fix up to `batch` more shuffle slots, eliminating the ticket landing in each.
    ///
    /// For slot `i` the partner is `i + pick(i, total - i)`, drawn from `draw`, so
    /// the eliminated set depends only on the seed and the collected list, never on
    /// how the work was split into batches.
    pub fn select_batch<S: FlagStore, D: SeedDraw>(
        &mut self,
        board: &mut Board<S>,
        collected: &mut [Position],
        draw: &D,
        batch: u32,
    ) -> EliminationResult<Step> {
        if self.phase != EliminationPhase::Selecting {
            return Err(EliminationError::NotSelecting);
        }
        if batch == 0 {
            return Err(EliminationError::ZeroStep);
        }
        self.check_list(collected.len())?;

        let end = self.cursor.saturating_add(batch).min(self.target);
        let mut eliminated = Vec::with_capacity(end.saturating_sub(self.cursor) as usize);
        for i in self.cursor..end {
            let j = i + draw.pick(i, self.total - i);
            collected.swap(i as usize, j as usize);
            let position = collected[i as usize];
            board.set(FlagKind::Active, position, false);
            eliminated.push(position);
        }
        self.cursor = end;

        if end < self.target {
            return Ok(Step::Eliminated(eliminated));
        }

        let survivors = &collected[self.target as usize..];
        let outcome = match survivors {
            [only] => RoundOutcome::Winner(*only),
            _ => RoundOutcome::Continue {
                survivors: survivors.len() as u32,
            },
        };
        *self = Self::default();
        Ok(Step::Resolved {
            eliminated,
            outcome,
        })
    }

    fn check_list(&self, len: usize) -> EliminationResult<()> {
        if len as u32 != self.total {
            return Err(EliminationError::ListMismatch {
                expected: self.total,
                found: len as u32,
            });
        }
        Ok(())
    }
}
