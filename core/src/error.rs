//! Error types for elimination operations
//!
//! no_std compatible enums, mapped onto dispatch errors by the pallet.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;

#[cfg(feature = "std")]
use serde::{Deserialize, Serialize};

/// Errors raised while advancing an elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo)]
#[cfg_attr(feature = "std", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "std", serde(tag = "type", rename_all = "camelCase"))]
pub enum EliminationError {
    /// A collection step was requested outside the collection phase
    NotCollecting,
    /// A selection step was requested outside the selection phase
    NotSelecting,
    /// Chunk or batch size of zero would never make progress
    ZeroStep,
    /// The persisted working list does not match the checkpoint
    ListMismatch { expected: u32, found: u32 },
}

/// Result type alias for elimination operations
pub type EliminationResult<T> = Result<T, EliminationError>;
