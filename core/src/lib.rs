//! Pure game logic for the Survivor elimination game.
//!
//! Everything here is `no_std` and storage-agnostic: the board is driven through the
//! [`FlagStore`] trait and the elimination engine persists its own checkpoint in
//! [`EliminationProgress`], so the same code runs inside the runtime pallet and in
//! off-chain tooling.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod board;
pub mod elimination;
pub mod error;
pub mod rng;

#[cfg(test)]
mod tests;

pub use board::*;
pub use elimination::*;
pub use error::*;
pub use rng::*;
