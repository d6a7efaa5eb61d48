//! Weight functions for pallet-survivor.
//!
//! This file is intended to be regenerated with the benchmark CLI after updating
//! benchmark scenarios in `benchmarking.rs`. The round-end sweep scales with the
//! board size, elimination steps with the chunk and the collected set, and
//! finalization with the finalize chunk.

#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]

use core::marker::PhantomData;
use frame::{deps::frame_support::weights::constants::RocksDbWeight, prelude::*};

/// Weight functions needed for pallet-survivor.
pub trait WeightInfo {
    fn claim() -> Weight;
    fn list() -> Weight;
    fn unlist() -> Weight;
    fn purchase() -> Weight;
    fn make_offer() -> Weight;
    fn accept_offer() -> Weight;
    fn reject_offer() -> Weight;
    fn cancel_offer() -> Weight;
    fn withdraw_pending() -> Weight;
    fn start_round() -> Weight;
    fn end_round(n: u32) -> Weight;
    fn receive_randomness() -> Weight;
    fn retry_randomness() -> Weight;
    fn advance_elimination(c: u32, n: u32) -> Weight;
    fn finalize_step(c: u32) -> Weight;
    fn update_settings() -> Weight;
    fn emergency_withdraw() -> Weight;
    fn fund_prize_pool() -> Weight;
}

/// Weights for pallet-survivor using runtime database weights.
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: frame_system::Config> WeightInfo for SubstrateWeight<T> {
    fn claim() -> Weight {
        Weight::from_parts(110_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(8))
            .saturating_add(T::DbWeight::get().writes(7))
    }

    fn list() -> Weight {
        Weight::from_parts(70_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(5))
            .saturating_add(T::DbWeight::get().writes(2))
    }

    fn unlist() -> Weight {
        Weight::from_parts(55_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(3))
            .saturating_add(T::DbWeight::get().writes(2))
    }

    fn purchase() -> Weight {
        Weight::from_parts(210_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(9))
            .saturating_add(T::DbWeight::get().writes(8))
    }

    fn make_offer() -> Weight {
        Weight::from_parts(120_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(6))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    fn accept_offer() -> Weight {
        Weight::from_parts(190_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(9))
            .saturating_add(T::DbWeight::get().writes(7))
    }

    fn reject_offer() -> Weight {
        Weight::from_parts(100_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(5))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    fn cancel_offer() -> Weight {
        Weight::from_parts(95_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    fn withdraw_pending() -> Weight {
        Weight::from_parts(90_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    fn start_round() -> Weight {
        Weight::from_parts(40_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(3))
            .saturating_add(T::DbWeight::get().writes(1))
    }

    /// The range of component `n` is `[0, 8]`.
    fn end_round(n: u32) -> Weight {
        Weight::from_parts(48_000_000, 0)
            .saturating_add(Weight::from_parts(14_000_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(6))
            .saturating_add(T::DbWeight::get().reads((3_u64).saturating_mul(n.into())))
            .saturating_add(T::DbWeight::get().writes(4))
            .saturating_add(T::DbWeight::get().writes((3_u64).saturating_mul(n.into())))
    }

    fn receive_randomness() -> Weight {
        Weight::from_parts(50_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(3))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    fn retry_randomness() -> Weight {
        Weight::from_parts(60_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().writes(2))
    }

    /// The range of component `c` is `[1, 8]`.
    /// The range of component `n` is `[2, 8]`.
    fn advance_elimination(c: u32, n: u32) -> Weight {
        Weight::from_parts(35_000_000, 0)
            .saturating_add(Weight::from_parts(18_000_000, 0).saturating_mul(c.into()))
            .saturating_add(Weight::from_parts(1_200_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(5))
            .saturating_add(T::DbWeight::get().reads((2_u64).saturating_mul(c.into())))
            .saturating_add(T::DbWeight::get().writes(3))
            .saturating_add(T::DbWeight::get().writes((2_u64).saturating_mul(c.into())))
    }

    /// The range of component `c` is `[1, 8]`.
    fn finalize_step(c: u32) -> Weight {
        Weight::from_parts(42_000_000, 0)
            .saturating_add(Weight::from_parts(21_000_000, 0).saturating_mul(c.into()))
            .saturating_add(T::DbWeight::get().reads(5))
            .saturating_add(T::DbWeight::get().reads((3_u64).saturating_mul(c.into())))
            .saturating_add(T::DbWeight::get().writes(3))
            .saturating_add(T::DbWeight::get().writes((4_u64).saturating_mul(c.into())))
    }

    fn update_settings() -> Weight {
        Weight::from_parts(30_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(1))
            .saturating_add(T::DbWeight::get().writes(1))
    }

    fn emergency_withdraw() -> Weight {
        Weight::from_parts(95_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(6))
            .saturating_add(T::DbWeight::get().writes(4))
    }

    fn fund_prize_pool() -> Weight {
        Weight::from_parts(85_000_000, 0)
            .saturating_add(T::DbWeight::get().reads(4))
            .saturating_add(T::DbWeight::get().writes(3))
    }
}

// For backwards compatibility and tests.
impl WeightInfo for () {
    fn claim() -> Weight {
        Weight::from_parts(110_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(8))
            .saturating_add(RocksDbWeight::get().writes(7))
    }

    fn list() -> Weight {
        Weight::from_parts(70_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(5))
            .saturating_add(RocksDbWeight::get().writes(2))
    }

    fn unlist() -> Weight {
        Weight::from_parts(55_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(3))
            .saturating_add(RocksDbWeight::get().writes(2))
    }

    fn purchase() -> Weight {
        Weight::from_parts(210_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(9))
            .saturating_add(RocksDbWeight::get().writes(8))
    }

    fn make_offer() -> Weight {
        Weight::from_parts(120_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(6))
            .saturating_add(RocksDbWeight::get().writes(4))
    }

    fn accept_offer() -> Weight {
        Weight::from_parts(190_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(9))
            .saturating_add(RocksDbWeight::get().writes(7))
    }

    fn reject_offer() -> Weight {
        Weight::from_parts(100_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(5))
            .saturating_add(RocksDbWeight::get().writes(4))
    }

    fn cancel_offer() -> Weight {
        Weight::from_parts(95_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(4))
            .saturating_add(RocksDbWeight::get().writes(4))
    }

    fn withdraw_pending() -> Weight {
        Weight::from_parts(90_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(4))
            .saturating_add(RocksDbWeight::get().writes(4))
    }

    fn start_round() -> Weight {
        Weight::from_parts(40_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(3))
            .saturating_add(RocksDbWeight::get().writes(1))
    }

    /// The range of component `n` is `[0, 8]`.
    fn end_round(n: u32) -> Weight {
        Weight::from_parts(48_000_000, 0)
            .saturating_add(Weight::from_parts(14_000_000, 0).saturating_mul(n.into()))
            .saturating_add(RocksDbWeight::get().reads(6))
            .saturating_add(RocksDbWeight::get().reads((3_u64).saturating_mul(n.into())))
            .saturating_add(RocksDbWeight::get().writes(4))
            .saturating_add(RocksDbWeight::get().writes((3_u64).saturating_mul(n.into())))
    }

    fn receive_randomness() -> Weight {
        Weight::from_parts(50_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(3))
            .saturating_add(RocksDbWeight::get().writes(4))
    }

    fn retry_randomness() -> Weight {
        Weight::from_parts(60_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(4))
            .saturating_add(RocksDbWeight::get().writes(2))
    }

    /// The range of component `c` is `[1, 8]`.
    /// The range of component `n` is `[2, 8]`.
    fn advance_elimination(c: u32, n: u32) -> Weight {
        Weight::from_parts(35_000_000, 0)
            .saturating_add(Weight::from_parts(18_000_000, 0).saturating_mul(c.into()))
            .saturating_add(Weight::from_parts(1_200_000, 0).saturating_mul(n.into()))
            .saturating_add(RocksDbWeight::get().reads(5))
            .saturating_add(RocksDbWeight::get().reads((2_u64).saturating_mul(c.into())))
            .saturating_add(RocksDbWeight::get().writes(3))
            .saturating_add(RocksDbWeight::get().writes((2_u64).saturating_mul(c.into())))
    }

    /// The range of component `c` is `[1, 8]`.
    fn finalize_step(c: u32) -> Weight {
        Weight::from_parts(42_000_000, 0)
            .saturating_add(Weight::from_parts(21_000_000, 0).saturating_mul(c.into()))
            .saturating_add(RocksDbWeight::get().reads(5))
            .saturating_add(RocksDbWeight::get().reads((3_u64).saturating_mul(c.into())))
            .saturating_add(RocksDbWeight::get().writes(3))
            .saturating_add(RocksDbWeight::get().writes((4_u64).saturating_mul(c.into())))
    }

    fn update_settings() -> Weight {
        Weight::from_parts(30_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(1))
            .saturating_add(RocksDbWeight::get().writes(1))
    }

    fn emergency_withdraw() -> Weight {
        Weight::from_parts(95_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(6))
            .saturating_add(RocksDbWeight::get().writes(4))
    }

    fn fund_prize_pool() -> Weight {
        Weight::from_parts(85_000_000, 0)
            .saturating_add(RocksDbWeight::get().reads(4))
            .saturating_add(RocksDbWeight::get().writes(3))
    }
}
