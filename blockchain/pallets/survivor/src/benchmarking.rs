//! Benchmarking for pallet-survivor.
//!
//! Each dispatchable is measured on its heaviest path for the configured board.

use super::*;
use alloc::vec;
use frame::arithmetic::Percent;
use frame::deps::sp_runtime::traits::SaturatedConversion;
use frame::{deps::frame_benchmarking::v2::*, prelude::*};

#[benchmarks]
mod benchmarks {
    use super::*;
    use frame::traits::fungible;
    use frame_system::RawOrigin;
    use survivor_core::EliminationPhase;

    const SEED: u32 = 0;

    fn benchmark_balance<T: Config>() -> BalanceOf<T> {
        1_000_000u128.saturated_into()
    }

    fn benchmark_price<T: Config>() -> BalanceOf<T> {
        1_000u128.saturated_into()
    }

    fn fund_account<T: Config>(who: &T::AccountId, amount: BalanceOf<T>) {
        let _ = <T::Currency as fungible::Mutate<T::AccountId>>::mint_into(who, amount);
    }

    fn fund_escrow<T: Config>() {
        let minimum = <T::Currency as fungible::Inspect<T::AccountId>>::minimum_balance();
        fund_account::<T>(&Pallet::<T>::account_id(), minimum);
    }

    fn player<T: Config>(position: Position) -> T::AccountId {
        let who: T::AccountId = account("player", position, SEED);
        fund_account::<T>(&who, benchmark_balance::<T>());
        who
    }

    fn claim_as<T: Config>(who: &T::AccountId, position: Position) {
        Pallet::<T>::claim(RawOrigin::Signed(who.clone()).into(), position)
            .expect("setup claim should succeed");
    }

    /// Claim positions `1..=count`, each with its own funded account.
    fn claim_positions<T: Config>(count: u32) {
        for position in 1..=count {
            claim_as::<T>(&player::<T>(position), position);
        }
    }

    fn approve_escrow<T: Config>(position: Position) {
        let record = Tickets::<T>::get(position).expect("position was claimed");
        T::Tickets::approve(record.ticket, &Pallet::<T>::account_id());
    }

    fn list_as<T: Config>(who: &T::AccountId, position: Position) {
        approve_escrow::<T>(position);
        Pallet::<T>::list(RawOrigin::Signed(who.clone()).into(), position, benchmark_price::<T>())
            .expect("setup list should succeed");
    }

    fn offer_as<T: Config>(who: &T::AccountId, position: Position) {
        Pallet::<T>::make_offer(RawOrigin::Signed(who.clone()).into(), position, benchmark_price::<T>())
            .expect("setup offer should succeed");
    }

    fn setup_full_board<T: Config>() {
        fund_escrow::<T>();
        claim_positions::<T>(T::BoardSize::get());
    }

    fn reach_deadline<T: Config>() {
        frame_system::Pallet::<T>::set_block_number(Game::<T>::get().round_deadline);
    }

    fn setup_awaiting_randomness<T: Config>() -> RequestId {
        setup_full_board::<T>();
        reach_deadline::<T>();
        Pallet::<T>::end_round(RawOrigin::Signed(player::<T>(0)).into())
            .expect("setup end_round should succeed");
        PendingRequest::<T>::get().expect("request was issued").request_id
    }

    fn seed_words<T: Config>() -> BoundedVec<[u8; 32], T::MaxRandomWords> {
        BoundedVec::truncate_from(vec![[7u8; 32]])
    }

    #[benchmark]
    fn claim() {
        fund_escrow::<T>();
        Settings::<T>::mutate(|s| s.claim_price = benchmark_price::<T>());
        let size = T::BoardSize::get();
        claim_positions::<T>(size - 1);
        let caller = player::<T>(size);

        // The last claim fills the board and starts the first round.
        #[extrinsic_call]
        _(RawOrigin::Signed(caller), size);

        assert_eq!(Game::<T>::get().phase, GamePhase::RoundActive);
    }

    #[benchmark]
    fn list() {
        fund_escrow::<T>();
        let caller = player::<T>(1);
        claim_as::<T>(&caller, 1);
        approve_escrow::<T>(1);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), 1, benchmark_price::<T>());

        assert!(Tickets::<T>::get(1).and_then(|r| r.listing).is_some());
    }

    #[benchmark]
    fn unlist() {
        fund_escrow::<T>();
        let caller = player::<T>(1);
        claim_as::<T>(&caller, 1);
        list_as::<T>(&caller, 1);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), 1);

        assert!(Tickets::<T>::get(1).and_then(|r| r.listing).is_none());
    }

    #[benchmark]
    fn purchase() {
        fund_escrow::<T>();
        let seller = player::<T>(1);
        claim_as::<T>(&seller, 1);
        list_as::<T>(&seller, 1);
        offer_as::<T>(&player::<T>(2), 1);
        let buyer = player::<T>(3);

        // Buying over an outstanding offer also refunds the offer.
        #[extrinsic_call]
        _(RawOrigin::Signed(buyer.clone()), 1, benchmark_price::<T>());

        let record = Tickets::<T>::get(1).expect("binding survives a trade");
        assert_eq!(T::Tickets::owner_of(record.ticket), Some(buyer));
    }

    #[benchmark]
    fn make_offer() {
        fund_escrow::<T>();
        claim_as::<T>(&player::<T>(1), 1);
        let caller = player::<T>(2);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), 1, benchmark_price::<T>());

        assert!(Tickets::<T>::get(1).and_then(|r| r.offer).is_some());
    }

    #[benchmark]
    fn accept_offer() {
        fund_escrow::<T>();
        let owner = player::<T>(1);
        claim_as::<T>(&owner, 1);
        list_as::<T>(&owner, 1);
        let maker = player::<T>(2);
        offer_as::<T>(&maker, 1);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), 1);

        let record = Tickets::<T>::get(1).expect("binding survives a trade");
        assert_eq!(T::Tickets::owner_of(record.ticket), Some(maker));
    }

    #[benchmark]
    fn reject_offer() {
        fund_escrow::<T>();
        let owner = player::<T>(1);
        claim_as::<T>(&owner, 1);
        offer_as::<T>(&player::<T>(2), 1);

        #[extrinsic_call]
        _(RawOrigin::Signed(owner), 1);

        assert!(Tickets::<T>::get(1).and_then(|r| r.offer).is_none());
    }

    #[benchmark]
    fn cancel_offer() {
        fund_escrow::<T>();
        claim_as::<T>(&player::<T>(1), 1);
        let maker = player::<T>(2);
        offer_as::<T>(&maker, 1);

        #[extrinsic_call]
        _(RawOrigin::Signed(maker), 1);

        assert!(Tickets::<T>::get(1).and_then(|r| r.offer).is_none());
    }

    #[benchmark]
    fn withdraw_pending() {
        fund_escrow::<T>();
        let caller = player::<T>(1);
        fund_account::<T>(&Pallet::<T>::account_id(), benchmark_price::<T>());
        Pallet::<T>::credit_pending(&caller, benchmark_price::<T>());

        #[extrinsic_call]
        _(RawOrigin::Signed(caller.clone()));

        assert!(PendingWithdrawals::<T>::get(caller).is_zero());
    }

    #[benchmark]
    fn start_round() -> Result<(), BenchmarkError> {
        fund_escrow::<T>();
        claim_positions::<T>(T::BoardSize::get() - 1);
        let origin =
            T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin);

        assert_eq!(Game::<T>::get().phase, GamePhase::RoundActive);
        Ok(())
    }

    #[benchmark]
    fn end_round(n: Linear<0, { T::BoardSize::get() }>) {
        setup_full_board::<T>();
        // The first `n` positions carry a listing and an offer to sweep.
        let size = T::BoardSize::get();
        let bidder = player::<T>(size + 1);
        for position in 1..=n {
            list_as::<T>(&account("player", position, SEED), position);
            offer_as::<T>(&bidder, position);
        }
        reach_deadline::<T>();

        #[extrinsic_call]
        _(RawOrigin::Signed(bidder.clone()));

        assert_eq!(Game::<T>::get().phase, GamePhase::AwaitingRandomness);
        assert_eq!(PendingWithdrawals::<T>::get(bidder).is_zero(), n == 0);
    }

    #[benchmark]
    fn receive_randomness() -> Result<(), BenchmarkError> {
        let request_id = setup_awaiting_randomness::<T>();
        let origin =
            T::RandomnessOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, request_id, seed_words::<T>());

        assert_eq!(Game::<T>::get().phase, GamePhase::Eliminating);
        Ok(())
    }

    #[benchmark]
    fn retry_randomness() -> Result<(), BenchmarkError> {
        setup_awaiting_randomness::<T>();
        let pending = PendingRequest::<T>::get().expect("request was issued");
        let timeout = Settings::<T>::get().randomness_timeout;
        frame_system::Pallet::<T>::set_block_number(pending.requested_at + timeout);
        let origin =
            T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin);

        let retried = PendingRequest::<T>::get().expect("request was reissued");
        assert!(retried.request_id != pending.request_id);
        Ok(())
    }

    #[benchmark]
    fn advance_elimination(
        c: Linear<1, { T::CollectionChunk::get().max(T::ShuffleBatch::get()).max(1) }>,
        n: Linear<2, { T::BoardSize::get() }>,
    ) -> Result<(), BenchmarkError> {
        fund_escrow::<T>();
        claim_positions::<T>(n);
        if Game::<T>::get().phase == GamePhase::Claiming {
            Pallet::<T>::do_start_round()?;
        }
        reach_deadline::<T>();
        Pallet::<T>::end_round(RawOrigin::Signed(player::<T>(0)).into())?;
        let request_id =
            PendingRequest::<T>::get().ok_or(BenchmarkError::Stop("no randomness request"))?.request_id;
        let origin =
            T::RandomnessOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;
        Pallet::<T>::receive_randomness(origin, request_id, seed_words::<T>())?;

        // Finish collection so the measured step is a selection batch of `c`.
        while Elimination::<T>::get().phase == EliminationPhase::Collecting {
            Pallet::<T>::advance_elimination_with(T::BoardSize::get(), c)?;
        }

        #[block]
        {
            Pallet::<T>::advance_elimination_with(c, c)?;
        }

        assert!(Pallet::<T>::active_count() < n);
        Ok(())
    }

    #[benchmark]
    fn finalize_step(c: Linear<1, { T::FinalizeChunk::get().max(1).min(T::BoardSize::get()) }>) {
        // `c` tickets inside the first finalize chunk are retired by one step.
        fund_escrow::<T>();
        claim_positions::<T>(c);
        Game::<T>::mutate(|game| {
            game.phase = GamePhase::Completed;
            game.winner = None;
        });
        let caller = player::<T>(0);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller));

        assert!(Tickets::<T>::get(1).is_none());
    }

    #[benchmark]
    fn update_settings() -> Result<(), BenchmarkError> {
        let origin =
            T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

        #[extrinsic_call]
        set_fees(
            origin as T::RuntimeOrigin,
            Percent::from_percent(10),
            Percent::from_percent(20),
            Percent::from_percent(5),
        );

        assert_eq!(Settings::<T>::get().prize_fee, Percent::from_percent(20));
        Ok(())
    }

    #[benchmark]
    fn emergency_withdraw() -> Result<(), BenchmarkError> {
        fund_escrow::<T>();
        let funder = player::<T>(1);
        Pallet::<T>::fund_prize_pool(RawOrigin::Signed(funder).into(), benchmark_price::<T>())?;
        Paused::<T>::put(true);
        let to: T::AccountId = account("recipient", 0, SEED);
        let origin =
            T::AdminOrigin::try_successful_origin().map_err(|_| BenchmarkError::Weightless)?;

        #[extrinsic_call]
        _(origin as T::RuntimeOrigin, to, benchmark_price::<T>());

        assert!(PrizePool::<T>::get().is_zero());
        Ok(())
    }

    #[benchmark]
    fn fund_prize_pool() {
        fund_escrow::<T>();
        let caller = player::<T>(1);

        #[extrinsic_call]
        _(RawOrigin::Signed(caller), benchmark_price::<T>());

        assert_eq!(PrizePool::<T>::get(), benchmark_price::<T>());
    }

    impl_benchmark_test_suite!(Pallet, crate::mock::new_test_ext(), crate::mock::Test);
}
