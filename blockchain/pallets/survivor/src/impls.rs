use crate::pallet::*;
use crate::traits::{RandomnessRequester, RequestId, TicketRegistry};
use crate::weights::WeightInfo;
use core::marker::PhantomData;
use frame::arithmetic::PerThing;
use frame::deps::frame_support::storage::with_storage_layer;
use frame::prelude::*;
use frame::traits::{fungible, tokens::Preservation, Get};
use survivor_core::{Board, EliminationProgress, FlagKind, FlagStore, Position, SeedDraw};

/// Board flags kept in pallet storage.
pub struct StoredFlags<T>(PhantomData<T>);

impl<T: Config> FlagStore for StoredFlags<T> {
    fn word(&self, kind: FlagKind, index: u32) -> u64 {
        BoardWords::<T>::get(kind, index)
    }

    fn set_word(&mut self, kind: FlagKind, index: u32, word: u64) {
        if word == 0 {
            BoardWords::<T>::remove(kind, index);
        } else {
            BoardWords::<T>::insert(kind, index, word);
        }
    }

    fn active_count(&self) -> u32 {
        ActiveCount::<T>::get()
    }

    fn set_active_count(&mut self, count: u32) {
        ActiveCount::<T>::put(count);
    }
}

/// Seed-derived draws hashed with blake2.
pub struct Blake2Draw {
    seed: [u8; 32],
}

impl Blake2Draw {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed }
    }
}

impl SeedDraw for Blake2Draw {
    fn draw(&self, index: u32, attempt: u32) -> u64 {
        let hash = frame::hashing::blake2_256(&(self.seed, index, attempt).encode());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash[..8]);
        u64::from_le_bytes(bytes)
    }
}

/// How a trade amount is divided.
#[derive(Clone, Copy, PartialEq, Eq, RuntimeDebug)]
pub struct FeeSplit<Balance> {
    pub dealer: Balance,
    pub prize: Balance,
    pub seller: Balance,
}

impl<T: Config> Pallet<T> {
    /// The escrow account holding the prize pool, offers and pending balances.
    pub fn account_id() -> T::AccountId {
        use frame::deps::sp_runtime::traits::AccountIdConversion;
        T::PalletId::get().into_account_truncating()
    }

    /// Round end sweeps every position of the board.
    pub(crate) fn end_round_weight() -> Weight {
        T::WeightInfo::end_round(T::BoardSize::get())
    }

    pub(crate) fn advance_elimination_weight() -> Weight {
        let chunk = T::CollectionChunk::get().max(T::ShuffleBatch::get());
        T::WeightInfo::advance_elimination(chunk, T::BoardSize::get())
    }

    pub(crate) fn finalize_step_weight() -> Weight {
        T::WeightInfo::finalize_step(T::FinalizeChunk::get().max(1).min(T::BoardSize::get()))
    }

    pub(crate) fn board() -> Board<StoredFlags<T>> {
        Board::new(StoredFlags(PhantomData), T::BoardSize::get())
    }

    pub(crate) fn now() -> BlockNumberFor<T> {
        frame_system::Pallet::<T>::block_number()
    }

    pub(crate) fn ensure_not_paused() -> DispatchResult {
        ensure!(!Paused::<T>::get(), Error::<T>::Paused);
        Ok(())
    }

    /// Run `f` with the reentrancy flag held.
    pub(crate) fn with_lock<R>(f: impl FnOnce() -> Result<R, DispatchError>) -> Result<R, DispatchError> {
        ensure!(!Locked::<T>::get(), Error::<T>::Reentrancy);
        Locked::<T>::put(true);
        let result = f();
        Locked::<T>::kill();
        result
    }

    // ── Escrow and payments ────────────────────────────────────────────

    /// Pull `amount` from `who` into escrow.
    pub(crate) fn collect(who: &T::AccountId, amount: BalanceOf<T>) -> DispatchResult {
        <T::Currency as fungible::Mutate<T::AccountId>>::transfer(
            who,
            &Self::account_id(),
            amount,
            Preservation::Expendable,
        )?;
        Ok(())
    }

    /// Push `amount` from escrow to `who`. Zero amounts are skipped.
    ///
    /// The escrow may be drained to zero: every unit it holds beyond the genesis
    /// deposit is owed to someone.
    pub(crate) fn pay_out(who: &T::AccountId, amount: BalanceOf<T>) -> DispatchResult {
        if amount.is_zero() {
            return Ok(());
        }
        with_storage_layer(|| {
            <T::Currency as fungible::Mutate<T::AccountId>>::transfer(
                &Self::account_id(),
                who,
                amount,
                Preservation::Expendable,
            )
        })
        .map(|_| ())
        .map_err(|e| {
            log::warn!(target: crate::LOG_TARGET, "push of {:?} to {:?} failed: {:?}", amount, who, e);
            Error::<T>::TransferFailed.into()
        })
    }

    /// Push `amount` to `who`, crediting it to the pending ledger if the push fails.
    pub(crate) fn pay_or_credit(who: &T::AccountId, amount: BalanceOf<T>) {
        if Self::pay_out(who, amount).is_err() {
            Self::credit_pending(who, amount);
        }
    }

    /// Record `amount` as owed to `who`.
    pub(crate) fn credit_pending(who: &T::AccountId, amount: BalanceOf<T>) {
        if amount.is_zero() {
            return;
        }
        PendingWithdrawals::<T>::mutate(who, |owed| *owed = owed.saturating_add(amount));
        TotalPending::<T>::mutate(|total| *total = total.saturating_add(amount));
        Self::deposit_event(Event::PaymentDeferred { who: who.clone(), amount });
    }

    pub(crate) fn do_withdraw_pending(who: &T::AccountId) -> DispatchResult {
        let amount = PendingWithdrawals::<T>::take(who);
        ensure!(!amount.is_zero(), Error::<T>::NothingToWithdraw);
        TotalPending::<T>::mutate(|total| *total = total.saturating_sub(amount));
        Self::pay_out(who, amount)?;
        Self::deposit_event(Event::Withdrawn { who: who.clone(), amount });
        Ok(())
    }

    /// Divide a trade amount into dealer fee, prize contribution and seller proceeds.
    pub(crate) fn fee_split(amount: BalanceOf<T>) -> FeeSplit<BalanceOf<T>> {
        let settings = Settings::<T>::get();
        let dealer = settings.dealer_fee.mul_floor(amount);
        let prize = settings.prize_fee.mul_floor(amount);
        FeeSplit {
            dealer,
            prize,
            seller: amount.saturating_sub(dealer).saturating_sub(prize),
        }
    }

    /// Credit the prize share and push the dealer and seller shares of a trade.
    pub(crate) fn settle_trade(seller: &T::AccountId, amount: BalanceOf<T>) -> DispatchResult {
        let split = Self::fee_split(amount);
        PrizePool::<T>::mutate(|pool| *pool = pool.saturating_add(split.prize));
        Self::pay_out(&T::Dealer::get(), split.dealer)?;
        Self::pay_out(seller, split.seller)
    }

    pub(crate) fn do_fund_prize_pool(who: &T::AccountId, amount: BalanceOf<T>) -> DispatchResult {
        ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
        Self::collect(who, amount)?;
        PrizePool::<T>::mutate(|pool| *pool = pool.saturating_add(amount));
        Self::deposit_event(Event::PrizePoolFunded { who: who.clone(), amount });
        Ok(())
    }

    pub(crate) fn do_emergency_withdraw(to: &T::AccountId, amount: BalanceOf<T>) -> DispatchResult {
        ensure!(Paused::<T>::get(), Error::<T>::NotPaused);
        ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
        let pool = PrizePool::<T>::get();
        let rollover = RolloverReserve::<T>::get();
        ensure!(amount <= pool.saturating_add(rollover), Error::<T>::ExceedsReserves);

        let from_pool = amount.min(pool);
        PrizePool::<T>::put(pool.saturating_sub(from_pool));
        RolloverReserve::<T>::put(rollover.saturating_sub(amount.saturating_sub(from_pool)));
        Self::pay_out(to, amount)?;

        log::warn!(target: crate::LOG_TARGET, "emergency withdrawal of {:?} to {:?}", amount, to);
        Self::deposit_event(Event::EmergencyWithdrawal { to: to.clone(), amount });
        Ok(())
    }

    // ── Tickets ────────────────────────────────────────────────────────

    /// Current owner of a bound ticket, per the registry.
    pub(crate) fn owner_of(record: &TicketRecord<T>) -> Result<T::AccountId, DispatchError> {
        T::Tickets::owner_of(record.ticket).ok_or_else(|| Error::<T>::TicketNotFound.into())
    }

    pub(crate) fn do_claim(who: &T::AccountId, position: Position) -> DispatchResult {
        Self::ensure_not_paused()?;
        let mut board = Self::board();
        ensure!(board.contains(position), Error::<T>::InvalidPosition);

        let mut game = Game::<T>::get();
        ensure!(game.minted < board.size(), Error::<T>::BoardFull);
        ensure!(game.phase == GamePhase::Claiming, Error::<T>::WrongPhase);

        let settings = Settings::<T>::get();
        let mut claims = ClaimCounts::<T>::get(who);
        if claims.game_id != game.game_id {
            claims = ClaimCount { game_id: game.game_id, count: 0 };
        }
        ensure!(
            claims.count < settings.max_claims_per_account,
            Error::<T>::ClaimLimitReached
        );
        ensure!(
            !board.get(FlagKind::Active, position) && !Tickets::<T>::contains_key(position),
            Error::<T>::PositionTaken
        );

        if !settings.claim_price.is_zero() {
            Self::collect(who, settings.claim_price)?;
            PrizePool::<T>::mutate(|pool| *pool = pool.saturating_add(settings.claim_price));
        }

        let ticket = T::Tickets::mint(who)?;
        Tickets::<T>::insert(
            position,
            TicketRecord {
                ticket,
                game_id: game.game_id,
                created_at: Self::now(),
                listing: None,
                offer: None,
            },
        );
        PositionOf::<T>::insert(ticket, position);
        board.set(FlagKind::Active, position, true);

        claims.count = claims.count.saturating_add(1);
        ClaimCounts::<T>::insert(who, claims);
        game.minted = game.minted.saturating_add(1);

        Self::deposit_event(Event::TicketClaimed {
            game_id: game.game_id,
            position,
            ticket,
            owner: who.clone(),
        });

        if game.minted == board.size() {
            Self::begin_round(&mut game);
        }
        Game::<T>::put(game);
        Ok(())
    }

    /// Unbind a ticket from its position and clear every flag. Burns the token if asked.
    pub(crate) fn retire(position: Position, record: TicketRecord<T>, burn: bool) {
        let mut board = Self::board();
        board.clear_all(position);
        Tickets::<T>::remove(position);
        PositionOf::<T>::remove(record.ticket);

        if let Some(offer) = record.offer {
            Self::credit_pending(&offer.maker, offer.amount);
        }
        if burn && T::Tickets::exists(record.ticket) {
            if let Err(e) = T::Tickets::burn(record.ticket) {
                log::warn!(
                    target: crate::LOG_TARGET,
                    "failed to burn ticket {} at position {}: {:?}",
                    record.ticket,
                    position,
                    e
                );
            }
        }
    }

    // ── Rounds ─────────────────────────────────────────────────────────

    /// Open the next round of `game`. The caller persists `game`.
    pub(crate) fn begin_round(game: &mut GameState<T>) {
        let duration = Settings::<T>::get().round_duration;
        game.round = game.round.saturating_add(1);
        game.phase = GamePhase::RoundActive;
        game.round_deadline = Self::now().saturating_add(duration);

        log::info!(
            target: crate::LOG_TARGET,
            "game {} round {} started, {} tickets active",
            game.game_id,
            game.round,
            ActiveCount::<T>::get()
        );
        Self::deposit_event(Event::RoundStarted {
            game_id: game.game_id,
            round: game.round,
            deadline: game.round_deadline,
        });
    }

    pub(crate) fn do_start_round() -> DispatchResult {
        let mut game = Game::<T>::get();
        ensure!(game.phase == GamePhase::Claiming, Error::<T>::WrongPhase);
        ensure!(game.minted > 0, Error::<T>::NoTickets);
        Self::begin_round(&mut game);
        Game::<T>::put(game);
        Ok(())
    }

    pub(crate) fn do_end_round() -> DispatchResult {
        let mut game = Game::<T>::get();
        ensure!(game.phase == GamePhase::RoundActive, Error::<T>::WrongPhase);
        ensure!(Self::now() >= game.round_deadline, Error::<T>::DeadlineNotReached);

        Self::clear_market(game.round);
        game.phase = GamePhase::AwaitingRandomness;
        Game::<T>::put(&game);
        Self::deposit_event(Event::RoundEnded { game_id: game.game_id, round: game.round });

        Self::request_randomness(&game)
    }

    fn request_randomness(game: &GameState<T>) -> DispatchResult {
        let request_id = T::Randomness::request_randomness()?;
        PendingRequest::<T>::put(PendingRandomness {
            request_id,
            game_id: game.game_id,
            round: game.round,
            requested_at: Self::now(),
        });
        log::debug!(
            target: crate::LOG_TARGET,
            "randomness request {} for game {} round {}",
            request_id,
            game.game_id,
            game.round
        );
        Self::deposit_event(Event::RandomnessRequested { request_id, round: game.round });
        Ok(())
    }

    pub(crate) fn do_retry_randomness() -> DispatchResult {
        let game = Game::<T>::get();
        ensure!(game.phase == GamePhase::AwaitingRandomness, Error::<T>::WrongPhase);
        if let Some(pending) = PendingRequest::<T>::get() {
            let timeout = Settings::<T>::get().randomness_timeout;
            ensure!(
                Self::now() >= pending.requested_at.saturating_add(timeout),
                Error::<T>::RetryTooEarly
            );
            log::warn!(
                target: crate::LOG_TARGET,
                "randomness request {} timed out, re-requesting",
                pending.request_id
            );
        }
        Self::request_randomness(&game)
    }

    pub(crate) fn do_receive_randomness(request_id: RequestId, words: &[[u8; 32]]) -> DispatchResult {
        let seed = *words.first().ok_or(Error::<T>::EmptyRandomness)?;
        let pending = PendingRequest::<T>::get().ok_or(Error::<T>::UnknownRequest)?;
        ensure!(pending.request_id == request_id, Error::<T>::UnknownRequest);

        let mut game = Game::<T>::get();
        ensure!(
            game.phase == GamePhase::AwaitingRandomness &&
                pending.game_id == game.game_id &&
                pending.round == game.round,
            Error::<T>::StaleRequest
        );

        PendingRequest::<T>::kill();
        Collected::<T>::kill();
        Elimination::<T>::put(EliminationProgress::start(seed));
        game.phase = GamePhase::Eliminating;
        Game::<T>::put(&game);

        Self::deposit_event(Event::RandomnessReceived { request_id, round: game.round });
        Ok(())
    }
}
