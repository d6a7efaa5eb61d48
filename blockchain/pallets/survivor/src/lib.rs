//! # Survivor Pallet
//!
//! A multi-round elimination game. Players claim numbered board positions, each
//! represented by a ticket token held in an external registry. Once every position is
//! claimed (or the admin starts early) the game runs rounds: a round ends after its
//! deadline, randomness is requested, and once it arrives half of the remaining
//! tickets are eliminated in bounded, resumable steps. The last ticket standing wins
//! the prize pool. Between rounds, tickets trade on an escrowed marketplace whose fees
//! feed the pool.
//!
//! Work that scales with the board (collection, shuffling, cleanup) never runs in a
//! single call: [`Pallet::advance_elimination`] and [`Pallet::finalize_step`] each do
//! one bounded chunk and persist a checkpoint. [`Pallet::perform_upkeep`] lets a keeper
//! drive whichever of these is currently due.
//!
//! Outgoing payments are attempted directly; if a push fails the amount is credited to
//! the recipient's pending balance, which they pull with [`Pallet::withdraw_pending`].

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub mod traits;
pub mod weights;

mod impls;
mod lifecycle;
mod market;

pub use traits::{RandomnessRequester, RequestId, TicketId, TicketRegistry};
pub use weights::WeightInfo;

pub use survivor_core::{FlagKind, Position};

/// Log target for everything this pallet emits.
pub const LOG_TARGET: &str = "runtime::survivor";

/// Blocks a round lasts unless configured otherwise.
pub const DEFAULT_ROUND_DURATION: u32 = 600;

/// Blocks to wait for randomness before the admin may re-request it.
pub const DEFAULT_RANDOMNESS_TIMEOUT: u32 = 300;

#[frame::pallet]
pub mod pallet {
    use alloc::vec::Vec;
    use frame::arithmetic::{PerThing, Percent};
    use frame::prelude::*;
    use frame::traits::{fungible, Contains, Get};
    use survivor_core::{EliminationProgress, FlagKind, Position};

    use crate::traits::{RandomnessRequester, RequestId, TicketId, TicketRegistry};
    use crate::weights::WeightInfo;

    #[pallet::pallet]
    pub struct Pallet<T>(_);

    /// Configure the pallet by specifying the parameters and types on which it depends.
    #[pallet::config]
    pub trait Config: frame_system::Config {
        /// Because this pallet emits events, it depends on the runtime's definition of an event.
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Currency for claim prices, trades and prize payouts.
        type Currency: fungible::Inspect<Self::AccountId> + fungible::Mutate<Self::AccountId>;

        /// Registry holding the ticket tokens.
        type Tickets: TicketRegistry<Self::AccountId>;

        /// Asynchronous randomness source.
        type Randomness: RandomnessRequester;

        /// Origin allowed to deliver randomness.
        type RandomnessOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        /// Origin for administration: pausing, settings, emergency withdrawal.
        type AdminOrigin: EnsureOrigin<Self::RuntimeOrigin>;

        /// Accounts that must never receive a direct push of the winner payout.
        /// Their winnings are always credited to the pending ledger.
        type ContractAccounts: Contains<Self::AccountId>;

        /// Recipient of the dealer fee on every trade.
        type Dealer: Get<Self::AccountId>;

        /// Pallet ID used to derive the escrow account.
        #[pallet::constant]
        type PalletId: Get<frame::deps::frame_support::PalletId>;

        /// Number of positions on the board.
        #[pallet::constant]
        type BoardSize: Get<u32>;

        /// Positions scanned per collection step.
        #[pallet::constant]
        type CollectionChunk: Get<u32>;

        /// Shuffle slots fixed per selection step.
        #[pallet::constant]
        type ShuffleBatch: Get<u32>;

        /// Positions retired per finalization step.
        #[pallet::constant]
        type FinalizeChunk: Get<u32>;

        /// Number of past winners kept in `RecentWinners`. Zero disables the history.
        #[pallet::constant]
        type MaxWinnerHistory: Get<u32>;

        /// Upper bound on words accepted by `receive_randomness`.
        #[pallet::constant]
        type MaxRandomWords: Get<u32>;

        /// Weight information for extrinsics in this pallet.
        type WeightInfo: WeightInfo;
    }

    /// Type alias for the balance type from the configured Currency.
    pub type BalanceOf<T> = <<T as Config>::Currency as fungible::Inspect<
        <T as frame_system::Config>::AccountId,
    >>::Balance;

    /// Where the current game is in its lifecycle.
    #[derive(
        Encode, Decode, TypeInfo, Clone, Copy, PartialEq, Eq, RuntimeDebug, MaxEncodedLen, Default,
    )]
    pub enum GamePhase {
        /// Positions can be claimed. No round has started yet.
        #[default]
        Claiming,
        /// A round is running until its deadline.
        RoundActive,
        /// The round ended; waiting for the randomness callback.
        AwaitingRandomness,
        /// Randomness arrived; elimination steps are being applied.
        Eliminating,
        /// A winner was declared, or nothing survived.
        Completed,
        /// Tickets of the finished game are being retired.
        Finalizing,
    }

    /// State of the current game.
    #[derive(
        Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound, MaxEncodedLen, DefaultNoBound,
    )]
    #[scale_info(skip_type_params(T))]
    pub struct GameState<T: Config> {
        pub game_id: u32,
        /// Rounds started so far in this game. Zero while claiming.
        pub round: u32,
        pub phase: GamePhase,
        /// Block at which the current round may be ended.
        pub round_deadline: BlockNumberFor<T>,
        /// Tickets minted for this game.
        pub minted: u32,
        pub winner: Option<Position>,
    }

    /// Tunable game parameters.
    #[derive(
        Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound, MaxEncodedLen,
    )]
    #[scale_info(skip_type_params(T))]
    pub struct GameSettings<T: Config> {
        pub round_duration: BlockNumberFor<T>,
        pub randomness_timeout: BlockNumberFor<T>,
        /// Share of every trade paid to the dealer.
        pub dealer_fee: Percent,
        /// Share of every trade added to the prize pool.
        pub prize_fee: Percent,
        /// Share of the prize pool held back for the next game.
        pub rollover: Percent,
        pub claim_price: BalanceOf<T>,
        pub max_claims_per_account: u32,
    }

    impl<T: Config> Default for GameSettings<T> {
        fn default() -> Self {
            Self {
                round_duration: crate::DEFAULT_ROUND_DURATION.into(),
                randomness_timeout: crate::DEFAULT_RANDOMNESS_TIMEOUT.into(),
                dealer_fee: Percent::from_percent(5),
                prize_fee: Percent::from_percent(10),
                rollover: Percent::from_percent(10),
                claim_price: Zero::zero(),
                max_claims_per_account: 10,
            }
        }
    }

    /// An active sale listing.
    #[derive(
        Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound, MaxEncodedLen,
    )]
    #[scale_info(skip_type_params(T))]
    pub struct Listing<T: Config> {
        /// Owner at the time of listing. A sale fails if the ticket moved since.
        pub seller: T::AccountId,
        pub price: BalanceOf<T>,
    }

    /// An escrowed purchase offer.
    #[derive(
        Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound, MaxEncodedLen,
    )]
    #[scale_info(skip_type_params(T))]
    pub struct Offer<T: Config> {
        pub maker: T::AccountId,
        pub amount: BalanceOf<T>,
    }

    /// Binding between a board position and its ticket token.
    #[derive(
        Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound, MaxEncodedLen,
    )]
    #[scale_info(skip_type_params(T))]
    pub struct TicketRecord<T: Config> {
        pub ticket: TicketId,
        pub game_id: u32,
        pub created_at: BlockNumberFor<T>,
        pub listing: Option<Listing<T>>,
        pub offer: Option<Offer<T>>,
    }

    /// Claims made by one account, scoped to a game.
    #[derive(Encode, Decode, TypeInfo, Clone, Copy, PartialEq, Eq, RuntimeDebug, MaxEncodedLen, Default)]
    pub struct ClaimCount {
        pub game_id: u32,
        pub count: u32,
    }

    /// The outstanding randomness request.
    #[derive(
        Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound, MaxEncodedLen,
    )]
    #[scale_info(skip_type_params(T))]
    pub struct PendingRandomness<T: Config> {
        pub request_id: RequestId,
        pub game_id: u32,
        pub round: u32,
        pub requested_at: BlockNumberFor<T>,
    }

    /// A finished game's winner.
    #[derive(
        Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound, MaxEncodedLen,
    )]
    #[scale_info(skip_type_params(T))]
    pub struct WinnerRecord<T: Config> {
        pub game_id: u32,
        pub position: Position,
        pub ticket: TicketId,
        pub owner: T::AccountId,
        pub payout: BalanceOf<T>,
        pub declared_at: BlockNumberFor<T>,
    }

    /// Read model of one position for front-ends.
    #[derive(Encode, Decode, TypeInfo, CloneNoBound, PartialEqNoBound, RuntimeDebugNoBound)]
    #[scale_info(skip_type_params(T))]
    pub struct TicketView<T: Config> {
        pub position: Position,
        pub ticket: Option<TicketId>,
        pub owner: Option<T::AccountId>,
        pub active: bool,
        pub listed: bool,
        pub has_offer: bool,
        pub winner: bool,
        pub listing_price: Option<BalanceOf<T>>,
        pub offer: Option<Offer<T>>,
        pub game_id: Option<u32>,
        pub created_at: Option<BlockNumberFor<T>>,
    }

    /// Maintenance work a keeper can trigger through `perform_upkeep`.
    #[derive(Encode, Decode, TypeInfo, Clone, Copy, PartialEq, Eq, RuntimeDebug)]
    pub enum UpkeepAction {
        EndRound,
        AdvanceElimination,
        FinalizeGame,
    }

    /// Game parameters.
    #[pallet::storage]
    pub type Settings<T: Config> = StorageValue<_, GameSettings<T>, ValueQuery>;

    /// The current game.
    #[pallet::storage]
    pub type Game<T: Config> = StorageValue<_, GameState<T>, ValueQuery>;

    /// Funds the next winner receives, before rollover.
    #[pallet::storage]
    pub type PrizePool<T: Config> = StorageValue<_, BalanceOf<T>, ValueQuery>;

    /// Funds held back from the last payout, added to the pool when the game is finalized.
    #[pallet::storage]
    pub type RolloverReserve<T: Config> = StorageValue<_, BalanceOf<T>, ValueQuery>;

    /// Flag bitsets, 64 positions per word. Zero words are not stored.
    #[pallet::storage]
    pub type BoardWords<T: Config> = StorageDoubleMap<
        _,
        Twox64Concat, FlagKind,
        Twox64Concat, u32,
        u64,
        ValueQuery,
    >;

    /// Number of positions with the `Active` flag set.
    #[pallet::storage]
    pub type ActiveCount<T: Config> = StorageValue<_, u32, ValueQuery>;

    /// Ticket bound to each claimed position.
    #[pallet::storage]
    pub type Tickets<T: Config> = StorageMap<_, Twox64Concat, Position, TicketRecord<T>, OptionQuery>;

    /// Reverse index of `Tickets`.
    #[pallet::storage]
    pub type PositionOf<T: Config> = StorageMap<_, Twox64Concat, TicketId, Position, OptionQuery>;

    /// Claims per account. Counts from an older game are treated as zero.
    #[pallet::storage]
    pub type ClaimCounts<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AccountId, ClaimCount, ValueQuery>;

    /// Payments that could not be pushed, awaiting withdrawal.
    #[pallet::storage]
    pub type PendingWithdrawals<T: Config> =
        StorageMap<_, Blake2_128Concat, T::AccountId, BalanceOf<T>, ValueQuery>;

    /// Sum of all `PendingWithdrawals`.
    #[pallet::storage]
    pub type TotalPending<T: Config> = StorageValue<_, BalanceOf<T>, ValueQuery>;

    /// Checkpoint of the running elimination.
    #[pallet::storage]
    pub type Elimination<T: Config> = StorageValue<_, EliminationProgress, ValueQuery>;

    /// Working list of the running elimination.
    #[pallet::storage]
    pub type Collected<T: Config> = StorageValue<_, BoundedVec<Position, T::BoardSize>, ValueQuery>;

    /// Last position handled by finalization.
    #[pallet::storage]
    pub type FinalizeCursor<T: Config> = StorageValue<_, Position, ValueQuery>;

    /// The randomness request the game is waiting on.
    #[pallet::storage]
    pub type PendingRequest<T: Config> = StorageValue<_, PendingRandomness<T>, OptionQuery>;

    /// Most recent winners, oldest first.
    #[pallet::storage]
    pub type RecentWinners<T: Config> =
        StorageValue<_, BoundedVec<WinnerRecord<T>, T::MaxWinnerHistory>, ValueQuery>;

    /// Whether player-facing operations are halted.
    #[pallet::storage]
    pub type Paused<T: Config> = StorageValue<_, bool, ValueQuery>;

    /// Set while a fund-moving call is executing.
    #[pallet::storage]
    pub type Locked<T: Config> = StorageValue<_, bool, ValueQuery>;

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        /// A position was claimed and its ticket minted.
        TicketClaimed {
            game_id: u32,
            position: Position,
            ticket: TicketId,
            owner: T::AccountId,
        },
        /// A round started.
        RoundStarted {
            game_id: u32,
            round: u32,
            deadline: BlockNumberFor<T>,
        },
        /// A round passed its deadline and was closed.
        RoundEnded { game_id: u32, round: u32 },
        /// Randomness was requested for a round.
        RandomnessRequested { request_id: RequestId, round: u32 },
        /// Randomness arrived and elimination can begin.
        RandomnessReceived { request_id: RequestId, round: u32 },
        /// Collection finished; `target` of `total` tickets will be eliminated.
        CollectionCompleted { round: u32, total: u32, target: u32 },
        /// A ticket was eliminated.
        TicketEliminated {
            game_id: u32,
            round: u32,
            position: Position,
        },
        /// The game has a winner.
        WinnerDeclared {
            game_id: u32,
            position: Position,
            owner: T::AccountId,
            payout: BalanceOf<T>,
            rollover: BalanceOf<T>,
        },
        /// Nothing survived; the pool carries over.
        GameEndedWithoutWinner { game_id: u32 },
        /// A finalization chunk was processed.
        FinalizationProgressed { game_id: u32, cursor: Position },
        /// The finished game was cleaned up and a new one opened.
        GameFinalized {
            game_id: u32,
            next_game_id: u32,
            carried_over: BalanceOf<T>,
        },
        /// A ticket was listed for sale.
        Listed {
            position: Position,
            seller: T::AccountId,
            price: BalanceOf<T>,
        },
        /// A listing was withdrawn.
        Unlisted { position: Position },
        /// A listed ticket was bought.
        Purchased {
            position: Position,
            seller: T::AccountId,
            buyer: T::AccountId,
            price: BalanceOf<T>,
        },
        /// An offer was escrowed.
        OfferMade {
            position: Position,
            maker: T::AccountId,
            amount: BalanceOf<T>,
        },
        /// The owner accepted an offer.
        OfferAccepted {
            position: Position,
            seller: T::AccountId,
            buyer: T::AccountId,
            amount: BalanceOf<T>,
        },
        /// The owner rejected an offer and the maker was refunded.
        OfferRejected {
            position: Position,
            maker: T::AccountId,
            amount: BalanceOf<T>,
        },
        /// The maker withdrew an offer.
        OfferCancelled {
            position: Position,
            maker: T::AccountId,
            amount: BalanceOf<T>,
        },
        /// Round end removed all listings and offers.
        MarketCleared { round: u32, listings: u32, offers: u32 },
        /// A push failed; the amount was credited to the recipient's pending balance.
        PaymentDeferred { who: T::AccountId, amount: BalanceOf<T> },
        /// Pending funds were withdrawn.
        Withdrawn { who: T::AccountId, amount: BalanceOf<T> },
        /// Someone topped up the prize pool.
        PrizePoolFunded { who: T::AccountId, amount: BalanceOf<T> },
        /// The game was paused or unpaused.
        PauseToggled { paused: bool },
        /// Game settings changed.
        SettingsUpdated,
        /// Reserve funds were moved out while paused.
        EmergencyWithdrawal { to: T::AccountId, amount: BalanceOf<T> },
    }

    #[pallet::error]
    pub enum Error<T> {
        // State violations
        /// The game is paused.
        Paused,
        /// Emergency withdrawal requires the game to be paused.
        NotPaused,
        /// The operation is not allowed in the current game phase.
        WrongPhase,
        /// The marketplace is closed outside claiming and active rounds.
        MarketClosed,
        /// Position is outside the board.
        InvalidPosition,
        /// Position already has a ticket.
        PositionTaken,
        /// No ticket is bound to this position.
        TicketNotFound,
        /// The ticket has been eliminated.
        TicketNotActive,
        /// The ticket is already listed.
        AlreadyListed,
        /// The ticket is not listed.
        NotListed,
        /// The ticket changed hands since it was listed.
        StaleListing,
        /// The ticket already has an offer.
        OfferExists,
        /// The ticket has no offer.
        NoOffer,
        /// The round deadline has not passed yet.
        DeadlineNotReached,
        /// A fund-moving call is already executing.
        Reentrancy,
        /// No pending funds to withdraw.
        NothingToWithdraw,
        /// A round cannot start without tickets.
        NoTickets,
        /// Elimination state is inconsistent.
        EliminationCorrupted,
        // Authorization
        /// Caller does not own the ticket.
        NotTicketOwner,
        /// Caller did not make this offer.
        NotOfferMaker,
        /// Owners cannot buy or bid on their own ticket.
        OwnTicket,
        /// The pallet is not approved to move the ticket.
        NotApproved,
        // Payment
        /// Payment does not equal the listing price.
        PaymentMismatch,
        /// Amount must be non-zero.
        ZeroAmount,
        // Capacity
        /// Every position has been claimed.
        BoardFull,
        /// Account reached its claim limit for this game.
        ClaimLimitReached,
        // Randomness
        /// The callback carried no random words.
        EmptyRandomness,
        /// The request id does not match the outstanding request.
        UnknownRequest,
        /// The request belongs to an earlier round.
        StaleRequest,
        /// The randomness timeout has not elapsed.
        RetryTooEarly,
        // Transfers
        /// A required outgoing transfer failed.
        TransferFailed,
        // Configuration
        /// Dealer and prize fees exceed 100%.
        InvalidFeeConfig,
        /// Durations must be non-zero.
        InvalidDuration,
        /// The claim limit must be non-zero.
        InvalidClaimLimit,
        /// Requested amount exceeds the prize and rollover reserves.
        ExceedsReserves,
    }

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub round_duration: u32,
        pub randomness_timeout: u32,
        pub dealer_fee_percent: u8,
        pub prize_fee_percent: u8,
        pub rollover_percent: u8,
        pub claim_price: u128,
        pub max_claims_per_account: u32,
        #[serde(skip)]
        pub _phantom: core::marker::PhantomData<T>,
    }

    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            Self {
                round_duration: crate::DEFAULT_ROUND_DURATION,
                randomness_timeout: crate::DEFAULT_RANDOMNESS_TIMEOUT,
                dealer_fee_percent: 5,
                prize_fee_percent: 10,
                rollover_percent: 10,
                claim_price: 0,
                max_claims_per_account: 10,
                _phantom: Default::default(),
            }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            use frame::deps::sp_runtime::traits::SaturatedConversion;

            assert!(
                self.dealer_fee_percent as u16 + self.prize_fee_percent as u16 <= 100,
                "dealer and prize fees must not exceed 100%"
            );
            assert!(self.round_duration > 0, "round duration must be non-zero");
            assert!(self.randomness_timeout > 0, "randomness timeout must be non-zero");
            assert!(self.max_claims_per_account > 0, "claim limit must be non-zero");

            Settings::<T>::put(GameSettings::<T> {
                round_duration: self.round_duration.into(),
                randomness_timeout: self.randomness_timeout.into(),
                dealer_fee: Percent::from_percent(self.dealer_fee_percent),
                prize_fee: Percent::from_percent(self.prize_fee_percent),
                rollover: Percent::from_percent(self.rollover_percent),
                claim_price: self.claim_price.saturated_into(),
                max_claims_per_account: self.max_claims_per_account,
            });
            Game::<T>::put(GameState::<T> { game_id: 1, ..Default::default() });

            // Endow the escrow so deposits below the existential deposit can land.
            let escrow = Pallet::<T>::account_id();
            let minimum = <T::Currency as fungible::Inspect<T::AccountId>>::minimum_balance();
            if <T::Currency as fungible::Inspect<T::AccountId>>::balance(&escrow) < minimum {
                if let Err(e) =
                    <T::Currency as fungible::Mutate<T::AccountId>>::mint_into(&escrow, minimum)
                {
                    log::warn!(target: crate::LOG_TARGET, "escrow endowment failed: {:?}", e);
                }
            }
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Claim an open position and mint its ticket to the caller.
        ///
        /// Charges the configured claim price into the prize pool. The claim that fills
        /// the board starts the first round.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::claim())]
        pub fn claim(origin: OriginFor<T>, position: Position) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_claim(&who, position))
        }

        /// List an owned, active ticket for sale at `price`.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::list())]
        pub fn list(origin: OriginFor<T>, position: Position, price: BalanceOf<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::do_list(&who, position, price)
        }

        /// Withdraw a listing.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::unlist())]
        pub fn unlist(origin: OriginFor<T>, position: Position) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::do_unlist(&who, position)
        }

        /// Buy a listed ticket. `payment` must equal the listing price.
        #[pallet::call_index(3)]
        #[pallet::weight(T::WeightInfo::purchase())]
        pub fn purchase(
            origin: OriginFor<T>,
            position: Position,
            payment: BalanceOf<T>,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_purchase(&who, position, payment))
        }

        /// Escrow an offer for a ticket the caller does not own.
        #[pallet::call_index(4)]
        #[pallet::weight(T::WeightInfo::make_offer())]
        pub fn make_offer(
            origin: OriginFor<T>,
            position: Position,
            amount: BalanceOf<T>,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_make_offer(&who, position, amount))
        }

        /// Sell the ticket to its offer maker.
        #[pallet::call_index(5)]
        #[pallet::weight(T::WeightInfo::accept_offer())]
        pub fn accept_offer(origin: OriginFor<T>, position: Position) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_accept_offer(&who, position))
        }

        /// Refuse the offer on an owned ticket, refunding its maker.
        #[pallet::call_index(6)]
        #[pallet::weight(T::WeightInfo::reject_offer())]
        pub fn reject_offer(origin: OriginFor<T>, position: Position) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_reject_offer(&who, position))
        }

        /// Withdraw the caller's own offer.
        #[pallet::call_index(7)]
        #[pallet::weight(T::WeightInfo::cancel_offer())]
        pub fn cancel_offer(origin: OriginFor<T>, position: Position) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_cancel_offer(&who, position))
        }

        /// Pull the caller's entire pending balance.
        #[pallet::call_index(8)]
        #[pallet::weight(T::WeightInfo::withdraw_pending())]
        pub fn withdraw_pending(origin: OriginFor<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_withdraw_pending(&who))
        }

        /// Close the active round once its deadline has passed and request randomness.
        #[pallet::call_index(9)]
        #[pallet::weight(Pallet::<T>::end_round_weight())]
        pub fn end_round(origin: OriginFor<T>) -> DispatchResult {
            ensure_signed(origin)?;
            Self::ensure_not_paused()?;
            Self::with_lock(Self::do_end_round)
        }

        /// Randomness callback. Only the first word is used as the round seed.
        #[pallet::call_index(10)]
        #[pallet::weight(T::WeightInfo::receive_randomness())]
        pub fn receive_randomness(
            origin: OriginFor<T>,
            request_id: RequestId,
            words: BoundedVec<[u8; 32], T::MaxRandomWords>,
        ) -> DispatchResult {
            T::RandomnessOrigin::ensure_origin(origin)?;
            Self::do_receive_randomness(request_id, &words)
        }

        /// Run one bounded elimination step.
        #[pallet::call_index(11)]
        #[pallet::weight(Pallet::<T>::advance_elimination_weight())]
        pub fn advance_elimination(origin: OriginFor<T>) -> DispatchResult {
            ensure_signed(origin)?;
            Self::ensure_not_paused()?;
            Self::with_lock(Self::do_advance_elimination)
        }

        /// Retire one chunk of the finished game's tickets.
        #[pallet::call_index(12)]
        #[pallet::weight(Pallet::<T>::finalize_step_weight())]
        pub fn finalize_step(origin: OriginFor<T>) -> DispatchResult {
            ensure_signed(origin)?;
            Self::ensure_not_paused()?;
            Self::with_lock(Self::do_finalize_step)
        }

        /// Perform whatever maintenance is due. Does nothing if none is.
        #[pallet::call_index(13)]
        #[pallet::weight(
            Pallet::<T>::end_round_weight()
                .max(Pallet::<T>::advance_elimination_weight())
                .max(Pallet::<T>::finalize_step_weight())
        )]
        pub fn perform_upkeep(origin: OriginFor<T>) -> DispatchResult {
            ensure_signed(origin)?;
            Self::ensure_not_paused()?;
            let Some(action) = Self::pending_upkeep() else {
                return Ok(());
            };
            log::debug!(target: crate::LOG_TARGET, "upkeep: {:?}", action);
            match action {
                UpkeepAction::EndRound => Self::with_lock(Self::do_end_round),
                UpkeepAction::AdvanceElimination => Self::with_lock(Self::do_advance_elimination),
                UpkeepAction::FinalizeGame => Self::with_lock(Self::do_finalize_step),
            }
        }

        /// Start the first round before the board is full.
        #[pallet::call_index(14)]
        #[pallet::weight(T::WeightInfo::start_round())]
        pub fn start_round(origin: OriginFor<T>) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Self::do_start_round()
        }

        /// Issue a new randomness request once the previous one has timed out.
        #[pallet::call_index(15)]
        #[pallet::weight(T::WeightInfo::retry_randomness())]
        pub fn retry_randomness(origin: OriginFor<T>) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Self::do_retry_randomness()
        }

        #[pallet::call_index(16)]
        #[pallet::weight(T::WeightInfo::update_settings())]
        pub fn set_paused(origin: OriginFor<T>, paused: bool) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Paused::<T>::put(paused);
            log::info!(target: crate::LOG_TARGET, "paused set to {}", paused);
            Self::deposit_event(Event::PauseToggled { paused });
            Ok(())
        }

        /// Change the round duration. Not allowed mid-round or mid-elimination.
        #[pallet::call_index(17)]
        #[pallet::weight(T::WeightInfo::update_settings())]
        pub fn set_round_duration(origin: OriginFor<T>, blocks: BlockNumberFor<T>) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            ensure!(!blocks.is_zero(), Error::<T>::InvalidDuration);
            ensure!(
                !matches!(Game::<T>::get().phase, GamePhase::RoundActive | GamePhase::Eliminating),
                Error::<T>::WrongPhase
            );
            Settings::<T>::mutate(|s| s.round_duration = blocks);
            Self::deposit_event(Event::SettingsUpdated);
            Ok(())
        }

        /// Change the trade fee split and the winner rollover share.
        #[pallet::call_index(18)]
        #[pallet::weight(T::WeightInfo::update_settings())]
        pub fn set_fees(
            origin: OriginFor<T>,
            dealer_fee: Percent,
            prize_fee: Percent,
            rollover: Percent,
        ) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            ensure!(
                dealer_fee.deconstruct() as u16 + prize_fee.deconstruct() as u16 <= 100,
                Error::<T>::InvalidFeeConfig
            );
            Settings::<T>::mutate(|s| {
                s.dealer_fee = dealer_fee;
                s.prize_fee = prize_fee;
                s.rollover = rollover;
            });
            Self::deposit_event(Event::SettingsUpdated);
            Ok(())
        }

        #[pallet::call_index(19)]
        #[pallet::weight(T::WeightInfo::update_settings())]
        pub fn set_randomness_timeout(
            origin: OriginFor<T>,
            blocks: BlockNumberFor<T>,
        ) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            ensure!(!blocks.is_zero(), Error::<T>::InvalidDuration);
            Settings::<T>::mutate(|s| s.randomness_timeout = blocks);
            Self::deposit_event(Event::SettingsUpdated);
            Ok(())
        }

        /// Change the claim price and the per-account claim limit.
        #[pallet::call_index(20)]
        #[pallet::weight(T::WeightInfo::update_settings())]
        pub fn set_claim_settings(
            origin: OriginFor<T>,
            claim_price: BalanceOf<T>,
            max_claims_per_account: u32,
        ) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            ensure!(max_claims_per_account > 0, Error::<T>::InvalidClaimLimit);
            Settings::<T>::mutate(|s| {
                s.claim_price = claim_price;
                s.max_claims_per_account = max_claims_per_account;
            });
            Self::deposit_event(Event::SettingsUpdated);
            Ok(())
        }

        /// Move reserve funds out while the game is paused.
        ///
        /// Draws from the prize pool first, then the rollover reserve. Pending
        /// withdrawals are never touched.
        #[pallet::call_index(21)]
        #[pallet::weight(T::WeightInfo::emergency_withdraw())]
        pub fn emergency_withdraw(
            origin: OriginFor<T>,
            to: T::AccountId,
            amount: BalanceOf<T>,
        ) -> DispatchResult {
            T::AdminOrigin::ensure_origin(origin)?;
            Self::with_lock(|| Self::do_emergency_withdraw(&to, amount))
        }

        /// Add funds to the prize pool.
        #[pallet::call_index(22)]
        #[pallet::weight(T::WeightInfo::fund_prize_pool())]
        pub fn fund_prize_pool(origin: OriginFor<T>, amount: BalanceOf<T>) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::with_lock(|| Self::do_fund_prize_pool(&who, amount))
        }
    }

    impl<T: Config> Pallet<T> {
        /// Read model for a batch of positions. Positions off the board are skipped.
        pub fn ticket_views(positions: &[Position]) -> Vec<TicketView<T>> {
            let board = Self::board();
            positions
                .iter()
                .copied()
                .filter(|p| board.contains(*p))
                .map(|position| {
                    let record = Tickets::<T>::get(position);
                    let ticket = record
                        .as_ref()
                        .map(|r| r.ticket)
                        .filter(|id| T::Tickets::exists(*id));
                    TicketView {
                        position,
                        ticket,
                        owner: ticket.and_then(T::Tickets::owner_of),
                        active: board.get(FlagKind::Active, position),
                        listed: board.get(FlagKind::Listed, position),
                        has_offer: board.get(FlagKind::HasOffer, position),
                        winner: board.get(FlagKind::Winner, position),
                        listing_price: record.as_ref().and_then(|r| r.listing.as_ref().map(|l| l.price)),
                        game_id: record.as_ref().map(|r| r.game_id),
                        created_at: record.as_ref().map(|r| r.created_at),
                        offer: record.and_then(|r| r.offer),
                    }
                })
                .collect()
        }

        /// Position a ticket is bound to, if any.
        pub fn position_of(ticket: TicketId) -> Option<Position> {
            PositionOf::<T>::get(ticket)
        }

        /// Whether `perform_upkeep` would do anything.
        pub fn check_upkeep() -> bool {
            !Paused::<T>::get() && Self::pending_upkeep().is_some()
        }

        /// The maintenance action currently due, if any.
        pub fn pending_upkeep() -> Option<UpkeepAction> {
            let game = Game::<T>::get();
            match game.phase {
                GamePhase::RoundActive
                    if frame_system::Pallet::<T>::block_number() >= game.round_deadline =>
                    Some(UpkeepAction::EndRound),
                GamePhase::Eliminating => Some(UpkeepAction::AdvanceElimination),
                GamePhase::Completed | GamePhase::Finalizing => Some(UpkeepAction::FinalizeGame),
                _ => None,
            }
        }

        /// Number of tickets still in the game.
        pub fn active_count() -> u32 {
            ActiveCount::<T>::get()
        }
    }
}
