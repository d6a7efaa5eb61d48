use crate::traits::{RandomnessRequester, RequestId, TicketId, TicketRegistry};
use frame::{
    deps::{
        frame_support::{storage::unhashed, weights::constants::RocksDbWeight},
        frame_system::GenesisConfig,
    },
    prelude::*,
    runtime::prelude::*,
    testing_prelude::*,
};
use polkadot_sdk::pallet_balances;

// Configure a mock runtime to test the pallet.
#[frame_construct_runtime]
mod test_runtime {
    #[runtime::runtime]
    #[runtime::derive(
        RuntimeCall,
        RuntimeEvent,
        RuntimeError,
        RuntimeOrigin,
        RuntimeFreezeReason,
        RuntimeHoldReason,
        RuntimeSlashReason,
        RuntimeLockId,
        RuntimeTask,
        RuntimeViewFunction
    )]
    pub struct Test;

    #[runtime::pallet_index(0)]
    pub type System = frame_system;
    #[runtime::pallet_index(1)]
    pub type Survivor = crate;
    #[runtime::pallet_index(2)]
    pub type Balances = pallet_balances;
}

pub const EXISTENTIAL_DEPOSIT: u64 = 5;
pub const STARTING_BALANCE: u64 = 10_000;
pub const ORACLE: u64 = 100;
pub const DEALER: u64 = 99;
/// Accounts at or above this id count as contract accounts.
pub const CONTRACTS_FROM: u64 = 1_000;
pub const ROUND_DURATION: u64 = 10;
pub const RANDOMNESS_TIMEOUT: u64 = 5;

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type Nonce = u64;
    type Block = MockBlock<Test>;
    type BlockHashCount = ConstU64<250>;
    type DbWeight = RocksDbWeight;
    type AccountData = pallet_balances::AccountData<u64>;
}

impl pallet_balances::Config for Test {
    type Balance = u64;
    type RuntimeEvent = RuntimeEvent;
    type DustRemoval = ();
    type ExistentialDeposit = ConstU64<EXISTENTIAL_DEPOSIT>;
    type AccountStore = System;
    type MaxLocks = ConstU32<50>;
    type MaxReserves = ConstU32<50>;
    type ReserveIdentifier = [u8; 8];
    type WeightInfo = ();
    type RuntimeHoldReason = RuntimeHoldReason;
    type RuntimeFreezeReason = RuntimeFreezeReason;
    type FreezeIdentifier = RuntimeFreezeReason;
    type MaxFreezes = ConstU32<0>;
    type DoneSlashHandler = ();
}

frame::deps::frame_support::parameter_types! {
    pub const SurvivorPalletId: frame::deps::frame_support::PalletId =
        frame::deps::frame_support::PalletId(*b"survivor");
    pub storage DealerAccount: u64 = DEALER;
    pub storage NextTicketId: TicketId = 1;
    pub storage NextRequestId: RequestId = 1;
    pub storage RandomnessOffline: bool = false;
}

frame::deps::frame_support::ord_parameter_types! {
    pub const Oracle: u64 = ORACLE;
}

/// Ticket registry kept in raw storage so it rolls back with the pallet's own writes.
pub struct MockTickets;

impl MockTickets {
    fn owner_key(ticket: TicketId) -> Vec<u8> {
        (b"mock/owner", ticket).encode()
    }

    fn approval_key(ticket: TicketId) -> Vec<u8> {
        (b"mock/approval", ticket).encode()
    }

    /// Grant `operator` the right to move `ticket`.
    pub fn approve(ticket: TicketId, operator: u64) {
        unhashed::put(&Self::approval_key(ticket), &operator);
    }

    pub fn revoke(ticket: TicketId) {
        unhashed::kill(&Self::approval_key(ticket));
    }

    /// Move a ticket outside the pallet, as a direct registry transfer would.
    pub fn transfer_externally(ticket: TicketId, to: u64) {
        unhashed::put(&Self::owner_key(ticket), &to);
        Self::revoke(ticket);
    }
}

impl TicketRegistry<u64> for MockTickets {
    fn exists(ticket: TicketId) -> bool {
        unhashed::exists(&Self::owner_key(ticket))
    }

    fn owner_of(ticket: TicketId) -> Option<u64> {
        unhashed::get(&Self::owner_key(ticket))
    }

    fn mint(to: &u64) -> Result<TicketId, DispatchError> {
        let ticket = NextTicketId::get();
        NextTicketId::set(&(ticket + 1));
        unhashed::put(&Self::owner_key(ticket), to);
        Ok(ticket)
    }

    fn burn(ticket: TicketId) -> DispatchResult {
        ensure!(Self::exists(ticket), DispatchError::Other("no such ticket"));
        unhashed::kill(&Self::owner_key(ticket));
        Self::revoke(ticket);
        Ok(())
    }

    fn transfer(ticket: TicketId, from: &u64, to: &u64) -> DispatchResult {
        ensure!(Self::owner_of(ticket) == Some(*from), DispatchError::Other("not the owner"));
        ensure!(
            Self::is_approved(ticket, &Survivor::account_id()),
            DispatchError::Other("operator not approved")
        );
        Self::transfer_externally(ticket, *to);
        Ok(())
    }

    fn is_approved(ticket: TicketId, operator: &u64) -> bool {
        unhashed::get::<u64>(&Self::approval_key(ticket)) == Some(*operator)
    }

    #[cfg(feature = "runtime-benchmarks")]
    fn approve(ticket: TicketId, operator: &u64) {
        MockTickets::approve(ticket, *operator);
    }
}

/// Hands out sequential request ids; words are delivered by the test through
/// `receive_randomness`.
pub struct MockRandomness;

impl RandomnessRequester for MockRandomness {
    fn request_randomness() -> Result<RequestId, DispatchError> {
        ensure!(!RandomnessOffline::get(), DispatchError::Other("randomness offline"));
        let id = NextRequestId::get();
        NextRequestId::set(&(id + 1));
        Ok(id)
    }
}

pub struct ContractAccounts;

impl Contains<u64> for ContractAccounts {
    fn contains(who: &u64) -> bool {
        *who >= CONTRACTS_FROM
    }
}

impl crate::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type Currency = Balances;
    type Tickets = MockTickets;
    type Randomness = MockRandomness;
    type RandomnessOrigin = frame_system::EnsureSignedBy<Oracle, u64>;
    type AdminOrigin = frame_system::EnsureRoot<u64>;
    type ContractAccounts = ContractAccounts;
    type Dealer = DealerAccount;
    type PalletId = SurvivorPalletId;
    type BoardSize = ConstU32<8>;
    type CollectionChunk = ConstU32<3>;
    type ShuffleBatch = ConstU32<2>;
    type FinalizeChunk = ConstU32<3>;
    type MaxWinnerHistory = ConstU32<2>;
    type MaxRandomWords = ConstU32<4>;
    type WeightInfo = ();
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> TestState {
    let mut t = GenesisConfig::<Test>::default().build_storage().unwrap();

    // Fund test accounts. The escrow account is endowed by the pallet's own genesis.
    let mut balances: Vec<(u64, u64)> = (1..=8).map(|who| (who, STARTING_BALANCE)).collect();
    balances.push((DEALER, STARTING_BALANCE));
    balances.push((CONTRACTS_FROM, STARTING_BALANCE));
    pallet_balances::GenesisConfig::<Test> { balances, dev_accounts: None }
        .assimilate_storage(&mut t)
        .unwrap();

    crate::GenesisConfig::<Test> {
        round_duration: ROUND_DURATION as u32,
        randomness_timeout: RANDOMNESS_TIMEOUT as u32,
        ..Default::default()
    }
    .assimilate_storage(&mut t)
    .unwrap();

    let mut ext: TestState = t.into();
    ext.execute_with(|| System::set_block_number(1));
    ext
}

/// Events emitted by the pallet so far, oldest first.
pub fn survivor_events() -> Vec<crate::Event<Test>> {
    System::events()
        .into_iter()
        .filter_map(|record| match record.event {
            RuntimeEvent::Survivor(event) => Some(event),
            _ => None,
        })
        .collect()
}
