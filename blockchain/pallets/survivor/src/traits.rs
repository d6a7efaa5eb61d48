//! Capabilities the pallet consumes from the rest of the runtime.

use frame::prelude::*;

/// Identifier of a ticket token in the external registry.
pub type TicketId = u64;

/// Identifier of an outstanding randomness request.
pub type RequestId = u64;

/// The token registry that owns ticket NFTs.
///
/// The pallet never tracks ownership itself; it asks the registry and moves tokens
/// only through `transfer`, which the owner must have pre-authorized for the pallet
/// account.
pub trait TicketRegistry<AccountId> {
    fn exists(ticket: TicketId) -> bool;

    fn owner_of(ticket: TicketId) -> Option<AccountId>;

    /// Create a new token owned by `to`.
    fn mint(to: &AccountId) -> Result<TicketId, DispatchError>;

    fn burn(ticket: TicketId) -> DispatchResult;

    /// Move `ticket` from `from` to `to` as an approved operator.
    fn transfer(ticket: TicketId, from: &AccountId, to: &AccountId) -> DispatchResult;

    /// Whether `operator` may move `ticket` on behalf of its owner.
    fn is_approved(ticket: TicketId, operator: &AccountId) -> bool;

    /// Grant `operator` the right to move `ticket`. Only needed to set up benchmarks.
    #[cfg(feature = "runtime-benchmarks")]
    fn approve(ticket: TicketId, operator: &AccountId);
}

/// Asynchronous randomness source.
///
/// A request returns immediately with an id; the words arrive later through the
/// `receive_randomness` call, dispatched by `Config::RandomnessOrigin`.
pub trait RandomnessRequester {
    fn request_randomness() -> Result<RequestId, DispatchError>;
}
