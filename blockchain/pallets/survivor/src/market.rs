//! Escrowed secondary market for tickets.
//!
//! Listings and offers exist only while the game is claiming or a round is running.
//! Offers hold the maker's funds in the pallet account until they are accepted,
//! rejected, cancelled or swept when the round ends.

use crate::pallet::*;
use crate::traits::TicketRegistry;
use frame::prelude::*;
use survivor_core::{FlagKind, Position};

impl<T: Config> Pallet<T> {
    fn ensure_market_open() -> DispatchResult {
        Self::ensure_not_paused()?;
        ensure!(
            matches!(Game::<T>::get().phase, GamePhase::Claiming | GamePhase::RoundActive),
            Error::<T>::MarketClosed
        );
        Ok(())
    }

    fn ticket_at(position: Position) -> Result<TicketRecord<T>, DispatchError> {
        Tickets::<T>::get(position).ok_or_else(|| Error::<T>::TicketNotFound.into())
    }

    fn ensure_active(position: Position) -> DispatchResult {
        ensure!(
            Self::board().get(FlagKind::Active, position),
            Error::<T>::TicketNotActive
        );
        Ok(())
    }

    pub(crate) fn do_list(who: &T::AccountId, position: Position, price: BalanceOf<T>) -> DispatchResult {
        Self::ensure_market_open()?;
        let mut record = Self::ticket_at(position)?;
        ensure!(Self::owner_of(&record)? == *who, Error::<T>::NotTicketOwner);
        Self::ensure_active(position)?;
        ensure!(!price.is_zero(), Error::<T>::ZeroAmount);
        ensure!(
            T::Tickets::is_approved(record.ticket, &Self::account_id()),
            Error::<T>::NotApproved
        );
        ensure!(record.listing.is_none(), Error::<T>::AlreadyListed);

        record.listing = Some(Listing { seller: who.clone(), price });
        Tickets::<T>::insert(position, record);
        Self::board().set(FlagKind::Listed, position, true);

        Self::deposit_event(Event::Listed { position, seller: who.clone(), price });
        Ok(())
    }

    pub(crate) fn do_unlist(who: &T::AccountId, position: Position) -> DispatchResult {
        Self::ensure_market_open()?;
        let mut record = Self::ticket_at(position)?;
        ensure!(Self::owner_of(&record)? == *who, Error::<T>::NotTicketOwner);
        ensure!(record.listing.take().is_some(), Error::<T>::NotListed);

        Tickets::<T>::insert(position, record);
        Self::board().set(FlagKind::Listed, position, false);

        Self::deposit_event(Event::Unlisted { position });
        Ok(())
    }

    pub(crate) fn do_purchase(
        buyer: &T::AccountId,
        position: Position,
        payment: BalanceOf<T>,
    ) -> DispatchResult {
        Self::ensure_market_open()?;
        let mut record = Self::ticket_at(position)?;
        let listing = record.listing.take().ok_or(Error::<T>::NotListed)?;
        Self::ensure_active(position)?;
        ensure!(payment == listing.price, Error::<T>::PaymentMismatch);
        let seller = Self::owner_of(&record)?;
        ensure!(seller == listing.seller, Error::<T>::StaleListing);
        ensure!(seller != *buyer, Error::<T>::OwnTicket);

        Self::collect(buyer, payment)?;

        let mut board = Self::board();
        board.set(FlagKind::Listed, position, false);
        let offer = record.offer.take();
        if offer.is_some() {
            board.set(FlagKind::HasOffer, position, false);
        }
        let ticket = record.ticket;
        Tickets::<T>::insert(position, record);

        // The displaced offer is refunded before the ticket moves.
        if let Some(offer) = offer {
            Self::pay_or_credit(&offer.maker, offer.amount);
        }
        T::Tickets::transfer(ticket, &seller, buyer)?;
        Self::settle_trade(&seller, payment)?;

        log::debug!(target: crate::LOG_TARGET, "position {} sold for {:?}", position, payment);
        Self::deposit_event(Event::Purchased {
            position,
            seller,
            buyer: buyer.clone(),
            price: payment,
        });
        Ok(())
    }

    pub(crate) fn do_make_offer(
        maker: &T::AccountId,
        position: Position,
        amount: BalanceOf<T>,
    ) -> DispatchResult {
        Self::ensure_market_open()?;
        let mut record = Self::ticket_at(position)?;
        ensure!(Self::owner_of(&record)? != *maker, Error::<T>::OwnTicket);
        ensure!(!amount.is_zero(), Error::<T>::ZeroAmount);
        Self::ensure_active(position)?;
        ensure!(record.offer.is_none(), Error::<T>::OfferExists);

        Self::collect(maker, amount)?;
        record.offer = Some(Offer { maker: maker.clone(), amount });
        Tickets::<T>::insert(position, record);
        Self::board().set(FlagKind::HasOffer, position, true);

        Self::deposit_event(Event::OfferMade { position, maker: maker.clone(), amount });
        Ok(())
    }

    pub(crate) fn do_accept_offer(owner: &T::AccountId, position: Position) -> DispatchResult {
        Self::ensure_market_open()?;
        let mut record = Self::ticket_at(position)?;
        ensure!(Self::owner_of(&record)? == *owner, Error::<T>::NotTicketOwner);
        let offer = record.offer.take().ok_or(Error::<T>::NoOffer)?;
        Self::ensure_active(position)?;
        ensure!(
            T::Tickets::is_approved(record.ticket, &Self::account_id()),
            Error::<T>::NotApproved
        );

        let mut board = Self::board();
        board.set(FlagKind::HasOffer, position, false);
        if record.listing.take().is_some() {
            board.set(FlagKind::Listed, position, false);
        }
        let ticket = record.ticket;
        Tickets::<T>::insert(position, record);

        T::Tickets::transfer(ticket, owner, &offer.maker)?;
        Self::settle_trade(owner, offer.amount)?;

        Self::deposit_event(Event::OfferAccepted {
            position,
            seller: owner.clone(),
            buyer: offer.maker,
            amount: offer.amount,
        });
        Ok(())
    }

    pub(crate) fn do_reject_offer(owner: &T::AccountId, position: Position) -> DispatchResult {
        let mut record = Self::ticket_at(position)?;
        ensure!(Self::owner_of(&record)? == *owner, Error::<T>::NotTicketOwner);
        let offer = record.offer.take().ok_or(Error::<T>::NoOffer)?;

        Tickets::<T>::insert(position, record);
        Self::board().set(FlagKind::HasOffer, position, false);
        Self::pay_or_credit(&offer.maker, offer.amount);

        Self::deposit_event(Event::OfferRejected {
            position,
            maker: offer.maker,
            amount: offer.amount,
        });
        Ok(())
    }

    pub(crate) fn do_cancel_offer(maker: &T::AccountId, position: Position) -> DispatchResult {
        let mut record = Self::ticket_at(position)?;
        let offer = record.offer.take().ok_or(Error::<T>::NoOffer)?;
        ensure!(offer.maker == *maker, Error::<T>::NotOfferMaker);

        Tickets::<T>::insert(position, record);
        Self::board().set(FlagKind::HasOffer, position, false);
        Self::pay_or_credit(&offer.maker, offer.amount);

        Self::deposit_event(Event::OfferCancelled {
            position,
            maker: offer.maker,
            amount: offer.amount,
        });
        Ok(())
    }

    /// Drop every listing and move every escrowed offer to its maker's pending balance.
    pub(crate) fn clear_market(round: u32) {
        let mut board = Self::board();
        let listed = board.positions_with(FlagKind::Listed);
        let offered = board.positions_with(FlagKind::HasOffer);

        for position in &listed {
            board.set(FlagKind::Listed, *position, false);
            Tickets::<T>::mutate(position, |record| {
                if let Some(record) = record {
                    record.listing = None;
                }
            });
        }
        for position in &offered {
            board.set(FlagKind::HasOffer, *position, false);
            let offer = Tickets::<T>::mutate(position, |record| {
                record.as_mut().and_then(|r| r.offer.take())
            });
            if let Some(offer) = offer {
                Self::credit_pending(&offer.maker, offer.amount);
            }
        }

        if !listed.is_empty() || !offered.is_empty() {
            log::debug!(
                target: crate::LOG_TARGET,
                "round {} closed the market: {} listings, {} offers",
                round,
                listed.len(),
                offered.len()
            );
            Self::deposit_event(Event::MarketCleared {
                round,
                listings: listed.len() as u32,
                offers: offered.len() as u32,
            });
        }
    }
}
