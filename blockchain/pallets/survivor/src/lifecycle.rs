//! Elimination driver and end-of-game cleanup.

use crate::impls::Blake2Draw;
use crate::pallet::*;
use alloc::vec::Vec;
use frame::arithmetic::PerThing;
use frame::prelude::*;
use frame::traits::{Contains, Get};
use survivor_core::{EliminationError, EliminationPhase, FlagKind, Position, RoundOutcome, Step};

impl<T: Config> Pallet<T> {
    fn corrupted(error: EliminationError) -> DispatchError {
        log::error!(target: crate::LOG_TARGET, "elimination checkpoint rejected: {:?}", error);
        Error::<T>::EliminationCorrupted.into()
    }

    /// Apply one collection chunk or one selection batch of the running elimination.
    pub(crate) fn do_advance_elimination() -> DispatchResult {
        Self::advance_elimination_with(T::CollectionChunk::get(), T::ShuffleBatch::get())
    }

    pub(crate) fn advance_elimination_with(collect_chunk: u32, shuffle_batch: u32) -> DispatchResult {
        let game = Game::<T>::get();
        ensure!(game.phase == GamePhase::Eliminating, Error::<T>::WrongPhase);

        let mut progress = Elimination::<T>::get();
        let mut board = Self::board();
        let mut collected: Vec<Position> = Collected::<T>::get().into_inner();

        let step = match progress.phase {
            EliminationPhase::Collecting => progress
                .collect_chunk(&board, &mut collected, collect_chunk)
                .map_err(Self::corrupted)?,
            EliminationPhase::Selecting => {
                let draw = Blake2Draw::new(progress.seed);
                progress
                    .select_batch(&mut board, &mut collected, &draw, shuffle_batch)
                    .map_err(Self::corrupted)?
            },
            EliminationPhase::Idle => return Err(Error::<T>::EliminationCorrupted.into()),
        };

        if progress.is_running() {
            let collected = BoundedVec::<Position, T::BoardSize>::try_from(collected)
                .map_err(|_| Error::<T>::EliminationCorrupted)?;
            Collected::<T>::put(collected);
            Elimination::<T>::put(progress);
        } else {
            Collected::<T>::kill();
            Elimination::<T>::kill();
        }

        Self::apply_step(game, step)
    }

    fn apply_step(mut game: GameState<T>, step: Step) -> DispatchResult {
        match step {
            Step::Collecting { scanned, found } => {
                log::debug!(
                    target: crate::LOG_TARGET,
                    "collection scanned up to {}, {} active in chunk",
                    scanned,
                    found
                );
            },
            Step::Collected { total, target } => {
                Self::deposit_event(Event::CollectionCompleted { round: game.round, total, target });
            },
            Step::Eliminated(positions) => Self::note_eliminated(&game, &positions),
            Step::Resolved { eliminated, outcome } => {
                Self::note_eliminated(&game, &eliminated);
                match outcome {
                    RoundOutcome::Continue { survivors } => {
                        log::info!(
                            target: crate::LOG_TARGET,
                            "game {} round {} done, {} survivors",
                            game.game_id,
                            game.round,
                            survivors
                        );
                        Self::begin_round(&mut game);
                        Game::<T>::put(game);
                    },
                    RoundOutcome::Winner(position) => Self::declare_winner(game, position)?,
                    RoundOutcome::NoSurvivors => {
                        game.phase = GamePhase::Completed;
                        game.winner = None;
                        Game::<T>::put(&game);
                        log::warn!(target: crate::LOG_TARGET, "game {} ended with no survivors", game.game_id);
                        Self::deposit_event(Event::GameEndedWithoutWinner { game_id: game.game_id });
                    },
                }
            },
        }
        Ok(())
    }

    fn note_eliminated(game: &GameState<T>, positions: &[Position]) {
        for position in positions {
            Self::deposit_event(Event::TicketEliminated {
                game_id: game.game_id,
                round: game.round,
                position: *position,
            });
        }
    }

    /// Mark the winner, split the pool into payout and rollover, and pay out.
    ///
    /// Game state is written before any funds move. Contract accounts are always paid
    /// through the pending ledger.
    fn declare_winner(mut game: GameState<T>, position: Position) -> DispatchResult {
        let record = Tickets::<T>::get(position).ok_or(Error::<T>::TicketNotFound)?;
        let owner = Self::owner_of(&record)?;
        let mut board = Self::board();
        ensure!(board.get(FlagKind::Active, position), Error::<T>::TicketNotActive);
        board.set(FlagKind::Winner, position, true);

        let pool = PrizePool::<T>::take();
        let rollover = Settings::<T>::get().rollover.mul_floor(pool);
        let payout = pool.saturating_sub(rollover);
        RolloverReserve::<T>::mutate(|reserve| *reserve = reserve.saturating_add(rollover));

        game.phase = GamePhase::Completed;
        game.winner = Some(position);
        Game::<T>::put(&game);

        let entry = WinnerRecord {
            game_id: game.game_id,
            position,
            ticket: record.ticket,
            owner: owner.clone(),
            payout,
            declared_at: Self::now(),
        };
        // A history bound of zero disables the history.
        let history = T::MaxWinnerHistory::get() as usize;
        if history > 0 {
            RecentWinners::<T>::mutate(|winners| {
                while winners.len() >= history {
                    winners.remove(0);
                }
                if winners.try_push(entry).is_err() {
                    log::warn!(target: crate::LOG_TARGET, "winner history is full");
                }
            });
        }

        if T::ContractAccounts::contains(&owner) {
            Self::credit_pending(&owner, payout);
        } else {
            Self::pay_or_credit(&owner, payout);
        }

        log::info!(
            target: crate::LOG_TARGET,
            "game {} won by position {}, payout {:?}, rollover {:?}",
            game.game_id,
            position,
            payout,
            rollover
        );
        Self::deposit_event(Event::WinnerDeclared {
            game_id: game.game_id,
            position,
            owner,
            payout,
            rollover,
        });
        Ok(())
    }

    /// Retire the next chunk of the finished game's tickets. The chunk that reaches
    /// the end of the board opens the next game.
    pub(crate) fn do_finalize_step() -> DispatchResult {
        let mut game = Game::<T>::get();
        ensure!(
            matches!(game.phase, GamePhase::Completed | GamePhase::Finalizing),
            Error::<T>::WrongPhase
        );
        game.phase = GamePhase::Finalizing;

        let size = T::BoardSize::get();
        let cursor = FinalizeCursor::<T>::get();
        let end = cursor.saturating_add(T::FinalizeChunk::get().max(1)).min(size);
        for position in cursor.saturating_add(1)..=end {
            if game.winner == Some(position) {
                continue;
            }
            if let Some(record) = Tickets::<T>::get(position) {
                if record.game_id == game.game_id {
                    Self::retire(position, record, true);
                }
            }
        }

        if end < size {
            FinalizeCursor::<T>::put(end);
            Game::<T>::put(&game);
            Self::deposit_event(Event::FinalizationProgressed { game_id: game.game_id, cursor: end });
            return Ok(());
        }

        Self::open_next_game(game);
        Ok(())
    }

    /// Release the winner binding, carry the rollover into the pool and start a new game.
    fn open_next_game(game: GameState<T>) {
        if let Some(position) = game.winner {
            if let Some(record) = Tickets::<T>::get(position) {
                Self::retire(position, record, false);
            }
        }

        let carried_over = RolloverReserve::<T>::take();
        PrizePool::<T>::mutate(|pool| *pool = pool.saturating_add(carried_over));
        FinalizeCursor::<T>::kill();

        let next_game_id = game.game_id.saturating_add(1);
        Game::<T>::put(GameState::<T> { game_id: next_game_id, ..Default::default() });

        log::info!(
            target: crate::LOG_TARGET,
            "game {} finalized, game {} open for claims",
            game.game_id,
            next_game_id
        );
        Self::deposit_event(Event::GameFinalized {
            game_id: game.game_id,
            next_game_id,
            carried_over,
        });
    }
}
