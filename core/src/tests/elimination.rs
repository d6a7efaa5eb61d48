use super::*;
use crate::elimination::{EliminationPhase, EliminationProgress, RoundOutcome, Step};
use crate::error::EliminationError;

fn seed_from(n: u32) -> [u8; 32] {
    let mut seed = [0u8; 32];
    seed[..4].copy_from_slice(&n.to_le_bytes());
    seed
}

/// Drive an elimination to completion, returning every eliminated position in order.
fn run_elimination(
    board: &mut Board<MemoryFlags>,
    seed: [u8; 32],
    chunk: u32,
    batch: u32,
) -> (Vec<Position>, RoundOutcome) {
    let mut progress = EliminationProgress::start(seed);
    let mut collected = Vec::new();
    let draw = MixDraw::from_seed(&seed);
    let mut eliminated = Vec::new();

    loop {
        let step = match progress.phase {
            EliminationPhase::Collecting => progress.collect_chunk(board, &mut collected, chunk),
            EliminationPhase::Selecting => {
                progress.select_batch(board, &mut collected, &draw, batch)
            }
            EliminationPhase::Idle => panic!("elimination stalled"),
        }
        .expect("step should succeed");

        match step {
            Step::Eliminated(positions) => eliminated.extend(positions),
            Step::Resolved {
                eliminated: last,
                outcome,
            } => {
                eliminated.extend(last);
                assert_eq!(progress, EliminationProgress::default());
                return (eliminated, outcome);
            }
            Step::Collecting { .. } | Step::Collected { .. } => {}
        }
    }
}

#[test]
fn test_empty_board_resolves_without_survivors() {
    let mut board = Board::in_memory(16);

    let (eliminated, outcome) = run_elimination(&mut board, seed_from(1), 4, 2);

    assert!(eliminated.is_empty());
    assert_eq!(outcome, RoundOutcome::NoSurvivors);
}

#[test]
fn test_single_ticket_wins_without_shuffle() {
    let mut board = board_with_active(16, &[9]);
    let mut progress = EliminationProgress::start(seed_from(1));
    let mut collected = Vec::new();

    let step = progress.collect_chunk(&board, &mut collected, 16).unwrap();

    assert_eq!(
        step,
        Step::Resolved {
            eliminated: vec![],
            outcome: RoundOutcome::Winner(9)
        }
    );
    assert!(collected.is_empty());
    assert!(!progress.is_running());
    assert!(board.get(FlagKind::Active, 9));

    // Selection is never reachable afterwards
    let draw = MixDraw::from_seed(&[0u8; 32]);
    assert_eq!(
        progress.select_batch(&mut board, &mut collected, &draw, 1),
        Err(EliminationError::NotSelecting)
    );
}

#[test]
fn test_two_tickets_leave_a_winner() {
    let mut board = board_with_active(8, &[3, 6]);

    let (eliminated, outcome) = run_elimination(&mut board, seed_from(5), 8, 8);

    assert_eq!(eliminated.len(), 1);
    let survivor = if eliminated[0] == 3 { 6 } else { 3 };
    assert_eq!(outcome, RoundOutcome::Winner(survivor));
    assert_eq!(board.enumerate_active(), vec![survivor]);
}

#[test]
fn test_four_tickets_halve_to_two() {
    // SCENARIO: board of 4, all claimed. Collection finds [1,2,3,4], target is 2.
    let mut board = board_with_active(4, &[1, 2, 3, 4]);
    let mut progress = EliminationProgress::start(seed_from(77));
    let mut collected = Vec::new();

    let step = progress.collect_chunk(&board, &mut collected, 4).unwrap();
    assert_eq!(step, Step::Collected { total: 4, target: 2 });
    assert_eq!(collected, vec![1, 2, 3, 4]);

    let draw = MixDraw::from_seed(&progress.seed);
    let step = progress
        .select_batch(&mut board, &mut collected, &draw, 10)
        .unwrap();

    match step {
        Step::Resolved {
            eliminated,
            outcome,
        } => {
            assert_eq!(eliminated.len(), 2);
            assert_eq!(outcome, RoundOutcome::Continue { survivors: 2 });
        }
        other => panic!("unexpected step {:?}", other),
    }
    assert_eq!(board.active_count(), 2);
}

#[test]
fn test_removes_floor_half_for_every_size() {
    for k in 0..40u32 {
        let active: Vec<Position> = (1..=k).map(|i| i * 3).collect();
        let mut board = board_with_active(128, &active);

        let (eliminated, outcome) = run_elimination(&mut board, seed_from(k), 7, 3);

        assert_eq!(eliminated.len() as u32, if k <= 1 { 0 } else { k / 2 });
        let remaining = if k == 0 { 0 } else { k - k / 2 };
        assert_eq!(board.active_count(), remaining);
        assert_eq!(count_active_by_scan(&board), remaining);
        match remaining {
            0 => assert_eq!(outcome, RoundOutcome::NoSurvivors),
            1 => assert!(matches!(outcome, RoundOutcome::Winner(_))),
            n => assert_eq!(outcome, RoundOutcome::Continue { survivors: n }),
        }
    }
}

#[test]
fn test_eliminated_positions_are_distinct_and_were_active() {
    let active: Vec<Position> = (1..=100).collect();
    let mut board = board_with_active(100, &active);

    let (mut eliminated, _) = run_elimination(&mut board, seed_from(3), 10, 5);

    for position in &eliminated {
        assert!(!board.get(FlagKind::Active, *position));
    }
    eliminated.sort();
    eliminated.dedup();
    assert_eq!(eliminated.len(), 50);
}

#[test]
fn test_same_seed_same_result_regardless_of_chunking() {
    let active: Vec<Position> = (1..=256).filter(|p| p % 3 != 0).collect();

    let mut a = board_with_active(256, &active);
    let mut b = board_with_active(256, &active);

    let (elim_a, outcome_a) = run_elimination(&mut a, seed_from(2024), 1, 1);
    let (elim_b, outcome_b) = run_elimination(&mut b, seed_from(2024), 256, 1_000);

    assert_eq!(elim_a, elim_b);
    assert_eq!(outcome_a, outcome_b);
    assert_eq!(a.enumerate_active(), b.enumerate_active());
}

#[test]
fn test_different_seeds_diverge() {
    let active: Vec<Position> = (1..=64).collect();
    let baseline = {
        let mut board = board_with_active(64, &active);
        run_elimination(&mut board, seed_from(0), 64, 64).0
    };

    let diverged = (1..8u32).any(|n| {
        let mut board = board_with_active(64, &active);
        run_elimination(&mut board, seed_from(n), 64, 64).0 != baseline
    });
    assert!(diverged);
}

#[test]
fn test_resume_survives_unrelated_writes_between_steps() {
    // SCENARIO: other calls touch non-active flags between elimination steps.
    // The checkpoint must resume exactly where it left off.
    let active: Vec<Position> = (1..=32).collect();
    let seed = seed_from(11);

    let mut quiet = board_with_active(32, &active);
    let (expected, _) = run_elimination(&mut quiet, seed, 5, 2);

    let mut noisy = board_with_active(32, &active);
    let mut progress = EliminationProgress::start(seed);
    let mut collected = Vec::new();
    let draw = MixDraw::from_seed(&seed);
    let mut eliminated = Vec::new();
    let mut tick = 0;
    while progress.is_running() {
        noisy.set(FlagKind::Listed, (tick % 32) + 1, tick % 2 == 0);
        tick += 1;
        let step = match progress.phase {
            EliminationPhase::Collecting => progress.collect_chunk(&noisy, &mut collected, 5),
            _ => progress.select_batch(&mut noisy, &mut collected, &draw, 2),
        }
        .unwrap();
        match step {
            Step::Eliminated(positions) => eliminated.extend(positions),
            Step::Resolved { eliminated: last, .. } => eliminated.extend(last),
            _ => {}
        }
    }

    assert_eq!(eliminated, expected);
}

#[test]
fn test_each_ticket_is_eliminated_about_half_the_time() {
    let mut hits = [0u32; 4];
    for n in 0..400u32 {
        let mut board = board_with_active(4, &[1, 2, 3, 4]);
        let (eliminated, _) = run_elimination(&mut board, seed_from(n), 4, 2);
        for position in eliminated {
            hits[(position - 1) as usize] += 1;
        }
    }

    for count in hits {
        assert!((120..=280).contains(&count), "biased selection: {:?}", hits);
    }
}

#[test]
fn test_step_guards() {
    let mut board = board_with_active(8, &[1, 2, 3]);
    let mut idle = EliminationProgress::default();
    let mut collected = Vec::new();
    let draw = MixDraw::from_seed(&[0u8; 32]);

    assert_eq!(
        idle.collect_chunk(&board, &mut collected, 4),
        Err(EliminationError::NotCollecting)
    );

    let mut progress = EliminationProgress::start([1u8; 32]);
    assert_eq!(
        progress.collect_chunk(&board, &mut collected, 0),
        Err(EliminationError::ZeroStep)
    );

    progress.collect_chunk(&board, &mut collected, 8).unwrap();
    assert_eq!(progress.phase, EliminationPhase::Selecting);

    let mut truncated = collected[..2].to_vec();
    assert_eq!(
        progress.select_batch(&mut board, &mut truncated, &draw, 1),
        Err(EliminationError::ListMismatch {
            expected: 3,
            found: 2
        })
    );
    assert_eq!(
        progress.select_batch(&mut board, &mut collected, &draw, 0),
        Err(EliminationError::ZeroStep)
    );
}
