use super::*;

#[test]
fn test_set_and_get_flags() {
    let mut board = Board::in_memory(256);

    assert!(board.set(FlagKind::Active, 1, true));
    assert!(board.set(FlagKind::Listed, 64, true));
    assert!(board.set(FlagKind::HasOffer, 65, true));
    assert!(board.set(FlagKind::Winner, 256, true));

    assert!(board.get(FlagKind::Active, 1));
    assert!(board.get(FlagKind::Listed, 64));
    assert!(board.get(FlagKind::HasOffer, 65));
    assert!(board.get(FlagKind::Winner, 256));

    // Kinds are independent bitsets
    assert!(!board.get(FlagKind::Listed, 1));
    assert!(!board.get(FlagKind::Active, 64));
}

#[test]
fn test_set_reports_change_only() {
    let mut board = Board::in_memory(8);

    assert!(board.set(FlagKind::Active, 3, true));
    assert!(!board.set(FlagKind::Active, 3, true));
    assert_eq!(board.active_count(), 1);

    assert!(board.set(FlagKind::Active, 3, false));
    assert!(!board.set(FlagKind::Active, 3, false));
    assert_eq!(board.active_count(), 0);
}

#[test]
fn test_out_of_range_positions_are_ignored() {
    let mut board = Board::in_memory(4);

    assert!(!board.set(FlagKind::Active, 0, true));
    assert!(!board.set(FlagKind::Active, 5, true));
    assert!(!board.get(FlagKind::Active, 0));
    assert!(!board.get(FlagKind::Active, 5));
    assert_eq!(board.active_count(), 0);
}

#[test]
fn test_only_active_kind_moves_count() {
    let mut board = Board::in_memory(16);

    board.set(FlagKind::Listed, 2, true);
    board.set(FlagKind::HasOffer, 2, true);
    board.set(FlagKind::Winner, 2, true);
    assert_eq!(board.active_count(), 0);

    board.set(FlagKind::Active, 2, true);
    assert_eq!(board.active_count(), 1);
}

#[test]
fn test_enumerate_active_ascending_across_words() {
    let board = board_with_active(200, &[130, 2, 64, 65, 199, 1]);

    assert_eq!(board.enumerate_active(), vec![1, 2, 64, 65, 130, 199]);
    assert_eq!(board.enumerate_active().len() as u32, board.active_count());
}

#[test]
fn test_positions_in_range_is_inclusive_and_clamped() {
    let board = board_with_active(130, &[1, 63, 64, 65, 128, 130]);

    assert_eq!(board.positions_in_range(FlagKind::Active, 63, 65), vec![63, 64, 65]);
    assert_eq!(board.positions_in_range(FlagKind::Active, 66, 127), Vec::<Position>::new());
    assert_eq!(board.positions_in_range(FlagKind::Active, 0, 1), vec![1]);
    assert_eq!(board.positions_in_range(FlagKind::Active, 120, 500), vec![128, 130]);
    assert_eq!(board.positions_in_range(FlagKind::Active, 10, 9), Vec::<Position>::new());
}

#[test]
fn test_clear_all_drops_every_flag() {
    let mut board = board_with_active(8, &[5]);
    board.set(FlagKind::Listed, 5, true);
    board.set(FlagKind::HasOffer, 5, true);
    board.set(FlagKind::Winner, 5, true);

    board.clear_all(5);

    for kind in FlagKind::ALL {
        assert!(!board.get(kind, 5));
    }
    assert_eq!(board.active_count(), 0);
    assert_eq!(board.into_store(), MemoryFlags::default());
}

#[test]
fn test_active_count_matches_scan_under_random_mutations() {
    // SCENARIO: thousands of random flag writes of every kind. After each write the
    // incrementally maintained count must equal a full scan.
    for seed in 0..4u8 {
        let mut stream = Stream::new(seed);
        let mut board = Board::in_memory(256);

        for _ in 0..2_000 {
            let kind = FlagKind::ALL[stream.below(4) as usize];
            let position = stream.below(258); // 0 and 257 are off-board on purpose
            let value = stream.below(2) == 1;
            board.set(kind, position, value);

            assert_eq!(board.active_count(), count_active_by_scan(&board));
        }
        assert_eq!(board.enumerate_active().len() as u32, board.active_count());
    }
}
