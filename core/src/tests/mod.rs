mod board;
mod elimination;

use crate::board::{Board, FlagKind, MemoryFlags, Position};
use crate::rng::{MixDraw, SeedDraw};

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

fn board_with_active(size: u32, active: &[Position]) -> Board<MemoryFlags> {
    let mut board = Board::in_memory(size);
    for position in active {
        board.set(FlagKind::Active, *position, true);
    }
    board
}

/// Full scan of the active flags. Test oracle only.
fn count_active_by_scan(board: &Board<MemoryFlags>) -> u32 {
    (1..=board.size())
        .filter(|p| board.get(FlagKind::Active, *p))
        .count() as u32
}

/// A stream of pseudo-random values for property-style tests.
struct Stream {
    draw: MixDraw,
    next: u32,
}

impl Stream {
    fn new(seed: u8) -> Self {
        Self {
            draw: MixDraw::from_seed(&[seed; 32]),
            next: 0,
        }
    }

    fn below(&mut self, bound: u32) -> u32 {
        let value = self.draw.pick(self.next, bound);
        self.next += 1;
        value
    }
}
