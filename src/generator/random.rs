use super::*;
use rand::prelude::*;

/// Uniform generator that rejects cells already used in the current lap of
/// the grid. A lap ends once the history length is a multiple of the grid's
/// cell count, so every cell appears exactly once per lap and the same cell
/// can still open the next lap.
#[derive(Clone, Debug)]
pub struct RandomCellGenerator {
    rng: SmallRng,
}

impl RandomCellGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl CellGenerator for RandomCellGenerator {
    fn next_cell(&mut self, history: &[Cell], grid_size: u8) -> Cell {
        let max_cells = grid_cells(grid_size);
        if max_cells == 0 {
            log::warn!("Grid has no cells, returning cell 0");
            return 0;
        }
        let remainder = history.len() % max_cells as usize;
        let current_lap = &history[history.len() - remainder..];
        // The lap holds at most max_cells - 1 entries, so a free cell exists.
        loop {
            let cell = self.rng.random_range(0..max_cells) as Cell;
            if !current_lap.contains(&cell) {
                return cell;
            }
        }
    }
}
