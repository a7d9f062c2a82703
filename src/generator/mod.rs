use crate::*;

pub use random::*;

mod random;

/// Source of the next cell to append to the sequence.
///
/// `history` is the sequence generated so far, oldest first. Implementations
/// must return a cell in `0..grid_cells(grid_size)`.
pub trait CellGenerator {
    fn next_cell(&mut self, history: &[Cell], grid_size: u8) -> Cell;
}
