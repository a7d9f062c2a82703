/// Linear index of a cell within the square grid, row-major from the top-left.
pub type Cell = u8;

/// Count type used for cell totals and sequence lengths.
pub type CellCount = u16;

/// Total number of cells in a square grid with the given side length.
pub const fn grid_cells(grid_size: u8) -> CellCount {
    let g = grid_size as CellCount;
    g.saturating_mul(g)
}
