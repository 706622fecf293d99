/// A coordinate on the minesweeper board.
///
/// Ordered row-major so that sets of cells iterate top-left to bottom-right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Whether the cell lies inside a `height` x `width` grid.
    pub fn in_bounds(self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// All cells within one row and one column of this one, excluding itself.
    /// Cells that would fall off the board edges are skipped.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (-1isize..=1).flat_map(move |dr| {
            (-1isize..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let r = self.row as isize + dr;
                let c = self.col as isize + dc;

                if r >= 0 && r < height as isize && c >= 0 && c < width as isize {
                    Some(Cell::new(r as usize, c as usize))
                } else {
                    None
                }
            })
        })
    }

    /// Every cell of a `height` x `width` grid, row by row.
    pub fn all(height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (0..height).flat_map(move |row| (0..width).map(move |col| Cell::new(row, col)))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
