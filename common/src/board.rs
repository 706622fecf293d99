use crate::Cell;
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::BTreeSet;

/// The hidden truth of a minesweeper board: where the mines are, and which
/// of them the player has flagged so far.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    pub height: usize,
    pub width: usize,
    mines: BTreeSet<Cell>,
    /// Mines the player has flagged. The game is won when this equals `mines`.
    mines_found: BTreeSet<Cell>,
}

impl Board {
    /// Places `mine_count` mines uniformly at random.
    pub fn random<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mine_count: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if mine_count >= height * width {
            anyhow::bail!(
                "{} mines do not leave a free cell on a {}x{} board",
                mine_count,
                height,
                width
            );
        }
        let mines = Cell::all(height, width).choose_multiple(rng, mine_count);
        Board::with_mines(height, width, mines)
    }

    /// A board with mines at exactly the given cells.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> anyhow::Result<Self> {
        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        if let Some(outside) = mines.iter().find(|cell| !cell.in_bounds(height, width)) {
            anyhow::bail!(
                "mine at {} lies outside the {}x{} board",
                outside,
                height,
                width
            );
        }
        Ok(Board {
            height,
            width,
            mines,
            mines_found: BTreeSet::new(),
        })
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines within one row and column of `cell`, not counting itself.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        cell.neighbors(self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count()
    }

    /// Flags `cell` as a mine. Flags on safe cells are kept too, and will
    /// stop the board from counting as won.
    pub fn flag(&mut self, cell: Cell) {
        self.mines_found.insert(cell);
    }

    pub fn flagged(&self) -> &BTreeSet<Cell> {
        &self.mines_found
    }

    /// Whether every mine, and nothing else, has been flagged.
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }
}

/// Shows where the mines are, one `|X` or `| ` per cell.
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let divider = "--".repeat(self.width) + "-";
        for row in 0..self.height {
            writeln!(f, "{}", divider)?;
            for col in 0..self.width {
                let mark = if self.is_mine(Cell::new(row, col)) { "|X" } else { "| " };
                write!(f, "{}", mark)?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{}", divider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_board_has_requested_mines() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::random(5, 5, 10, &mut rng).unwrap();
        assert_eq!(board.mine_count(), 10);
        assert_eq!(board.height, 5);
        assert_eq!(board.width, 5);
        assert!(!board.won());
    }

    #[test]
    fn test_random_board_rejects_full_mine_field() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Board::random(3, 3, 9, &mut rng).is_err());
    }

    #[test]
    fn test_with_mines_rejects_out_of_bounds() {
        assert!(Board::with_mines(2, 2, [Cell::new(2, 0)]).is_err());
    }

    #[test]
    fn test_nearby_mines() {
        let board = Board::with_mines(3, 3, [Cell::new(0, 0), Cell::new(2, 2)]).unwrap();
        assert_eq!(board.nearby_mines(Cell::new(1, 1)), 2);
        assert_eq!(board.nearby_mines(Cell::new(0, 1)), 1);
        assert_eq!(board.nearby_mines(Cell::new(2, 0)), 0);
        // A mine does not count itself
        assert_eq!(board.nearby_mines(Cell::new(0, 0)), 0);
    }

    #[test]
    fn test_won_requires_exact_flags() {
        let mut board = Board::with_mines(2, 2, [Cell::new(1, 1)]).unwrap();
        board.flag(Cell::new(0, 0));
        assert!(!board.won());

        let mut board = Board::with_mines(2, 2, [Cell::new(1, 1)]).unwrap();
        board.flag(Cell::new(1, 1));
        assert!(board.won());
    }

    #[test]
    fn test_display() {
        let board = Board::with_mines(1, 2, [Cell::new(0, 1)]).unwrap();
        assert_eq!(board.to_string(), "-----\n| |X|\n-----\n");
    }
}
