use crate::Cell;
use rand::Rng;
use rand::seq::IteratorRandom;
use std::collections::BTreeSet;
use std::fmt;

/// The hidden minefield. Knows where every mine is and answers the
/// neighbour counts the agent learns from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    pub height: usize,
    pub width: usize,
    mines: BTreeSet<Cell>,
}

impl Board {
    /// Places exactly `mines` mines uniformly at random.
    pub fn generate<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if height == 0 || width == 0 {
            anyhow::bail!("board must have at least one row and one column");
        }
        if mines >= height * width {
            anyhow::bail!("total mines must be less than the number of cells on the board");
        }

        let mines = (0..height * width)
            .choose_multiple(rng, mines)
            .into_iter()
            .map(|index| Cell::new(index / width, index % width))
            .collect();

        Ok(Board {
            height,
            width,
            mines,
        })
    }

    /// A board with a fixed mine layout.
    pub fn from_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> anyhow::Result<Self> {
        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        if let Some(cell) = mines.iter().find(|cell| !cell.in_bounds(height, width)) {
            anyhow::bail!("mine {cell} is outside the {height}x{width} board");
        }
        Ok(Board {
            height,
            width,
            mines,
        })
    }

    pub fn mines(&self) -> &BTreeSet<Cell> {
        &self.mines
    }

    pub fn is_mine(&self, cell: &Cell) -> bool {
        self.mines.contains(cell)
    }

    /// Number of mines among the cell's neighbours, not counting the cell.
    pub fn nearby_mines(&self, cell: Cell) -> usize {
        cell.neighbors(self.height, self.width)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count()
    }

    /// The board is won once the flagged cells are exactly the mines.
    pub fn won(&self, flagged: &BTreeSet<Cell>) -> bool {
        *flagged == self.mines
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "--".repeat(self.width) + "-";
        for row in 0..self.height {
            writeln!(f, "{rule}")?;
            for col in 0..self.width {
                let mark = if self.is_mine(&Cell::new(row, col)) { 'X' } else { ' ' };
                write!(f, "|{mark}")?;
            }
            writeln!(f, "|")?;
        }
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_places_exact_mine_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::generate(8, 8, 10, &mut rng).unwrap();
        assert_eq!(board.mines().len(), 10);
        assert!(board.mines().iter().all(|c| c.in_bounds(8, 8)));
    }

    #[test]
    fn test_generate_too_many_mines() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(Board::generate(3, 3, 9, &mut rng).is_err());
        assert!(Board::generate(0, 3, 0, &mut rng).is_err());
    }

    #[test]
    fn test_nearby_mines() {
        let board = Board::from_mines(3, 3, [Cell::new(0, 0), Cell::new(2, 2)]).unwrap();
        assert_eq!(board.nearby_mines(Cell::new(1, 1)), 2);
        assert_eq!(board.nearby_mines(Cell::new(0, 1)), 1);
        assert_eq!(board.nearby_mines(Cell::new(2, 0)), 0);
        // The cell itself does not count
        assert_eq!(board.nearby_mines(Cell::new(0, 0)), 0);
    }

    #[test]
    fn test_won() {
        let board = Board::from_mines(2, 2, [Cell::new(1, 1)]).unwrap();
        assert!(!board.won(&BTreeSet::new()));
        assert!(board.won(&BTreeSet::from([Cell::new(1, 1)])));
        assert!(!board.won(&BTreeSet::from([Cell::new(1, 1), Cell::new(0, 0)])));
    }

    #[test]
    fn test_from_mines_out_of_bounds() {
        assert!(Board::from_mines(2, 2, [Cell::new(2, 0)]).is_err());
    }

    #[test]
    fn test_display() {
        let board = Board::from_mines(1, 2, [Cell::new(0, 1)]).unwrap();
        assert_eq!(board.to_string(), "-----\n| |X|\n-----");
    }
}
