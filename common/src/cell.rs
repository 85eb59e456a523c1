use std::fmt;

/// A (row, column) coordinate on the grid.
///
/// Cells order by row first, then column, so sets of cells iterate in
/// row-major order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }

    /// Returns true if the cell lies on a `height` x `width` grid.
    pub fn in_bounds(&self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// All valid neighbours of this cell on a `height` x `width` grid.
    /// Handles edges and corners; never yields the cell itself.
    pub fn neighbors(self, height: usize, width: usize) -> impl Iterator<Item = Cell> {
        (-1..=1).flat_map(move |dr| {
            (-1..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let nr = self.row as isize + dr;
                let nc = self.col as isize + dc;

                if nr >= 0 && nr < height as isize && nc >= 0 && nc < width as isize {
                    Some(Cell {
                        row: nr as usize,
                        col: nc as usize,
                    })
                } else {
                    None
                }
            })
        })
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_neighbors() {
        // Corner, edge and interior cells on a 3x3 grid
        assert_eq!(Cell::new(0, 0).neighbors(3, 3).count(), 3);
        assert_eq!(Cell::new(0, 1).neighbors(3, 3).count(), 5);
        assert_eq!(Cell::new(1, 1).neighbors(3, 3).count(), 8);

        let corner: BTreeSet<Cell> = Cell::new(0, 0).neighbors(8, 8).collect();
        assert_eq!(
            corner,
            BTreeSet::from([Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)])
        );
    }

    #[test]
    fn test_neighbors_single_cell_grid() {
        assert_eq!(Cell::new(0, 0).neighbors(1, 1).count(), 0);
    }

    #[test]
    fn test_ordering_is_row_major() {
        let cells: Vec<Cell> = BTreeSet::from([Cell::new(1, 0), Cell::new(0, 2), Cell::new(0, 1)])
            .into_iter()
            .collect();
        assert_eq!(cells, vec![Cell::new(0, 1), Cell::new(0, 2), Cell::new(1, 0)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::from((2, 3)).to_string(), "(2, 3)");
        assert!(Cell::new(2, 3).in_bounds(3, 4));
        assert!(!Cell::new(3, 3).in_bounds(3, 4));
    }
}
