use crate::{Cell, KnowledgeError};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Statements shrink as facts become known; a statement whose cell set is
/// empty carries no information and is purged by the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Statement {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Statement {
    /// Builds a statement, rejecting a count larger than the number of cells.
    pub fn new(
        cells: impl IntoIterator<Item = Cell>,
        count: usize,
    ) -> Result<Self, KnowledgeError> {
        let cells: BTreeSet<Cell> = cells.into_iter().collect();
        if count > cells.len() {
            return Err(KnowledgeError::InvalidStatement { cells, count });
        }
        Ok(Statement { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// Every cell is a mine when the count saturates the cell set.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.forces_mines() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the count is zero.
    pub fn known_safes(&self) -> BTreeSet<Cell> {
        if self.forces_safes() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    pub(crate) fn forces_mines(&self) -> bool {
        !self.cells.is_empty() && self.cells.len() == self.count
    }

    pub(crate) fn forces_safes(&self) -> bool {
        !self.cells.is_empty() && self.count == 0
    }

    /// Removes a mine from the statement, decrementing the count.
    ///
    /// The caller must not mark a mine in a statement with a zero count;
    /// the knowledge base rejects that as a conflict first.
    pub fn mark_mine(&mut self, cell: &Cell) -> bool {
        if !self.cells.remove(cell) {
            return false;
        }
        debug_assert!(self.count > 0, "mine {cell} marked in a zero-count statement");
        self.count = self.count.saturating_sub(1);
        true
    }

    /// Removes a safe cell from the statement; the count is unchanged.
    pub fn mark_safe(&mut self, cell: &Cell) -> bool {
        self.cells.remove(cell)
    }

    /// Subset-difference: if `other` covers a subset of our cells, the
    /// remaining cells hold the remaining mines.
    ///
    /// Returns `None` when `other` is not a proper subset, and an error when
    /// the resulting count would be negative or exceed the remaining cells.
    pub fn difference(&self, other: &Statement) -> Option<Result<Statement, KnowledgeError>> {
        if other.cells.is_empty()
            || other.cells.len() >= self.cells.len()
            || !other.cells.is_subset(&self.cells)
        {
            return None;
        }

        let cells: BTreeSet<Cell> = self.cells.difference(&other.cells).copied().collect();
        Some(match self.count.checked_sub(other.count) {
            Some(count) => Statement::new(cells, count),
            None => Err(KnowledgeError::InconsistentPair {
                superset: self.clone(),
                subset: other.clone(),
            }),
        })
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.count)
    }
}
