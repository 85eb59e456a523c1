use crate::{Cell, Fact, Statement};
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised by the knowledge base.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KnowledgeError {
    /// The observed cell is not on the grid.
    #[error("cell {cell} is outside the {height}x{width} grid")]
    OutOfBounds {
        cell: Cell,
        height: usize,
        width: usize,
    },

    /// The observed cell was already revealed.
    #[error("cell {0} has already been played")]
    AlreadyPlayed(Cell),

    /// A statement whose count exceeds its number of cells.
    #[error("invalid statement: {count} mines among {} cells", .cells.len())]
    InvalidStatement { cells: BTreeSet<Cell>, count: usize },

    /// A subset statement claims more mines than its superset.
    #[error("{subset} claims more mines than its superset {superset}")]
    InconsistentPair {
        superset: Statement,
        subset: Statement,
    },

    /// A cell was asserted to be the opposite of what is already known.
    #[error("contradiction: cell {cell} is already known to be {known}")]
    Conflict { cell: Cell, known: Fact },
}
