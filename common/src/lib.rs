//! A knowledge-based Minesweeper agent.
//!
//! The agent never guesses while it can prove something. Each revealed cell
//! becomes a [`Statement`] ("exactly `count` of these cells are mines") in a
//! [`KnowledgeBase`], which shrinks statements with known facts, extracts
//! saturated ones, and derives new statements from pairs whose cells nest.
//! [`Board`] and [`Game`] provide the minefield and the move loop around it.

mod board;
mod cell;
mod error;
mod game;
mod knowledge;
mod statement;

pub use board::Board;
pub use cell::Cell;
pub use error::KnowledgeError;
pub use game::{CellView, Game, GameState, Move, MoveKind};
pub use knowledge::{DEFAULT_STATEMENT_LIMIT, Fact, KnowledgeBase};
pub use statement::Statement;
