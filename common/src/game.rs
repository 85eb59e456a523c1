use crate::{Board, Cell, KnowledgeBase};
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, info};

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// How the agent arrived at a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// The cell was proven safe.
    Deduced,
    /// Nothing was provable, so the cell was picked at random.
    Guessed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub cell: Cell,
    pub kind: MoveKind,
}

/// What the player can see of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Revealed(usize),
}

/// One game: the hidden board, the agent playing it, and what has been
/// uncovered so far.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Game {
    pub board: Board,
    pub agent: KnowledgeBase,
    /// Revealed cells and their neighbouring mine counts.
    pub revealed: BTreeMap<Cell, usize>,
    /// Cells the agent has proven to be mines.
    pub flagged: BTreeSet<Cell>,
    pub state: GameState,
}

impl Game {
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        Ok(Self::with_board(Board::generate(height, width, mines, rng)?))
    }

    pub fn with_board(board: Board) -> Self {
        Game {
            agent: KnowledgeBase::new(board.height, board.width),
            board,
            revealed: BTreeMap::new(),
            flagged: BTreeSet::new(),
            state: GameState::Playing,
        }
    }

    /// Replaces the agent's statement limit. Only meaningful before the
    /// first move.
    pub fn with_statement_limit(mut self, limit: usize) -> Self {
        self.agent = self.agent.with_statement_limit(limit);
        self
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Reveals a cell and feeds its count to the agent.
    ///
    /// Returns `false` if the cell was a mine, which ends the game.
    /// Revealing an already revealed cell is a no-op. If the agent rejects
    /// the observation the game is left untouched.
    pub fn reveal(&mut self, at: Cell) -> anyhow::Result<bool> {
        if self.state != GameState::Playing {
            anyhow::bail!("game_ended");
        }
        if !at.in_bounds(self.board.height, self.board.width) {
            anyhow::bail!("cell {at} is off the board");
        }
        if self.revealed.contains_key(&at) {
            return Ok(true);
        }

        if self.board.is_mine(&at) {
            info!(cell = %at, "hit a mine");
            self.state = GameState::Lost;
            return Ok(false);
        }

        let count = self.board.nearby_mines(at);
        self.agent.add_knowledge(at, count)?;
        self.revealed.insert(at, count);
        self.flagged.extend(self.agent.known_mines().iter().copied());

        if self.board.won(&self.flagged) {
            info!(revealed = self.revealed.len(), "every mine flagged");
            self.state = GameState::Won;
        }
        Ok(true)
    }

    /// Lets the agent make one move: a proven-safe cell if it has one,
    /// otherwise a random cell not known to be a mine.
    ///
    /// Returns `None` when there is nothing left to reveal.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Option<Move>> {
        if self.state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let next = match self.agent.choose_safe_move() {
            Some(cell) => Move {
                cell,
                kind: MoveKind::Deduced,
            },
            None => {
                let eligible: Vec<Cell> = self.agent.eligible_moves().collect();
                match eligible.choose(rng) {
                    Some(&cell) => Move {
                        cell,
                        kind: MoveKind::Guessed,
                    },
                    None => return Ok(None),
                }
            }
        };

        debug!(cell = %next.cell, kind = ?next.kind, "agent move");
        self.reveal(next.cell)?;
        Ok(Some(next))
    }

    pub fn view(&self, cell: &Cell) -> CellView {
        if let Some(&count) = self.revealed.get(cell) {
            CellView::Revealed(count)
        } else if self.flagged.contains(cell) {
            CellView::Flagged
        } else {
            CellView::Hidden
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..self.board.width {
            write!(f, "{:^3}", col)?;
        }
        writeln!(f, "\n  +{}", "---".repeat(self.board.width))?;

        for row in 0..self.board.height {
            write!(f, "{:^2}|", row)?;
            for col in 0..self.board.width {
                match self.view(&Cell::new(row, col)) {
                    CellView::Hidden => write!(f, " ■ ")?,
                    CellView::Flagged => write!(f, " F ")?,
                    CellView::Revealed(n) => write!(f, " {} ", n)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_game_initialization() {
        let mut rng = StdRng::seed_from_u64(1);
        let game = Game::new(5, 5, 3, &mut rng).unwrap();
        assert_eq!(game.board.mines().len(), 3);
        assert_eq!(game.state, GameState::Playing);
        assert_eq!(game.agent.height(), 5);
        assert!(game.revealed.is_empty());

        assert!(Game::new(3, 3, 9, &mut rng).is_err());
    }

    #[test]
    fn test_hitting_mine() {
        let board = Board::from_mines(2, 2, [Cell::new(0, 0)]).unwrap();
        let mut game = Game::with_board(board);

        assert!(!game.reveal(Cell::new(0, 0)).unwrap());
        assert_eq!(game.state, GameState::Lost);

        // Further moves are rejected
        assert!(game.reveal(Cell::new(1, 1)).is_err());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(game.step(&mut rng).is_err());
    }

    #[test]
    fn test_deduced_move_wins() {
        // One row, mine at the far end
        let board = Board::from_mines(1, 3, [Cell::new(0, 2)]).unwrap();
        let mut game = Game::with_board(board);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(game.reveal(Cell::new(0, 0)).unwrap());
        assert_eq!(game.view(&Cell::new(0, 0)), CellView::Revealed(0));

        let played = game.step(&mut rng).unwrap();
        assert_eq!(
            played,
            Some(Move {
                cell: Cell::new(0, 1),
                kind: MoveKind::Deduced,
            })
        );
        assert_eq!(game.flagged, BTreeSet::from([Cell::new(0, 2)]));
        assert_eq!(game.view(&Cell::new(0, 2)), CellView::Flagged);
        assert_eq!(game.state, GameState::Won);
    }

    #[test]
    fn test_reveal_twice_is_noop() {
        let board = Board::from_mines(3, 3, [Cell::new(2, 2)]).unwrap();
        let mut game = Game::with_board(board);

        assert!(game.reveal(Cell::new(1, 1)).unwrap());
        assert!(game.reveal(Cell::new(1, 1)).unwrap());
        assert_eq!(game.agent.moves_made().len(), 1);
        assert!(game.reveal(Cell::new(3, 0)).is_err());
    }

    #[test]
    fn test_rejected_observation_leaves_game_untouched() {
        let board = Board::from_mines(3, 3, [Cell::new(2, 2)]).unwrap();
        let mut game = Game::with_board(board);
        // Corrupt the agent: it believes a safe cell is a mine
        game.agent.mark_mine(Cell::new(0, 0)).unwrap();

        assert!(game.reveal(Cell::new(0, 0)).is_err());
        assert!(game.revealed.is_empty());
        assert_eq!(game.view(&Cell::new(0, 0)), CellView::Hidden);
        assert_eq!(game.state, GameState::Playing);
        assert!(game.agent.moves_made().is_empty());
    }

    #[test]
    fn test_bot_plays_to_completion() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut game = Game::new(8, 8, 8, &mut rng).unwrap();

        let mut moves = 0;
        while game.state == GameState::Playing {
            if game.step(&mut rng).unwrap().is_none() {
                break;
            }
            moves += 1;
            assert!(moves <= 64);
        }

        assert_ne!(game.state, GameState::Playing);
        // Whatever happened, every flag is on a real mine
        assert!(game.flagged.is_subset(game.board.mines()));
        assert!(game.agent.known_safe().is_disjoint(game.board.mines()));
    }

    #[test]
    fn test_serialization() {
        let board = Board::from_mines(3, 3, [Cell::new(2, 2)]).unwrap();
        let mut game = Game::with_board(board);
        game.reveal(Cell::new(0, 0)).unwrap();

        let restored = Game::deserialize(&game.serialize().unwrap()).unwrap();
        assert_eq!(restored.board, game.board);
        assert_eq!(restored.revealed, game.revealed);
        assert_eq!(restored.agent.known_safe(), game.agent.known_safe());
        assert_eq!(restored.state, GameState::Playing);
        assert!(Game::deserialize(&[0xff]).is_err());
    }
}
