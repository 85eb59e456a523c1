use crate::{Cell, KnowledgeError, Statement};
use itertools::Itertools;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, trace, warn};

/// Upper bound on live statements unless overridden with
/// [`KnowledgeBase::with_statement_limit`].
pub const DEFAULT_STATEMENT_LIMIT: usize = 4096;

/// What the knowledge base has proven about a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fact {
    Safe,
    Mine,
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Safe => f.write_str("safe"),
            Fact::Mine => f.write_str("a mine"),
        }
    }
}

/// The agent's inference state for one game.
///
/// Observations arrive through [`add_knowledge`](Self::add_knowledge), which
/// runs propagation and pairwise inference to a fixed point before
/// returning. Between public calls no cell is both safe and a mine, and no
/// live statement mentions a cell whose status is known.
///
/// Pairwise inference is quadratic in the number of statements and the
/// collection can grow every round, so derived statements are capped;
/// those beyond the cap are dropped, which loses deductions but never
/// soundness. Observations are always kept.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    height: usize,
    width: usize,
    moves_made: BTreeSet<Cell>,
    known_safe: BTreeSet<Cell>,
    known_mines: BTreeSet<Cell>,
    statements: Vec<Statement>,
    statement_limit: usize,
}

impl KnowledgeBase {
    pub fn new(height: usize, width: usize) -> Self {
        KnowledgeBase {
            height,
            width,
            moves_made: BTreeSet::new(),
            known_safe: BTreeSet::new(),
            known_mines: BTreeSet::new(),
            statements: Vec::new(),
            statement_limit: DEFAULT_STATEMENT_LIMIT,
        }
    }

    pub fn with_statement_limit(mut self, limit: usize) -> Self {
        self.statement_limit = limit;
        self
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn moves_made(&self) -> &BTreeSet<Cell> {
        &self.moves_made
    }

    pub fn known_safe(&self) -> &BTreeSet<Cell> {
        &self.known_safe
    }

    pub fn known_mines(&self) -> &BTreeSet<Cell> {
        &self.known_mines
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// What is known about `cell`, if anything.
    pub fn fact(&self, cell: &Cell) -> Option<Fact> {
        if self.known_mines.contains(cell) {
            Some(Fact::Mine)
        } else if self.known_safe.contains(cell) {
            Some(Fact::Safe)
        } else {
            None
        }
    }

    /// Ingests a revealed cell and the number of mines among its neighbours.
    ///
    /// The new statement covers every neighbour, known or not; propagation
    /// shrinks it afterwards. The observation itself is always kept, even at
    /// the statement limit. On error the knowledge base is left exactly as
    /// it was before the call.
    pub fn add_knowledge(&mut self, cell: Cell, count: usize) -> Result<(), KnowledgeError> {
        if !cell.in_bounds(self.height, self.width) {
            return Err(KnowledgeError::OutOfBounds {
                cell,
                height: self.height,
                width: self.width,
            });
        }
        if self.moves_made.contains(&cell) {
            return Err(KnowledgeError::AlreadyPlayed(cell));
        }
        let statement = Statement::new(cell.neighbors(self.height, self.width), count)?;

        debug!(%cell, count, "ingesting observation");
        let snapshot = self.clone();
        if let Err(error) = self.ingest(cell, statement) {
            warn!(%cell, %error, "observation contradicts knowledge, rolled back");
            *self = snapshot;
            return Err(error);
        }

        debug!(
            safe = self.known_safe.len(),
            mines = self.known_mines.len(),
            statements = self.statements.len(),
            "knowledge updated"
        );
        Ok(())
    }

    fn ingest(&mut self, cell: Cell, statement: Statement) -> Result<(), KnowledgeError> {
        self.mark_safe(cell)?;
        self.moves_made.insert(cell);
        self.admit(statement);
        self.propagate()?;

        let mut round = 0;
        loop {
            let derived = self.infer_new_statements();
            if derived.is_empty() {
                break;
            }

            round += 1;
            let candidates = derived.len();
            let inserted = derived
                .into_iter()
                .filter(|statement| self.insert(statement.clone()))
                .count();
            debug!(round, candidates, inserted, "inferred new statements");

            if inserted < candidates {
                warn!(
                    limit = self.statement_limit,
                    dropped = candidates - inserted,
                    "statement limit reached, derivations dropped"
                );
            }
            // Nothing new went in, so another round would derive the same.
            if inserted == 0 {
                break;
            }
            self.propagate()?;
        }
        Ok(())
    }

    /// Records `cell` as a mine and removes it from every statement.
    /// Returns the number of statements that changed.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<usize, KnowledgeError> {
        let forced_safe = self
            .statements
            .iter()
            .any(|s| s.contains(&cell) && s.count() == 0);
        if forced_safe || self.known_safe.contains(&cell) {
            return Err(KnowledgeError::Conflict {
                cell,
                known: Fact::Safe,
            });
        }

        if self.known_mines.insert(cell) {
            trace!(%cell, "mine");
        }
        Ok(self
            .statements
            .iter_mut()
            .map(|s| s.mark_mine(&cell))
            .filter(|&changed| changed)
            .count())
    }

    /// Records `cell` as safe and removes it from every statement.
    /// Returns the number of statements that changed.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<usize, KnowledgeError> {
        let forced_mine = self
            .statements
            .iter()
            .any(|s| s.contains(&cell) && s.forces_mines());
        if forced_mine || self.known_mines.contains(&cell) {
            return Err(KnowledgeError::Conflict {
                cell,
                known: Fact::Mine,
            });
        }

        if self.known_safe.insert(cell) {
            trace!(%cell, "safe");
        }
        Ok(self
            .statements
            .iter_mut()
            .map(|s| s.mark_safe(&cell))
            .filter(|&changed| changed)
            .count())
    }

    /// Applies saturated statements and known facts until a full pass
    /// changes nothing, then purges emptied and duplicate statements.
    /// Returns the total number of statement mutations.
    pub fn propagate(&mut self) -> Result<usize, KnowledgeError> {
        let mut total = 0;
        loop {
            let mut changes = 0;

            let mut safes = BTreeSet::new();
            let mut mines = BTreeSet::new();
            for statement in &self.statements {
                safes.extend(statement.known_safes());
                mines.extend(statement.known_mines());
            }
            for cell in safes {
                changes += self.mark_safe(cell)?;
            }
            for cell in mines {
                changes += self.mark_mine(cell)?;
            }

            // Facts learned before a statement arrived.
            for cell in self.known_safe.clone() {
                changes += self.mark_safe(cell)?;
            }
            for cell in self.known_mines.clone() {
                changes += self.mark_mine(cell)?;
            }

            if changes == 0 {
                break;
            }
            total += changes;
        }

        self.purge();
        Ok(total)
    }

    /// Subset-difference elimination over every ordered pair of statements.
    ///
    /// Emptied and duplicate statements are purged first. The returned
    /// statements are not yet part of the knowledge base and contain no
    /// duplicates of it.
    pub fn infer_new_statements(&mut self) -> Vec<Statement> {
        self.purge();

        let existing: HashSet<&Statement> = self.statements.iter().collect();
        let mut seen: HashSet<Statement> = HashSet::new();
        let mut derived: Vec<Statement> = Vec::new();
        for (a, b) in self.statements.iter().cartesian_product(&self.statements) {
            if a.cells() == b.cells() && a.count() > b.count() {
                warn!(%a, %b, "statements disagree over the same cells");
                continue;
            }
            match a.difference(b) {
                Some(Ok(candidate)) => {
                    if !existing.contains(&candidate) && seen.insert(candidate.clone()) {
                        trace!(%a, %b, %candidate, "derived");
                        derived.push(candidate);
                    }
                }
                Some(Err(error)) => warn!(%error, "dropping invalid derivation"),
                None => {}
            }
        }
        derived
    }

    /// A known-safe cell that has not been played yet, smallest first.
    pub fn choose_safe_move(&self) -> Option<Cell> {
        self.known_safe.difference(&self.moves_made).next().copied()
    }

    /// The first unplayed cell, in row-major order, not known to be a mine.
    pub fn choose_any_move(&self) -> Option<Cell> {
        self.eligible_moves().next()
    }

    /// Every unplayed cell not known to be a mine, in row-major order.
    pub fn eligible_moves(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height)
            .cartesian_product(0..self.width)
            .map(Cell::from)
            .filter(move |cell| !self.known_mines.contains(cell) && !self.moves_made.contains(cell))
    }

    /// Drops emptied statements, and those that shrank into copies of others.
    fn purge(&mut self) {
        self.statements = std::mem::take(&mut self.statements)
            .into_iter()
            .filter(|s| !s.is_empty())
            .unique()
            .collect();
    }

    /// Adds a derived statement unless the collection is full.
    fn insert(&mut self, statement: Statement) -> bool {
        if self.statements.len() >= self.statement_limit
            && !statement.is_empty()
            && !self.statements.contains(&statement)
        {
            return false;
        }
        self.admit(statement);
        true
    }

    /// Adds a statement regardless of the limit.
    fn admit(&mut self, statement: Statement) {
        if !statement.is_empty() && !self.statements.contains(&statement) {
            self.statements.push(statement);
        }
    }
}
