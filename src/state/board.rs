//! A player's private 5x5 arrangement of the numbers 1..=25 and the numbers called on it.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use thiserror::Error;

use crate::state::win;

/// Number of cells along one side of the board.
pub const BOARD_SIDE: usize = 5;
/// Total number of cells, which is also the highest callable number.
pub const CELL_COUNT: usize = BOARD_SIDE * BOARD_SIDE;
/// Highest number that can be placed or called.
pub const MAX_NUMBER: Number = CELL_COUNT as Number;

/// A value placed on a board cell or called during play.
pub type Number = u8;

/// Errors raised while building or marking a board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// The submitted arrangement is not a permutation of 1..=25.
    #[error("invalid board: {0}")]
    InvalidBoard(String),
    /// The called number is out of range or was already called.
    #[error("invalid move: {0}")]
    InvalidMove(String),
}

/// Convert a raw wire integer into a callable number.
pub fn parse_number(raw: i64) -> Result<Number, BoardError> {
    match Number::try_from(raw) {
        Ok(number) if (1..=MAX_NUMBER).contains(&number) => Ok(number),
        _ => Err(BoardError::InvalidMove(format!(
            "number {raw} is outside 1..={MAX_NUMBER}"
        ))),
    }
}

/// Cells are stored in row-major order (index `row * 5 + col`).
///
/// A default board is incomplete: it has no cells and cannot be played until
/// [`Board::submit`] succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: Vec<Number>,
    called: BTreeSet<Number>,
}

impl Board {
    /// Create an incomplete board awaiting submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a complete board with a uniformly shuffled arrangement.
    pub fn shuffled() -> Self {
        let mut cells: Vec<Number> = (1..=MAX_NUMBER).collect();
        cells.shuffle(&mut rand::rng());
        Self {
            cells,
            called: BTreeSet::new(),
        }
    }

    /// Accept a candidate arrangement, replacing any previous one and clearing calls.
    ///
    /// The board is left untouched when the arrangement is rejected.
    pub fn submit(&mut self, candidate: &[i64]) -> Result<(), BoardError> {
        if candidate.len() != CELL_COUNT {
            return Err(BoardError::InvalidBoard(format!(
                "expected {CELL_COUNT} numbers, got {}",
                candidate.len()
            )));
        }

        let mut seen = BTreeSet::new();
        let mut cells = Vec::with_capacity(CELL_COUNT);
        for &raw in candidate {
            let number = match Number::try_from(raw) {
                Ok(number) if (1..=MAX_NUMBER).contains(&number) => number,
                _ => {
                    return Err(BoardError::InvalidBoard(format!(
                        "number {raw} is outside 1..={MAX_NUMBER}"
                    )));
                }
            };
            if !seen.insert(number) {
                return Err(BoardError::InvalidBoard(format!(
                    "number {number} appears more than once"
                )));
            }
            cells.push(number);
        }

        self.cells = cells;
        self.called.clear();
        Ok(())
    }

    /// Whether all 25 numbers have been placed.
    pub fn is_complete(&self) -> bool {
        self.cells.len() == CELL_COUNT
    }

    /// Mark `number` as called on this board.
    pub fn call(&mut self, number: Number) -> Result<(), BoardError> {
        if !(1..=MAX_NUMBER).contains(&number) {
            return Err(BoardError::InvalidMove(format!(
                "number {number} is outside 1..={MAX_NUMBER}"
            )));
        }
        if !self.is_complete() {
            return Err(BoardError::InvalidMove(
                "board has not been submitted".into(),
            ));
        }
        if !self.called.insert(number) {
            return Err(BoardError::InvalidMove(format!(
                "number {number} has already been called"
            )));
        }
        Ok(())
    }

    /// Drop the arrangement and every call, returning to the incomplete state.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.called.clear();
    }

    pub fn cells(&self) -> &[Number] {
        &self.cells
    }

    pub fn called(&self) -> &BTreeSet<Number> {
        &self.called
    }

    /// Whether at least one row, column, or diagonal is fully called.
    pub fn has_win(&self) -> bool {
        win::has_win(&self.called, &self.cells)
    }

    /// Number of fully called lines on this board.
    pub fn completed_lines(&self) -> usize {
        win::completed_lines(&self.called, &self.cells)
    }
}
