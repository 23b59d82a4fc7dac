//! Line completion over a board's called numbers.

use std::collections::BTreeSet;

use crate::state::board::{BOARD_SIDE, Number};

/// Five cell indices (row-major) forming one winning line.
pub type Line = [usize; BOARD_SIDE];

/// The 12 fixed lines: 5 rows, 5 columns, then both diagonals.
pub const LINES: [Line; 12] = [
    [0, 1, 2, 3, 4],
    [5, 6, 7, 8, 9],
    [10, 11, 12, 13, 14],
    [15, 16, 17, 18, 19],
    [20, 21, 22, 23, 24],
    [0, 5, 10, 15, 20],
    [1, 6, 11, 16, 21],
    [2, 7, 12, 17, 22],
    [3, 8, 13, 18, 23],
    [4, 9, 14, 19, 24],
    [0, 6, 12, 18, 24],
    [4, 8, 12, 16, 20],
];

/// Report whether any line of `cells` is fully contained in `called`.
pub fn has_win(called: &BTreeSet<Number>, cells: &[Number]) -> bool {
    winning_line(called, cells).is_some()
}

/// First completed line, in [`LINES`] order.
pub fn winning_line(called: &BTreeSet<Number>, cells: &[Number]) -> Option<&'static Line> {
    LINES
        .iter()
        .find(|line| is_line_complete(line, called, cells))
}

/// Count every completed line.
pub fn completed_lines(called: &BTreeSet<Number>, cells: &[Number]) -> usize {
    LINES
        .iter()
        .filter(|line| is_line_complete(line, called, cells))
        .count()
}

fn is_line_complete(line: &Line, called: &BTreeSet<Number>, cells: &[Number]) -> bool {
    // Missing cells (incomplete board) never count as called.
    line.iter()
        .all(|&index| cells.get(index).is_some_and(|value| called.contains(value)))
}
