//! Line detection and clearing.
//!
//! Rows and columns are evaluated against the board as it stands before any
//! cell is cleared, so one call never cascades into a second round.

use crate::board::Board;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of one line-clearing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineClear {
    /// Completed row numbers
    pub rows: Vec<usize>,
    /// Completed column numbers
    pub columns: Vec<usize>,
    /// Cleared cell indices, sorted, each listed once
    pub cells: Vec<usize>,
}

impl LineClear {
    /// Completed rows plus completed columns
    pub fn lines_cleared(&self) -> u32 {
        (self.rows.len() + self.columns.len()) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Find every complete row and column, then clear them all at once
pub fn detect_and_clear(board: &mut Board) -> LineClear {
    let size = board.size();
    let rows: Vec<usize> = (0..size).filter(|&y| board.row_complete(y)).collect();
    let columns: Vec<usize> = (0..size).filter(|&x| board.column_complete(x)).collect();

    let mut cells = BTreeSet::new();
    for &y in &rows {
        cells.extend((0..size).map(|x| y * size + x));
    }
    for &x in &columns {
        cells.extend((0..size).map(|y| y * size + x));
    }

    board.clear_cells(&cells);

    LineClear {
        rows,
        columns,
        cells: cells.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, y: i32) {
        for x in 0..board.size() as i32 {
            board.set_occupied(x, y, true).unwrap();
        }
    }

    fn fill_column(board: &mut Board, x: i32) {
        for y in 0..board.size() as i32 {
            board.set_occupied(x, y, true).unwrap();
        }
    }

    #[test]
    fn test_nothing_to_clear() {
        let mut board = Board::new(10);
        board.set_occupied(0, 0, true).unwrap();
        let clear = detect_and_clear(&mut board);
        assert!(clear.is_empty());
        assert_eq!(clear.lines_cleared(), 0);
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn test_single_row() {
        let mut board = Board::new(10);
        fill_row(&mut board, 3);
        board.set_occupied(0, 4, true).unwrap();

        let clear = detect_and_clear(&mut board);
        assert_eq!(clear.rows, vec![3]);
        assert!(clear.columns.is_empty());
        assert_eq!(clear.cells, (30..40).collect::<Vec<_>>());
        assert_eq!(board.occupied_count(), 1);
        assert!(board.is_occupied(0, 4).unwrap());
    }

    #[test]
    fn test_row_and_column_share_one_cell() {
        let mut board = Board::new(10);
        fill_row(&mut board, 2);
        fill_column(&mut board, 7);

        let clear = detect_and_clear(&mut board);
        assert_eq!(clear.lines_cleared(), 2);
        assert_eq!(clear.cells.len(), 19);
        assert_eq!(clear.cells.iter().filter(|&&i| i == 27).count(), 1);
        assert!(board.is_empty());
    }

    #[test]
    fn test_full_board_counts_every_line() {
        let mut board = Board::new(4);
        for y in 0..4 {
            fill_row(&mut board, y);
        }
        let clear = detect_and_clear(&mut board);
        assert_eq!(clear.lines_cleared(), 8);
        assert_eq!(clear.cells.len(), 16);
        assert!(board.is_empty());
    }

    #[test]
    fn test_second_pass_is_empty() {
        let mut board = Board::new(10);
        fill_row(&mut board, 0);
        fill_column(&mut board, 0);
        assert!(!detect_and_clear(&mut board).is_empty());
        assert!(detect_and_clear(&mut board).is_empty());
    }
}
