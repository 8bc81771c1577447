//! Board occupancy model.
//!
//! The board is a square grid stored row-major: the cell at column `x`, row
//! `y` lives at index `y * size + x`. Coordinates are signed so that callers
//! can probe positions a piece offset pushes off the left or top edge; any
//! access outside the grid is reported as [`GameError::OutOfBounds`].

use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default side length of the board
pub const DEFAULT_GRID_SIZE: usize = 10;

/// Square grid of occupancy bits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Side length
    size: usize,
    /// `size * size` cells, row-major
    cells: Vec<bool>,
}

impl Board {
    /// Create an empty board
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Rebuild a board from its raw cells
    ///
    /// Returns `None` if `cells` does not hold exactly `size * size` entries.
    pub fn from_cells(size: usize, cells: Vec<bool>) -> Option<Self> {
        (size.checked_mul(size) == Some(cells.len())).then_some(Self { size, cells })
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.size
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Row-major index of a coordinate. Does not check bounds.
    pub fn cell_index(&self, x: i32, y: i32) -> i32 {
        y * self.size as i32 + x
    }

    /// Whether a coordinate lies on the board
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        let size = self.size as i32;
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    fn checked_index(&self, x: i32, y: i32) -> Result<usize, GameError> {
        if !self.in_bounds(x, y) {
            return Err(GameError::OutOfBounds {
                x,
                y,
                size: self.size,
            });
        }
        Ok(self.cell_index(x, y) as usize)
    }

    /// Read a cell
    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool, GameError> {
        let index = self.checked_index(x, y)?;
        Ok(self.cells[index])
    }

    /// Write a cell
    pub fn set_occupied(&mut self, x: i32, y: i32, occupied: bool) -> Result<(), GameError> {
        let index = self.checked_index(x, y)?;
        self.cells[index] = occupied;
        Ok(())
    }

    /// Reallocate to a new size, clearing every cell
    pub fn resize(&mut self, new_size: usize) {
        self.size = new_size;
        self.cells = vec![false; new_size * new_size];
    }

    /// Number of occupied cells
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// True if no cell is occupied
    pub fn is_empty(&self) -> bool {
        !self.cells.contains(&true)
    }

    /// True if every cell of row `y` is occupied
    ///
    /// Rows outside the board are never complete.
    pub fn row_complete(&self, y: usize) -> bool {
        if y >= self.size {
            return false;
        }
        let start = y * self.size;
        self.cells[start..start + self.size].iter().all(|&c| c)
    }

    /// True if every cell of column `x` is occupied; false off the board
    pub fn column_complete(&self, x: usize) -> bool {
        x < self.size && self.cells.iter().skip(x).step_by(self.size).all(|&c| c)
    }

    /// Mark the given cell indices unoccupied
    pub fn clear_cells<'a>(&mut self, indices: impl IntoIterator<Item = &'a usize>) {
        for &index in indices {
            if let Some(cell) = self.cells.get_mut(index) {
                *cell = false;
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size.max(1)) {
            for &cell in row {
                f.write_str(if cell { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
