//! Snake (boustrophedon) placement of the linear tile path onto a grid.
//!
//! Even rows read left-to-right and odd rows right-to-left, so consecutive
//! positions are always adjacent on screen and the token path never jumps.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A grid cell, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Row from the top.
    pub row: usize,
    /// Column from the left.
    pub col: usize,
}

/// Grid dimensions for the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    rows: usize,
    cols: usize,
}

impl BoardLayout {
    /// Creates a layout with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// The standard 5 x 4 grid.
    pub fn standard() -> Self {
        Self::new(5, 4)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells.
    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    /// Grid cell of a linear path index (`tile id - 1`).
    #[instrument(skip(self))]
    pub fn cell_of(&self, index: usize) -> Option<Cell> {
        if self.cols == 0 || index >= self.capacity() {
            return None;
        }
        let row = index / self.cols;
        let offset = index % self.cols;
        let col = if row % 2 == 0 {
            offset
        } else {
            self.cols - 1 - offset
        };
        Some(Cell { row, col })
    }

    /// Linear path index shown at a grid cell. Inverse of [`Self::cell_of`].
    #[instrument(skip(self))]
    pub fn index_at(&self, cell: Cell) -> Option<usize> {
        if cell.row >= self.rows || cell.col >= self.cols {
            return None;
        }
        let offset = if cell.row % 2 == 0 {
            cell.col
        } else {
            self.cols - 1 - cell.col
        };
        Some(cell.row * self.cols + offset)
    }

    /// Path indices in visual (row-major) order.
    pub fn visual_indices(&self) -> Vec<usize> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Cell { row, col }))
            .filter_map(|cell| self.index_at(cell))
            .collect()
    }

    /// Reorders a linear path into visual order. Indices past the end of
    /// `path` are skipped.
    #[instrument(skip(self, path), fields(len = path.len()))]
    pub fn visual_order<'a, T>(&self, path: &'a [T]) -> Vec<&'a T> {
        self.visual_indices()
            .into_iter()
            .filter_map(|index| path.get(index))
            .collect()
    }

    /// Grid rows in visual order; cells past the end of `path` are `None`.
    pub fn visual_rows<'a, T>(&self, path: &'a [T]) -> Vec<Vec<Option<&'a T>>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.index_at(Cell { row, col }).and_then(|i| path.get(i)))
                    .collect()
            })
            .collect()
    }
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::standard()
    }
}
