#![warn(missing_docs)]

//! Validated control-point height grid for the patchfield pipeline.
//!
//! A [`ControlGrid`] is the raw input to patch construction: a row-major
//! grid of scalar heights whose dimensions are positive multiples of 4,
//! so it partitions exactly into the 4x4 sub-blocks that become bicubic
//! Bezier patches. The grid is validated once at construction and
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`ControlGrid`].
#[derive(Error, Debug)]
pub enum GridError {
    /// A grid dimension is zero.
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    EmptyGrid {
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
    },

    /// A grid dimension is not divisible by the patch block size.
    #[error("grid dimensions must be multiples of 4, got {rows}x{cols}")]
    NotBlockAligned {
        /// Declared row count.
        rows: usize,
        /// Declared column count.
        cols: usize,
    },

    /// The height buffer does not match the declared dimensions.
    #[error("expected {expected} height values, got {actual}")]
    HeightCountMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },
}

/// Result type for grid construction.
pub type Result<T> = std::result::Result<T, GridError>;

/// Control points per patch edge; grids partition into `BLOCK x BLOCK` sub-blocks.
pub const BLOCK: usize = 4;

/// An immutable row-major grid of control-point heights.
///
/// Deserialization goes through [`ControlGrid::new`], so a grid read back
/// from serialized form carries the same validity guarantees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct ControlGrid {
    rows: usize,
    cols: usize,
    heights: Vec<f64>,
}

/// Unvalidated mirror of [`ControlGrid`] used during deserialization.
#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    heights: Vec<f64>,
}

impl TryFrom<RawGrid> for ControlGrid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        ControlGrid::new(raw.rows, raw.cols, raw.heights)
    }
}

impl ControlGrid {
    /// Create a grid from row-major height values.
    ///
    /// `rows` and `cols` must be positive multiples of 4 and `heights`
    /// must hold exactly `rows * cols` values.
    pub fn new(rows: usize, cols: usize, heights: Vec<f64>) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid { rows, cols });
        }
        if rows % BLOCK != 0 || cols % BLOCK != 0 {
            return Err(GridError::NotBlockAligned { rows, cols });
        }
        let expected = rows * cols;
        if heights.len() != expected {
            return Err(GridError::HeightCountMismatch {
                expected,
                actual: heights.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            heights,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Height at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    pub fn height(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows && col < self.cols);
        self.heights[row * self.cols + col]
    }

    /// Number of 4x4 blocks along x (columns).
    pub fn blocks_x(&self) -> usize {
        self.cols / BLOCK
    }

    /// Number of 4x4 blocks along y (rows).
    pub fn blocks_y(&self) -> usize {
        self.rows / BLOCK
    }

    /// Row-major height buffer.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }
}
