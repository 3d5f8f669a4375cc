/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

use thiserror::Error;

/// Errors reported by matrix construction, validation and bulk operations.
///
/// Out-of-bounds *indexed* access through `Index`/`IndexMut` panics instead (see
/// [`crate::Matrix`]); everything the library can reasonably recover from is a
/// variant here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("row {row} has length {len} but row 0 has length {expected}: all rows must have the same length")]
    Ragged {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("tried to construct a {nrows}x{ncols} matrix over a buffer of length {len}")]
    WrongBufferLength {
        len: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error("shape mismatch: {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    ShapeMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("illegal matrix dimensions for multiply: left has {left_cols} columns, right has {right_rows} rows")]
    InnerDimension {
        left_cols: usize,
        right_rows: usize,
    },

    #[error("range {from}..{to} is out of bounds for length {len}")]
    RangeOutOfBounds { from: usize, to: usize, len: usize },

    #[error("index ({row}, {col}) is out of bounds for a {nrows}x{ncols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        nrows: usize,
        ncols: usize,
    },

    #[error("'nrows' and 'ncols' must be the same to access diagonals: nrows={nrows}, ncols={ncols}")]
    NotSquare { nrows: usize, ncols: usize },

    #[error("row_repeats={row_repeats} and col_repeats={col_repeats} must both be at least 1")]
    BadRepeat {
        row_repeats: usize,
        col_repeats: usize,
    },

    #[error("'new_cols' must be at least 1 to reshape")]
    BadReshape,

    #[error("expected a row of length {expected}, got {got}")]
    RowLength { expected: usize, got: usize },

    #[error("expected a column of length {expected}, got {got}")]
    ColumnLength { expected: usize, got: usize },

    #[error("expected a diagonal of length {expected}, got {got}")]
    BadDiagonal { expected: usize, got: usize },

    #[error("the main and anti diagonal vectors must have the same length: {main} vs {anti}")]
    DiagonalLength { main: usize, anti: usize },

    #[error("{labels} labels were supplied for {expected} {axis}")]
    LabelCount {
        labels: usize,
        expected: usize,
        axis: &'static str,
    },

    #[error("at least one input matrix is required")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Validate a half-open range against a length.
    pub(crate) fn check_range(from: usize, to: usize, len: usize) -> Result<()> {
        if from > to || to > len {
            Err(Error::RangeOutOfBounds { from, to, len })
        } else {
            Ok(())
        }
    }
}
