/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! The dense matrix type: one flat row-major allocation plus its shape.
//!
//! Rows are contiguous slices of the backing store, which makes row access, row
//! iteration and reshape cheap. Bulk operations that can profit from it hand their
//! work to [`crate::dispatch`].

use std::fmt;
use std::ops::{Index, IndexMut, Range};

use rand::distr::{Distribution, StandardUniform};
use rand::Rng;

use crate::dispatch;
use crate::element::{DisplayCell, Element, Numeric};
use crate::error::{Error, Result};

/// A dense 2-dimensional matrix in row-major order.
///
/// The element kind is the type parameter: `Matrix<i32>`, `Matrix<f64>`,
/// `Matrix<bool>`, `Matrix<char>`, or the boxed form `Matrix<Option<T>>` whose
/// absent cells unbox to the kind's default.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T: Element> {
    data: Box<[T]>,
    nrows: usize,
    ncols: usize,
    count: u64,
}

impl<T: Element> Matrix<T> {
    /// The 0x0 matrix. Allocation-free.
    pub fn empty() -> Self {
        Self {
            data: Box::default(),
            nrows: 0,
            ncols: 0,
            count: 0,
        }
    }

    /// Build a matrix from row vectors.
    ///
    /// An empty input yields the 0x0 matrix. Every row must have the length of row
    /// 0, otherwise [`Error::Ragged`] is returned.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        if rows.is_empty() {
            return Ok(Self::empty());
        }

        let ncols = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(Error::Ragged {
                    row: i,
                    len: row.len(),
                    expected: ncols,
                });
            }
        }

        let nrows = rows.len();
        let data: Box<[T]> = rows.into_iter().flatten().collect();
        Ok(Self::from_parts(data, nrows, ncols))
    }

    /// Wrap an existing row-major buffer without copying.
    ///
    /// The buffer length must equal `nrows * ncols`.
    pub fn try_from_flat(data: Box<[T]>, nrows: usize, ncols: usize) -> Result<Self> {
        if data.len() != nrows * ncols {
            return Err(Error::WrongBufferLength {
                len: data.len(),
                nrows,
                ncols,
            });
        }
        Ok(Self::from_parts(data, nrows, ncols))
    }

    /// An `nrows x ncols` matrix with every cell set to `value`.
    pub fn filled(nrows: usize, ncols: usize, value: T) -> Self {
        Self::from_parts(vec![value; nrows * ncols].into_boxed_slice(), nrows, ncols)
    }

    /// A `1 x len` matrix repeating `value`.
    pub fn repeat(value: T, len: usize) -> Self {
        Self::filled(1, len, value)
    }

    pub(crate) fn from_parts(data: Box<[T]>, nrows: usize, ncols: usize) -> Self {
        debug_assert_eq!(data.len(), nrows * ncols);
        Self {
            data,
            nrows,
            ncols,
            // Widened so huge shapes cannot overflow the cached element count.
            count: nrows as u64 * ncols as u64,
        }
    }

    ////////////
    // Shape  //
    ////////////

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Total cell count, widened to 64 bits.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The `(nrows, ncols)` pair.
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.nrows == other.nrows && self.ncols == other.ncols
    }

    pub(crate) fn check_square(&self) -> Result<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(Error::NotSquare {
                nrows: self.nrows,
                ncols: self.ncols,
            })
        }
    }

    /////////////
    // Access  //
    /////////////

    /// Return the backing store as a row-major slice.
    ///
    /// This is the avoid-copy contract: the slice is the matrix's live storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable companion to [`Matrix::as_slice`].
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the matrix, returning the backing store.
    pub fn into_flat(self) -> Box<[T]> {
        self.data
    }

    /// Return a reference to the cell at `(row, col)`, or `None` out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.nrows && col < self.ncols {
            Some(&self.data[row * self.ncols + col])
        } else {
            None
        }
    }

    /// Set the cell at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row < self.nrows && col < self.ncols {
            self.data[row * self.ncols + col] = value;
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds {
                row,
                col,
                nrows: self.nrows,
                ncols: self.ncols,
            })
        }
    }

    /// Return row `row` as a slice of the backing store.
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()`.
    pub fn row(&self, row: usize) -> &[T] {
        assert!(
            row < self.nrows,
            "tried to access row {row} of a matrix with {} rows",
            self.nrows
        );
        let start = row * self.ncols;
        &self.data[start..start + self.ncols]
    }

    /// Return row `row` if it exists.
    pub fn get_row(&self, row: usize) -> Option<&[T]> {
        (row < self.nrows).then(|| {
            let start = row * self.ncols;
            &self.data[start..start + self.ncols]
        })
    }

    /// Mutable companion to [`Matrix::row`].
    ///
    /// # Panics
    ///
    /// Panics if `row >= self.nrows()`.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(
            row < self.nrows,
            "tried to access row {row} of a matrix with {} rows",
            self.nrows
        );
        let start = row * self.ncols;
        &mut self.data[start..start + self.ncols]
    }

    /// Iterate over the rows, first to last.
    pub fn row_iter(&self) -> impl ExactSizeIterator<Item = &[T]> + '_ {
        (0..self.nrows).map(move |i| self.row(i))
    }

    /// Mutable row iteration. A zero-column matrix yields no rows.
    pub fn row_iter_mut(&mut self) -> impl Iterator<Item = &mut [T]> {
        let ncols = self.ncols;
        self.data.chunks_exact_mut(ncols.max(1))
    }

    /// Return column `col` as a freshly allocated buffer (columns are not
    /// contiguous, so a copy is unavoidable).
    ///
    /// # Panics
    ///
    /// Panics if `col >= self.ncols()`.
    pub fn column(&self, col: usize) -> Box<[T]> {
        assert!(
            col < self.ncols,
            "col {col} is out of bounds (max: {})",
            self.ncols
        );
        (0..self.nrows)
            .map(|i| self.data[i * self.ncols + col].clone())
            .collect()
    }

    /// Replace row `row` with `values`; the length must match exactly.
    pub fn set_row(&mut self, row: usize, values: &[T]) -> Result<()> {
        if row >= self.nrows {
            return Err(Error::IndexOutOfBounds {
                row,
                col: 0,
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }
        if values.len() != self.ncols {
            return Err(Error::RowLength {
                expected: self.ncols,
                got: values.len(),
            });
        }
        self.row_mut(row).clone_from_slice(values);
        Ok(())
    }

    /// Replace column `col` with `values`; the length must match exactly.
    pub fn set_column(&mut self, col: usize, values: &[T]) -> Result<()> {
        if col >= self.ncols {
            return Err(Error::IndexOutOfBounds {
                row: 0,
                col,
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }
        if values.len() != self.nrows {
            return Err(Error::ColumnLength {
                expected: self.nrows,
                got: values.len(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.data[i * self.ncols + col] = value.clone();
        }
        Ok(())
    }

    /// Transform row `row` in place.
    pub fn update_row<F>(&mut self, row: usize, mut f: F) -> Result<()>
    where
        F: FnMut(&T) -> T,
    {
        if row >= self.nrows {
            return Err(Error::IndexOutOfBounds {
                row,
                col: 0,
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }
        for cell in self.row_mut(row) {
            *cell = f(cell);
        }
        Ok(())
    }

    /// Transform column `col` in place.
    pub fn update_column<F>(&mut self, col: usize, mut f: F) -> Result<()>
    where
        F: FnMut(&T) -> T,
    {
        if col >= self.ncols {
            return Err(Error::IndexOutOfBounds {
                row: 0,
                col,
                nrows: self.nrows,
                ncols: self.ncols,
            });
        }
        for i in 0..self.nrows {
            let cell = &mut self.data[i * self.ncols + col];
            *cell = f(cell);
        }
        Ok(())
    }

    ///////////////
    // Neighbors //
    ///////////////

    /// The value above `(row, col)`, if any.
    pub fn up_of(&self, row: usize, col: usize) -> Option<T> {
        let row = row.checked_sub(1)?;
        self.get(row, col).cloned()
    }

    /// The value below `(row, col)`, if any.
    pub fn down_of(&self, row: usize, col: usize) -> Option<T> {
        self.get(row + 1, col).cloned()
    }

    /// The value left of `(row, col)`, if any.
    pub fn left_of(&self, row: usize, col: usize) -> Option<T> {
        let col = col.checked_sub(1)?;
        self.get(row, col).cloned()
    }

    /// The value right of `(row, col)`, if any.
    pub fn right_of(&self, row: usize, col: usize) -> Option<T> {
        self.get(row, col + 1).cloned()
    }

    ///////////////
    // Diagonals //
    ///////////////

    /// The main diagonal (left-upper to right-lower). Square matrices only.
    pub fn lu2rd(&self) -> Result<Vec<T>> {
        self.check_square()?;
        Ok((0..self.nrows)
            .map(|i| self.data[i * self.ncols + i].clone())
            .collect())
    }

    /// The anti diagonal (right-upper to left-lower). Square matrices only.
    pub fn ru2ld(&self) -> Result<Vec<T>> {
        self.check_square()?;
        Ok((0..self.nrows)
            .map(|i| self.data[i * self.ncols + (self.ncols - 1 - i)].clone())
            .collect())
    }

    /// Replace the main diagonal. Square matrices only; the length must match.
    pub fn set_lu2rd(&mut self, values: &[T]) -> Result<()> {
        self.check_square()?;
        if values.len() != self.nrows {
            return Err(Error::BadDiagonal {
                expected: self.nrows,
                got: values.len(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.data[i * self.ncols + i] = value.clone();
        }
        Ok(())
    }

    /// Replace the anti diagonal. Square matrices only; the length must match.
    pub fn set_ru2ld(&mut self, values: &[T]) -> Result<()> {
        self.check_square()?;
        if values.len() != self.nrows {
            return Err(Error::BadDiagonal {
                expected: self.nrows,
                got: values.len(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            self.data[i * self.ncols + (self.ncols - 1 - i)] = value.clone();
        }
        Ok(())
    }

    /// Transform the main diagonal in place. Square matrices only.
    pub fn update_lu2rd<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&T) -> T,
    {
        self.check_square()?;
        for i in 0..self.nrows {
            let cell = &mut self.data[i * self.ncols + i];
            *cell = f(cell);
        }
        Ok(())
    }

    /// Transform the anti diagonal in place. Square matrices only.
    pub fn update_ru2ld<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&T) -> T,
    {
        self.check_square()?;
        for i in 0..self.nrows {
            let cell = &mut self.data[i * self.ncols + (self.ncols - 1 - i)];
            *cell = f(cell);
        }
        Ok(())
    }

    /////////////////
    // Elementwise //
    /////////////////

    /// Transform every cell in place, fanning out when the dispatcher says so.
    pub fn update_all<F>(&mut self, f: F)
    where
        F: Fn(&T) -> T + Sync,
    {
        if self.ncols == 0 {
            return;
        }
        if dispatch::is_parallelable(self.count) {
            use rayon::prelude::*;
            let ncols = self.ncols;
            self.data
                .par_chunks_exact_mut(ncols)
                .for_each(|row| {
                    for cell in row {
                        *cell = f(cell);
                    }
                });
        } else {
            for cell in self.data.iter_mut() {
                *cell = f(cell);
            }
        }
    }

    /// Like [`Matrix::update_all`], but the transform also sees the cell's
    /// coordinates.
    pub fn update_all_indexed<F>(&mut self, f: F)
    where
        F: Fn(usize, usize, &T) -> T + Sync,
    {
        if self.ncols == 0 {
            return;
        }
        if dispatch::is_parallelable(self.count) {
            use rayon::prelude::*;
            let ncols = self.ncols;
            self.data
                .par_chunks_exact_mut(ncols)
                .enumerate()
                .for_each(|(i, row)| {
                    for (j, cell) in row.iter_mut().enumerate() {
                        *cell = f(i, j, cell);
                    }
                });
        } else {
            let ncols = self.ncols;
            for (idx, cell) in self.data.iter_mut().enumerate() {
                *cell = f(idx / ncols, idx % ncols, cell);
            }
        }
    }

    /// Replace every cell matching `predicate` with `value`, in place.
    pub fn replace_if<P>(&mut self, predicate: P, value: T)
    where
        P: Fn(&T) -> bool + Sync,
    {
        self.update_all(|cell| {
            if predicate(cell) {
                value.clone()
            } else {
                cell.clone()
            }
        });
    }

    /// A new matrix of the same kind with `f` applied to every cell.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&T) -> T + Sync,
    {
        self.map_to(f)
    }

    /// A new matrix of a possibly different element kind with `f` applied to
    /// every cell.
    pub fn map_to<U, F>(&self, f: F) -> Matrix<U>
    where
        U: Element,
        F: Fn(&T) -> U + Sync,
    {
        let parallel = dispatch::is_parallelable(self.count);
        dispatch::fill_rows(self.nrows, self.ncols, parallel, |i, out| {
            let src = self.row(i);
            for (j, cell) in out.iter_mut().enumerate() {
                *cell = f(&src[j]);
            }
        })
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy `src` into this matrix with its upper-left corner at
    /// `(from_row, from_col)`, clipped to this matrix's bounds.
    pub fn fill_from(&mut self, from_row: usize, from_col: usize, src: &Self) -> Result<()> {
        Error::check_range(from_row, self.nrows, self.nrows)?;
        Error::check_range(from_col, self.ncols, self.ncols)?;

        let rows = src.nrows.min(self.nrows - from_row);
        let cols = src.ncols.min(self.ncols - from_col);
        for i in 0..rows {
            let dst = self.row_mut(from_row + i);
            dst[from_col..from_col + cols].clone_from_slice(&src.row(i)[..cols]);
        }
        Ok(())
    }

    ////////////
    // Copies //
    ////////////

    /// An independent copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Copy the half-open row range `rows` into a new matrix.
    pub fn copy_rows(&self, rows: Range<usize>) -> Result<Self> {
        Error::check_range(rows.start, rows.end, self.nrows)?;
        let data: Box<[T]> = self.data[rows.start * self.ncols..rows.end * self.ncols].into();
        Ok(Self::from_parts(data, rows.len(), self.ncols))
    }

    /// Copy the half-open row and column ranges into a new matrix.
    pub fn copy_region(&self, rows: Range<usize>, cols: Range<usize>) -> Result<Self> {
        Error::check_range(rows.start, rows.end, self.nrows)?;
        Error::check_range(cols.start, cols.end, self.ncols)?;

        let (nrows, ncols) = (rows.len(), cols.len());
        let data: Box<[T]> = rows
            .flat_map(|i| self.row(i)[cols.start..cols.end].iter().cloned())
            .collect();
        Ok(Self::from_parts(data, nrows, ncols))
    }

    /// Resize to `new_rows x new_cols`, keeping the overlapping region in place
    /// and filling new cells with `fill`.
    pub fn extend(&self, new_rows: usize, new_cols: usize, fill: T) -> Self {
        let mut out = Self::filled(new_rows, new_cols, fill);
        let rows = self.nrows.min(new_rows);
        let cols = self.ncols.min(new_cols);
        for i in 0..rows {
            out.row_mut(i)[..cols].clone_from_slice(&self.row(i)[..cols]);
        }
        out
    }

    /// Grow by `up`/`down`/`left`/`right` cells in each direction, filling the new
    /// border with `fill`.
    pub fn extend_directional(
        &self,
        up: usize,
        down: usize,
        left: usize,
        right: usize,
        fill: T,
    ) -> Self {
        let new_rows = up + self.nrows + down;
        let new_cols = left + self.ncols + right;
        let mut out = Self::filled(new_rows, new_cols, fill);
        for i in 0..self.nrows {
            out.row_mut(up + i)[left..left + self.ncols].clone_from_slice(self.row(i));
        }
        out
    }

    //////////////////////////////
    // Reorderings and rotations //
    //////////////////////////////

    /// Reverse every row in place (mirror around the vertical axis).
    pub fn reverse_h(&mut self) {
        for row in self.row_iter_mut() {
            row.reverse();
        }
    }

    /// Reverse every column in place (mirror around the horizontal axis).
    pub fn reverse_v(&mut self) {
        if self.nrows < 2 {
            return;
        }
        let ncols = self.ncols;
        let (mut low, mut high) = (0, self.nrows - 1);
        while low < high {
            let (head, tail) = self.data.split_at_mut(high * ncols);
            head[low * ncols..(low + 1) * ncols].swap_with_slice(&mut tail[..ncols]);
            low += 1;
            high -= 1;
        }
    }

    /// A horizontally mirrored copy.
    pub fn flip_h(&self) -> Self {
        let mut out = self.copy();
        out.reverse_h();
        out
    }

    /// A vertically mirrored copy.
    pub fn flip_v(&self) -> Self {
        let mut out = self.copy();
        out.reverse_v();
        out
    }

    /// Rotate clockwise by 90 degrees into a new `ncols x nrows` matrix.
    pub fn rotate90(&self) -> Self {
        let (m, n) = (self.nrows, self.ncols);
        let mut out = Self::filled(n, m, T::DEFAULT);
        for i in 0..n {
            let dst = out.row_mut(i);
            for (j, cell) in dst.iter_mut().enumerate() {
                *cell = self.data[(m - 1 - j) * n + i].clone();
            }
        }
        out
    }

    /// Rotate by 180 degrees into a new matrix of the same shape.
    pub fn rotate180(&self) -> Self {
        let data: Box<[T]> = self.data.iter().rev().cloned().collect();
        Self::from_parts(data, self.nrows, self.ncols)
    }

    /// Rotate clockwise by 270 degrees into a new `ncols x nrows` matrix.
    pub fn rotate270(&self) -> Self {
        let (m, n) = (self.nrows, self.ncols);
        let mut out = Self::filled(n, m, T::DEFAULT);
        for i in 0..n {
            let dst = out.row_mut(i);
            for (j, cell) in dst.iter_mut().enumerate() {
                *cell = self.data[j * n + (n - 1 - i)].clone();
            }
        }
        out
    }

    /// The transpose: a new `ncols x nrows` matrix with `out[j][i] = self[i][j]`.
    pub fn transpose(&self) -> Self {
        let (m, n) = (self.nrows, self.ncols);
        let mut out = Self::filled(n, m, T::DEFAULT);
        for i in 0..n {
            let dst = out.row_mut(i);
            for (j, cell) in dst.iter_mut().enumerate() {
                *cell = self.data[j * n + i].clone();
            }
        }
        out
    }

    /////////////
    // Reshape //
    /////////////

    /// Reinterpret the flattened element sequence with `new_cols` columns; the row
    /// count becomes `ceil(count / new_cols)`.
    pub fn reshape(&self, new_cols: usize) -> Result<Self> {
        if new_cols == 0 {
            return Err(Error::BadReshape);
        }
        let new_rows = self.count.div_ceil(new_cols as u64) as usize;
        Ok(self.reshape_to(new_rows, new_cols))
    }

    /// Reinterpret the flattened element sequence as `new_rows x new_cols`.
    ///
    /// If the new shape has more cells than the source, the extra cells take the
    /// element kind's default value; excess source cells are dropped.
    pub fn reshape_to(&self, new_rows: usize, new_cols: usize) -> Self {
        let mut out = Self::filled(new_rows, new_cols, T::DEFAULT);
        let take = self.data.len().min(out.data.len());
        out.data[..take].clone_from_slice(&self.data[..take]);
        out
    }

    /// Repeat each cell as a `row_repeats x col_repeats` block. Both factors must
    /// be at least 1.
    pub fn repelem(&self, row_repeats: usize, col_repeats: usize) -> Result<Self> {
        if row_repeats == 0 || col_repeats == 0 {
            return Err(Error::BadRepeat {
                row_repeats,
                col_repeats,
            });
        }

        let mut out = Self::filled(
            self.nrows * row_repeats,
            self.ncols * col_repeats,
            T::DEFAULT,
        );
        for i in 0..out.nrows {
            let src = self.row(i / row_repeats);
            let dst = out.row_mut(i);
            for (j, cell) in dst.iter_mut().enumerate() {
                *cell = src[j / col_repeats].clone();
            }
        }
        Ok(out)
    }

    /// Tile the whole matrix `row_repeats` times vertically and `col_repeats`
    /// times horizontally. Both factors must be at least 1.
    pub fn repmat(&self, row_repeats: usize, col_repeats: usize) -> Result<Self> {
        if row_repeats == 0 || col_repeats == 0 {
            return Err(Error::BadRepeat {
                row_repeats,
                col_repeats,
            });
        }

        let mut out = Self::filled(
            self.nrows * row_repeats,
            self.ncols * col_repeats,
            T::DEFAULT,
        );
        if !self.is_empty() {
            for i in 0..out.nrows {
                let src = self.row(i % self.nrows);
                for rep in 0..col_repeats {
                    out.row_mut(i)[rep * self.ncols..(rep + 1) * self.ncols]
                        .clone_from_slice(src);
                }
            }
        }
        Ok(out)
    }

    /// The elements in row-major order.
    pub fn flatten(&self) -> Vec<T> {
        self.data.to_vec()
    }

    /// Hand the flattened row-major view to `op`, whose writes land directly in
    /// the matrix. Not invoked at all when the matrix is empty.
    pub fn flat_op<F>(&mut self, op: F)
    where
        F: FnOnce(&mut [T]),
    {
        if self.is_empty() {
            return;
        }
        op(&mut self.data);
    }

    //////////////
    // Stacking //
    //////////////

    /// Stack `other` below this matrix; column counts must match.
    pub fn vstack(&self, other: &Self) -> Result<Self> {
        if self.ncols != other.ncols {
            return Err(Error::ShapeMismatch {
                left_rows: self.nrows,
                left_cols: self.ncols,
                right_rows: other.nrows,
                right_cols: other.ncols,
            });
        }
        let data: Box<[T]> = self
            .data
            .iter()
            .chain(other.data.iter())
            .cloned()
            .collect();
        Ok(Self::from_parts(data, self.nrows + other.nrows, self.ncols))
    }

    /// Stack `other` to the right of this matrix; row counts must match.
    pub fn hstack(&self, other: &Self) -> Result<Self> {
        if self.nrows != other.nrows {
            return Err(Error::ShapeMismatch {
                left_rows: self.nrows,
                left_cols: self.ncols,
                right_rows: other.nrows,
                right_cols: other.ncols,
            });
        }
        let ncols = self.ncols + other.ncols;
        let mut out = Self::filled(self.nrows, ncols, T::DEFAULT);
        for i in 0..self.nrows {
            let dst = out.row_mut(i);
            dst[..self.ncols].clone_from_slice(self.row(i));
            dst[self.ncols..].clone_from_slice(other.row(i));
        }
        Ok(out)
    }

    ///////////////
    // Iteration //
    ///////////////

    /// Invoke `action` once per `(row, col)`, through the dispatcher.
    ///
    /// Row-major when sequential; unordered (but exactly-once) when the
    /// dispatcher picks the parallel path.
    pub fn for_each<F>(&self, action: F)
    where
        F: Fn(usize, usize) + Sync,
    {
        let parallel = dispatch::is_parallelable(self.count);
        dispatch::run(0..self.nrows, 0..self.ncols, action, parallel);
    }

    /// Region-restricted [`Matrix::for_each`]; ranges are half-open.
    pub fn for_each_region<F>(&self, rows: Range<usize>, cols: Range<usize>, action: F) -> Result<()>
    where
        F: Fn(usize, usize) + Sync,
    {
        Error::check_range(rows.start, rows.end, self.nrows)?;
        Error::check_range(cols.start, cols.end, self.ncols)?;

        let op_count = rows.len() as u64 * cols.len() as u64;
        let parallel = dispatch::is_parallelable(op_count);
        dispatch::run(rows, cols, action, parallel);
        Ok(())
    }

    /////////////////
    // Combination //
    /////////////////

    /// Elementwise combination with one other same-shaped matrix.
    pub fn zip_with<U, F>(&self, other: &Self, f: F) -> Result<Matrix<U>>
    where
        U: Element,
        F: Fn(&T, &T) -> U + Sync,
    {
        dispatch::zip(self, other, f)
    }

    /// Elementwise combination with two other same-shaped matrices.
    pub fn zip_with3<U, F>(&self, b: &Self, c: &Self, f: F) -> Result<Matrix<U>>
    where
        U: Element,
        F: Fn(&T, &T, &T) -> U + Sync,
    {
        dispatch::zip3(self, b, c, f)
    }

    /////////////////
    // Conversions //
    /////////////////

    /// The boxed view of this matrix: every cell becomes `Some(cell)`.
    pub fn boxed(&self) -> Matrix<Option<T>> {
        self.map_to(|cell| Some(cell.clone()))
    }

    /// Convert to a wider element kind.
    pub fn convert<U>(&self) -> Matrix<U>
    where
        U: Element + From<T>,
    {
        self.map_to(|cell| U::from(cell.clone()))
    }
}

/// Extra behavior of the boxed/generic form.
impl<T: Element> Matrix<Option<T>> {
    /// Unbox into the underlying kind, mapping absent cells to the kind's
    /// default value.
    pub fn unbox(&self) -> Matrix<T> {
        self.map_to(|cell| cell.clone().unwrap_or(T::DEFAULT))
    }
}

////////////////
// Arithmetic //
////////////////

impl<T: Numeric> Matrix<T> {
    /// Elementwise sum; shapes must match.
    pub fn add(&self, other: &Self) -> Result<Self> {
        dispatch::zip(self, other, |x, y| *x + *y)
    }

    /// Elementwise difference; shapes must match.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        dispatch::zip(self, other, |x, y| *x - *y)
    }

    /// Matrix product; `self.ncols()` must equal `other.nrows()`.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        dispatch::multiply(self, other)
    }

    /// A `1 x n` matrix holding `start, start + 1, ...` up to but excluding `end`.
    pub fn range(start: T, end: T) -> Self {
        Self::range_step(start, end, T::one())
    }

    /// A `1 x n` matrix stepping from `start` towards `end` (exclusive) by `step`.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn range_step(start: T, end: T, step: T) -> Self {
        assert!(step != T::zero(), "range step must not be zero");
        let mut values = Vec::new();
        let mut x = start;
        if step > T::zero() {
            while x < end {
                values.push(x);
                x += step;
            }
        } else {
            while x > end {
                values.push(x);
                x += step;
            }
        }
        let len = values.len();
        Self::from_parts(values.into_boxed_slice(), 1, len)
    }

    /// Like [`Matrix::range`], but `end` is included.
    pub fn range_closed(start: T, end: T) -> Self {
        Self::range_closed_step(start, end, T::one())
    }

    /// Like [`Matrix::range_step`], but `end` is included.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero.
    pub fn range_closed_step(start: T, end: T, step: T) -> Self {
        assert!(step != T::zero(), "range step must not be zero");
        let mut values = Vec::new();
        let mut x = start;
        if step > T::zero() {
            while x <= end {
                values.push(x);
                x += step;
            }
        } else {
            while x >= end {
                values.push(x);
                x += step;
            }
        }
        let len = values.len();
        Self::from_parts(values.into_boxed_slice(), 1, len)
    }
}

///////////////
// Factories //
///////////////

impl<T: Element> Matrix<T>
where
    StandardUniform: Distribution<T>,
{
    /// A `1 x len` matrix of uniformly random values.
    pub fn random(len: usize) -> Self {
        let mut rng = rand::rng();
        let data: Box<[T]> = (0..len).map(|_| rng.random()).collect();
        Self::from_parts(data, 1, len)
    }
}

impl<T: Element> Matrix<T> {
    /// A square matrix with `diagonal` on the main diagonal and defaults
    /// elsewhere.
    pub fn diagonal_lu2rd(diagonal: &[T]) -> Self {
        let len = diagonal.len();
        let mut out = Self::filled(len, len, T::DEFAULT);
        for (i, value) in diagonal.iter().enumerate() {
            out.data[i * len + i] = value.clone();
        }
        out
    }

    /// A square matrix with `diagonal` on the anti diagonal and defaults
    /// elsewhere.
    pub fn diagonal_ru2ld(diagonal: &[T]) -> Self {
        let len = diagonal.len();
        let mut out = Self::filled(len, len, T::DEFAULT);
        for (i, value) in diagonal.iter().enumerate() {
            out.data[i * len + (len - 1 - i)] = value.clone();
        }
        out
    }

    /// A square matrix with both diagonals populated.
    ///
    /// Either vector may be absent (or empty); both absent yields the empty
    /// matrix. Present vectors must have equal lengths. Where the diagonals cross
    /// (the center cell of an odd-sized matrix), the main diagonal wins.
    pub fn diagonal(main: Option<&[T]>, anti: Option<&[T]>) -> Result<Self> {
        let main = main.filter(|v| !v.is_empty());
        let anti = anti.filter(|v| !v.is_empty());

        let len = match (main, anti) {
            (None, None) => return Ok(Self::empty()),
            (Some(m), Some(a)) if m.len() != a.len() => {
                return Err(Error::DiagonalLength {
                    main: m.len(),
                    anti: a.len(),
                });
            }
            (Some(m), _) => m.len(),
            (None, Some(a)) => a.len(),
        };

        let mut out = Self::filled(len, len, T::DEFAULT);
        if let Some(a) = anti {
            for (i, value) in a.iter().enumerate() {
                out.data[i * len + (len - 1 - i)] = value.clone();
            }
        }
        if let Some(m) = main {
            for (i, value) in m.iter().enumerate() {
                out.data[i * len + i] = value.clone();
            }
        }
        Ok(out)
    }
}

//////////////
// Indexing //
//////////////

/// Return a reference to the cell at `(row, col)`.
///
/// # Panics
///
/// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
impl<T: Element> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &Self::Output {
        assert!(
            row < self.nrows,
            "row {row} is out of bounds (max: {})",
            self.nrows
        );
        assert!(
            col < self.ncols,
            "col {col} is out of bounds (max: {})",
            self.ncols
        );
        &self.data[row * self.ncols + col]
    }
}

/// Return a mutable reference to the cell at `(row, col)`.
///
/// # Panics
///
/// Panics if `row >= self.nrows()` or `col >= self.ncols()`.
impl<T: Element> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut Self::Output {
        assert!(
            row < self.nrows,
            "row {row} is out of bounds (max: {})",
            self.nrows
        );
        assert!(
            col < self.ncols,
            "col {col} is out of bounds (max: {})",
            self.ncols
        );
        &mut self.data[row * self.ncols + col]
    }
}

/// Diagnostic rendering: `[]` for an empty matrix, one bracketed row per line
/// otherwise. Absent cells of the boxed form render as `null`.
impl<T: Element + DisplayCell> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[]");
        }
        write!(f, "[")?;
        for i in 0..self.nrows {
            if i > 0 {
                write!(f, ",\n ")?;
            }
            write!(f, "[")?;
            for (j, cell) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                cell.fmt_cell(f)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
