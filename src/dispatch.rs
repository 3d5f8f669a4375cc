/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! The dispatch orchestrator: decides whether a bulk operation runs sequentially or
//! across rayon workers, and implements the cross-matrix operations (N-ary zip and
//! multiplication) that do not belong to any single matrix.
//!
//! Parallel work is always partitioned into disjoint row chunks, so concurrent
//! writes to the same cell cannot occur. The sequential path visits cells in
//! row-major order; the parallel path guarantees only that every index is visited
//! exactly once.

use std::cell::Cell;
use std::ops::Range;

use rayon::prelude::*;
use tracing::trace;

use crate::element::{Element, Numeric};
use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// In [`ParallelEnabled::Automatic`] mode, operations touching more cells than this
/// fan out to the rayon pool.
pub const MIN_COUNT_FOR_PARALLEL: u64 = 8192;

/// Thread-scoped override for the sequential-vs-parallel decision.
///
/// The setting applies to all subsequent bulk operations on the current thread
/// until changed again; callers that need determinism across calls should read and
/// restore it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParallelEnabled {
    /// Fan out regardless of operation size.
    Always,
    /// Stay on the calling thread regardless of operation size.
    Never,
    /// Decide by operation size against [`MIN_COUNT_FOR_PARALLEL`].
    #[default]
    Automatic,
}

thread_local! {
    static PARALLEL_ENABLED: Cell<ParallelEnabled> =
        const { Cell::new(ParallelEnabled::Automatic) };
}

/// Set the parallel override for the current thread.
pub fn set_parallel_enabled(flag: ParallelEnabled) {
    PARALLEL_ENABLED.with(|cell| cell.set(flag));
}

/// Read the current thread's parallel override.
pub fn get_parallel_enabled() -> ParallelEnabled {
    PARALLEL_ENABLED.with(|cell| cell.get())
}

/// Decide whether an operation over `count` cells should run in parallel, using the
/// current thread's override.
pub fn is_parallelable(count: u64) -> bool {
    is_parallelable_with(get_parallel_enabled(), count)
}

/// Like [`is_parallelable`], but for operations whose per-cell cost is `factor`
/// times a plain visit (multiply uses the right-hand column count here).
pub fn is_parallelable_scaled(count: u64, factor: u64) -> bool {
    is_parallelable_with(get_parallel_enabled(), count.saturating_mul(factor))
}

/// The policy decision itself, free of ambient state. Callers who thread an
/// explicit policy through their code use this and pass the answer down.
pub fn is_parallelable_with(policy: ParallelEnabled, count: u64) -> bool {
    match policy {
        ParallelEnabled::Always => true,
        ParallelEnabled::Never => false,
        ParallelEnabled::Automatic => count > MIN_COUNT_FOR_PARALLEL,
    }
}

/// Execute `action` for every `(row, col)` in the 2D index space.
///
/// Sequential execution is row-major. Parallel execution fans out one task per row
/// and blocks until all rows complete; cross-row ordering is unspecified.
pub fn run<F>(rows: Range<usize>, cols: Range<usize>, action: F, parallel: bool)
where
    F: Fn(usize, usize) + Sync,
{
    trace!(
        rows = rows.len(),
        cols = cols.len(),
        parallel,
        "dispatching 2d iteration"
    );

    if parallel {
        rows.into_par_iter().for_each(|i| {
            for j in cols.clone() {
                action(i, j);
            }
        });
    } else {
        for i in rows {
            for j in cols.clone() {
                action(i, j);
            }
        }
    }
}

/// Fallible variant of [`run`]: the first error raised inside any row surfaces to
/// the caller once every row has settled. Work already performed by other rows is
/// not rolled back.
pub fn try_run<F, E>(
    rows: Range<usize>,
    cols: Range<usize>,
    action: F,
    parallel: bool,
) -> std::result::Result<(), E>
where
    F: Fn(usize, usize) -> std::result::Result<(), E> + Sync,
    E: Send,
{
    let per_row = |i: usize| -> std::result::Result<(), E> {
        for j in cols.clone() {
            action(i, j)?;
        }
        Ok(())
    };

    if parallel {
        rows.into_par_iter()
            .map(per_row)
            .reduce(|| Ok(()), |acc, next| acc.and(next))
    } else {
        for i in rows {
            per_row(i)?;
        }
        Ok(())
    }
}

/// Allocate an `nrows x ncols` matrix and let `fill` populate each row, in
/// parallel over disjoint row slices when requested.
///
/// This is the write side of the orchestrator: safe Rust cannot hand a shared
/// writing closure to multiple workers, so producers get exclusive row slices
/// instead of `(i, j)` indices.
pub(crate) fn fill_rows<U, F>(nrows: usize, ncols: usize, parallel: bool, fill: F) -> Matrix<U>
where
    U: Element,
    F: Fn(usize, &mut [U]) + Sync,
{
    let mut data = vec![U::DEFAULT; nrows * ncols].into_boxed_slice();

    if ncols > 0 {
        if parallel {
            data.par_chunks_exact_mut(ncols)
                .enumerate()
                .for_each(|(i, row)| fill(i, row));
        } else {
            data.chunks_exact_mut(ncols)
                .enumerate()
                .for_each(|(i, row)| fill(i, row));
        }
    }

    Matrix::from_parts(data, nrows, ncols)
}

fn check_same_shape<T: Element>(a: &Matrix<T>, b: &Matrix<T>) -> Result<()> {
    if a.is_same_shape(b) {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            left_rows: a.nrows(),
            left_cols: a.ncols(),
            right_rows: b.nrows(),
            right_cols: b.ncols(),
        })
    }
}

/// Elementwise combination of two same-shaped matrices.
///
/// The output element kind is whatever the combiner returns, so this one signature
/// covers both the kind-preserving and the kind-changing (`zipToInt`-style) forms
/// without boxing.
pub fn zip<T, U, F>(a: &Matrix<T>, b: &Matrix<T>, f: F) -> Result<Matrix<U>>
where
    T: Element,
    U: Element,
    F: Fn(&T, &T) -> U + Sync,
{
    check_same_shape(a, b)?;

    let parallel = is_parallelable(a.count());
    Ok(fill_rows(a.nrows(), a.ncols(), parallel, |i, out| {
        let (ra, rb) = (a.row(i), b.row(i));
        for (j, cell) in out.iter_mut().enumerate() {
            *cell = f(&ra[j], &rb[j]);
        }
    }))
}

/// Elementwise combination of three same-shaped matrices.
pub fn zip3<T, U, F>(a: &Matrix<T>, b: &Matrix<T>, c: &Matrix<T>, f: F) -> Result<Matrix<U>>
where
    T: Element,
    U: Element,
    F: Fn(&T, &T, &T) -> U + Sync,
{
    check_same_shape(a, b)?;
    check_same_shape(a, c)?;

    let parallel = is_parallelable(a.count());
    Ok(fill_rows(a.nrows(), a.ncols(), parallel, |i, out| {
        let (ra, rb, rc) = (a.row(i), b.row(i), c.row(i));
        for (j, cell) in out.iter_mut().enumerate() {
            *cell = f(&ra[j], &rb[j], &rc[j]);
        }
    }))
}

/// Elementwise combination of four same-shaped matrices.
pub fn zip4<T, U, F>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    c: &Matrix<T>,
    d: &Matrix<T>,
    f: F,
) -> Result<Matrix<U>>
where
    T: Element,
    U: Element,
    F: Fn(&T, &T, &T, &T) -> U + Sync,
{
    check_same_shape(a, b)?;
    check_same_shape(a, c)?;
    check_same_shape(a, d)?;

    let parallel = is_parallelable(a.count());
    Ok(fill_rows(a.nrows(), a.ncols(), parallel, |i, out| {
        let (ra, rb, rc, rd) = (a.row(i), b.row(i), c.row(i), d.row(i));
        for (j, cell) in out.iter_mut().enumerate() {
            *cell = f(&ra[j], &rb[j], &rc[j], &rd[j]);
        }
    }))
}

/// General N-ary zip: each output cell is `f` applied to the slice of values
/// extracted from the corresponding cell of every input.
///
/// All inputs must share one shape; an empty input list is an error.
pub fn zip_n<T, U, F>(matrices: &[&Matrix<T>], f: F) -> Result<Matrix<U>>
where
    T: Element,
    U: Element,
    F: Fn(&[T]) -> U + Sync,
{
    let first = *matrices.first().ok_or(Error::EmptyInput)?;
    for other in &matrices[1..] {
        check_same_shape(first, other)?;
    }

    let parallel = is_parallelable(first.count());
    Ok(fill_rows(first.nrows(), first.ncols(), parallel, |i, out| {
        let rows: Vec<&[T]> = matrices.iter().map(|m| m.row(i)).collect();
        let mut scratch: Vec<T> = Vec::with_capacity(rows.len());

        for (j, cell) in out.iter_mut().enumerate() {
            scratch.clear();
            scratch.extend(rows.iter().map(|r| r[j].clone()));
            *cell = f(&scratch);
        }
    }))
}

/// Dense matrix multiplication: `result[i][j] = sum_k a[i][k] * b[k][j]`.
///
/// Requires `a.ncols() == b.nrows()`. Parallel execution partitions the result by
/// output rows; both paths perform the same additions in the same order, so the
/// results are bit-identical.
pub fn multiply<T: Numeric>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    if a.ncols() != b.nrows() {
        return Err(Error::InnerDimension {
            left_cols: a.ncols(),
            right_rows: b.nrows(),
        });
    }

    let parallel = is_parallelable_scaled(a.count(), b.ncols() as u64);
    trace!(
        m = a.nrows(),
        k = a.ncols(),
        n = b.ncols(),
        parallel,
        "dispatching multiply"
    );

    // i-k-j order: the inner loop walks a row of `b` and a row of the result, both
    // contiguous in row-major storage.
    Ok(fill_rows(a.nrows(), b.ncols(), parallel, |i, out| {
        for (k, &aik) in a.row(i).iter().enumerate() {
            let rb = b.row(k);
            for (j, cell) in out.iter_mut().enumerate() {
                *cell += aik * rb[j];
            }
        }
    }))
}
