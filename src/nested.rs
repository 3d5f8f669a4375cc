/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Helpers over raw nested arrays (`&[Vec<T>]`), independent of the matrix type.
//!
//! These tolerate ragged input, and their reshape/zip semantics deliberately
//! differ from the matrix ones: [`reshape`] leaves a short last row instead of
//! padding, and [`zip_padded`] substitutes defaults for missing cells instead of
//! demanding equal shapes.

use crate::error::{Error, Result};

/// Total number of elements across all sub-arrays, widened to 64 bits.
pub fn total_count_of_elements<T>(arrays: &[Vec<T>]) -> u64 {
    arrays.iter().map(|a| a.len() as u64).sum()
}

/// Length of the shortest sub-array, or `None` when there are none.
pub fn min_sub_array_len<T>(arrays: &[Vec<T>]) -> Option<usize> {
    arrays.iter().map(Vec::len).min()
}

/// Length of the longest sub-array, or `None` when there are none.
pub fn max_sub_array_len<T>(arrays: &[Vec<T>]) -> Option<usize> {
    arrays.iter().map(Vec::len).max()
}

/// Concatenate all sub-arrays in order.
pub fn flatten<T: Clone>(arrays: &[Vec<T>]) -> Vec<T> {
    arrays.iter().flatten().cloned().collect()
}

/// Split a flat sequence into rows of `cols` elements.
///
/// The last row keeps whatever remains and may be shorter; nothing is padded.
/// `cols` must be at least 1.
pub fn reshape<T: Clone>(flat: &[T], cols: usize) -> Result<Vec<Vec<T>>> {
    if cols == 0 {
        return Err(Error::BadReshape);
    }
    Ok(flat.chunks(cols).map(<[T]>::to_vec).collect())
}

/// Flatten the nested arrays, hand the flat buffer to `op`, and copy the result
/// back row by row. Not invoked at all when there are no elements.
pub fn flat_op<T, F>(arrays: &mut [Vec<T>], op: F)
where
    T: Clone,
    F: FnOnce(&mut [T]),
{
    if total_count_of_elements(arrays) == 0 {
        return;
    }

    let mut flat = flatten(arrays);
    op(&mut flat);

    let mut offset = 0;
    for row in arrays.iter_mut() {
        let len = row.len();
        row.clone_from_slice(&flat[offset..offset + len]);
        offset += len;
    }
}

/// Apply `f` to every element, preserving the (possibly ragged) structure.
pub fn map_to<T, U, F>(arrays: &[Vec<T>], mut f: F) -> Vec<Vec<U>>
where
    F: FnMut(&T) -> U,
{
    arrays
        .iter()
        .map(|row| row.iter().map(&mut f).collect())
        .collect()
}

/// Combine two nested arrays elementwise, truncating to the shorter operand at
/// both nesting levels.
pub fn zip<A, B, U, F>(a: &[Vec<A>], b: &[Vec<B>], mut f: F) -> Vec<Vec<U>>
where
    F: FnMut(&A, &B) -> U,
{
    a.iter()
        .zip(b.iter())
        .map(|(ra, rb)| ra.iter().zip(rb.iter()).map(|(x, y)| f(x, y)).collect())
        .collect()
}

/// Combine two nested arrays elementwise, extending to the longer operand at
/// both nesting levels; missing cells are replaced by the operand's default.
pub fn zip_padded<A, B, U, F>(
    a: &[Vec<A>],
    b: &[Vec<B>],
    default_a: A,
    default_b: B,
    mut f: F,
) -> Vec<Vec<U>>
where
    A: Clone,
    B: Clone,
    F: FnMut(&A, &B) -> U,
{
    let empty_a: Vec<A> = Vec::new();
    let empty_b: Vec<B> = Vec::new();
    let rows = a.len().max(b.len());

    (0..rows)
        .map(|i| {
            let ra = a.get(i).unwrap_or(&empty_a);
            let rb = b.get(i).unwrap_or(&empty_b);
            let cols = ra.len().max(rb.len());
            (0..cols)
                .map(|j| {
                    let x = ra.get(j).unwrap_or(&default_a);
                    let y = rb.get(j).unwrap_or(&default_b);
                    f(x, y)
                })
                .collect()
        })
        .collect()
}

/// Ternary form of [`zip`]: truncates to the shortest operand at both levels.
pub fn zip3<A, B, C, U, F>(a: &[Vec<A>], b: &[Vec<B>], c: &[Vec<C>], mut f: F) -> Vec<Vec<U>>
where
    F: FnMut(&A, &B, &C) -> U,
{
    a.iter()
        .zip(b.iter())
        .zip(c.iter())
        .map(|((ra, rb), rc)| {
            ra.iter()
                .zip(rb.iter())
                .zip(rc.iter())
                .map(|((x, y), z)| f(x, y, z))
                .collect()
        })
        .collect()
}

/// Ternary form of [`zip_padded`]: extends to the longest operand at both levels.
pub fn zip3_padded<A, B, C, U, F>(
    a: &[Vec<A>],
    b: &[Vec<B>],
    c: &[Vec<C>],
    default_a: A,
    default_b: B,
    default_c: C,
    mut f: F,
) -> Vec<Vec<U>>
where
    A: Clone,
    B: Clone,
    C: Clone,
    F: FnMut(&A, &B, &C) -> U,
{
    let empty_a: Vec<A> = Vec::new();
    let empty_b: Vec<B> = Vec::new();
    let empty_c: Vec<C> = Vec::new();
    let rows = a.len().max(b.len()).max(c.len());

    (0..rows)
        .map(|i| {
            let ra = a.get(i).unwrap_or(&empty_a);
            let rb = b.get(i).unwrap_or(&empty_b);
            let rc = c.get(i).unwrap_or(&empty_c);
            let cols = ra.len().max(rb.len()).max(rc.len());
            (0..cols)
                .map(|j| {
                    let x = ra.get(j).unwrap_or(&default_a);
                    let y = rb.get(j).unwrap_or(&default_b);
                    let z = rc.get(j).unwrap_or(&default_c);
                    f(x, y, z)
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ragged() -> Vec<Vec<i32>> {
        vec![vec![1, 2, 3], vec![4], vec![], vec![5, 6]]
    }

    #[test]
    fn counting_and_extremes() {
        let a = ragged();
        assert_eq!(total_count_of_elements(&a), 6);
        assert_eq!(min_sub_array_len(&a), Some(0));
        assert_eq!(max_sub_array_len(&a), Some(3));

        let none: Vec<Vec<i32>> = vec![];
        assert_eq!(total_count_of_elements(&none), 0);
        assert_eq!(min_sub_array_len(&none), None);
        assert_eq!(max_sub_array_len(&none), None);
    }

    #[test]
    fn flatten_concatenates_in_order() {
        assert_eq!(flatten(&ragged()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn reshape_leaves_a_short_last_row() {
        let rows = reshape(&[1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!(rows, vec![vec![1, 2], vec![3, 4], vec![5]]);
        assert_eq!(reshape::<i32>(&[], 3).unwrap(), Vec::<Vec<i32>>::new());
        assert_eq!(reshape(&[1], 0), Err(Error::BadReshape));
    }

    #[test]
    fn flat_op_round_trips_through_the_flat_view() {
        let mut a = ragged();
        flat_op(&mut a, |flat| flat.reverse());
        assert_eq!(a, vec![vec![6, 5, 4], vec![3], vec![], vec![2, 1]]);

        let mut empty: Vec<Vec<i32>> = vec![vec![], vec![]];
        flat_op(&mut empty, |_| panic!("must not be invoked without elements"));
    }

    #[test]
    fn map_to_preserves_raggedness() {
        let doubled = map_to(&ragged(), |x| x * 2);
        assert_eq!(doubled, vec![vec![2, 4, 6], vec![8], vec![], vec![10, 12]]);
    }

    #[test]
    fn zip_truncates_to_the_shorter_operand() {
        let a = vec![vec![1, 2, 3], vec![4, 5]];
        let b = vec![vec![10, 20]];
        assert_eq!(zip(&a, &b, |x, y| x + y), vec![vec![11, 22]]);
    }

    #[test]
    fn zip_padded_extends_with_defaults() {
        let a = vec![vec![1, 2, 3], vec![4, 5]];
        let b = vec![vec![10, 20]];
        assert_eq!(
            zip_padded(&a, &b, 0, 100, |x, y| x + y),
            vec![vec![11, 22, 103], vec![104, 105]]
        );
    }

    #[test]
    fn ternary_zips() {
        let a = vec![vec![1, 2]];
        let b = vec![vec![10, 20], vec![30]];
        let c = vec![vec![100]];

        assert_eq!(zip3(&a, &b, &c, |x, y, z| x + y + z), vec![vec![111]]);
        assert_eq!(
            zip3_padded(&a, &b, &c, 0, 0, 0, |x, y, z| x + y + z),
            vec![vec![111, 22], vec![30]]
        );
    }
}
