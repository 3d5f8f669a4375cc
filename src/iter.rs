/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Point and element streaming over a matrix.
//!
//! All iterators here are lazy and borrow the matrix; nothing is materialized.
//! Diagonal streams exist only for square matrices and report
//! [`Error::NotSquare`] otherwise.

use crate::element::Element;
use crate::error::Result;
use crate::matrix::Matrix;

/// A cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Point {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl<T: Element> Matrix<T> {
    /// All cell coordinates in row-major order.
    pub fn points_h(&self) -> impl Iterator<Item = Point> {
        let (m, n) = self.shape();
        (0..m).flat_map(move |i| (0..n).map(move |j| Point::new(i, j)))
    }

    /// All cell coordinates in column-major order.
    pub fn points_v(&self) -> impl Iterator<Item = Point> {
        let (m, n) = self.shape();
        (0..n).flat_map(move |j| (0..m).map(move |i| Point::new(i, j)))
    }

    /// One coordinate sub-iterator per row.
    pub fn points_r(&self) -> impl Iterator<Item = impl Iterator<Item = Point>> {
        let (m, n) = self.shape();
        (0..m).map(move |i| (0..n).map(move |j| Point::new(i, j)))
    }

    /// One coordinate sub-iterator per column.
    pub fn points_c(&self) -> impl Iterator<Item = impl Iterator<Item = Point>> {
        let (m, n) = self.shape();
        (0..n).map(move |j| (0..m).map(move |i| Point::new(i, j)))
    }

    /// Coordinates of the main diagonal. Square matrices only.
    pub fn points_lu2rd(&self) -> Result<impl Iterator<Item = Point>> {
        self.check_square()?;
        Ok((0..self.nrows()).map(|i| Point::new(i, i)))
    }

    /// Coordinates of the anti diagonal. Square matrices only.
    pub fn points_ru2ld(&self) -> Result<impl Iterator<Item = Point>> {
        self.check_square()?;
        let n = self.nrows();
        Ok((0..n).map(move |i| Point::new(i, n - 1 - i)))
    }

    /// The elements in row-major order.
    pub fn iter_h(&self) -> impl Iterator<Item = &T> {
        self.as_slice().iter()
    }

    /// The elements in column-major order.
    pub fn iter_v(&self) -> impl Iterator<Item = &T> {
        let (m, n) = self.shape();
        (0..n).flat_map(move |j| (0..m).map(move |i| &self[(i, j)]))
    }

    /// One element sub-iterator per row.
    pub fn iter_rows(&self) -> impl Iterator<Item = impl Iterator<Item = &T>> {
        self.row_iter().map(|row| row.iter())
    }

    /// One element sub-iterator per column.
    pub fn iter_cols(&self) -> impl Iterator<Item = impl Iterator<Item = &T>> {
        let (m, n) = self.shape();
        (0..n).map(move |j| (0..m).map(move |i| &self[(i, j)]))
    }

    /// The main diagonal's elements. Square matrices only.
    pub fn iter_lu2rd(&self) -> Result<impl Iterator<Item = &T>> {
        self.check_square()?;
        Ok((0..self.nrows()).map(move |i| &self[(i, i)]))
    }

    /// The anti diagonal's elements. Square matrices only.
    pub fn iter_ru2ld(&self) -> Result<impl Iterator<Item = &T>> {
        self.check_square()?;
        let n = self.nrows();
        Ok((0..n).map(move |i| &self[(i, n - 1 - i)]))
    }

    /// The in-bounds 4-neighborhood of `(row, col)`: up, right, down, left.
    pub fn adjacent4_points(&self, row: usize, col: usize) -> impl Iterator<Item = Point> {
        let (m, n) = self.shape();
        let up = row.checked_sub(1).map(|i| Point::new(i, col));
        let right = (col + 1 < n).then(|| Point::new(row, col + 1));
        let down = (row + 1 < m).then(|| Point::new(row + 1, col));
        let left = col.checked_sub(1).map(|j| Point::new(row, j));
        [up, right, down, left].into_iter().flatten()
    }

    /// The in-bounds 8-neighborhood of `(row, col)`: the 4-neighborhood followed
    /// by the diagonal neighbors (left-up, right-up, right-down, left-down).
    pub fn adjacent8_points(&self, row: usize, col: usize) -> impl Iterator<Item = Point> {
        let (m, n) = self.shape();
        let above = row.checked_sub(1);
        let below = (row + 1 < m).then_some(row + 1);
        let before = col.checked_sub(1);
        let after = (col + 1 < n).then_some(col + 1);

        let left_up = above.zip(before).map(|(i, j)| Point::new(i, j));
        let right_up = above.zip(after).map(|(i, j)| Point::new(i, j));
        let right_down = below.zip(after).map(|(i, j)| Point::new(i, j));
        let left_down = below.zip(before).map(|(i, j)| Point::new(i, j));

        self.adjacent4_points(row, col)
            .chain([left_up, right_up, right_down, left_down].into_iter().flatten())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;

    use super::*;

    fn m2x3() -> Matrix<i32> {
        Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap()
    }

    fn m3x3() -> Matrix<i32> {
        Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).unwrap()
    }

    fn pts(raw: &[(usize, usize)]) -> Vec<Point> {
        raw.iter().map(|&(i, j)| Point::new(i, j)).collect()
    }

    #[test]
    fn points_h_is_row_major() {
        let got: Vec<Point> = m2x3().points_h().collect();
        assert_eq!(
            got,
            pts(&[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)])
        );
    }

    #[test]
    fn points_v_is_column_major() {
        let got: Vec<Point> = m2x3().points_v().collect();
        assert_eq!(
            got,
            pts(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)])
        );
    }

    #[test]
    fn points_r_and_c_yield_one_stream_per_axis() {
        let m = m2x3();
        let rows: Vec<Vec<Point>> = m.points_r().map(|r| r.collect()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], pts(&[(1, 0), (1, 1), (1, 2)]));

        let cols: Vec<Vec<Point>> = m.points_c().map(|c| c.collect()).collect();
        assert_eq!(cols.len(), 3);
        assert_eq!(cols[2], pts(&[(0, 2), (1, 2)]));
    }

    #[test]
    fn diagonal_points_need_a_square_matrix() {
        let got: Vec<Point> = m3x3().points_lu2rd().unwrap().collect();
        assert_eq!(got, pts(&[(0, 0), (1, 1), (2, 2)]));

        let got: Vec<Point> = m3x3().points_ru2ld().unwrap().collect();
        assert_eq!(got, pts(&[(0, 2), (1, 1), (2, 0)]));

        assert!(matches!(
            m2x3().points_lu2rd().map(|_| ()),
            Err(Error::NotSquare { .. })
        ));
    }

    #[test]
    fn element_streams_follow_their_point_streams() {
        let m = m2x3();
        let h: Vec<i32> = m.iter_h().copied().collect();
        assert_eq!(h, vec![1, 2, 3, 4, 5, 6]);

        let v: Vec<i32> = m.iter_v().copied().collect();
        assert_eq!(v, vec![1, 4, 2, 5, 3, 6]);

        let rows: Vec<Vec<i32>> = m.iter_rows().map(|r| r.copied().collect()).collect();
        assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6]]);

        let cols: Vec<Vec<i32>> = m.iter_cols().map(|c| c.copied().collect()).collect();
        assert_eq!(cols, vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
    }

    #[test]
    fn diagonal_element_streams() {
        let m = m3x3();
        let main: Vec<i32> = m.iter_lu2rd().unwrap().copied().collect();
        assert_eq!(main, vec![1, 5, 9]);
        let anti: Vec<i32> = m.iter_ru2ld().unwrap().copied().collect();
        assert_eq!(anti, vec![3, 5, 7]);
        assert!(m2x3().iter_lu2rd().map(|_| ()).is_err());
    }

    #[test]
    fn adjacent4_skips_out_of_bounds_neighbors() {
        let m = m3x3();
        let center: Vec<Point> = m.adjacent4_points(1, 1).collect();
        assert_eq!(center, pts(&[(0, 1), (1, 2), (2, 1), (1, 0)]));

        let corner: Vec<Point> = m.adjacent4_points(0, 0).collect();
        assert_eq!(corner, pts(&[(0, 1), (1, 0)]));
    }

    #[test]
    fn adjacent8_appends_the_diagonal_neighbors() {
        let m = m3x3();
        let center: Vec<Point> = m.adjacent8_points(1, 1).collect();
        assert_eq!(
            center,
            pts(&[
                (0, 1),
                (1, 2),
                (2, 1),
                (1, 0),
                (0, 0),
                (0, 2),
                (2, 2),
                (2, 0)
            ])
        );

        let corner: Vec<Point> = m.adjacent8_points(2, 2).collect();
        assert_eq!(corner, pts(&[(1, 2), (2, 1), (1, 1)]));
    }

    #[test]
    fn streams_over_the_empty_matrix_are_empty() {
        let m = Matrix::<i32>::empty();
        assert_eq!(m.points_h().count(), 0);
        assert_eq!(m.iter_v().count(), 0);
        assert_eq!(m.points_lu2rd().unwrap().count(), 0);
    }
}
