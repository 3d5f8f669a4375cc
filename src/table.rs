/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Labeled tabular export of a matrix.

use crate::element::Element;
use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// A named-column table of cloned matrix values.
///
/// Produced by [`Matrix::to_table_h`] and [`Matrix::to_table_v`]; detached from
/// the source matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T: Element> {
    names: Vec<String>,
    columns: Vec<Vec<T>>,
}

impl<T: Element> Table<T> {
    /// The column labels, in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The columns, in label order.
    pub fn columns(&self) -> &[Vec<T>] {
        &self.columns
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of values per column.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Look a column up by its label.
    pub fn column(&self, name: &str) -> Option<&[T]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.columns[i].as_slice())
    }
}

impl<T: Element> Matrix<T> {
    /// Export with one table column per matrix column.
    ///
    /// `names` labels the matrix columns and must have exactly `ncols` entries.
    pub fn to_table_h<S: Into<String>>(&self, names: Vec<S>) -> Result<Table<T>> {
        if names.len() != self.ncols() {
            return Err(Error::LabelCount {
                labels: names.len(),
                expected: self.ncols(),
                axis: "columns",
            });
        }
        Ok(Table {
            names: names.into_iter().map(Into::into).collect(),
            columns: (0..self.ncols()).map(|j| self.column(j).into_vec()).collect(),
        })
    }

    /// Export with one table column per matrix row.
    ///
    /// `names` labels the matrix rows and must have exactly `nrows` entries.
    pub fn to_table_v<S: Into<String>>(&self, names: Vec<S>) -> Result<Table<T>> {
        if names.len() != self.nrows() {
            return Err(Error::LabelCount {
                labels: names.len(),
                expected: self.nrows(),
                axis: "rows",
            });
        }
        Ok(Table {
            names: names.into_iter().map(Into::into).collect(),
            columns: (0..self.nrows()).map(|i| self.row(i).to_vec()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m2x3() -> Matrix<i32> {
        Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap()
    }

    #[test]
    fn to_table_h_labels_the_columns() {
        let t = m2x3().to_table_h(vec!["a", "b", "c"]).unwrap();
        assert_eq!(t.names(), &["a", "b", "c"]);
        assert_eq!(t.width(), 3);
        assert_eq!(t.height(), 2);
        assert_eq!(t.column("b"), Some(&[2, 5][..]));
        assert_eq!(t.column("missing"), None);
    }

    #[test]
    fn to_table_v_labels_the_rows() {
        let t = m2x3().to_table_v(vec!["top", "bottom"]).unwrap();
        assert_eq!(t.width(), 2);
        assert_eq!(t.height(), 3);
        assert_eq!(t.column("bottom"), Some(&[4, 5, 6][..]));
    }

    #[test]
    fn label_counts_must_match_their_axis() {
        assert_eq!(
            m2x3().to_table_h(vec!["a", "b"]).unwrap_err(),
            Error::LabelCount {
                labels: 2,
                expected: 3,
                axis: "columns"
            }
        );
        assert_eq!(
            m2x3().to_table_v(vec!["a", "b", "c"]).unwrap_err(),
            Error::LabelCount {
                labels: 3,
                expected: 2,
                axis: "rows"
            }
        );
    }
}
