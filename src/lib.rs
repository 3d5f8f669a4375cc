/*
 * Copyright (c) Microsoft Corporation.
 * Licensed under the MIT license.
 */

//! Dense row-major matrices with sequential/parallel-adaptive bulk operations.
//!
//! The center of the crate is [`Matrix<T>`], a dense 2-dimensional matrix over a
//! single flat allocation. Bulk operations (elementwise transforms, N-ary zip,
//! multiplication) route through [`dispatch`], which picks a sequential or
//! rayon-parallel execution path from the operation's element count and a
//! thread-scoped override.
//!
//! ```
//! use rowmajor::{IntMatrix, Matrix};
//!
//! let a = IntMatrix::from_rows(vec![vec![1, 2], vec![3, 4]])?;
//! let b = IntMatrix::from_rows(vec![vec![5, 6], vec![7, 8]])?;
//! assert_eq!(a.multiply(&b)?, Matrix::from_rows(vec![vec![19, 22], vec![43, 50]])?);
//! # Ok::<(), rowmajor::Error>(())
//! ```

pub mod dispatch;
pub mod element;
pub mod error;
pub mod iter;
pub mod matrix;
pub mod nested;
pub mod table;

pub use dispatch::{ParallelEnabled, MIN_COUNT_FOR_PARALLEL};
pub use element::{DisplayCell, Element, Numeric};
pub use error::{Error, Result};
pub use iter::Point;
pub use matrix::Matrix;
pub use table::Table;

// One alias per supported element kind.
pub type BooleanMatrix = Matrix<bool>;
pub type CharMatrix = Matrix<char>;
pub type ByteMatrix = Matrix<i8>;
pub type ShortMatrix = Matrix<i16>;
pub type IntMatrix = Matrix<i32>;
pub type LongMatrix = Matrix<i64>;
pub type FloatMatrix = Matrix<f32>;
pub type DoubleMatrix = Matrix<f64>;

/// The boxed form: every cell may be absent, and [`Matrix::unbox`] maps absent
/// cells to the element kind's default.
pub type BoxedMatrix<T> = Matrix<Option<T>>;
