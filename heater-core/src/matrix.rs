//! A dense matrix with labeled rows and columns.

use std::collections::HashMap;

use ndarray::{Array2, Axis};
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum MatrixError {
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("missing row: {0}")]
    MissingRow(String),
    #[error("missing column: {0}")]
    MissingColumn(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    row_names: Vec<String>,
    column_names: Vec<String>,
    data: Array2<T>,
}

impl<T> Matrix<T> {
    pub fn new(
        row_names: Vec<String>,
        column_names: Vec<String>,
        data: Array2<T>,
    ) -> Result<Self, MatrixError> {
        let expected = (row_names.len(), column_names.len());
        let actual = data.dim();

        if actual != expected {
            return Err(MatrixError::ShapeMismatch { expected, actual });
        }

        Ok(Self {
            row_names,
            column_names,
            data,
        })
    }

    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn get(&self, row_name: &str, column_name: &str) -> Option<&T> {
        let i = self.row_names.iter().position(|name| name == row_name)?;
        let j = self.column_names.iter().position(|name| name == column_name)?;
        self.data.get((i, j))
    }

    /// Swaps rows and columns, labels included.
    pub fn transpose(self) -> Self {
        Self {
            row_names: self.column_names,
            column_names: self.row_names,
            data: self.data.reversed_axes(),
        }
    }

    pub fn map<U, F>(&self, f: F) -> Matrix<U>
    where
        F: FnMut(&T) -> U,
    {
        Matrix {
            row_names: self.row_names.clone(),
            column_names: self.column_names.clone(),
            data: self.data.map(f),
        }
    }
}

impl<T> Matrix<T>
where
    T: Clone,
{
    /// Builds a new matrix with rows taken in the order of `names`.
    pub fn select_rows<S>(&self, names: &[S]) -> Result<Self, MatrixError>
    where
        S: AsRef<str>,
    {
        let indices = find_indices(&self.row_names, names).map_err(MatrixError::MissingRow)?;

        Ok(Self {
            row_names: names.iter().map(|name| name.as_ref().into()).collect(),
            column_names: self.column_names.clone(),
            data: self.data.select(Axis(0), &indices),
        })
    }

    /// Builds a new matrix with columns taken in the order of `names`.
    pub fn select_columns<S>(&self, names: &[S]) -> Result<Self, MatrixError>
    where
        S: AsRef<str>,
    {
        let indices =
            find_indices(&self.column_names, names).map_err(MatrixError::MissingColumn)?;

        Ok(Self {
            row_names: self.row_names.clone(),
            column_names: names.iter().map(|name| name.as_ref().into()).collect(),
            data: self.data.select(Axis(1), &indices),
        })
    }
}

fn find_indices<S>(haystack: &[String], needles: &[S]) -> Result<Vec<usize>, String>
where
    S: AsRef<str>,
{
    let positions: HashMap<&str, usize> = haystack
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    needles
        .iter()
        .map(|needle| {
            let needle = needle.as_ref();
            positions.get(needle).copied().ok_or_else(|| needle.into())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn build_matrix() -> Result<Matrix<u32>, MatrixError> {
        Matrix::new(
            vec![String::from("r0"), String::from("r1")],
            vec![String::from("c0"), String::from("c1"), String::from("c2")],
            array![[0, 1, 2], [3, 4, 5]],
        )
    }

    #[test]
    fn test_new() {
        assert_eq!(
            Matrix::new(vec![String::from("r0")], Vec::new(), array![[8]]),
            Err(MatrixError::ShapeMismatch {
                expected: (1, 0),
                actual: (1, 1)
            })
        );
    }

    #[test]
    fn test_get() -> Result<(), MatrixError> {
        let matrix = build_matrix()?;
        assert_eq!(matrix.get("r1", "c0"), Some(&3));
        assert_eq!(matrix.get("r2", "c0"), None);
        Ok(())
    }

    #[test]
    fn test_transpose() -> Result<(), MatrixError> {
        let matrix = build_matrix()?.transpose();

        assert_eq!(matrix.row_names(), ["c0", "c1", "c2"]);
        assert_eq!(matrix.column_names(), ["r0", "r1"]);
        assert_eq!(matrix.data(), &array![[0, 3], [1, 4], [2, 5]]);

        Ok(())
    }

    #[test]
    fn test_select_rows() -> Result<(), MatrixError> {
        let matrix = build_matrix()?;

        let actual = matrix.select_rows(&["r1", "r0"])?;
        assert_eq!(actual.row_names(), ["r1", "r0"]);
        assert_eq!(actual.data(), &array![[3, 4, 5], [0, 1, 2]]);

        assert_eq!(
            matrix.select_rows(&["r0", "r9"]),
            Err(MatrixError::MissingRow(String::from("r9")))
        );

        Ok(())
    }

    #[test]
    fn test_select_columns() -> Result<(), MatrixError> {
        let matrix = build_matrix()?;

        let actual = matrix.select_columns(&["c2", "c0"])?;
        assert_eq!(actual.column_names(), ["c2", "c0"]);
        assert_eq!(actual.data(), &array![[2, 0], [5, 3]]);

        assert_eq!(
            matrix.select_columns(&["c3"]),
            Err(MatrixError::MissingColumn(String::from("c3")))
        );

        Ok(())
    }
}
