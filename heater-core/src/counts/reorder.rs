use std::{
    collections::HashSet,
    io::{self, BufRead},
};

use thiserror::Error;
use tracing::info;

use crate::{Matrix, matrix::MatrixError};

/// Caller-supplied sample (column) and sequence (row) orders.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Order {
    pub samples: Option<Vec<String>>,
    pub sequences: Option<Vec<String>>,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ReorderError {
    #[error("invalid sample order")]
    InvalidSampleOrder(#[source] MatrixError),
    #[error("invalid sequence order")]
    InvalidSequenceOrder(#[source] MatrixError),
}

/// Reorders a sequence × sample matrix.
///
/// When both orders are given, the result is transposed, i.e., rows are samples and columns
/// are sequences.
pub fn reorder<T>(matrix: Matrix<T>, order: &Order) -> Result<Matrix<T>, ReorderError>
where
    T: Clone,
{
    match (&order.samples, &order.sequences) {
        (Some(samples), Some(sequences)) => {
            info!(
                sample_count = samples.len(),
                sequence_count = sequences.len(),
                "reordering samples and sequences"
            );

            let matrix = select_samples(&matrix, samples)?;
            let matrix = select_sequences(&matrix, sequences)?;

            Ok(matrix.transpose())
        }
        (Some(samples), None) => {
            info!(sample_count = samples.len(), "reordering samples");
            select_samples(&matrix, samples)
        }
        (None, Some(sequences)) => {
            info!(sequence_count = sequences.len(), "reordering sequences");
            select_sequences(&matrix, sequences)
        }
        (None, None) => Ok(matrix),
    }
}

fn select_samples<T>(matrix: &Matrix<T>, samples: &[String]) -> Result<Matrix<T>, ReorderError>
where
    T: Clone,
{
    matrix
        .select_columns(samples)
        .map_err(ReorderError::InvalidSampleOrder)
}

fn select_sequences<T>(
    matrix: &Matrix<T>,
    sequences: &[String],
) -> Result<Matrix<T>, ReorderError>
where
    T: Clone,
{
    matrix
        .select_rows(sequences)
        .map_err(ReorderError::InvalidSequenceOrder)
}

#[derive(Debug, Error)]
pub enum ReadOrderError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("empty order")]
    Empty,
    #[error("duplicate label: {0}")]
    DuplicateLabel(String),
}

/// Reads an order list.
///
/// Labels are separated by tabs and/or newlines, e.g., a single line of tab-separated sample
/// names. Blank entries are ignored.
pub fn read_order<R>(reader: &mut R) -> Result<Vec<String>, ReadOrderError>
where
    R: BufRead,
{
    const DELIMITER: char = '\t';

    let mut labels = Vec::new();
    let mut seen = HashSet::new();

    for result in reader.lines() {
        let line = result?;

        for raw_label in line.split(DELIMITER) {
            let label = raw_label.trim();

            if label.is_empty() {
                continue;
            }

            if !seen.insert(label.to_string()) {
                return Err(ReadOrderError::DuplicateLabel(label.into()));
            }

            labels.push(label.into());
        }
    }

    if labels.is_empty() {
        return Err(ReadOrderError::Empty);
    }

    Ok(labels)
}
