//! Merges per-sample records into a single accession × sample count matrix.
//!
//! Every sample must list the same accessions in the same order with the same lengths as the
//! first sample. The first sample's lengths become the authoritative length key for the run.

use std::collections::HashSet;

use ndarray::Array2;
use thiserror::Error;
use tracing::{debug, info};

use super::{LengthKey, Sample};
use crate::{
    Matrix,
    matrix::MatrixError,
};

#[derive(Debug, Error, Eq, PartialEq)]
pub enum AssembleError {
    #[error("no samples")]
    Empty,
    #[error("duplicate sample name: {0}")]
    DuplicateSampleName(String),
    #[error(
        "accession count mismatch in sample {sample_name}: expected {expected}, got {actual}"
    )]
    AccessionCountMismatch {
        sample_name: String,
        expected: usize,
        actual: usize,
    },
    #[error(
        "accession mismatch in sample {sample_name} at row {index}: expected {expected}, got {actual}"
    )]
    AccessionMismatch {
        sample_name: String,
        index: usize,
        expected: String,
        actual: String,
    },
    #[error(
        "length mismatch in sample {sample_name} for {accession}: expected {expected}, got {actual}"
    )]
    LengthMismatch {
        sample_name: String,
        accession: String,
        expected: u64,
        actual: u64,
    },
    #[error("invalid matrix")]
    InvalidMatrix(#[from] MatrixError),
}

/// Mapped read counts for every accession (rows) in every sample (columns).
#[derive(Clone, Debug, PartialEq)]
pub struct CountMatrix {
    lengths: LengthKey,
    counts: Matrix<u64>,
}

impl CountMatrix {
    pub fn lengths(&self) -> &LengthKey {
        &self.lengths
    }

    pub fn counts(&self) -> &Matrix<u64> {
        &self.counts
    }

    pub fn accessions(&self) -> &[String] {
        self.counts.row_names()
    }

    pub fn sample_names(&self) -> &[String] {
        self.counts.column_names()
    }
}

pub fn assemble(samples: &[Sample]) -> Result<CountMatrix, AssembleError> {
    let first_sample = samples.first().ok_or(AssembleError::Empty)?;

    let lengths = first_sample.length_key();
    let sample_names = read_sample_names(samples)?;

    let mut data = Array2::zeros((lengths.len(), samples.len()));

    for (sample, mut column) in samples.iter().zip(data.columns_mut()) {
        validate_records(&lengths, sample)?;

        for (record, count) in sample.records().iter().zip(column.iter_mut()) {
            *count = record.mapped_read_count;
        }

        debug!(sample_name = sample.name(), "merged sample");
    }

    let accessions = lengths.keys().cloned().collect();
    let counts = Matrix::new(accessions, sample_names, data)?;

    info!(
        accession_count = lengths.len(),
        sample_count = samples.len(),
        "assembled counts"
    );

    Ok(CountMatrix { lengths, counts })
}

fn read_sample_names(samples: &[Sample]) -> Result<Vec<String>, AssembleError> {
    let mut names = HashSet::with_capacity(samples.len());

    samples
        .iter()
        .map(|sample| {
            let name = sample.name();

            if names.insert(name) {
                Ok(name.into())
            } else {
                Err(AssembleError::DuplicateSampleName(name.into()))
            }
        })
        .collect()
}

fn validate_records(lengths: &LengthKey, sample: &Sample) -> Result<(), AssembleError> {
    let records = sample.records();

    if records.len() != lengths.len() {
        return Err(AssembleError::AccessionCountMismatch {
            sample_name: sample.name().into(),
            expected: lengths.len(),
            actual: records.len(),
        });
    }

    for (index, ((expected_accession, &expected_length), record)) in
        lengths.iter().zip(records).enumerate()
    {
        if record.accession != *expected_accession {
            return Err(AssembleError::AccessionMismatch {
                sample_name: sample.name().into(),
                index,
                expected: expected_accession.clone(),
                actual: record.accession.clone(),
            });
        }

        if record.length != expected_length {
            return Err(AssembleError::LengthMismatch {
                sample_name: sample.name().into(),
                accession: record.accession.clone(),
                expected: expected_length,
                actual: record.length,
            });
        }
    }

    Ok(())
}
