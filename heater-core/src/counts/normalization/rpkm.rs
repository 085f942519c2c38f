//! Reads per kilobase of reference sequence per million mapped reads (RPKM).
//!
//! ```text
//!                        mapped_reads(g, s)
//! RPKM(g, s) = ---------------------------------------
//!              (length(g) / 1e3) * (total(s) / 1e6)
//! ```
//!
//! The output rows are sorted by ascending reference sequence length (ties keep input order),
//! and the columns are sorted by sample name.

use ndarray::Array2;
use thiserror::Error;
use tracing::info;

use crate::{
    Matrix,
    counts::{CountMatrix, SampleTotals},
    matrix::MatrixError,
};

const BASES_PER_KILOBASE: f64 = 1e3;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("invalid length for {0}: expected > 0")]
    ZeroLength(String),
    #[error("missing total for sample {0}")]
    MissingSampleTotal(String),
    #[error("invalid total for sample {sample_name}: expected > 0, got {total}")]
    InvalidSampleTotal { sample_name: String, total: f64 },
    #[error("invalid matrix")]
    InvalidMatrix(#[from] MatrixError),
}

pub fn normalize(counts: &CountMatrix, totals: &SampleTotals) -> Result<Matrix<f64>, NormalizeError> {
    let lengths: Vec<_> = counts.lengths().values().copied().collect();
    validate_lengths(counts.accessions(), &lengths)?;

    let sample_totals = collect_sample_totals(counts.sample_names(), totals)?;

    let row_indices = sort_by_length(&lengths);
    let column_indices = sort_by_name(counts.sample_names());

    let data = counts.counts().data();

    let values = Array2::from_shape_fn(
        (row_indices.len(), column_indices.len()),
        |(i, j)| {
            let (row, column) = (row_indices[i], column_indices[j]);
            let divisor = calculate_divisor(lengths[row], sample_totals[column]);
            calculate_rpkm(data[[row, column]], divisor)
        },
    );

    let row_names = row_indices
        .iter()
        .map(|&i| counts.accessions()[i].clone())
        .collect();

    let column_names = column_indices
        .iter()
        .map(|&j| counts.sample_names()[j].clone())
        .collect();

    let rpkms = Matrix::new(row_names, column_names, values)?;

    let (accession_count, sample_count) = rpkms.dim();
    info!(accession_count, sample_count, "normalized counts");

    Ok(rpkms)
}

/// Returns the RPKM divisor, `(length / 1e3) * total`, where `total` is in millions of reads.
pub fn calculate_divisor(length: u64, total: f64) -> f64 {
    (length as f64 / BASES_PER_KILOBASE) * total
}

fn calculate_rpkm(count: u64, divisor: f64) -> f64 {
    count as f64 / divisor
}

fn validate_lengths(accessions: &[String], lengths: &[u64]) -> Result<(), NormalizeError> {
    match accessions.iter().zip(lengths).find(|(_, length)| **length == 0) {
        Some((accession, _)) => Err(NormalizeError::ZeroLength(accession.clone())),
        None => Ok(()),
    }
}

fn collect_sample_totals(
    sample_names: &[String],
    totals: &SampleTotals,
) -> Result<Vec<f64>, NormalizeError> {
    sample_names
        .iter()
        .map(|sample_name| {
            let total = totals
                .get(sample_name)
                .copied()
                .ok_or_else(|| NormalizeError::MissingSampleTotal(sample_name.clone()))?;

            if total > 0.0 && total.is_finite() {
                Ok(total)
            } else {
                Err(NormalizeError::InvalidSampleTotal {
                    sample_name: sample_name.clone(),
                    total,
                })
            }
        })
        .collect()
}

fn sort_by_length(lengths: &[u64]) -> Vec<usize> {
    let mut indices: Vec<_> = (0..lengths.len()).collect();
    indices.sort_by_key(|&i| lengths[i]);
    indices
}

fn sort_by_name(names: &[String]) -> Vec<usize> {
    let mut indices: Vec<_> = (0..names.len()).collect();
    indices.sort_by(|&a, &b| names[a].cmp(&names[b]));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::{Sample, assemble, reader::Record, totals};

    fn assert_approx_eq(a: f64, b: f64) {
        const EPSILON: f64 = 1e-6;
        assert!((a - b).abs() < EPSILON, "{a} != {b}");
    }

    fn build_sample(name: &str, rows: &[(&str, u64, u64)]) -> Sample {
        let records = rows
            .iter()
            .map(|&(accession, length, mapped_read_count)| Record {
                accession: accession.into(),
                length,
                mapped_read_count,
                unmapped_read_count: 0,
            })
            .collect();

        Sample::new(name.into(), records)
    }

    #[test]
    fn test_normalize() -> Result<(), Box<dyn std::error::Error>> {
        let samples = [
            build_sample("S1", &[("accA", 1000, 10), ("accB", 2000, 20)]),
            build_sample("S2", &[("accA", 1000, 5), ("accB", 2000, 40)]),
        ];

        let counts = assemble(&samples)?;
        let totals = totals::calculate(&counts);

        assert_approx_eq(totals["S1"], 0.00003);
        assert_approx_eq(totals["S2"], 0.000045);

        let rpkms = normalize(&counts, &totals)?;

        assert_eq!(rpkms.row_names(), ["accA", "accB"]);
        assert_eq!(rpkms.column_names(), ["S1", "S2"]);

        let rpkm = |accession, sample_name| rpkms.get(accession, sample_name).copied();

        let expected = 10.0 / ((1000.0 / 1000.0) * (30.0 / 1e6));
        assert_approx_eq(rpkm("accA", "S1").ok_or("missing cell")?, expected);
        assert_approx_eq(expected, 333333.333333);

        let expected = 40.0 / ((2000.0 / 1000.0) * (45.0 / 1e6));
        assert_approx_eq(rpkm("accB", "S2").ok_or("missing cell")?, expected);
        assert_approx_eq(expected, 444444.444444);

        Ok(())
    }

    #[test]
    fn test_normalize_sorts_rows_by_length_and_columns_by_name()
    -> Result<(), Box<dyn std::error::Error>> {
        let samples = [
            build_sample("S2", &[("accA", 3000, 1), ("accB", 100, 2), ("accC", 3000, 3)]),
            build_sample("S1", &[("accA", 3000, 4), ("accB", 100, 5), ("accC", 3000, 6)]),
        ];

        let counts = assemble(&samples)?;
        let totals = totals::calculate(&counts);
        let rpkms = normalize(&counts, &totals)?;

        assert_eq!(rpkms.row_names(), ["accB", "accA", "accC"]);
        assert_eq!(rpkms.column_names(), ["S1", "S2"]);

        let expected = 5.0 / calculate_divisor(100, 15.0 / 1e6);
        assert_approx_eq(rpkms.data()[[0, 0]], expected);

        let expected = 3.0 / calculate_divisor(3000, 6.0 / 1e6);
        assert_approx_eq(rpkms.data()[[2, 1]], expected);

        Ok(())
    }

    #[test]
    fn test_normalize_reconstructs_mapped_read_counts() -> Result<(), Box<dyn std::error::Error>> {
        let samples = [
            build_sample("S1", &[("a", 17711, 610), ("b", 10946, 2), ("c", 233, 6765)]),
            build_sample("S2", &[("a", 17711, 89), ("b", 10946, 0), ("c", 233, 144)]),
        ];

        let counts = assemble(&samples)?;
        let totals = totals::calculate(&counts);
        let rpkms = normalize(&counts, &totals)?;

        for sample in &samples {
            let mut sum = 0.0;

            for record in sample.records() {
                let rpkm = rpkms
                    .get(&record.accession, sample.name())
                    .copied()
                    .ok_or("missing cell")?;

                sum += rpkm * calculate_divisor(record.length, totals[sample.name()]);
            }

            assert_approx_eq(sum, sample.total_mapped_read_count() as f64);
        }

        Ok(())
    }

    #[test]
    fn test_normalize_with_zero_sample_total() -> Result<(), Box<dyn std::error::Error>> {
        let samples = [
            build_sample("S1", &[("accA", 1000, 10)]),
            build_sample("S2", &[("accA", 1000, 0)]),
        ];

        let counts = assemble(&samples)?;
        let totals = totals::calculate(&counts);

        assert_eq!(
            normalize(&counts, &totals),
            Err(NormalizeError::InvalidSampleTotal {
                sample_name: String::from("S2"),
                total: 0.0,
            })
        );

        Ok(())
    }

    #[test]
    fn test_normalize_with_missing_sample_total() -> Result<(), Box<dyn std::error::Error>> {
        let samples = [build_sample("S1", &[("accA", 1000, 10)])];
        let counts = assemble(&samples)?;

        assert_eq!(
            normalize(&counts, &SampleTotals::new()),
            Err(NormalizeError::MissingSampleTotal(String::from("S1")))
        );

        Ok(())
    }

    #[test]
    fn test_validate_lengths() {
        let accessions = [String::from("accA"), String::from("accB")];

        assert_eq!(validate_lengths(&accessions, &[1000, 2000]), Ok(()));
        assert_eq!(
            validate_lengths(&accessions, &[1000, 0]),
            Err(NormalizeError::ZeroLength(String::from("accB")))
        );
    }

    #[test]
    fn test_calculate_divisor() {
        assert_approx_eq(calculate_divisor(2000, 0.000045), 0.00009);
    }
}
