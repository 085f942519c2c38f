use indexmap::IndexMap;
use tracing::{debug, info};

use super::CountMatrix;

const READS_PER_MILLION: f64 = 1e6;

/// Total mapped reads per sample, in millions.
pub type SampleTotals = IndexMap<String, f64>;

/// Sums the mapped reads of every sample over all accessions.
///
/// This must be calculated from the assembled counts, i.e., before any rows are sorted,
/// selected, or dropped.
pub fn calculate(counts: &CountMatrix) -> SampleTotals {
    let matrix = counts.counts();

    let totals: SampleTotals = matrix
        .column_names()
        .iter()
        .zip(matrix.data().columns())
        .map(|(sample_name, column)| {
            let sum = sum_counts(column.iter().copied());
            let total = sum as f64 / READS_PER_MILLION;
            debug!(sample_name = sample_name.as_str(), %sum, total, "calculated sample total");
            (sample_name.clone(), total)
        })
        .collect();

    info!(sample_count = totals.len(), "calculated sample totals");

    totals
}

// Accumulates in 128 bits, which cannot overflow for any realistic number of accessions.
pub(crate) fn sum_counts<I>(counts: I) -> u128
where
    I: IntoIterator<Item = u64>,
{
    counts.into_iter().map(u128::from).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counts::{Sample, assemble, reader::Record};

    fn build_sample(name: &str, counts: &[u64]) -> Sample {
        let records = counts
            .iter()
            .enumerate()
            .map(|(i, &mapped_read_count)| Record {
                accession: format!("acc{i}"),
                length: 1000 * (i as u64 + 1),
                mapped_read_count,
                unmapped_read_count: 0,
            })
            .collect();

        Sample::new(name.into(), records)
    }

    #[test]
    fn test_calculate() -> Result<(), Box<dyn std::error::Error>> {
        let samples = [
            build_sample("S1", &[10, 20]),
            build_sample("S2", &[5, 40]),
            build_sample("S3", &[1_500_000, 2_500_000]),
        ];

        let counts = assemble(&samples)?;
        let totals = calculate(&counts);

        assert_eq!(totals.keys().collect::<Vec<_>>(), ["S1", "S2", "S3"]);
        assert_eq!(totals["S1"], 30.0 / 1e6);
        assert_eq!(totals["S2"], 45.0 / 1e6);
        assert_eq!(totals["S3"], 4.0);

        for sample in &samples {
            let expected = sample.total_mapped_read_count() as f64 / 1e6;
            assert_eq!(totals[sample.name()], expected);
        }

        Ok(())
    }

    #[test]
    fn test_calculate_is_unchanged_by_row_order() -> Result<(), Box<dyn std::error::Error>> {
        let samples = [build_sample("S1", &[7, 11, 13]), build_sample("S2", &[3, 0, 2])];
        let counts = assemble(&samples)?;

        let reversed_samples: Vec<_> = samples
            .iter()
            .map(|sample| {
                let mut records = sample.records().to_vec();
                records.reverse();
                Sample::new(sample.name().into(), records)
            })
            .collect();

        let reversed_counts = assemble(&reversed_samples)?;

        assert_eq!(calculate(&counts), calculate(&reversed_counts));

        Ok(())
    }

    #[test]
    fn test_calculate_with_counts_exceeding_u64() -> Result<(), Box<dyn std::error::Error>> {
        let samples = [
            build_sample("S1", &[u64::MAX, 1]),
            build_sample("S2", &[u64::MAX, 0]),
        ];

        let counts = assemble(&samples)?;
        let totals = calculate(&counts);

        assert_eq!(totals["S1"], 2f64.powi(64) / 1e6);
        assert_eq!(totals["S2"], u64::MAX as f64 / 1e6);

        Ok(())
    }

    #[test]
    fn test_sum_counts() {
        assert_eq!(sum_counts([]), 0);
        assert_eq!(sum_counts([1, 2, 3]), 6);
        assert_eq!(sum_counts([u64::MAX, u64::MAX]), 2 * u128::from(u64::MAX));
    }
}
