use std::{io::BufRead, path::Path};

use indexmap::IndexMap;

use super::{
    reader::{self, ReadError, Record},
    totals,
};

/// Reference sequence lengths keyed by accession, in file order.
pub type LengthKey = IndexMap<String, u64>;

/// The records of a single sample count file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sample {
    name: String,
    records: Vec<Record>,
}

impl Sample {
    pub fn new(name: String, records: Vec<Record>) -> Self {
        Self { name, records }
    }

    pub fn read<R>(name: String, reader: &mut R) -> Result<Self, ReadError>
    where
        R: BufRead,
    {
        let records = reader::read(reader)?;
        Ok(Self::new(name, records))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn length_key(&self) -> LengthKey {
        self.records
            .iter()
            .map(|record| (record.accession.clone(), record.length))
            .collect()
    }

    pub fn total_mapped_read_count(&self) -> u128 {
        totals::sum_counts(self.records.iter().map(|record| record.mapped_read_count))
    }
}

/// Derives a sample name from a count file path.
///
/// A trailing `.gz` is ignored, and up to two extensions are then stripped, e.g.,
/// `S1.bam.stats` and `S1.bam.stats.gz` are both named `S1`.
pub fn name_from_src<P>(src: P) -> Option<String>
where
    P: AsRef<Path>,
{
    const GZIP_EXTENSION: &str = "gz";

    let src = src.as_ref();

    let filename = if src.extension().is_some_and(|ext| ext == GZIP_EXTENSION) {
        Path::new(src.file_stem()?)
    } else {
        Path::new(src.file_name()?)
    };

    let stem = Path::new(filename.file_stem()?);
    let name = stem.file_stem()?.to_str()?;

    Some(name.into())
}
