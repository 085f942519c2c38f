use std::{
    collections::HashSet,
    io::{self, BufRead},
    num,
};

use thiserror::Error;

// samtools idxstats reports reads without a reference sequence on a final `*` row.
const UNPLACED_ACCESSION: &str = "*";

/// A single reference sequence row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub accession: String,
    pub length: u64,
    pub mapped_read_count: u64,
    pub unmapped_read_count: u64,
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("invalid record at line {line_number}")]
    InvalidRecord {
        line_number: usize,
        #[source]
        source: ParseError,
    },
    #[error("duplicate accession at line {line_number}: {accession}")]
    DuplicateAccession {
        line_number: usize,
        accession: String,
    },
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("invalid column count: expected 4, got {0}")]
    InvalidColumnCount(usize),
    #[error("missing accession")]
    MissingAccession,
    #[error("invalid length")]
    InvalidLength(#[source] num::ParseIntError),
    #[error("invalid length: expected > 0")]
    ZeroLength,
    #[error("invalid mapped read count")]
    InvalidMappedReadCount(#[source] num::ParseIntError),
    #[error("invalid unmapped read count")]
    InvalidUnmappedReadCount(#[source] num::ParseIntError),
}

pub(super) fn read<R>(reader: &mut R) -> Result<Vec<Record>, ReadError>
where
    R: BufRead,
{
    let mut records = Vec::new();
    let mut accessions = HashSet::new();

    for (i, result) in reader.lines().enumerate() {
        let line = result?;
        let line_number = i + 1;

        if line.trim().is_empty() || is_unplaced(&line) {
            continue;
        }

        let record = parse_line(&line).map_err(|source| ReadError::InvalidRecord {
            line_number,
            source,
        })?;

        if !accessions.insert(record.accession.clone()) {
            return Err(ReadError::DuplicateAccession {
                line_number,
                accession: record.accession,
            });
        }

        records.push(record);
    }

    Ok(records)
}

fn is_unplaced(s: &str) -> bool {
    const DELIMITER: char = '\t';

    s.split(DELIMITER)
        .next()
        .map(|accession| accession == UNPLACED_ACCESSION)
        .unwrap_or(false)
}

fn parse_line(s: &str) -> Result<Record, ParseError> {
    const DELIMITER: char = '\t';

    let fields: Vec<_> = s.split(DELIMITER).collect();

    let [raw_accession, raw_length, raw_mapped, raw_unmapped] = fields[..] else {
        return Err(ParseError::InvalidColumnCount(fields.len()));
    };

    if raw_accession.is_empty() {
        return Err(ParseError::MissingAccession);
    }

    let length: u64 = raw_length.parse().map_err(ParseError::InvalidLength)?;

    if length == 0 {
        return Err(ParseError::ZeroLength);
    }

    let mapped_read_count = raw_mapped
        .parse()
        .map_err(ParseError::InvalidMappedReadCount)?;

    let unmapped_read_count = raw_unmapped
        .parse()
        .map_err(ParseError::InvalidUnmappedReadCount)?;

    Ok(Record {
        accession: raw_accession.into(),
        length,
        mapped_read_count,
        unmapped_read_count,
    })
}
