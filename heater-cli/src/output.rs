use std::io::{self, Write};

use heater_core::{Matrix, counts::CountMatrix};

const SEPARATOR: char = '\t';
const LENGTH_HEADER: &str = "genome_length";
const MISSING: &str = "NA";

/// A matrix value written as a table cell.
pub trait Cell {
    fn write_cell<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write;
}

impl Cell for u64 {
    fn write_cell<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        write!(writer, "{self}")
    }
}

impl Cell for f64 {
    fn write_cell<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        write!(writer, "{self}")
    }
}

impl Cell for Option<f64> {
    fn write_cell<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        match self {
            Some(n) => n.write_cell(writer),
            None => writer.write_all(MISSING.as_bytes()),
        }
    }
}

/// Writes the raw counts, one row per accession, with its length before the sample columns.
pub fn write_counts<W>(writer: &mut W, counts: &CountMatrix) -> io::Result<()>
where
    W: Write,
{
    write!(writer, "{SEPARATOR}{LENGTH_HEADER}")?;

    for name in counts.sample_names() {
        write!(writer, "{SEPARATOR}{name}")?;
    }

    writeln!(writer)?;

    let rows = counts.lengths().iter().zip(counts.counts().data().rows());

    for ((accession, length), row) in rows {
        write!(writer, "{accession}{SEPARATOR}{length}")?;

        for count in row {
            write!(writer, "{SEPARATOR}")?;
            count.write_cell(writer)?;
        }

        writeln!(writer)?;
    }

    writer.flush()
}

pub fn write_matrix<W, T>(writer: &mut W, matrix: &Matrix<T>) -> io::Result<()>
where
    W: Write,
    T: Cell,
{
    for name in matrix.column_names() {
        write!(writer, "{SEPARATOR}{name}")?;
    }

    writeln!(writer)?;

    for (name, row) in matrix.row_names().iter().zip(matrix.data().rows()) {
        write!(writer, "{name}")?;

        for value in row {
            write!(writer, "{SEPARATOR}")?;
            value.write_cell(writer)?;
        }

        writeln!(writer)?;
    }

    writer.flush()
}
