mod idxstats;

use std::io::BufRead;

pub use self::idxstats::{ParseError, ReadError, Record};

/// Reads all reference sequence records from an idxstats-style count file.
///
/// Lines may end with LF or CRLF.
pub fn read<R>(reader: &mut R) -> Result<Vec<Record>, ReadError>
where
    R: BufRead,
{
    idxstats::read(reader)
}
