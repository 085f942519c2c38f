use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter},
    mem,
    path::{Path, PathBuf},
};

use flate2::read::MultiGzDecoder;
use tracing::{info, warn};

const SRC_SUFFIXES: [&str; 2] = [".stats", ".stats.gz"];
const GZIP_EXTENSION: &str = "gz";

/// Opens a text input for buffered reading, decompressing it when it ends in `.gz`.
pub fn open<P>(src: P) -> io::Result<Box<dyn BufRead>>
where
    P: AsRef<Path>,
{
    let src = src.as_ref();
    let file = File::open(src)?;

    let reader: Box<dyn BufRead> = if is_gzip(src) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader)
}

fn is_gzip(src: &Path) -> bool {
    src.extension().is_some_and(|ext| ext == GZIP_EXTENSION)
}

/// Lists the count files in `src_dir`, sorted by path.
pub fn find_srcs<P>(src_dir: P) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
{
    let mut srcs = Vec::new();

    for result in fs::read_dir(src_dir)? {
        let entry = result?;
        let path = entry.path();

        if entry.file_type()?.is_file() && is_src(&path) {
            srcs.push(path);
        }
    }

    srcs.sort();

    Ok(srcs)
}

fn is_src(src: &Path) -> bool {
    src.file_name()
        .and_then(|name| name.to_str())
        .map(|name| SRC_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
        .unwrap_or(false)
}

/// Creates the output directory, optionally removing everything already in it.
pub fn prepare_dst_dir<P>(dst_dir: P, clear: bool) -> io::Result<()>
where
    P: AsRef<Path>,
{
    let dst_dir = dst_dir.as_ref();

    if clear && dst_dir.is_dir() {
        info!(?dst_dir, "clearing output directory");

        for result in fs::read_dir(dst_dir)? {
            let entry = result?;
            let path = entry.path();

            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
        }
    }

    fs::create_dir_all(dst_dir)
}

/// Files written by a run.
///
/// Unless committed, every tracked file is removed when this is dropped.
pub struct Outputs {
    dst_dir: PathBuf,
    paths: Vec<PathBuf>,
    is_committed: bool,
}

impl Outputs {
    pub fn new<P>(dst_dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            dst_dir: dst_dir.into(),
            paths: Vec::new(),
            is_committed: false,
        }
    }

    /// Returns the output path for `filename` and tracks it.
    pub fn track(&mut self, filename: &str) -> PathBuf {
        let dst = self.dst_dir.join(filename);
        self.paths.push(dst.clone());
        dst
    }

    pub fn create(&mut self, filename: &str) -> io::Result<BufWriter<File>> {
        let dst = self.track(filename);
        File::create(dst).map(BufWriter::new)
    }

    pub fn commit(mut self) -> Vec<PathBuf> {
        self.is_committed = true;
        mem::take(&mut self.paths)
    }
}

impl Drop for Outputs {
    fn drop(&mut self) {
        if self.is_committed {
            return;
        }

        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => warn!(?path, "removed incomplete output"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(?path, error = %e, "could not remove incomplete output"),
            }
        }
    }
}
