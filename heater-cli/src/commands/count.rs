use std::{
    io,
    path::{Path, PathBuf},
};

use heater_core::{
    Matrix,
    counts::{
        self, Sample,
        assemble::AssembleError,
        normalization::rpkm::{self, NormalizeError},
        reader::ReadError,
        reorder::{self, Order, ReadOrderError, ReorderError},
        sample, totals,
    },
};
use thiserror::Error;
use tracing::info;

use crate::{
    cli::count,
    fs::{self, Outputs},
    output::{self, Cell},
};

pub fn count(args: count::Args) -> Result<(), CountError> {
    let (mut outputs, rpkms) = run(&args)?;

    write_rpkms(&mut outputs, &args.project, &rpkms)?;

    let dsts = outputs.commit();
    info!(file_count = dsts.len(), "done");

    Ok(())
}

#[derive(Debug, Error)]
pub enum CountError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("no count files (*.stats, *.stats.gz) in {}", .0.display())]
    NoSources(PathBuf),
    #[error("invalid sample name: {}", .0.display())]
    InvalidSampleName(PathBuf),
    #[error("invalid sample: {}", .src.display())]
    InvalidSample {
        src: PathBuf,
        #[source]
        source: ReadError,
    },
    #[error("invalid order: {}", .src.display())]
    InvalidOrder {
        src: PathBuf,
        #[source]
        source: ReadOrderError,
    },
    #[error("invalid samples")]
    Assemble(#[from] AssembleError),
    #[error("invalid counts")]
    Normalize(#[from] NormalizeError),
    #[error("reorder failed")]
    Reorder(#[from] ReorderError),
}

/// Runs the pipeline through reordering.
///
/// The counts table is written to the returned outputs, which remove it when dropped unless
/// committed.
pub(super) fn run(args: &count::Args) -> Result<(Outputs, Matrix<f64>), CountError> {
    let src_dir = &args.src_dir;

    info!(?src_dir, "finding count files");

    let srcs = fs::find_srcs(src_dir)?;

    if srcs.is_empty() {
        return Err(CountError::NoSources(src_dir.clone()));
    }

    let order = read_order(args)?;

    info!(sample_count = srcs.len(), "reading samples");

    let samples = read_samples(&srcs)?;

    let counts = counts::assemble(&samples)?;

    let dst_dir = &args.dst_dir;
    fs::prepare_dst_dir(dst_dir, args.clear)?;

    let mut outputs = Outputs::new(dst_dir);

    let filename = format!("{}_counts.csv", args.project);
    info!(dst = ?dst_dir.join(&filename), "writing counts");
    let mut writer = outputs.create(&filename)?;
    output::write_counts(&mut writer, &counts)?;

    let totals = totals::calculate(&counts);
    let rpkms = rpkm::normalize(&counts, &totals)?;
    let rpkms = reorder::reorder(rpkms, &order)?;

    Ok((outputs, rpkms))
}

pub(super) fn write_rpkms<T>(
    outputs: &mut Outputs,
    project: &str,
    rpkms: &Matrix<T>,
) -> io::Result<()>
where
    T: Cell,
{
    let filename = format!("{project}_rpkm.csv");

    let (row_count, column_count) = rpkms.dim();
    info!(filename = filename.as_str(), row_count, column_count, "writing RPKM");

    let mut writer = outputs.create(&filename)?;
    output::write_matrix(&mut writer, rpkms)
}

fn read_order(args: &count::Args) -> Result<Order, CountError> {
    let samples = args.sort_samples.as_deref().map(read_order_list).transpose()?;
    let sequences = args
        .sort_sequences
        .as_deref()
        .map(read_order_list)
        .transpose()?;

    Ok(Order { samples, sequences })
}

fn read_order_list(src: &Path) -> Result<Vec<String>, CountError> {
    let wrap = |source| CountError::InvalidOrder {
        src: src.into(),
        source,
    };

    let mut reader = fs::open(src).map_err(|e| wrap(ReadOrderError::from(e)))?;

    let labels = reorder::read_order(&mut reader).map_err(wrap)?;

    info!(?src, label_count = labels.len(), "read order");

    Ok(labels)
}

fn read_samples(srcs: &[PathBuf]) -> Result<Vec<Sample>, CountError> {
    srcs.iter().map(|src| read_sample(src)).collect()
}

fn read_sample(src: &Path) -> Result<Sample, CountError> {
    let name = sample::name_from_src(src).ok_or_else(|| CountError::InvalidSampleName(src.into()))?;

    let wrap = |source| CountError::InvalidSample {
        src: src.into(),
        source,
    };

    let mut reader = fs::open(src).map_err(|e| wrap(ReadError::from(e)))?;

    let sample = Sample::read(name, &mut reader).map_err(wrap)?;

    info!(
        ?src,
        sample_name = sample.name(),
        record_count = sample.records().len(),
        "read sample"
    );

    Ok(sample)
}
