use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
pub struct Args {
    /// Input directory of samtools idxstats files (`*.stats`, `*.stats.gz`).
    ///
    /// Each file is one sample. The sample name is the filename without its last two
    /// extensions, e.g., `ANE_004_05M.bam.stats` is `ANE_004_05M`.
    #[arg(long)]
    pub src_dir: PathBuf,

    /// Output directory.
    ///
    /// This is created if it does not exist.
    #[arg(long)]
    pub dst_dir: PathBuf,

    /// Project name, used as the prefix of output filenames.
    #[arg(long, default_value = "rpkm")]
    pub project: String,

    /// Sample order.
    ///
    /// A list of sample names separated by tabs and/or newlines, e.g.,
    /// `ANE_004_05M<TAB>ANE_150_40M`. Only the listed samples are kept.
    #[arg(long)]
    pub sort_samples: Option<PathBuf>,

    /// Sequence order.
    ///
    /// A list of accessions separated by tabs and/or newlines. Only the listed sequences are
    /// kept. When given with `--sort-samples`, the output is transposed (samples × sequences).
    #[arg(long)]
    pub sort_sequences: Option<PathBuf>,

    /// Remove the existing contents of the output directory before writing.
    #[arg(long)]
    pub clear: bool,
}
