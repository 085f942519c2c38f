pub mod count;
pub mod map;

use clap::{Parser, Subcommand};

#[derive(Subcommand)]
pub enum Command {
    /// Build the count and RPKM matrices.
    Count(count::Args),
    /// Build the count and log10 RPKM matrices and render a heatmap.
    Map(map::Args),
}

/// Generate RPKM matrices and heatmaps from samtools idxstats counts.
///
///                         mapped_reads
/// RPKM = ------------------------------------------
///        (length / 1e3) * (total_mapped_reads / 1e6)
#[derive(Parser)]
#[command(verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}
