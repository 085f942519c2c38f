use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use heater_core::heatmap::Palette;

use super::count;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Ticks {
    #[default]
    On,
    Off,
}

#[derive(Parser)]
pub struct Args {
    #[command(flatten)]
    pub count: count::Args,

    /// Color gradient (plasma, viridis, blue, red, or green).
    #[arg(long, default_value_t = Palette::Plasma)]
    pub palette: Palette,

    /// Per-label colors.
    ///
    /// Three tab-separated columns: label, 0-based position on its axis, and color
    /// (hexadecimal or a basic color name), e.g., `2503754001<TAB>0<TAB>#990000`.
    #[arg(long)]
    pub label_colors: Option<PathBuf>,

    /// Show column labels.
    #[arg(long, value_enum, default_value_t = Ticks::On)]
    pub x_ticks: Ticks,

    /// Show row labels.
    #[arg(long, value_enum, default_value_t = Ticks::On)]
    pub y_ticks: Ticks,
}
