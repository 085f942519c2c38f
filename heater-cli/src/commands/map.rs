use std::{
    io,
    path::{Path, PathBuf},
};

use heater_core::{
    counts::transform,
    heatmap::{
        self, LabelColor, Options, RenderError,
        label_colors::{self, ReadLabelColorsError},
    },
};
use thiserror::Error;
use tracing::info;

use super::count::{self, CountError};
use crate::{
    cli::map::{self, Ticks},
    fs::{self, Outputs},
};

const DATE_FORMAT: &str = "%m.%d.%Y";

pub fn map(args: map::Args) -> Result<(), MapError> {
    let label_colors = match &args.label_colors {
        Some(src) => read_label_colors(src)?,
        None => Vec::new(),
    };

    let (mut outputs, rpkms) = count::run(&args.count)?;

    let rpkms = transform::log10_clamped(&rpkms);

    count::write_rpkms(&mut outputs, &args.count.project, &rpkms)?;
    outputs.commit();

    let options = Options {
        palette: args.palette,
        hide_column_labels: args.x_ticks == Ticks::Off,
        hide_row_labels: args.y_ticks == Ticks::Off,
        label_colors,
    };

    let mut outputs = Outputs::new(&args.count.dst_dir);
    let dst = outputs.track(&heatmap_filename(&args.count.project));

    info!(?dst, palette = %options.palette, "rendering heatmap");

    heatmap::render(&dst, &rpkms, &options)?;

    outputs.commit();

    info!("done");

    Ok(())
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Count(#[from] CountError),
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("invalid label colors: {}", .src.display())]
    InvalidLabelColors {
        src: PathBuf,
        #[source]
        source: ReadLabelColorsError,
    },
    #[error("render failed")]
    Render(#[from] RenderError),
}

fn heatmap_filename(project: &str) -> String {
    let date = chrono::Local::now().format(DATE_FORMAT);
    format!("{project}_rpkm_heat_{date}.png")
}

fn read_label_colors(src: &Path) -> Result<Vec<LabelColor>, MapError> {
    let wrap = |source| MapError::InvalidLabelColors {
        src: src.into(),
        source,
    };

    let mut reader = fs::open(src).map_err(|e| wrap(ReadLabelColorsError::from(e)))?;

    let label_colors = label_colors::read(&mut reader).map_err(wrap)?;

    info!(?src, label_color_count = label_colors.len(), "read label colors");

    Ok(label_colors)
}
