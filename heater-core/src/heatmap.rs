//! Heatmap rendering.

pub mod label_colors;
pub mod palette;

use std::path::Path;

use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use thiserror::Error;
use tracing::info;

pub use self::{
    label_colors::{LabelColor, Overrides, ResolveError},
    palette::{Palette, ParsePaletteError},
};
use crate::Matrix;

const MAX_CELL_SIZE: u32 = 16;
// Upper bound of the grid's width and height. Cells shrink to fit, down to 1 px.
const MAX_GRID_EXTENT: u32 = 8192;

const MIN_LABEL_AREA_SIZE: u32 = 16;
const MAX_LABEL_AREA_SIZE: u32 = 480;
// Approximate glyph advance as a fraction of the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

const LEGEND_WIDTH: u32 = 120;
const MARGIN: u32 = 20;
const LABEL_PADDING: i32 = 4;

const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: f64 = 12.0;

const GRADIENT_STEP_COUNT: usize = 100;

const LABEL_COLOR: RGBColor = BLACK;
const MISSING_COLOR: RGBColor = RGBColor(0xbf, 0xbf, 0xbf);

#[derive(Clone, Debug, Default)]
pub struct Options {
    pub palette: Palette,
    pub hide_column_labels: bool,
    pub hide_row_labels: bool,
    pub label_colors: Vec<LabelColor>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("empty matrix")]
    EmptyMatrix,
    #[error("matrix too large: {0} × {1}")]
    MatrixTooLarge(usize, usize),
    #[error("invalid label colors")]
    InvalidLabelColors(#[from] ResolveError),
    #[error("drawing error: {0}")]
    Draw(String),
}

fn draw_error<E>(e: E) -> RenderError
where
    E: std::error::Error,
{
    RenderError::Draw(e.to_string())
}

/// The range of present values, used to map values onto the palette.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Option<f64>>,
    {
        let (min, max) = values
            .into_iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &n| {
                (min.min(n), max.max(n))
            });

        if min > max {
            Self { min: 0.0, max: 1.0 }
        } else if min == max {
            Self { min, max: min + 1.0 }
        } else {
            Self { min, max }
        }
    }

    fn normalize(&self, n: f64) -> f64 {
        (n - self.min) / (self.max - self.min)
    }
}

/// Renders a matrix as a PNG heatmap.
///
/// The first row is drawn at the top. Missing values are drawn gray.
pub fn render<P>(dst: P, matrix: &Matrix<Option<f64>>, options: &Options) -> Result<(), RenderError>
where
    P: AsRef<Path>,
{
    let (row_count, column_count) = matrix.dim();

    if row_count == 0 || column_count == 0 {
        return Err(RenderError::EmptyMatrix);
    }

    let overrides = label_colors::resolve(
        &options.label_colors,
        matrix.row_names(),
        matrix.column_names(),
    )?;

    let y_label_area_size = if options.hide_row_labels {
        0
    } else {
        label_area_size(matrix.row_names())
    };

    let x_label_area_size = if options.hide_column_labels {
        0
    } else {
        label_area_size(matrix.column_names())
    };

    let (grid_width, grid_height) = grid_size(row_count, column_count)?;
    let width = 2 * MARGIN + y_label_area_size + grid_width + LEGEND_WIDTH;
    let height = 2 * MARGIN + x_label_area_size + grid_height;

    let scale = Scale::from_values(matrix.data().iter());

    let root = BitMapBackend::new(dst.as_ref(), (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let (grid_area, legend_area) = root.split_horizontally(width - LEGEND_WIDTH);

    let grid_area = grid_area.margin(
        MARGIN,
        MARGIN + x_label_area_size,
        MARGIN + y_label_area_size,
        0,
    );

    let chart = ChartBuilder::on(&grid_area)
        .build_cartesian_2d(0..column_count, 0..row_count)
        .map_err(draw_error)?;

    let plotting_area = chart.plotting_area();

    for ((i, j), value) in matrix.data().indexed_iter() {
        let y = row_count - 1 - i;

        let color = match value {
            Some(n) => options.palette.color_at(scale.normalize(*n)),
            None => MISSING_COLOR,
        };

        plotting_area
            .draw(&Rectangle::new([(j, y), (j + 1, y + 1)], color.filled()))
            .map_err(draw_error)?;
    }

    if !options.hide_row_labels {
        for (i, name) in matrix.row_names().iter().enumerate() {
            let y = row_count - 1 - i;
            let (left, top) = chart.backend_coord(&(0, y + 1));
            let (_, bottom) = chart.backend_coord(&(0, y));

            let color = overrides.rows.get(&i).copied().unwrap_or(LABEL_COLOR);
            let style = TextStyle::from((FONT_FAMILY, FONT_SIZE).into_font())
                .color(&color)
                .pos(Pos::new(HPos::Right, VPos::Center));

            root.draw(&Text::new(
                name.clone(),
                (left - LABEL_PADDING, (top + bottom) / 2),
                style,
            ))
            .map_err(draw_error)?;
        }
    }

    if !options.hide_column_labels {
        for (j, name) in matrix.column_names().iter().enumerate() {
            let (left, bottom) = chart.backend_coord(&(j, 0));
            let (right, _) = chart.backend_coord(&(j + 1, 0));

            let color = overrides.columns.get(&j).copied().unwrap_or(LABEL_COLOR);
            let style = TextStyle::from(
                (FONT_FAMILY, FONT_SIZE)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .color(&color)
            .pos(Pos::new(HPos::Left, VPos::Center));

            root.draw(&Text::new(
                name.clone(),
                ((left + right) / 2, bottom + LABEL_PADDING),
                style,
            ))
            .map_err(draw_error)?;
        }
    }

    draw_legend(&legend_area, options.palette, scale)?;

    root.present().map_err(draw_error)?;

    info!(
        dst = ?dst.as_ref(),
        row_count,
        column_count,
        palette = %options.palette,
        "rendered heatmap"
    );

    Ok(())
}

/// Returns the grid width and height in pixels.
///
/// Each axis gets the largest cell size (at most `MAX_CELL_SIZE`) that keeps it within
/// `MAX_GRID_EXTENT`. Rows and columns are sized independently.
fn grid_size(row_count: usize, column_count: usize) -> Result<(u32, u32), RenderError> {
    let extent = |n: usize| {
        let n = u32::try_from(n).ok().filter(|&n| n <= MAX_GRID_EXTENT)?;
        let cell_size = (MAX_GRID_EXTENT / n.max(1)).min(MAX_CELL_SIZE);
        Some(n * cell_size)
    };

    match (extent(column_count), extent(row_count)) {
        (Some(width), Some(height)) => Ok((width, height)),
        _ => Err(RenderError::MatrixTooLarge(row_count, column_count)),
    }
}

/// Estimates the space needed to draw the longest label.
fn label_area_size(names: &[String]) -> u32 {
    let char_count = names
        .iter()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0);

    let text_width = (char_count as f64 * FONT_SIZE * CHAR_WIDTH_RATIO).ceil() as u32;
    let size = text_width + 2 * LABEL_PADDING.unsigned_abs();

    size.clamp(MIN_LABEL_AREA_SIZE, MAX_LABEL_AREA_SIZE)
}

fn draw_legend(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    palette: Palette,
    scale: Scale,
) -> Result<(), RenderError> {
    let mut chart = ChartBuilder::on(area)
        .margin(MARGIN)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, scale.min..scale.max)
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .label_style((FONT_FAMILY, FONT_SIZE))
        .draw()
        .map_err(draw_error)?;

    let step = (scale.max - scale.min) / GRADIENT_STEP_COUNT as f64;

    chart
        .draw_series((0..GRADIENT_STEP_COUNT).map(|k| {
            let t = k as f64 / (GRADIENT_STEP_COUNT - 1) as f64;
            let bottom = scale.min + step * k as f64;
            let color = palette.color_at(t);
            Rectangle::new([(0.0, bottom), (1.0, bottom + step)], color.filled())
        }))
        .map_err(draw_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ndarray::Array2;
    use tempfile::TempDir;

    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| String::from(*name)).collect()
    }

    fn numbered_names(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    // Reads the width and height from the PNG header (IHDR).
    fn read_png_size<P>(src: P) -> Result<(u32, u32), Box<dyn std::error::Error>>
    where
        P: AsRef<Path>,
    {
        let data = fs::read(src)?;

        assert_eq!(data.get(..8), Some(&PNG_SIGNATURE[..]));

        let width = u32::from_be_bytes(data[16..20].try_into()?);
        let height = u32::from_be_bytes(data[20..24].try_into()?);

        Ok((width, height))
    }

    #[test]
    fn test_scale_from_values() {
        let values = [Some(2.0), None, Some(0.5), Some(4.0)];
        assert_eq!(Scale::from_values(&values), Scale { min: 0.5, max: 4.0 });

        let values = [Some(3.0), Some(3.0)];
        assert_eq!(Scale::from_values(&values), Scale { min: 3.0, max: 4.0 });

        let values = [None, None];
        assert_eq!(Scale::from_values(&values), Scale { min: 0.0, max: 1.0 });
    }

    #[test]
    fn test_scale_normalize() {
        let scale = Scale { min: 1.0, max: 5.0 };
        assert_eq!(scale.normalize(1.0), 0.0);
        assert_eq!(scale.normalize(3.0), 0.5);
        assert_eq!(scale.normalize(5.0), 1.0);
    }

    #[test]
    fn test_grid_size() {
        assert!(matches!(grid_size(2, 3), Ok((48, 32))));
        assert!(matches!(grid_size(5000, 10), Ok((160, 5000))));
        assert!(matches!(grid_size(1024, 8192), Ok((8192, 8192))));
        assert!(matches!(
            grid_size(8193, 3),
            Err(RenderError::MatrixTooLarge(8193, 3))
        ));
        assert!(matches!(
            grid_size(1 << 20, 3),
            Err(RenderError::MatrixTooLarge(_, 3))
        ));
    }

    #[test]
    fn test_label_area_size() {
        // 2 * 12 * 0.6 + 8 = 22.4, rounded up
        assert_eq!(label_area_size(&names(&["S1", "S2"])), 23);
        // 24 * 12 * 0.6 + 8 = 180.8, rounded up
        assert_eq!(
            label_area_size(&names(&["accA", "GCF_000005845.2_ASM584v2"])),
            181
        );
        assert_eq!(label_area_size(&names(&["a"])), MIN_LABEL_AREA_SIZE);
        assert_eq!(label_area_size(&names(&["x".repeat(200).as_str()])), MAX_LABEL_AREA_SIZE);
        assert_eq!(label_area_size(&[]), MIN_LABEL_AREA_SIZE);
    }

    #[test]
    fn test_render_with_empty_matrix() -> Result<(), crate::matrix::MatrixError> {
        let matrix = Matrix::new(Vec::new(), Vec::new(), ndarray::Array2::from_elem((0, 0), None))?;

        assert!(matches!(
            render("unused.png", &matrix, &Options::default()),
            Err(RenderError::EmptyMatrix)
        ));

        Ok(())
    }

    #[test]
    fn test_render_with_invalid_label_colors() -> Result<(), crate::matrix::MatrixError> {
        let matrix = Matrix::new(
            vec![String::from("accA")],
            vec![String::from("S1")],
            ndarray::array![[Some(1.0)]],
        )?;

        let options = Options {
            label_colors: vec![LabelColor {
                label: String::from("accA"),
                index: 1,
                color: RED,
            }],
            ..Default::default()
        };

        assert!(matches!(
            render("unused.png", &matrix, &options),
            Err(RenderError::InvalidLabelColors(
                ResolveError::IndexOutOfBounds { index: 1, len: 1, .. }
            ))
        ));

        Ok(())
    }

    #[test]
    fn test_render() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;

        let matrix = Matrix::new(
            names(&["accA", "accB"]),
            names(&["S1", "S2", "S3"]),
            ndarray::array![
                [Some(0.0), Some(1.5), None],
                [Some(3.0), Some(4.5), Some(6.0)]
            ],
        )?;

        let dst = tmp.path().join("hidden.png");

        let options = Options {
            palette: Palette::Viridis,
            hide_column_labels: true,
            hide_row_labels: true,
            ..Default::default()
        };

        render(&dst, &matrix, &options)?;

        // 3 × 16 px wide and 2 × 16 px high, without label areas
        assert_eq!(
            read_png_size(&dst)?,
            (2 * MARGIN + 48 + LEGEND_WIDTH, 2 * MARGIN + 32)
        );

        let dst = tmp.path().join("labeled.png");

        let options = Options {
            palette: Palette::Red,
            label_colors: vec![
                LabelColor {
                    label: String::from("accB"),
                    index: 1,
                    color: BLUE,
                },
                LabelColor {
                    label: String::from("S3"),
                    index: 2,
                    color: GREEN,
                },
            ],
            ..Default::default()
        };

        render(&dst, &matrix, &options)?;

        let y_label_area_size = label_area_size(matrix.row_names());
        let x_label_area_size = label_area_size(matrix.column_names());

        assert_eq!(
            read_png_size(&dst)?,
            (
                2 * MARGIN + y_label_area_size + 48 + LEGEND_WIDTH,
                2 * MARGIN + x_label_area_size + 32
            )
        );

        Ok(())
    }

    #[test]
    fn test_render_with_many_rows() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;

        let matrix = Matrix::new(
            numbered_names("acc", 5000),
            numbered_names("S", 10),
            Array2::from_elem((5000, 10), Some(1.0)),
        )?;

        let dst = tmp.path().join("tall.png");
        render(&dst, &matrix, &Options::default())?;

        let (_, height) = read_png_size(&dst)?;
        assert!(height >= 5000);

        Ok(())
    }
}
