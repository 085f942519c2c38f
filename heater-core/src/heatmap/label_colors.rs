//! Per-label color overrides.
//!
//! A label colors file has three tab-separated columns and no header: the label (e.g., an
//! accession), its 0-based position on the rendered axis, and a color, either hexadecimal
//! (`#990000`, `#990000ff`) or a basic color name (`blue`).
//!
//! ```text
//! 2503754001	0	#990000
//! 2706794856	1	blue
//! ```

use std::{
    collections::HashMap,
    io::{self, BufRead},
    num,
};

use plotters::style::RGBColor;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, PartialEq)]
pub struct LabelColor {
    pub label: String,
    pub index: usize,
    pub color: RGBColor,
}

#[derive(Debug, Error)]
pub enum ReadLabelColorsError {
    #[error("I/O error")]
    Io(#[from] io::Error),
    #[error("invalid record at line {line_number}")]
    InvalidRecord {
        line_number: usize,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("invalid column count: expected 3, got {0}")]
    InvalidColumnCount(usize),
    #[error("missing label")]
    MissingLabel,
    #[error("invalid index")]
    InvalidIndex(#[source] num::ParseIntError),
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

pub fn read<R>(reader: &mut R) -> Result<Vec<LabelColor>, ReadLabelColorsError>
where
    R: BufRead,
{
    let mut label_colors = Vec::new();

    for (i, result) in reader.lines().enumerate() {
        let line = result?;

        if line.trim().is_empty() {
            continue;
        }

        let label_color = parse_line(&line).map_err(|source| {
            ReadLabelColorsError::InvalidRecord {
                line_number: i + 1,
                source,
            }
        })?;

        label_colors.push(label_color);
    }

    Ok(label_colors)
}

fn parse_line(s: &str) -> Result<LabelColor, ParseError> {
    const DELIMITER: char = '\t';

    let fields: Vec<_> = s.trim_end().split(DELIMITER).collect();

    let [raw_label, raw_index, raw_color] = fields[..] else {
        return Err(ParseError::InvalidColumnCount(fields.len()));
    };

    let label = raw_label.trim();

    if label.is_empty() {
        return Err(ParseError::MissingLabel);
    }

    let index: usize = raw_index.trim().parse().map_err(ParseError::InvalidIndex)?;

    let raw_color = raw_color.trim();
    let color = parse_color(raw_color).ok_or_else(|| ParseError::InvalidColor(raw_color.into()))?;

    Ok(LabelColor {
        label: label.into(),
        index,
        color,
    })
}

/// Parses a hexadecimal (`#rrggbb` or `#rrggbbaa`) or named color.
///
/// The alpha channel is ignored.
pub fn parse_color(s: &str) -> Option<RGBColor> {
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let color = match s.to_ascii_lowercase().as_str() {
        "black" | "k" => RGBColor(0x00, 0x00, 0x00),
        "white" | "w" => RGBColor(0xff, 0xff, 0xff),
        "red" | "r" => RGBColor(0xff, 0x00, 0x00),
        "green" | "g" => RGBColor(0x00, 0x80, 0x00),
        "blue" | "b" => RGBColor(0x00, 0x00, 0xff),
        "cyan" | "c" => RGBColor(0x00, 0xbf, 0xbf),
        "magenta" | "m" => RGBColor(0xbf, 0x00, 0xbf),
        "yellow" | "y" => RGBColor(0xbf, 0xbf, 0x00),
        "gray" | "grey" => RGBColor(0x80, 0x80, 0x80),
        "orange" => RGBColor(0xff, 0xa5, 0x00),
        "purple" => RGBColor(0x80, 0x00, 0x80),
        "brown" => RGBColor(0xa5, 0x2a, 0x2a),
        "pink" => RGBColor(0xff, 0xc0, 0xcb),
        "navy" => RGBColor(0x00, 0x00, 0x80),
        "teal" => RGBColor(0x00, 0x80, 0x80),
        "olive" => RGBColor(0x80, 0x80, 0x00),
        "maroon" => RGBColor(0x80, 0x00, 0x00),
        _ => return None,
    };

    Some(color)
}

fn parse_hex_color(s: &str) -> Option<RGBColor> {
    if !matches!(s.len(), 6 | 8) || !s.is_ascii() {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();

    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Label color overrides resolved against the rendered axes, keyed by position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub rows: HashMap<usize, RGBColor>,
    pub columns: HashMap<usize, RGBColor>,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ResolveError {
    #[error("index out of bounds for label {label}: expected < {len}, got {index}")]
    IndexOutOfBounds {
        label: String,
        index: usize,
        len: usize,
    },
}

/// Assigns each label color to the axis that contains its label, rows first.
///
/// The index is the authoritative position on that axis. Labels that are on neither axis are
/// skipped.
pub fn resolve(
    label_colors: &[LabelColor],
    row_names: &[String],
    column_names: &[String],
) -> Result<Overrides, ResolveError> {
    let mut overrides = Overrides::default();

    for label_color in label_colors {
        let label = label_color.label.as_str();

        let (names, dst) = if row_names.iter().any(|name| name == label) {
            (row_names, &mut overrides.rows)
        } else if column_names.iter().any(|name| name == label) {
            (column_names, &mut overrides.columns)
        } else {
            warn!(label, "skipping label color: label is not on any axis");
            continue;
        };

        let index = label_color.index;

        let Some(name) = names.get(index) else {
            return Err(ResolveError::IndexOutOfBounds {
                label: label.into(),
                index,
                len: names.len(),
            });
        };

        if name != label {
            warn!(
                label,
                index,
                name = name.as_str(),
                "label color index points at a different label"
            );
        }

        dst.insert(index, label_color.color);
    }

    Ok(overrides)
}
