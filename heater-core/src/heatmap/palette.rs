//! Named color gradients.
//!
//! Each palette runs from the color of the lowest value to the color of the highest value.

use std::{fmt, str::FromStr};

use plotters::style::RGBColor;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Palette {
    #[default]
    Plasma,
    Viridis,
    Blue,
    Red,
    Green,
}

impl Palette {
    pub const ALL: [Self; 5] = [
        Self::Plasma,
        Self::Viridis,
        Self::Blue,
        Self::Red,
        Self::Green,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plasma => "plasma",
            Self::Viridis => "viridis",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Green => "green",
        }
    }

    pub fn stops(&self) -> &'static [RGBColor] {
        match self {
            Self::Plasma => &PLASMA,
            Self::Viridis => &VIRIDIS,
            Self::Blue => &BLUE,
            Self::Red => &RED,
            Self::Green => &GREEN,
        }
    }

    /// Returns the color at position `t` in [0, 1] by linear interpolation between stops.
    ///
    /// `t` is clamped to [0, 1].
    pub fn color_at(&self, t: f64) -> RGBColor {
        let stops = self.stops();

        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let position = t * (stops.len() - 1) as f64;

        let i = position.floor() as usize;
        let j = (i + 1).min(stops.len() - 1);
        let fraction = position - i as f64;

        interpolate(stops[i], stops[j], fraction)
    }
}

fn interpolate(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    fn lerp(a: u8, b: u8, t: f64) -> u8 {
        let n = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
        n.round().clamp(0.0, 255.0) as u8
    }

    RGBColor(lerp(a.0, b.0, t), lerp(a.1, b.1, t), lerp(a.2, b.2, t))
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("invalid palette: {0} (expected one of plasma, viridis, blue, red, green)")]
pub struct ParsePaletteError(String);

impl FromStr for Palette {
    type Err = ParsePaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|palette| palette.name() == s)
            .ok_or_else(|| ParsePaletteError(s.into()))
    }
}

const PLASMA: [RGBColor; 20] = [
    RGBColor(0xff, 0xff, 0x99),
    RGBColor(0xef, 0xe3, 0x50),
    RGBColor(0xf7, 0xcb, 0x44),
    RGBColor(0xf9, 0xb6, 0x41),
    RGBColor(0xf9, 0xa2, 0x42),
    RGBColor(0xf6, 0x8f, 0x46),
    RGBColor(0xeb, 0x80, 0x55),
    RGBColor(0xde, 0x70, 0x65),
    RGBColor(0xcc, 0x6a, 0x70),
    RGBColor(0xb8, 0x62, 0x7d),
    RGBColor(0xa6, 0x5c, 0x85),
    RGBColor(0x90, 0x54, 0x8b),
    RGBColor(0x7e, 0x4e, 0x90),
    RGBColor(0x6b, 0x45, 0x96),
    RGBColor(0x59, 0x3d, 0x9c),
    RGBColor(0x40, 0x38, 0x91),
    RGBColor(0x25, 0x35, 0x82),
    RGBColor(0x13, 0x30, 0x6d),
    RGBColor(0x0c, 0x2a, 0x50),
    RGBColor(0x04, 0x23, 0x33),
];

const VIRIDIS: [RGBColor; 20] = [
    RGBColor(0xff, 0xff, 0x99),
    RGBColor(0xdc, 0xe3, 0x19),
    RGBColor(0xb8, 0xde, 0x29),
    RGBColor(0x95, 0xd8, 0x40),
    RGBColor(0x73, 0xd0, 0x55),
    RGBColor(0x55, 0xc6, 0x67),
    RGBColor(0x3c, 0xbb, 0x75),
    RGBColor(0x29, 0xaf, 0x7f),
    RGBColor(0x20, 0xa3, 0x87),
    RGBColor(0x1f, 0x96, 0x8b),
    RGBColor(0x23, 0x8a, 0x8d),
    RGBColor(0x28, 0x7d, 0x8e),
    RGBColor(0x2d, 0x70, 0x8e),
    RGBColor(0x33, 0x63, 0x8d),
    RGBColor(0x39, 0x56, 0x8c),
    RGBColor(0x40, 0x47, 0x88),
    RGBColor(0x45, 0x37, 0x81),
    RGBColor(0x48, 0x26, 0x77),
    RGBColor(0x48, 0x15, 0x67),
    RGBColor(0x44, 0x01, 0x54),
];

const BLUE: [RGBColor; 5] = [
    RGBColor(0x99, 0xff, 0xff),
    RGBColor(0x66, 0x99, 0xff),
    RGBColor(0x00, 0x00, 0xcc),
    RGBColor(0x00, 0x00, 0x99),
    RGBColor(0x00, 0x00, 0x66),
];

const RED: [RGBColor; 5] = [
    RGBColor(0xff, 0xcc, 0xcc),
    RGBColor(0xff, 0x66, 0x66),
    RGBColor(0xcc, 0x33, 0x33),
    RGBColor(0x99, 0x00, 0x00),
    RGBColor(0x66, 0x00, 0x00),
];

const GREEN: [RGBColor; 5] = [
    RGBColor(0xcc, 0xff, 0xcc),
    RGBColor(0x66, 0xcc, 0x66),
    RGBColor(0x33, 0x99, 0x33),
    RGBColor(0x00, 0x66, 0x00),
    RGBColor(0x00, 0x33, 0x00),
];
