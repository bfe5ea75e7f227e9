//! Length units and colors.
//!
//! OOXML measures geometry in English Metric Units (EMU): 914400 per inch,
//! 12700 per point. Tool callers work in inches and points, so conversions
//! happen at the edges and the model stores EMU.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_POINT: i64 = 12_700;

/// Default slide width (10 in).
pub const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;
/// Default slide height (7.5 in).
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;

pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

pub fn points(value: f64) -> i64 {
    (value * EMU_PER_POINT as f64).round() as i64
}

pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

pub fn emu_to_points(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT as f64
}

/// An sRGB color.
///
/// Serialized as a `#RRGGBB` string so template libraries stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `[R, G, B]` list supplied by a caller.
    ///
    /// Rejects lists that are not exactly three components or that hold
    /// values outside 0-255.
    pub fn from_components(components: &[i64]) -> Result<Self> {
        if !is_valid_rgb(components) {
            return Err(Error::invalid(format!(
                "Invalid color {components:?}: must be a valid RGB list [R, G, B] with values 0-255"
            )));
        }
        Ok(Self::new(
            components[0] as u8,
            components[1] as u8,
            components[2] as u8,
        ))
    }

    /// Parse `RRGGBB` or `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    /// Uppercase `RRGGBB` as written to `a:srgbClr/@val`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl TryFrom<String> for RgbColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        RgbColor::from_hex(&value).ok_or_else(|| format!("invalid color '{value}'"))
    }
}

impl From<RgbColor> for String {
    fn from(color: RgbColor) -> Self {
        color.to_string()
    }
}

/// True when `components` is a three-element list of values in 0-255.
pub fn is_valid_rgb(components: &[i64]) -> bool {
    components.len() == 3 && components.iter().all(|c| (0..=255).contains(c))
}
