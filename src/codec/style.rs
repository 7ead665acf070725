use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use image::Rgb;

use crate::error::{Result, StudioError};

/// Allowed pixel size of one QR module.
pub const MODULE_SIZE_RANGE: RangeInclusive<u32> = 5..=20;

/// Allowed width of the light border, in modules.
pub const BORDER_RANGE: RangeInclusive<u32> = 1..=10;

/// An sRGB colour written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const BLACK: Self = Self([0, 0, 0]);
    pub const WHITE: Self = Self([0xFF, 0xFF, 0xFF]);

    pub const fn rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

fn invalid_color(s: &str) -> StudioError {
    StudioError::InvalidStyle(format!(
        "invalid colour {s:?} (expected #RRGGBB or #RGB)"
    ))
}

/// Accepts `#RRGGBB`, `RRGGBB` and the shorthand `#RGB`.
impl FromStr for HexColor {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid_color(s));
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map_err(|_| invalid_color(s));
        match hex.len() {
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid_color(s));
                Ok(Self([byte(0)?, byte(2)?, byte(4)?]))
            }
            3 => Ok(Self([nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17])),
            _ => Err(invalid_color(s)),
        }
    }
}

impl TryFrom<String> for HexColor {
    type Error = StudioError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

/// Cosmetic options for a generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StyleOptions {
    /// Colour of dark modules.
    pub module_color: HexColor,
    /// Colour of light modules and the border.
    pub background_color: HexColor,
    /// Edge length of one module in pixels.
    pub module_size: u32,
    /// Border width in modules.
    pub border: u32,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            module_color: HexColor::BLACK,
            background_color: HexColor::WHITE,
            module_size: 10,
            border: 4,
        }
    }
}

impl StyleOptions {
    /// Check that size and border are inside their allowed ranges.
    ///
    /// # Errors
    ///
    /// Returns [`StudioError::InvalidStyle`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !MODULE_SIZE_RANGE.contains(&self.module_size) {
            return Err(StudioError::InvalidStyle(format!(
                "module size {} outside {}..={}",
                self.module_size,
                MODULE_SIZE_RANGE.start(),
                MODULE_SIZE_RANGE.end()
            )));
        }
        if !BORDER_RANGE.contains(&self.border) {
            return Err(StudioError::InvalidStyle(format!(
                "border {} outside {}..={}",
                self.border,
                BORDER_RANGE.start(),
                BORDER_RANGE.end()
            )));
        }
        Ok(())
    }
}
