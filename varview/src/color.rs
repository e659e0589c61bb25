//! Dimension colors and the shading used to tell branches and nesting apart.

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, Snafu};
use std::{fmt, num::ParseIntError, str::FromStr};

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ColorError {
    #[snafu(display("Unrecognized color {input:?}; expected rgb(r, g, b) or #rrggbb"))]
    Unrecognized { input: String },

    #[snafu(display("Invalid channel {channel:?} in color {input:?}"))]
    InvalidChannel {
        input: String,
        channel: String,
        source: ParseIntError,
    },
}

/// An opaque base color as picked for a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `1 + percent / 100`, truncating toward zero and
    /// clamping to `0..=255`.
    ///
    /// Integer arithmetic keeps the result exact: `rgb(127, 71, 62)` shaded by
    /// `+10` is `rgb(139, 78, 68)`.
    pub fn shade(self, percent: i16) -> Self {
        let scale = |channel: u8| -> u8 {
            let scaled = i32::from(channel) * (100 + i32::from(percent)) / 100;
            scaled.clamp(0, 255) as u8
        };
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    pub fn with_alpha(self, alpha: f32) -> Rgba {
        Rgba { rgb: self, alpha }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    /// Accepts `rgb(r, g, b)`, `rgba(r, g, b, a)` (alpha ignored) and `#rrggbb`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();

        if let Some(hex) = trimmed.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return UnrecognizedSnafu { input }.fail();
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&hex[range.clone()], 16).context(InvalidChannelSnafu {
                    input,
                    channel: &hex[range],
                })
            };
            return Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?));
        }

        let inner = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .context(UnrecognizedSnafu { input })?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() < 3 || parts.len() > 4 {
            return UnrecognizedSnafu { input }.fail();
        }
        let channel = |part: &str| {
            part.parse::<u8>()
                .context(InvalidChannelSnafu { input, channel: part })
        };
        Ok(Self::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
        ))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

/// A shaded color with the translucency applied to line backgrounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f32,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
        )
    }
}
