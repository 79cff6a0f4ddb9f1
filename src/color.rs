//! Colors for gradient stops and mesh corners.

use std::fmt;

use cssparser::Parser;
use rgb::RGBA8;

use crate::error::*;
use crate::parsers::Parse;
use crate::unit_interval::UnitInterval;
use crate::util::lerp;

pub use cssparser::Color;

impl Parse for cssparser::Color {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<cssparser::Color, ParseError<'i>> {
        Ok(cssparser::Color::parse(parser)?)
    }
}

/// An sRGB color with channels in the [0.0, 1.0] range.
///
/// Opacity is kept separately, next to the color, as the SVG stop and
/// mesh corner attributes do.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RgbColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbColor {
    #[inline]
    pub const fn new(r: f64, g: f64, b: f64) -> RgbColor {
        RgbColor { r, g, b }
    }

    #[inline]
    pub const fn black() -> RgbColor {
        RgbColor::new(0.0, 0.0, 0.0)
    }

    /// Color used when nothing better is known, such as for a freshly
    /// created mesh whose item has no fill.
    #[inline]
    pub const fn unset() -> RgbColor {
        RgbColor::new(0.5, 0.0, 0.5)
    }

    pub fn from_rgba8(c: RGBA8) -> (RgbColor, f64) {
        (
            RgbColor::new(
                f64::from(c.r) / 255.0,
                f64::from(c.g) / 255.0,
                f64::from(c.b) / 255.0,
            ),
            f64::from(c.a) / 255.0,
        )
    }

    pub fn to_rgba8(&self, opacity: f64) -> RGBA8 {
        RGBA8::new(
            u8::from(UnitInterval::clamp(self.r)),
            u8::from(UnitInterval::clamp(self.g)),
            u8::from(UnitInterval::clamp(self.b)),
            u8::from(UnitInterval::clamp(opacity)),
        )
    }

    #[inline]
    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn from_channels(c: [f64; 3]) -> RgbColor {
        RgbColor::new(c[0], c[1], c[2])
    }
}

impl From<cssparser::RGBA> for RgbColor {
    fn from(rgba: cssparser::RGBA) -> RgbColor {
        RgbColor::from_rgba8(RGBA8::new(rgba.red, rgba.green, rgba.blue, rgba.alpha)).0
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.to_rgba8(1.0);
        write!(f, "#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
    }
}

/// Interpolates between two colors; `t` = 0 gives `c1` and `t` = 1 gives `c2`.
pub fn average_color(c1: RgbColor, c2: RgbColor, t: f64) -> RgbColor {
    RgbColor::new(lerp(c1.r, c2.r, t), lerp(c1.g, c2.g, t), lerp(c1.b, c2.b, t))
}

/// The `stop-color` of a gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StopColor {
    /// Use the `color` in effect where the gradient is used.
    CurrentColor,

    Specified(RgbColor),
}

impl Default for StopColor {
    fn default() -> StopColor {
        StopColor::Specified(RgbColor::black())
    }
}

impl StopColor {
    #[inline]
    pub fn resolve(&self, current_color: RgbColor) -> RgbColor {
        match *self {
            StopColor::CurrentColor => current_color,
            StopColor::Specified(c) => c,
        }
    }

    #[inline]
    pub fn is_current_color(&self) -> bool {
        matches!(*self, StopColor::CurrentColor)
    }
}

/// Parses a CSS color into a stop color plus the alpha it carried, so
/// that `rgba()` values can be folded into the stop's opacity.
pub fn parse_stop_color(s: &str) -> Result<(StopColor, f64), ParseError<'_>> {
    match cssparser::Color::parse_str(s)? {
        Color::CurrentColor => Ok((StopColor::CurrentColor, 1.0)),
        Color::RGBA(rgba) => Ok((
            StopColor::Specified(RgbColor::from(rgba)),
            f64::from(rgba.alpha) / 255.0,
        )),
    }
}
