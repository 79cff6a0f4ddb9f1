//! Opacities and color channels, which live in [0.0, 1.0].
//!
//! `stop-opacity` accepts a number or a percentage; anything outside the
//! range is clamped rather than rejected.  Channels are quantized to
//! bytes when a color table is filled.

use cssparser::Parser;

use crate::error::*;
use crate::parsers::{NumberOrPercentage, Parse};
use crate::util;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UnitInterval(pub f64);

impl UnitInterval {
    /// NaN has no meaningful position in the range and is taken as 0.
    pub fn clamp(val: f64) -> UnitInterval {
        if val.is_nan() {
            UnitInterval(0.0)
        } else {
            UnitInterval(util::clamp(val, 0.0, 1.0))
        }
    }
}

impl Parse for UnitInterval {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<UnitInterval, ParseError<'i>> {
        let n = NumberOrPercentage::parse(parser)?;
        Ok(UnitInterval::clamp(n.value))
    }
}

/// Rounds to the nearest byte, with halves going up.
impl From<UnitInterval> for u8 {
    fn from(val: UnitInterval) -> u8 {
        (val.0 * 255.0 + 0.5).floor() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_opacity_is_clamped() {
        assert_eq!(UnitInterval::parse_str("0.25"), Ok(UnitInterval(0.25)));
        assert_eq!(UnitInterval::parse_str("25%"), Ok(UnitInterval(0.25)));
        assert_eq!(UnitInterval::parse_str("-0.5"), Ok(UnitInterval(0.0)));
        assert_eq!(UnitInterval::parse_str("200%"), Ok(UnitInterval(1.0)));
        assert_eq!(UnitInterval::clamp(f64::NAN), UnitInterval(0.0));
    }

    #[test]
    fn garbage_opacity_is_an_error() {
        assert!(UnitInterval::parse_str("").is_err());
        assert!(UnitInterval::parse_str("half").is_err());
        assert!(UnitInterval::parse_str("0.5 0.5").is_err());
    }

    #[test]
    fn channels_round_to_nearest_byte() {
        assert_eq!(u8::from(UnitInterval(0.0)), 0);
        assert_eq!(u8::from(UnitInterval(0.2)), 51);
        assert_eq!(u8::from(UnitInterval(0.5)), 128);
        assert_eq!(u8::from(UnitInterval(2.0 / 3.0)), 170);
        assert_eq!(u8::from(UnitInterval(1.0)), 255);
    }
}
