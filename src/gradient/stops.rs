//! Stop declarations and their normalization into a gradient vector.

use crate::color::{parse_stop_color, RgbColor, StopColor};
use crate::gradmesh_log;
use crate::parsers::{NumberOrPercentage, Parse};
use crate::unit_interval::UnitInterval;
use crate::util::clamp;

/// A `<stop>` as declared, before normalization.
///
/// The offset may be outside [0, 1] or smaller than the offset of the
/// stop before it; [`normalize_stops`] takes care of that.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StopDeclaration {
    pub offset: f64,
    pub color: StopColor,
    pub opacity: f64,
}

impl StopDeclaration {
    pub fn new(offset: f64, color: RgbColor, opacity: f64) -> StopDeclaration {
        StopDeclaration {
            offset,
            color: StopColor::Specified(color),
            opacity,
        }
    }

    /// Builds a stop from its `offset`, `stop-color` and `stop-opacity`
    /// attribute values.
    ///
    /// Missing or invalid values fall back to offset 0, black, and full
    /// opacity.  The alpha of an `rgba()` color multiplies the opacity.
    pub fn from_attributes(
        offset: Option<&str>,
        color: Option<&str>,
        opacity: Option<&str>,
    ) -> StopDeclaration {
        let offset = match offset.map(NumberOrPercentage::parse_str) {
            Some(Ok(NumberOrPercentage { value })) => value,
            Some(Err(_)) => {
                gradmesh_log!("(ignoring invalid stop offset {:?})", offset.unwrap_or_default());
                0.0
            }
            None => 0.0,
        };

        let (color, alpha) = match color.map(parse_stop_color) {
            Some(Ok(c)) => c,
            Some(Err(_)) => {
                gradmesh_log!("(ignoring invalid stop-color {:?})", color.unwrap_or_default());
                (StopColor::default(), 1.0)
            }
            None => (StopColor::default(), 1.0),
        };

        let opacity = match opacity.map(UnitInterval::parse_str) {
            Some(Ok(UnitInterval(o))) => o,
            Some(Err(_)) => {
                gradmesh_log!("(ignoring invalid stop-opacity {:?})", opacity.unwrap_or_default());
                1.0
            }
            None => 1.0,
        };

        StopDeclaration {
            offset,
            color,
            opacity: opacity * alpha,
        }
    }
}

/// A stop of a normalized gradient vector.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stop {
    /// In [0, 1], and not smaller than the offset of the previous stop.
    pub offset: f64,
    pub color: StopColor,
    pub opacity: f64,
}

impl Stop {
    /// Color of the stop; `current_color` stands in for `currentColor`.
    #[inline]
    pub fn rgb(&self, current_color: RgbColor) -> RgbColor {
        self.color.resolve(current_color)
    }

    pub fn is_current_color(&self) -> bool {
        self.color.is_current_color()
    }
}

impl From<Stop> for StopDeclaration {
    fn from(s: Stop) -> StopDeclaration {
        StopDeclaration {
            offset: s.offset,
            color: s.color,
            opacity: s.opacity,
        }
    }
}

/// Turns declared stops into a gradient vector.
///
/// Each offset is raised to the offset of the stop before it and clamped
/// to [0, 1].  An empty list yields two transparent black stops.  The
/// first and last stops are repeated at offsets 0 and 1 when they do not
/// already lie there, so the result always covers the whole range.
pub fn normalize_stops(declared: &[StopDeclaration]) -> Vec<Stop> {
    let mut stops: Vec<Stop> = Vec::with_capacity(declared.len() + 2);

    for d in declared {
        let last_offset = stops.last().map(|s| s.offset).unwrap_or(0.0);

        let offset = if d.offset.is_nan() {
            last_offset
        } else {
            clamp(d.offset.max(last_offset), 0.0, 1.0)
        };

        let opacity = if d.opacity.is_nan() {
            1.0
        } else {
            clamp(d.opacity, 0.0, 1.0)
        };

        stops.push(Stop {
            offset,
            color: d.color,
            opacity,
        });
    }

    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (*first, *last),

        _ => {
            let transparent = Stop {
                offset: 0.0,
                color: StopColor::Specified(RgbColor::black()),
                opacity: 0.0,
            };

            return vec![
                transparent,
                Stop {
                    offset: 1.0,
                    ..transparent
                },
            ];
        }
    };

    if first.offset > 0.0 {
        stops.insert(0, Stop { offset: 0.0, ..first });
    }

    if last.offset < 1.0 {
        stops.push(Stop { offset: 1.0, ..last });
    }

    stops
}
