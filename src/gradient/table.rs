//! Sampled color tables for gradient vectors.
//!
//! The table holds one full period of the gradient as seen through its
//! spread method.  Every cell is the exact average of the piecewise-linear
//! color ramp over the width of the cell, not a point sample, so that hard
//! stops and narrow ramps do not alias when the table is resampled.

use rgb::RGBA8;

use crate::color::RgbColor;
use crate::util::{clamp, lerp};

use super::stops::Stop;
use super::SpreadMethod;

/// Number of cells in a color table.
pub const VECTOR_LENGTH: usize = 1024;

/// Color ramp as (offset, [r, g, b, a]) points.
type Ramp = Vec<(f64, [f64; 4])>;

#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    spread: SpreadMethod,
    cells: Vec<RGBA8>,
}

impl ColorTable {
    /// Builds the table for a normalized stop list.
    ///
    /// For `Pad` and `Repeat` cell `k` is centered on offset `k / (N - 1)`.
    /// For `Reflect` the table spans the mirrored period 0 → 1 → 0, so the
    /// first and last cells are the same.
    pub fn new(stops: &[Stop], spread: SpreadMethod, current_color: RgbColor) -> ColorTable {
        assert!(!stops.is_empty(), "color table needs a normalized stop list");

        let ramp: Ramp = stops
            .iter()
            .map(|s| {
                let c = s.rgb(current_color);
                (s.offset, [c.r, c.g, c.b, s.opacity])
            })
            .collect();

        let period = match spread {
            SpreadMethod::Reflect => 2.0,
            SpreadMethod::Pad | SpreadMethod::Repeat => 1.0,
        };

        let last = (VECTOR_LENGTH - 1) as f64;
        let width = period / last;

        let cells = (0..VECTOR_LENGTH)
            .map(|k| {
                let center = period * k as f64 / last;

                let mut sum = [0.0; 4];
                integrate_spread(&ramp, spread, center - width / 2.0, center + width / 2.0, &mut sum);

                quantize(sum.map(|v| v / width))
            })
            .collect();

        ColorTable { spread, cells }
    }

    pub fn spread(&self) -> SpreadMethod {
        self.spread
    }

    pub fn as_slice(&self) -> &[RGBA8] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Color at offset `t` along the gradient, with `t` outside [0, 1]
    /// mapped through the spread method.  Picks the nearest cell.
    pub fn sample_at(&self, t: f64) -> RGBA8 {
        self.cells[cell_index(self.spread, t)]
    }
}

fn cell_index(spread: SpreadMethod, t: f64) -> usize {
    let u = match spread {
        SpreadMethod::Pad => clamp(t, 0.0, 1.0),
        SpreadMethod::Repeat => t.rem_euclid(1.0),
        SpreadMethod::Reflect => t.rem_euclid(2.0) / 2.0,
    };

    if !u.is_finite() {
        return 0;
    }

    let last = VECTOR_LENGTH - 1;
    ((u * last as f64).round() as usize).min(last)
}

fn quantize(c: [f64; 4]) -> RGBA8 {
    let [r, g, b, a] = c;
    RgbColor::new(r, g, b).to_rgba8(a)
}

fn add_constant(sum: &mut [f64; 4], color: &[f64; 4], length: f64) {
    for (s, c) in sum.iter_mut().zip(color) {
        *s += c * length;
    }
}

/// Adds the integral of the ramp over [lo, hi] ⊂ [0, 1] to `sum`.
fn integrate(ramp: &[(f64, [f64; 4])], lo: f64, hi: f64, sum: &mut [f64; 4]) {
    for pair in ramp.windows(2) {
        let (o0, c0) = pair[0];
        let (o1, c1) = pair[1];

        let a = lo.max(o0);
        let b = hi.min(o1);

        // Zero-width intervals are hard stops; they cover nothing.
        if b <= a || o1 <= o0 {
            continue;
        }

        let ta = (a - o0) / (o1 - o0);
        let tb = (b - o0) / (o1 - o0);

        for ch in 0..4 {
            let va = lerp(c0[ch], c1[ch], ta);
            let vb = lerp(c0[ch], c1[ch], tb);
            sum[ch] += (va + vb) / 2.0 * (b - a);
        }
    }
}

/// Adds the integral over [a, b] of the ramp as extended by `spread`.
fn integrate_spread(ramp: &[(f64, [f64; 4])], spread: SpreadMethod, a: f64, b: f64, sum: &mut [f64; 4]) {
    match spread {
        SpreadMethod::Pad => {
            if let (Some((_, first)), Some((_, last))) = (ramp.first(), ramp.last()) {
                if a < 0.0 {
                    add_constant(sum, first, b.min(0.0) - a);
                }
                if b > 1.0 {
                    add_constant(sum, last, b - a.max(1.0));
                }
            }

            integrate(ramp, a.max(0.0), b.min(1.0), sum);
        }

        SpreadMethod::Repeat | SpreadMethod::Reflect => {
            let mut x = a;

            while x < b {
                let period = x.floor();
                let end = b.min(period + 1.0);
                let (lo, hi) = (x - period, end - period);

                if spread == SpreadMethod::Reflect && (period as i64).rem_euclid(2) == 1 {
                    integrate(ramp, 1.0 - hi, 1.0 - lo, sum);
                } else {
                    integrate(ramp, lo, hi, sum);
                }

                x = end;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::{normalize_stops, StopDeclaration};

    fn red() -> RgbColor {
        RgbColor::new(1.0, 0.0, 0.0)
    }

    fn blue() -> RgbColor {
        RgbColor::new(0.0, 0.0, 1.0)
    }

    fn red_to_blue() -> Vec<Stop> {
        normalize_stops(&[
            StopDeclaration::new(0.0, red(), 1.0),
            StopDeclaration::new(1.0, blue(), 1.0),
        ])
    }

    fn close(a: RGBA8, b: RGBA8) -> bool {
        let d = |x: u8, y: u8| (i16::from(x) - i16::from(y)).abs() <= 1;
        d(a.r, b.r) && d(a.g, b.g) && d(a.b, b.b) && d(a.a, b.a)
    }

    #[test]
    fn uniform_color_fills_table() {
        let stops = normalize_stops(&[StopDeclaration::new(0.5, RgbColor::new(0.0, 1.0, 0.0), 0.5)]);

        for spread in &[SpreadMethod::Pad, SpreadMethod::Reflect, SpreadMethod::Repeat] {
            let table = ColorTable::new(&stops, *spread, RgbColor::black());

            assert_eq!(table.len(), VECTOR_LENGTH);
            assert!(table
                .as_slice()
                .iter()
                .all(|c| *c == RGBA8::new(0, 255, 0, 128)));
        }
    }

    #[test]
    fn pad_ends_are_stop_colors() {
        let table = ColorTable::new(&red_to_blue(), SpreadMethod::Pad, RgbColor::black());
        let cells = table.as_slice();

        assert_eq!(cells[0], RGBA8::new(255, 0, 0, 255));
        assert_eq!(cells[VECTOR_LENGTH - 1], RGBA8::new(0, 0, 255, 255));

        // A linear ramp averages to its value at the cell center.
        assert_eq!(cells[341], RGBA8::new(170, 0, 85, 255));
    }

    #[test]
    fn hard_stop_is_averaged_over_cell() {
        let stops = normalize_stops(&[
            StopDeclaration::new(0.31, red(), 1.0),
            StopDeclaration::new(0.31, blue(), 1.0),
        ]);

        let table = ColorTable::new(&stops, SpreadMethod::Pad, RgbColor::black());
        let cells = table.as_slice();

        assert_eq!(cells[316], RGBA8::new(255, 0, 0, 255));
        assert_eq!(cells[318], RGBA8::new(0, 0, 255, 255));

        // 0.31 * 1023 = 317.13, so cell 317 is 63% red.
        let c = cells[317];
        assert!((160..=161).contains(&c.r));
        assert!((94..=95).contains(&c.b));
    }

    #[test]
    fn repeat_ends_are_equal() {
        let table = ColorTable::new(&red_to_blue(), SpreadMethod::Repeat, RgbColor::black());
        let cells = table.as_slice();

        assert!(close(cells[0], cells[VECTOR_LENGTH - 1]));

        // Half red and half blue.
        assert!(close(cells[0], RGBA8::new(128, 0, 128, 255)));
    }

    #[test]
    fn reflect_is_symmetric() {
        let table = ColorTable::new(&red_to_blue(), SpreadMethod::Reflect, RgbColor::black());
        let cells = table.as_slice();

        assert!(close(cells[0], cells[VECTOR_LENGTH - 1]));
        assert_eq!(cells[0], RGBA8::new(255, 0, 0, 255));

        for k in 0..VECTOR_LENGTH {
            assert!(close(cells[k], cells[VECTOR_LENGTH - 1 - k]));
        }
    }

    #[test]
    fn samples_through_spread() {
        let stops = red_to_blue();

        let pad = ColorTable::new(&stops, SpreadMethod::Pad, RgbColor::black());
        assert_eq!(pad.sample_at(-3.0), pad.as_slice()[0]);
        assert_eq!(pad.sample_at(7.0), pad.as_slice()[VECTOR_LENGTH - 1]);
        assert_eq!(pad.sample_at(f64::NAN), pad.as_slice()[0]);

        let repeat = ColorTable::new(&stops, SpreadMethod::Repeat, RgbColor::black());
        assert_eq!(repeat.sample_at(1.25), repeat.sample_at(0.25));
        assert_eq!(repeat.sample_at(-0.75), repeat.sample_at(0.25));

        let reflect = ColorTable::new(&stops, SpreadMethod::Reflect, RgbColor::black());
        assert!(close(reflect.sample_at(0.25), reflect.sample_at(1.75)));
        assert!(close(reflect.sample_at(0.25), reflect.sample_at(-0.25)));
        assert!(close(reflect.sample_at(0.25), pad.sample_at(0.25)));
    }

    #[test]
    fn current_color_is_resolved() {
        let stops = normalize_stops(&[StopDeclaration::from_attributes(
            Some("0"),
            Some("currentColor"),
            None,
        )]);

        let table = ColorTable::new(&stops, SpreadMethod::Pad, blue());
        assert_eq!(table.sample_at(0.5), RGBA8::new(0, 0, 255, 255));
    }
}
