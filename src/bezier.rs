//! Cubic Bézier segments.
//!
//! Mesh sides are cubic Bézier curves.  Splitting a row or column of
//! patches subdivides every curve that crosses it with de Casteljau's
//! algorithm, which leaves the shape of the curve unchanged.

use crate::point::Point;

/// A cubic Bézier segment from `p0` to `p3` with control points `p1` and `p2`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct CubicBezier {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBezier {
    #[inline]
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> CubicBezier {
        CubicBezier { p0, p1, p2, p3 }
    }

    /// A straight segment with its control points at the thirds.
    pub fn line(from: Point, to: Point) -> CubicBezier {
        let s = (to - from) / 3.0;
        CubicBezier::new(from, from + s, to - s, to)
    }

    /// Approximates the elliptical arc of `center` and radii `rx`, `ry`
    /// going from angle `start` to angle `end` (radians).
    ///
    /// Good to well under a pixel for arcs up to a quarter turn.
    pub fn arc(center: Point, rx: f64, ry: f64, start: f64, end: f64) -> CubicBezier {
        let kappa = 4.0 / 3.0 * ((end - start) / 4.0).tan();
        let (s0, c0) = start.sin_cos();
        let (s1, c1) = end.sin_cos();

        let p0 = center + Point::new(rx * c0, ry * s0);
        let p3 = center + Point::new(rx * c1, ry * s1);

        CubicBezier::new(
            p0,
            p0 + Point::new(-rx * kappa * s0, ry * kappa * c0),
            p3 + Point::new(rx * kappa * s1, -ry * kappa * c1),
            p3,
        )
    }

    #[inline]
    pub fn from_points(p: [Point; 4]) -> CubicBezier {
        CubicBezier::new(p[0], p[1], p[2], p[3])
    }

    #[inline]
    pub fn points(&self) -> [Point; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    pub fn point_at(&self, t: f64) -> Point {
        self.subdivide(t).0.p3
    }

    /// Splits the curve at parameter `t` into two curves that together
    /// trace the same path.
    pub fn subdivide(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let p01 = Point::lerp(self.p0, self.p1, t);
        let p12 = Point::lerp(self.p1, self.p2, t);
        let p23 = Point::lerp(self.p2, self.p3, t);

        let p012 = Point::lerp(p01, p12, t);
        let p123 = Point::lerp(p12, p23, t);

        let mid = Point::lerp(p012, p123, t);

        (
            CubicBezier::new(self.p0, p01, p012, mid),
            CubicBezier::new(mid, p123, p23, self.p3),
        )
    }
}
