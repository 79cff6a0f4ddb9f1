//! Types for rectangles.

#[allow(clippy::module_inception)]
mod rect {
    use crate::float_eq::ApproxEqGeometry;
    use crate::point::Point;
    use core::ops::{Add, Sub};
    use num_traits::Zero;

    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rect<T> {
        pub x0: T,
        pub y0: T,
        pub x1: T,
        pub y1: T,
    }

    impl<T> Rect<T> {
        #[inline]
        pub fn new(x0: T, y0: T, x1: T, y1: T) -> Self {
            Self { x0, y0, x1, y1 }
        }
    }

    impl<T> Rect<T>
    where
        T: Copy + PartialOrd + PartialEq + Add<T, Output = T> + Sub<T, Output = T> + Zero,
    {
        #[inline]
        pub fn from_size(w: T, h: T) -> Self {
            Self {
                x0: Zero::zero(),
                y0: Zero::zero(),
                x1: w,
                y1: h,
            }
        }

        #[inline]
        pub fn width(&self) -> T {
            self.x1 - self.x0
        }

        #[inline]
        pub fn height(&self) -> T {
            self.y1 - self.y0
        }

        #[inline]
        pub fn contains(self, x: T, y: T) -> bool {
            x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
        }
    }

    impl Rect<f64> {
        /// A square of side `size` centered on `p`.
        #[inline]
        pub fn centered_at(p: Point, size: f64) -> Self {
            let h = size / 2.0;
            Self::new(p.x - h, p.y - h, p.x + h, p.y + h)
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.width().approx_eq_geom(0.0) || self.height().approx_eq_geom(0.0)
        }

        #[inline]
        pub fn center(&self) -> Point {
            Point::new((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
        }

        /// Corners in clockwise order starting at the top left.
        #[inline]
        pub fn corners(&self) -> [Point; 4] {
            [
                Point::new(self.x0, self.y0),
                Point::new(self.x1, self.y0),
                Point::new(self.x1, self.y1),
                Point::new(self.x0, self.y1),
            ]
        }
    }
}

pub type Rect = rect::Rect<f64>;

pub type IRect = rect::Rect<i32>;

impl From<Rect> for IRect {
    /// Rounds outwards, so the integer rectangle covers the original one.
    #[inline]
    fn from(r: Rect) -> Self {
        Self {
            x0: r.x0.floor() as i32,
            y0: r.y0.floor() as i32,
            x1: r.x1.ceil() as i32,
            y1: r.y1.ceil() as i32,
        }
    }
}
