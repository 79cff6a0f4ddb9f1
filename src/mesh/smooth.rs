//! Smoothing the color transitions of a mesh.
//!
//! Colors of a mesh gradient are interpolated bilinearly inside each
//! patch, which shows creases at the patch boundaries.  Smoothing
//! subdivides every patch into `SMOOTH_SUBDIVISIONS` x
//! `SMOOTH_SUBDIVISIONS` smaller ones and colors the new corners from a
//! smooth interpolation of the original corner colors.  Geometry is not
//! changed.

use nalgebra::{SMatrix, SVector};
use once_cell::sync::Lazy;

use crate::color::RgbColor;
use crate::enum_default;
use crate::util::clamp;

use super::array::MeshNodeArray;

/// Number of patches each patch is divided into, along each direction.
pub const SMOOTH_SUBDIVISIONS: usize = 8;

/// How the slopes at the original corners are chosen for Hermite smoothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlopeKind {
    /// Zero slope at every corner.
    Flat,
    /// Catmull-Rom; the outer corners act as if they were doubled.
    CatmullRomDouble,
    /// Catmull-Rom; the outer corners act as if the colors were reflected
    /// about them.
    CatmullRomReflect,
    /// Catmull-Rom, with parabolas in the outer patches.
    Parabolic,
    /// Like `Parabolic`, but without overshooting the corner colors.
    Monotone,
}

enum_default!(SlopeKind, SlopeKind::Monotone);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SmoothingKind {
    /// One dimensional cubic Hermite interpolation, first down the rows
    /// and then across the columns.
    Hermite(SlopeKind),
    /// Bicubic interpolation of each patch from the colors and
    /// derivatives at its four corners.
    Bicubic,
}

enum_default!(SmoothingKind, SmoothingKind::Hermite(SlopeKind::Monotone));

impl MeshNodeArray {
    /// A copy of the mesh with every patch subdivided and the new corners
    /// colored by `kind`.
    pub fn smooth(&self, kind: SmoothingKind) -> MeshNodeArray {
        let mut smooth = self.clone();

        if self.is_empty() {
            return smooth;
        }

        match kind {
            SmoothingKind::Hermite(slopes) => {
                hermite_rows(&mut smooth, slopes);

                smooth.transpose();
                hermite_rows(&mut smooth, slopes);
                smooth.transpose();
            }

            SmoothingKind::Bicubic => bicubic(self, &mut smooth),
        }

        smooth.update_edges();
        smooth
    }
}

fn subdivide_rows(mesh: &mut MeshNodeArray) {
    // From the end, so the rows still to be split keep their index.
    for i in (0..mesh.patch_rows()).rev() {
        mesh.split_row(i, SMOOTH_SUBDIVISIONS - 1);
    }
}

fn hermite(p0: f64, p1: f64, m0: f64, m1: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;

    (2.0 * t3 - 3.0 * t2 + 1.0) * p0
        + (t3 - 2.0 * t2 + t) * m0
        + (-2.0 * t3 + 3.0 * t2) * p1
        + (t3 - t2) * m1
}

/// Slopes at the start and end of the interval from `p0` to `p1`, given
/// the values `pb` before and `pa` after it.
fn find_slopes(
    [pb, p0, p1, pa]: [f64; 4],
    is_first: bool,
    is_last: bool,
    kind: SlopeKind,
) -> (f64, f64) {
    let mut m0 = (p1 - pb) / 2.0;
    let mut m1 = (pa - p0) / 2.0;

    let parabolic = match kind {
        SlopeKind::Flat => return (0.0, 0.0),

        SlopeKind::CatmullRomDouble => {
            if is_first {
                m0 = (p1 - p0) / 2.0;
            }
            if is_last {
                m1 = (p1 - p0) / 2.0;
            }
            false
        }

        SlopeKind::CatmullRomReflect => {
            if is_first {
                m0 = p1 - p0;
            }
            if is_last {
                m1 = p1 - p0;
            }
            false
        }

        SlopeKind::Parabolic => true,

        SlopeKind::Monotone => {
            if (pb > p0 && p1 > p0) || (pb < p0 && p1 < p0) {
                // Extremum.
                m0 = 0.0;
            } else {
                m0 = limit_slope(m0, &[p1 - p0, p0 - pb]);
            }

            if (p0 > p1 && pa > p1) || (p0 < p1 && pa < p1) {
                m1 = 0.0;
            } else {
                m1 = limit_slope(m1, &[pa - p1, p1 - p0]);
            }
            true
        }
    };

    if parabolic {
        let d = p1 - p0;

        if is_first {
            m0 = 2.0 * d - m1;
            if (d < 0.0 && m0 > 0.0) || (d > 0.0 && m0 < 0.0) {
                m0 = 0.0;
            }
        } else if is_last {
            m1 = 2.0 * d - m0;
            if (d < 0.0 && m1 > 0.0) || (d > 0.0 && m1 < 0.0) {
                m1 = 0.0;
            }
        }
    }

    (m0, m1)
}

/// Caps `slope` at three times each of the given differences, so that
/// the cubic does not overshoot.
fn limit_slope(slope: f64, diffs: &[f64]) -> f64 {
    diffs.iter().fold(slope, |slope, d| {
        if slope.abs() > (3.0 * d).abs() {
            3.0 * d
        } else {
            slope
        }
    })
}

/// Subdivides every patch row and colors the new corners by Hermite
/// interpolation down each column of corners.
fn hermite_rows(mesh: &mut MeshNodeArray, slopes: SlopeKind) {
    let n = SMOOTH_SUBDIVISIONS;
    let rows = mesh.patch_rows();

    subdivide_rows(mesh);

    // Original corner row i is now at node row i * n * 3.
    for j in 0..mesh.patch_columns() + 1 {
        let col = j * 3;
        let color = |mesh: &MeshNodeArray, i: usize| mesh.nodes[i * n * 3][col].color.channels();

        for i in 0..rows {
            let is_first = i == 0;
            let is_last = i + 1 == rows;

            let p0 = color(mesh, i);
            let p1 = color(mesh, i + 1);

            let mut result = vec![[0.0; 3]; n];

            for c in 0..3 {
                // Missing neighbors are reflected about the end corners.
                let pb = if is_first {
                    2.0 * p0[c] - p1[c]
                } else {
                    color(mesh, i - 1)[c]
                };
                let pa = if is_last {
                    2.0 * p1[c] - p0[c]
                } else {
                    color(mesh, i + 2)[c]
                };

                let (m0, m1) = find_slopes([pb, p0[c], p1[c], pa], is_first, is_last, slopes);

                for (k, r) in result.iter_mut().enumerate().skip(1) {
                    let t = k as f64 / n as f64;
                    r[c] = clamp(hermite(p0[c], p1[c], m0, m1, t), 0.0, 1.0);
                }
            }

            for (k, r) in result.iter().enumerate().skip(1) {
                mesh.nodes[(i * n + k) * 3][col].color = RgbColor::from_channels(*r);
            }
        }
    }
}

/// Value and derivatives of one color channel at a corner: f, df/dx,
/// df/dy and d²f/dxdy, with x down the rows and y across the columns.
type CornerDerivatives = [f64; 4];

/// Slope at `p1` from its neighbors, flat at extrema and limited so as
/// not to overshoot.
fn find_slope1(p0: f64, p1: f64, p2: f64) -> f64 {
    if (p0 > p1 && p1 < p2) || (p0 < p1 && p1 > p2) {
        0.0
    } else {
        limit_slope((p2 - p0) / 2.0, &[p1 - p0, p2 - p1])
    }
}

/// Cross derivative at `p0` from its four diagonal neighbors.
fn find_slope2(pmm: f64, ppm: f64, pmp: f64, ppp: f64, p0: f64) -> f64 {
    let diagonals = [ppp, pmp, ppm, pmm];

    if diagonals.iter().all(|&p| p > p0) || diagonals.iter().all(|&p| p < p0) {
        0.0
    } else {
        let diffs: Vec<f64> = diagonals.iter().map(|p| p - p0).collect();
        limit_slope((ppp - ppm - pmp + pmm) / 4.0, &diffs)
    }
}

/// Turns values and derivatives at the corners of the unit square into
/// the coefficients of the bicubic polynomial; see
/// <https://en.wikipedia.org/wiki/Bicubic_interpolation>.
#[rustfmt::skip]
static BICUBIC: Lazy<SMatrix<f64, 16, 16>> = Lazy::new(|| {
    SMatrix::from_row_slice(&[
         1.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,
         0.0,  0.0,  0.0,  0.0,   1.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,
        -3.0,  3.0,  0.0,  0.0,  -2.0, -1.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,
         2.0, -2.0,  0.0,  0.0,   1.0,  1.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,
         0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   1.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,
         0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   1.0,  0.0,  0.0,  0.0,
         0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,  -3.0,  3.0,  0.0,  0.0,  -2.0, -1.0,  0.0,  0.0,
         0.0,  0.0,  0.0,  0.0,   0.0,  0.0,  0.0,  0.0,   2.0, -2.0,  0.0,  0.0,   1.0,  1.0,  0.0,  0.0,
        -3.0,  0.0,  3.0,  0.0,   0.0,  0.0,  0.0,  0.0,  -2.0,  0.0, -1.0,  0.0,   0.0,  0.0,  0.0,  0.0,
         0.0,  0.0,  0.0,  0.0,  -3.0,  0.0,  3.0,  0.0,   0.0,  0.0,  0.0,  0.0,  -2.0,  0.0, -1.0,  0.0,
         9.0, -9.0, -9.0,  9.0,   6.0,  3.0, -6.0, -3.0,   6.0, -6.0,  3.0, -3.0,   4.0,  2.0,  2.0,  1.0,
        -6.0,  6.0,  6.0, -6.0,  -3.0, -3.0,  3.0,  3.0,  -4.0,  4.0, -2.0,  2.0,  -2.0, -2.0, -1.0, -1.0,
         2.0,  0.0, -2.0,  0.0,   0.0,  0.0,  0.0,  0.0,   1.0,  0.0,  1.0,  0.0,   0.0,  0.0,  0.0,  0.0,
         0.0,  0.0,  0.0,  0.0,   2.0,  0.0, -2.0,  0.0,   0.0,  0.0,  0.0,  0.0,   1.0,  0.0,  1.0,  0.0,
        -6.0,  6.0,  6.0, -6.0,  -4.0, -2.0,  4.0,  2.0,  -3.0,  3.0, -3.0,  3.0,  -2.0, -1.0, -2.0, -1.0,
         4.0, -4.0, -4.0,  4.0,   2.0,  2.0, -2.0, -2.0,   2.0, -2.0,  2.0, -2.0,   1.0,  1.0,  1.0,  1.0,
    ])
});

fn bicubic_sum(alpha: &SVector<f64, 16>, x: f64, y: f64) -> f64 {
    let xs = [1.0, x, x * x, x * x * x];
    let ys = [1.0, y, y * y, y * y * y];

    (0..16).map(|i| alpha[i] * xs[i % 4] * ys[i / 4]).sum()
}

fn bicubic(source: &MeshNodeArray, smooth: &mut MeshNodeArray) {
    let n = SMOOTH_SUBDIVISIONS;
    let rows = source.patch_rows() + 1;
    let cols = source.patch_columns() + 1;

    // d[i][j][channel] for corner (i, j).
    let mut d: Vec<Vec<[CornerDerivatives; 3]>> = (0..rows)
        .map(|i| {
            (0..cols)
                .map(|j| {
                    let c = source.nodes[i * 3][j * 3].color.channels();
                    [[c[0], 0.0, 0.0, 0.0], [c[1], 0.0, 0.0, 0.0], [c[2], 0.0, 0.0, 0.0]]
                })
                .collect()
        })
        .collect();

    let f = |d: &Vec<Vec<[CornerDerivatives; 3]>>, i: usize, j: usize, c: usize| d[i][j][c][0];

    for i in 1..rows.saturating_sub(1) {
        for j in 1..cols.saturating_sub(1) {
            for c in 0..3 {
                let dx = find_slope1(f(&d, i - 1, j, c), f(&d, i, j, c), f(&d, i + 1, j, c));
                let dy = find_slope1(f(&d, i, j - 1, c), f(&d, i, j, c), f(&d, i, j + 1, c));
                let dxy = find_slope2(
                    f(&d, i - 1, j - 1, c),
                    f(&d, i + 1, j - 1, c),
                    f(&d, i - 1, j + 1, c),
                    f(&d, i + 1, j + 1, c),
                    f(&d, i, j, c),
                );

                d[i][j][c][1] = dx;
                d[i][j][c][2] = dy;
                d[i][j][c][3] = dxy;
            }
        }
    }

    // Outer corners get the slope that makes the outer interval a parabola.
    let z = rows - 1;
    for j in 1..cols.saturating_sub(1) {
        for c in 0..3 {
            if z >= 2 {
                d[0][j][c][1] = 2.0 * (f(&d, 1, j, c) - f(&d, 0, j, c)) - d[1][j][c][1];
                d[z][j][c][1] = 2.0 * (f(&d, z, j, c) - f(&d, z - 1, j, c)) - d[z - 1][j][c][1];
            } else {
                d[0][j][c][1] = f(&d, 1, j, c) - f(&d, 0, j, c);
                d[z][j][c][1] = d[0][j][c][1];
            }
        }
    }

    let z = cols - 1;
    for i in 1..rows.saturating_sub(1) {
        for c in 0..3 {
            if z >= 2 {
                d[i][0][c][2] = 2.0 * (f(&d, i, 1, c) - f(&d, i, 0, c)) - d[i][1][c][2];
                d[i][z][c][2] = 2.0 * (f(&d, i, z, c) - f(&d, i, z - 1, c)) - d[i][z - 1][c][2];
            } else {
                d[i][0][c][2] = f(&d, i, 1, c) - f(&d, i, 0, c);
                d[i][z][c][2] = d[i][0][c][2];
            }
        }
    }

    subdivide_rows(smooth);
    for j in (0..smooth.patch_columns()).rev() {
        smooth.split_column(j, n - 1);
    }

    for i in 0..rows - 1 {
        for j in 0..cols - 1 {
            let mut result = vec![vec![[0.0; 3]; n + 1]; n + 1];

            for c in 0..3 {
                let corners = [(i, j), (i + 1, j), (i, j + 1), (i + 1, j + 1)];

                let mut v = SVector::<f64, 16>::zeros();
                for (m, &(ci, cj)) in corners.iter().enumerate() {
                    for param in 0..4 {
                        v[param * 4 + m] = d[ci][cj][c][param];
                    }
                }

                let alpha = *BICUBIC * v;

                for (k, row) in result.iter_mut().enumerate() {
                    for (l, r) in row.iter_mut().enumerate() {
                        let x = k as f64 / n as f64;
                        let y = l as f64 / n as f64;
                        r[c] = clamp(bicubic_sum(&alpha, x, y), 0.0, 1.0);
                    }
                }
            }

            for (k, row) in result.iter().enumerate() {
                for (l, r) in row.iter().enumerate() {
                    smooth.nodes[(i * n + k) * 3][(j * n + l) * 3].color = RgbColor::from_channels(*r);
                }
            }
        }
    }
}
