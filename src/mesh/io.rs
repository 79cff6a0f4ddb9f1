//! Conversion between the node grid and the per-patch description used
//! by SVG documents.
//!
//! A mesh is written as rows of patches.  Each patch lists the sides it
//! does not share with a patch that came before it: the first row writes
//! its top side, the first column writes its left side, and every patch
//! writes its right and bottom sides.  Each written side is a stop with a
//! path and, for the corners it introduces, a color.

use itertools::Itertools;
use thiserror::Error;

use crate::color::RgbColor;
use crate::gradmesh_log;
use crate::point::Point;

use super::array::MeshNodeArray;
use super::node::PathType;
use super::path::{parse_side_path, parse_tensor_points, MeshPathError};

/// A mesh in document form.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDescription {
    /// Position of the top left corner of the first patch.
    pub x: f64,
    pub y: f64,
    pub rows: Vec<MeshRowData>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshRowData {
    pub patches: Vec<MeshPatchData>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshPatchData {
    pub stops: Vec<MeshStopData>,

    /// Tensor points relative to their corners, as four coordinate pairs.
    pub tensor: Option<String>,
}

/// One side of a patch, plus the color of the corner the side starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshStopData {
    pub path: String,
    pub color: Option<RgbColor>,
    pub opacity: Option<f64>,
}

impl MeshStopData {
    pub fn new(path: &str) -> MeshStopData {
        MeshStopData {
            path: path.to_string(),
            color: None,
            opacity: None,
        }
    }

    pub fn with_color(path: &str, color: RgbColor, opacity: f64) -> MeshStopData {
        MeshStopData {
            path: path.to_string(),
            color: Some(color),
            opacity: Some(opacity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error("mesh has no patches")]
    Empty,

    #[error("row {row}, patch {column}, side {side}: {source}")]
    Path {
        row: usize,
        column: usize,
        side: usize,
        #[source]
        source: MeshPathError,
    },

    #[error("row {row}, patch {column}: invalid tensor points: {source}")]
    Tensor {
        row: usize,
        column: usize,
        #[source]
        source: MeshPathError,
    },
}

impl MeshNodeArray {
    /// Builds the node grid from its document form.
    ///
    /// Corners and handles shared with earlier patches are not repeated
    /// in the description; they are picked up from the nodes already
    /// read.  Missing colors are black and missing opacities are 1.
    pub fn read(desc: &MeshDescription) -> Result<MeshNodeArray, ReadError> {
        if desc.rows.iter().all(|row| row.patches.is_empty()) {
            return Err(ReadError::Empty);
        }

        let mut array = MeshNodeArray::new();
        let mut current_p = Point::new(desc.x, desc.y);
        let mut max_column = 0;

        for (irow, row) in desc.rows.iter().enumerate() {
            for (icol, data) in row.patches.iter().enumerate() {
                array.ensure_patch(irow, icol);
                let mut patch = array.patch_mut(irow, icol);

                // Only the first row has a top side.
                let first = if irow == 0 { 0 } else { 1 };

                if data.stops.len() > 4 - first {
                    gradmesh_log!(
                        "mesh row {} patch {}: ignoring {} extra stops",
                        irow,
                        icol,
                        data.stops.len() - (4 - first)
                    );
                }

                for (side, stop) in (first..4).zip(data.stops.iter()) {
                    if side == 0 && icol == 0 {
                        patch.set_point(0, 0, current_p, true);
                    }

                    // The first point of a side is the last point of the
                    // previous one.
                    current_p = patch.view().get_point(side, 0);

                    // The side that closes the patch ends at a point that
                    // is already known.
                    let closed = (icol == 0 && side == 3) || (icol > 0 && side == 2);

                    let path = parse_side_path(&stop.path).map_err(|source| ReadError::Path {
                        row: irow,
                        column: icol,
                        side,
                        source,
                    })?;

                    patch.set_path_type(side, path.path_type);

                    let relative = matches!(
                        path.path_type,
                        PathType::LineRelative | PathType::CurveRelative
                    );
                    let resolve = |p: Point| if relative { current_p + p } else { p };

                    let wanted = if path.path_type.is_line() { 1 } else { 3 };
                    let needed = if closed { wanted - 1 } else { wanted };

                    if path.points.len() < needed {
                        gradmesh_log!(
                            "mesh row {} patch {} side {}: expected {} points in \"{}\"",
                            irow,
                            icol,
                            side,
                            needed,
                            stop.path
                        );
                    }

                    if path.path_type.is_line() {
                        if !closed {
                            if let Some(&p) = path.points.first() {
                                patch.set_point(side, 3, resolve(p), true);
                            }
                        }

                        // Handles of straight sides sit at the thirds but
                        // are not authored.
                        let dp = (patch.view().get_point(side, 3) - current_p) / 3.0;
                        patch.set_point(side, 1, current_p + dp, false);
                        patch.set_point(side, 2, current_p + 2.0 * dp, false);
                    } else {
                        for (i, &p) in path.points.iter().take(needed).enumerate() {
                            patch.set_point(side, i + 1, resolve(p), true);
                        }
                    }

                    current_p = patch.view().get_point(side, 3);

                    // Corners shared with the patch to the left or above
                    // already have their color.
                    let shared = (side == 0 && irow == 0 && icol > 0) || (side == 1 && irow > 0);
                    if !shared {
                        patch.set_color(side, stop.color.unwrap_or_else(RgbColor::black));
                        patch.set_opacity(side, stop.opacity.unwrap_or(1.0));
                    }
                }

                // Tensor points are relative to the corners, so they come last.
                if let Some(ref tensor) = data.tensor {
                    let offsets =
                        parse_tensor_points(tensor).map_err(|source| ReadError::Tensor {
                            row: irow,
                            column: icol,
                            source,
                        })?;

                    for (k, offset) in offsets.iter().enumerate() {
                        let corner = patch.view().get_point(k, 0);
                        patch.set_tensor_point(k, corner + *offset);
                    }
                }
            }

            max_column = max_column.max(row.patches.len());
        }

        array.make_rectangular(max_column);
        array.update_edges();
        array.update_all_nodes();

        Ok(array)
    }

    /// The document form of the grid; `MeshNodeArray::read` of the result
    /// gives back an equivalent grid.
    ///
    /// Sides that were never given a path type are written as relative
    /// lines.  If any tensor point of a patch is set, all four are written.
    pub fn write(&self) -> MeshDescription {
        if self.is_empty() {
            return MeshDescription {
                x: 0.0,
                y: 0.0,
                rows: Vec::new(),
            };
        }

        let origin = self.patch(0, 0).get_point(0, 0);

        let rows = (0..self.patch_rows())
            .map(|i| MeshRowData {
                patches: (0..self.patch_columns())
                    .map(|j| self.write_patch(i, j))
                    .collect(),
            })
            .collect();

        MeshDescription {
            x: origin.x,
            y: origin.y,
            rows,
        }
    }

    fn write_patch(&self, i: usize, j: usize) -> MeshPatchData {
        let patch = self.patch(i, j);

        let tensor = if patch.any_tensor_is_set() {
            Some(
                (0..4)
                    .map(|k| patch.get_tensor_point(k) - patch.get_point(k, 0))
                    .join(" "),
            )
        } else {
            None
        };

        let mut stops = Vec::with_capacity(4);

        for k in 0..4 {
            // Only the first row has a top side, and only the first
            // column has a left side.
            if (k == 0 && i != 0) || (k == 3 && j != 0) {
                continue;
            }

            let p = patch.points_for_side(k);
            let start = p[0];

            let path = match patch.get_path_type(k) {
                PathType::LineRelative | PathType::Unset => format!("l {}", p[3] - start),
                PathType::LineAbsolute => format!("L {}", p[3]),
                PathType::CurveRelative => format!(
                    "c {} {} {}",
                    p[1] - start,
                    p[2] - start,
                    p[3] - start
                ),
                PathType::CurveAbsolute => format!("C {} {} {}", p[1], p[2], p[3]),
            };

            let owns_corner = (k == 0 && i == 0 && j == 0)
                || (k == 1 && i == 0)
                || k == 2
                || (k == 3 && j == 0);

            stops.push(if owns_corner {
                MeshStopData::with_color(&path, patch.get_color(k), patch.get_opacity(k))
            } else {
                MeshStopData::new(&path)
            });
        }

        MeshPatchData { stops, tensor }
    }
}
