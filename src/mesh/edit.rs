//! Edits driven by a selection of corners.
//!
//! Corners are numbered row by row, `(patch_columns() + 1)` per row.
//! Operations that change several things return how many they changed,
//! so that callers can decide whether anything needs to be redrawn or
//! written back.

use std::f64::consts::PI;

use itertools::Itertools;

use crate::color::RgbColor;
use crate::gradmesh_log;
use crate::point::Point;
use crate::rect::{IRect, Rect};
use crate::transform::Transform;

use super::array::MeshNodeArray;
use super::node::NodeType;

/// How the handles around a dragged corner follow it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeshNodeOperation {
    /// Only straight sides are kept straight.
    NoScale,
    /// Handles and tensors next to the corner move with it.
    Scale,
    /// Each curved side keeps its shape, rotated and scaled about its
    /// other corner.
    ScaleHandle,
}

/// Source of colors for [`MeshNodeArray::color_pick`].
pub trait ColorSampler {
    /// Average color of the drawing over `area`, or `None` if the area
    /// cannot be sampled.
    fn sample(&mut self, area: &IRect) -> Option<RgbColor>;
}

/// Result of [`MeshNodeArray::color_pick`]; both lists hold corner indices.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PickOutcome {
    pub picked: Vec<usize>,
    pub failed: Vec<usize>,
}

/// Size of the area sampled by `color_pick`, and how far corners on the
/// outside of the mesh are moved inwards before sampling.
const PICK_SIZE: f64 = 3.0;

type NodePos = (usize, usize);

impl MeshNodeArray {
    fn corner_index(&self, (row, col): NodePos) -> usize {
        (row / 3) * (self.patch_columns() + 1) + col / 3
    }

    /// The four nodes of the side between corners `a` and `b`, starting
    /// at the top or left one, or `None` if the corners are not the ends
    /// of a side.
    pub fn adjacent_corners(&self, a: usize, b: usize) -> Option<[NodePos; 4]> {
        let (r1, c1) = self.corner_position(a.min(b));
        let (r2, c2) = self.corner_position(a.max(b));

        if r1 == r2 && c2 - c1 == 3 {
            Some([(r1, c1), (r1, c1 + 1), (r1, c1 + 2), (r1, c1 + 3)])
        } else if c1 == c2 && r2 - r1 == 3 {
            Some([(r1, c1), (r1 + 1, c1), (r1 + 2, c1), (r1 + 3, c1)])
        } else {
            None
        }
    }

    fn selected_sides(&self, corners: &[usize]) -> Vec<[NodePos; 4]> {
        corners
            .iter()
            .copied()
            .unique()
            .tuple_combinations()
            .filter_map(|(a, b)| self.adjacent_corners(a, b))
            .collect()
    }

    #[inline]
    fn at(&self, (row, col): NodePos) -> Point {
        self.nodes[row][col].p
    }

    /// Toggles every side whose two corners are selected between a line
    /// and a curve.
    ///
    /// Straightening a side moves its handles to the thirds of the side
    /// but remembers where they were; curving it again puts them back.
    /// A side that was never curved keeps its handles on the thirds, so
    /// it looks the same until its handles are moved.
    pub fn side_toggle(&mut self, corners: &[usize]) -> usize {
        let mut toggled = 0;

        for n in self.selected_sides(corners) {
            let path_type = self.nodes[n[1].0][n[1].1].path_type;
            let (p0, p3) = (self.at(n[0]), self.at(n[3]));

            if path_type.is_curve() {
                self.retained.handles.insert(n[1], self.at(n[1]) - p0);
                self.retained.handles.insert(n[2], self.at(n[2]) - p3);

                let dp = (p3 - p0) / 3.0;
                let new_positions = [p0 + dp, p3 - dp];

                for (&pos, &p) in [n[1], n[2]].iter().zip(new_positions.iter()) {
                    let node = self.node_mut(pos.0, pos.1);
                    node.p = p;
                    node.set = false;
                    node.path_type = path_type.toggled();
                }
            } else if path_type.is_line() {
                for (&pos, &corner) in [n[1], n[2]].iter().zip([p0, p3].iter()) {
                    let restored = self.retained.handles.remove(&pos);

                    let node = self.node_mut(pos.0, pos.1);
                    if let Some(offset) = restored {
                        node.p = corner + offset;
                    }
                    node.set = true;
                    node.path_type = path_type.toggled();
                }
            } else {
                gradmesh_log!(
                    "side_toggle: side at ({}, {}) has no path type",
                    n[1].0,
                    n[1].1
                );
                continue;
            }

            toggled += 1;
        }

        toggled
    }

    /// Reshapes every selected curved side into an elliptical arc that
    /// keeps the direction of both handles.
    ///
    /// The arc is a quarter circle squashed and skewed into the
    /// parallelogram spanned by the two corners and the point where the
    /// handle directions meet.  Sides whose handles are parallel, or whose
    /// handle directions do not meet ahead of both corners, are left alone.
    pub fn side_arc(&mut self, corners: &[usize]) -> usize {
        let f = 4.0 / 3.0 * (PI / 8.0).tan();
        let mut arced = 0;

        for n in self.selected_sides(corners) {
            let path_type = self.nodes[n[1].0][n[1].1].path_type;

            if !path_type.is_curve() {
                gradmesh_log!("side_arc: cannot turn a straight side into an arc");
                continue;
            }

            let (p0, p1, p2, p3) = (self.at(n[0]), self.at(n[1]), self.at(n[2]), self.at(n[3]));
            let d1 = p1 - p0;
            let d2 = p2 - p3;

            let denom = d1.cross(d2);
            if denom.abs() < f64::EPSILON {
                gradmesh_log!("side_arc: handles are parallel, cannot turn into an arc");
                continue;
            }

            let ta = (p3 - p0).cross(d2) / denom;
            let tb = (p3 - p0).cross(d1) / denom;
            if ta < 0.0 || tb < 0.0 {
                gradmesh_log!("side_arc: handles do not cross, cannot turn into an arc");
                continue;
            }

            let crossing = p0 + ta * d1;

            self.node_mut(n[1].0, n[1].1).p = p0 + f * (crossing - p0);
            self.node_mut(n[2].0, n[2].1).p = p3 + f * (crossing - p3);
            arced += 1;
        }

        arced
    }

    /// Toggles the tensor points of every patch whose four corners are
    /// selected.
    ///
    /// Unsetting the tensors of a patch moves them to their default
    /// position and remembers the old ones; setting them again restores
    /// those, or fixes the defaults in place if there are none.
    pub fn tensor_toggle(&mut self, corners: &[usize]) -> usize {
        let ncorners = self.patch_columns() + 1;
        let mut toggled = 0;

        for combination in corners.iter().copied().unique().combinations(4) {
            let mut c = combination;
            c.sort_unstable();

            assert!(
                c[3] < self.corner_count(),
                "corner {} out of range for a mesh with {} corners",
                c[3],
                self.corner_count()
            );

            let one_patch = c[1] - c[0] == 1
                && c[3] - c[2] == 1
                && c[2] - c[0] == ncorners
                && c[3] - c[1] == ncorners
                && c[0] % ncorners < ncorners - 1;

            if !one_patch {
                continue;
            }

            let (prow, pcol) = (c[0] / ncorners, c[0] % ncorners);
            let mut patch = self.patch_mut(prow, pcol);
            patch.update_nodes();

            let view = patch.view();
            let positions: Vec<(NodePos, Point)> = (0..4)
                .map(|k| (view.tensor_node_position(k), view.get_point(k, 0)))
                .collect();
            let was_set = view.any_tensor_is_set();

            if was_set {
                for &((row, col), corner) in &positions {
                    let node = &mut self.nodes[row][col];
                    self.retained.tensors.insert((row, col), node.p - corner);
                    node.set = false;
                }

                self.patch_mut(prow, pcol).update_nodes();
            } else {
                for (k, &((row, col), corner)) in positions.iter().enumerate() {
                    let p = match self.retained.tensors.remove(&(row, col)) {
                        Some(offset) => corner + offset,
                        None => self.nodes[row][col].p,
                    };

                    self.patch_mut(prow, pcol).set_tensor_point(k, p);
                }
            }

            toggled += 1;
        }

        toggled
    }

    /// Sets each selected corner to the mean color and opacity of the
    /// corners next to it along the grid lines.  All new colors are
    /// computed before any is stored.
    pub fn color_smooth(&mut self, corners: &[usize]) -> usize {
        let (rows, cols) = self.node_dimensions();

        let updates: Vec<(NodePos, RgbColor, f64)> = corners
            .iter()
            .unique()
            .filter_map(|&corner| {
                let (row, col) = self.corner_position(corner);

                let neighbors: Vec<NodePos> = [
                    (row.checked_sub(3), Some(col)),
                    (Some(row), col.checked_sub(3)),
                    (Some(row + 3).filter(|&r| r < rows), Some(col)),
                    (Some(row), Some(col + 3).filter(|&c| c < cols)),
                ]
                .iter()
                .filter_map(|&(r, c)| Some((r?, c?)))
                .collect();

                if neighbors.is_empty() {
                    return None;
                }

                let count = neighbors.len() as f64;
                let mut sum = [0.0; 3];
                let mut opacity = 0.0;

                for &(r, c) in &neighbors {
                    let node = &self.nodes[r][c];
                    for (s, v) in sum.iter_mut().zip(node.color.channels().iter()) {
                        *s += v;
                    }
                    opacity += node.opacity;
                }

                let mean = RgbColor::from_channels([sum[0] / count, sum[1] / count, sum[2] / count]);

                Some(((row, col), mean, opacity / count))
            })
            .collect();

        for &((row, col), color, opacity) in &updates {
            let node = self.node_mut(row, col);
            node.color = color;
            node.opacity = opacity;
        }

        updates.len()
    }

    /// Sets each selected corner's color from what is drawn under it.
    ///
    /// Corner positions are mapped to the sampler's space with
    /// `gradient_transform`.  Corners on the outside of the mesh are moved
    /// inwards along their sides first, so that the sampled area is not
    /// half outside the shape.  Corners that cannot be sampled keep their
    /// color.
    pub fn color_pick<S: ColorSampler + ?Sized>(
        &mut self,
        corners: &[usize],
        sampler: &mut S,
        gradient_transform: &Transform,
    ) -> PickOutcome {
        let (rows, cols) = self.node_dimensions();
        let mut outcome = PickOutcome::default();

        for &corner in corners {
            let (row, col) = self.corner_position(corner);
            let mut p = gradient_transform.transform_point(self.at((row, col)));

            let mut nudge = |handle: NodePos| {
                let h = gradient_transform.transform_point(self.at(handle));
                p += (h - p).unit_vector() * PICK_SIZE;
            };

            if row == 0 {
                nudge((row + 1, col));
            }
            if col + 1 == cols {
                nudge((row, col - 1));
            }
            if row + 1 == rows {
                nudge((row - 1, col));
            }
            if col == 0 {
                nudge((row, col + 1));
            }

            let area = IRect::from(Rect::centered_at(p, PICK_SIZE));

            match sampler.sample(&area) {
                Some(color) => {
                    self.node_mut(row, col).color = color;
                    outcome.picked.push(corner);
                }

                None => {
                    gradmesh_log!(
                        "color_pick: could not sample corner {} at {}",
                        corner,
                        p
                    );
                    outcome.failed.push(corner);
                }
            }
        }

        outcome
    }

    /// Moves the handles and tensors around `corner` after the corner has
    /// been moved from `p_old` to its current position.
    ///
    /// Straight sides are always kept straight.  Curved sides are handled
    /// according to `op`; sides whose other corner is also in `selected`
    /// just move with the corner, since that corner gets its own update.
    /// Every node is changed at most once, however many patches share it.
    pub fn update_handles(
        &mut self,
        corner: usize,
        selected: &[usize],
        p_old: Point,
        op: MeshNodeOperation,
    ) {
        let (nrow, ncol) = self.corner_position(corner);
        let mrow = self.patch_rows();
        let mcol = self.patch_columns();
        let (crow, ccol) = (nrow / 3, ncol / 3);

        let p_new = self.at((nrow, ncol));
        let dp = p_new - p_old;

        // Patches around the corner, clockwise from the top left.
        let patch = [
            ccol > 0 && crow > 0,
            ccol < mcol && crow > 0,
            ccol < mcol && crow < mrow,
            ccol > 0 && crow < mrow,
        ];

        // Near handle, far handle and far corner of each side leaving
        // the corner: up, right, down, left.
        let mut sides: Vec<[NodePos; 3]> = Vec::with_capacity(4);
        if patch[0] || patch[1] {
            sides.push([(nrow - 1, ncol), (nrow - 2, ncol), (nrow - 3, ncol)]);
        }
        if patch[1] || patch[2] {
            sides.push([(nrow, ncol + 1), (nrow, ncol + 2), (nrow, ncol + 3)]);
        }
        if patch[2] || patch[3] {
            sides.push([(nrow + 1, ncol), (nrow + 2, ncol), (nrow + 3, ncol)]);
        }
        if patch[3] || patch[0] {
            sides.push([(nrow, ncol - 1), (nrow, ncol - 2), (nrow, ncol - 3)]);
        }

        for [near, far, far_corner] in sides {
            let far_p = self.at(far_corner);

            if self.nodes[near.0][near.1].path_type.is_line() {
                let s = (far_p - p_new) / 3.0;
                self.node_mut(near.0, near.1).p = p_new + s;
                self.node_mut(far.0, far.1).p = far_p - s;
                continue;
            }

            let far_selected = selected.contains(&self.corner_index(far_corner));

            match op {
                MeshNodeOperation::NoScale => (),

                MeshNodeOperation::ScaleHandle if !far_selected => {
                    let before = p_old - far_p;
                    let len2 = before.dot(before);

                    if len2 > 0.0 {
                        // Complex ratio of the new and old side vectors.
                        let after = p_new - far_p;
                        let z = Point::new(after.dot(before), before.cross(after)) / len2;

                        for &pos in &[near, far] {
                            let d = self.at(pos) - far_p;
                            self.node_mut(pos.0, pos.1).p =
                                far_p + Point::new(z.x * d.x - z.y * d.y, z.x * d.y + z.y * d.x);
                        }
                    } else {
                        self.node_mut(near.0, near.1).p += dp;
                    }
                }

                MeshNodeOperation::Scale | MeshNodeOperation::ScaleHandle => {
                    self.node_mut(near.0, near.1).p += dp;
                }
            }
        }

        if op != MeshNodeOperation::NoScale {
            let tensors = [
                (patch[0], (nrow.wrapping_sub(1), ncol.wrapping_sub(1))),
                (patch[1], (nrow.wrapping_sub(1), ncol + 1)),
                (patch[2], (nrow + 1, ncol + 1)),
                (patch[3], (nrow + 1, ncol.wrapping_sub(1))),
            ];

            for &(present, (r, c)) in &tensors {
                if present {
                    debug_assert_eq!(self.nodes[r][c].node_type, NodeType::Tensor);
                    self.node_mut(r, c).p += dp;
                }
            }
        }
    }
}
