//! Views of a single patch within the node grid.
//!
//! A patch is the 4x4 block of nodes starting at node (3 * `row`, 3 * `col`).
//! Sides are numbered clockwise from the top: 0 top, 1 right, 2 bottom,
//! 3 left.  Points along a side are returned in clockwise order, which for
//! sides 2 and 3 is the reverse of the order they are stored in the grid.
//!
//! Neighboring patches share the nodes along their common side, so
//! writing through one view is visible through the other.

use crate::bezier::CubicBezier;
use crate::color::RgbColor;
use crate::point::Point;

use super::node::{MeshNode, NodeType, PathType};

/// Grid offsets of the four corners, in side order.
const CORNERS: [(usize, usize); 4] = [(0, 0), (0, 3), (3, 3), (3, 0)];

/// Grid offsets of the four tensor points; tensor `k` sits next to corner `k`.
const TENSORS: [(usize, usize); 4] = [(1, 1), (1, 2), (2, 2), (2, 1)];

/// Grid offset of point `pt` of side `side`, relative to the patch origin.
fn side_offset(side: usize, pt: usize) -> (usize, usize) {
    assert!(side < 4, "invalid patch side {}", side);
    assert!(pt < 4, "invalid point {} on patch side", pt);

    match side {
        0 => (0, pt),
        1 => (pt, 3),
        2 => (3, 3 - pt),
        _ => (3 - pt, 0),
    }
}

fn check_index(k: usize) -> usize {
    assert!(k < 4, "invalid corner or tensor index {}", k);
    k
}

fn check_patch(nodes: &[Vec<MeshNode>], row: usize, col: usize) {
    let rows = nodes.len() / 3;
    let cols = nodes.first().map_or(0, |r| r.len() / 3);

    assert!(
        row < rows && col < cols,
        "patch ({}, {}) out of range for a {}x{} mesh",
        row,
        col,
        rows,
        cols
    );
}

/// Read-only view of one patch.
#[derive(Copy, Clone)]
pub struct MeshPatch<'a> {
    nodes: &'a [Vec<MeshNode>],
    row: usize,
    col: usize,
}

impl<'a> MeshPatch<'a> {
    /// Panics if the patch is outside the grid.
    pub fn new(nodes: &'a [Vec<MeshNode>], prow: usize, pcol: usize) -> MeshPatch<'a> {
        check_patch(nodes, prow, pcol);

        MeshPatch {
            nodes,
            row: prow * 3,
            col: pcol * 3,
        }
    }

    #[inline]
    fn node(&self, (i, j): (usize, usize)) -> &'a MeshNode {
        &self.nodes[self.row + i][self.col + j]
    }

    /// Grid position of point `pt` of side `side`.
    pub fn side_node_position(&self, side: usize, pt: usize) -> (usize, usize) {
        let (i, j) = side_offset(side, pt);
        (self.row + i, self.col + j)
    }

    pub fn corner_node_position(&self, k: usize) -> (usize, usize) {
        let (i, j) = CORNERS[check_index(k)];
        (self.row + i, self.col + j)
    }

    pub fn tensor_node_position(&self, k: usize) -> (usize, usize) {
        let (i, j) = TENSORS[check_index(k)];
        (self.row + i, self.col + j)
    }

    pub fn get_point(&self, side: usize, pt: usize) -> Point {
        self.node(side_offset(side, pt)).p
    }

    pub fn points_for_side(&self, side: usize) -> [Point; 4] {
        [
            self.get_point(side, 0),
            self.get_point(side, 1),
            self.get_point(side, 2),
            self.get_point(side, 3),
        ]
    }

    pub fn side_curve(&self, side: usize) -> CubicBezier {
        CubicBezier::from_points(self.points_for_side(side))
    }

    /// Path type of a side, as stored in its handles.
    pub fn get_path_type(&self, side: usize) -> PathType {
        self.node(side_offset(side, 1)).path_type
    }

    pub fn tensor_is_set(&self, k: usize) -> bool {
        self.node(TENSORS[check_index(k)]).set
    }

    pub fn any_tensor_is_set(&self) -> bool {
        (0..4).any(|k| self.tensor_is_set(k))
    }

    /// The authored tensor point, or the Coons default if there is none.
    pub fn get_tensor_point(&self, k: usize) -> Point {
        let n = self.node(TENSORS[check_index(k)]);

        if n.set {
            n.p
        } else {
            self.coons_tensor_point(k)
        }
    }

    /// Tensor point that makes the patch equivalent to a Coons patch
    /// with the same boundary.
    ///
    /// For a patch whose sides are all straight this is plain bilinear
    /// interpolation of the corners.  Nothing is modified.
    pub fn coons_tensor_point(&self, k: usize) -> Point {
        // p[i][j] in the row/column notation of the PDF tensor-product
        // patch; only the boundary is needed.
        let p00 = self.get_point(0, 0);
        let p01 = self.get_point(0, 1);
        let p02 = self.get_point(0, 2);
        let p03 = self.get_point(0, 3);
        let p10 = self.get_point(3, 2);
        let p13 = self.get_point(1, 1);
        let p20 = self.get_point(3, 1);
        let p23 = self.get_point(1, 2);
        let p30 = self.get_point(2, 3);
        let p31 = self.get_point(2, 2);
        let p32 = self.get_point(2, 1);
        let p33 = self.get_point(2, 0);

        let t = match check_index(k) {
            0 => -4.0 * p00 + 6.0 * (p01 + p10) - 2.0 * (p03 + p30) + 3.0 * (p31 + p13) - p33,
            1 => -4.0 * p03 + 6.0 * (p02 + p13) - 2.0 * (p00 + p33) + 3.0 * (p32 + p10) - p30,
            2 => -4.0 * p33 + 6.0 * (p32 + p23) - 2.0 * (p30 + p03) + 3.0 * (p02 + p20) - p00,
            _ => -4.0 * p30 + 6.0 * (p31 + p20) - 2.0 * (p33 + p00) + 3.0 * (p01 + p23) - p03,
        };

        t / 9.0
    }

    pub fn get_color(&self, k: usize) -> RgbColor {
        self.node(CORNERS[check_index(k)]).color
    }

    pub fn get_opacity(&self, k: usize) -> f64 {
        self.node(CORNERS[check_index(k)]).opacity
    }
}

/// Read-write view of one patch.
pub struct MeshPatchMut<'a> {
    nodes: &'a mut [Vec<MeshNode>],
    prow: usize,
    pcol: usize,
}

impl<'a> MeshPatchMut<'a> {
    /// Panics if the patch is outside the grid.
    pub fn new(nodes: &'a mut [Vec<MeshNode>], prow: usize, pcol: usize) -> MeshPatchMut<'a> {
        check_patch(nodes, prow, pcol);

        MeshPatchMut { nodes, prow, pcol }
    }

    /// Reborrows as a read-only view.
    pub fn view(&self) -> MeshPatch<'_> {
        MeshPatch {
            nodes: &*self.nodes,
            row: self.prow * 3,
            col: self.pcol * 3,
        }
    }

    #[inline]
    fn node_mut(&mut self, (i, j): (usize, usize)) -> &mut MeshNode {
        &mut self.nodes[self.prow * 3 + i][self.pcol * 3 + j]
    }

    /// Sets point `pt` of side `side`.  Points 0 and 3 are corners, 1
    /// and 2 are handles; `set` records whether the position is authored.
    pub fn set_point(&mut self, side: usize, pt: usize, p: Point, set: bool) {
        let node_type = if pt == 1 || pt == 2 {
            NodeType::Handle
        } else {
            NodeType::Corner
        };

        let n = self.node_mut(side_offset(side, pt));
        n.p = p;
        n.set = set;
        n.node_type = node_type;
    }

    pub fn set_path_type(&mut self, side: usize, t: PathType) {
        self.node_mut(side_offset(side, 1)).path_type = t;
        self.node_mut(side_offset(side, 2)).path_type = t;
    }

    /// Sets tensor point `k`.
    ///
    /// Tensor points are authored for a whole patch at once, so the other
    /// three become set too, at the positions they had before.
    pub fn set_tensor_point(&mut self, k: usize, p: Point) {
        let k = check_index(k);

        for (i, &pos) in TENSORS.iter().enumerate() {
            let q = if i == k {
                p
            } else {
                self.view().get_tensor_point(i)
            };

            let n = self.node_mut(pos);
            n.p = q;
            n.set = true;
            n.node_type = NodeType::Tensor;
        }
    }

    pub fn set_color(&mut self, k: usize, color: RgbColor) {
        self.node_mut(CORNERS[check_index(k)]).color = color;
    }

    pub fn set_opacity(&mut self, k: usize, opacity: f64) {
        self.node_mut(CORNERS[check_index(k)]).opacity = opacity;
    }

    /// Recomputes every node whose position is derived.
    ///
    /// A handle that was never set belongs to a straight side and goes
    /// to a third of the way between its corners.  Tensor points that
    /// were never set go to their Coons position, which depends on the
    /// handles, so handles are done first.
    pub fn update_nodes(&mut self) {
        for i in 0..4 {
            for j in 0..4 {
                let (set, node_type) = {
                    let n = self.view().node((i, j));
                    (n.set, n.node_type)
                };

                if set || node_type != NodeType::Handle {
                    continue;
                }

                let p = if i == 0 || i == 3 {
                    let p0 = self.view().node((i, 0)).p;
                    let p3 = self.view().node((i, 3)).p;
                    p0 + (p3 - p0) * (j as f64 / 3.0)
                } else {
                    let p0 = self.view().node((0, j)).p;
                    let p3 = self.view().node((3, j)).p;
                    p0 + (p3 - p0) * (i as f64 / 3.0)
                };

                self.node_mut((i, j)).p = p;
            }
        }

        for (k, &pos) in TENSORS.iter().enumerate() {
            if !self.view().node(pos).set {
                let p = self.view().coons_tensor_point(k);

                let n = self.node_mut(pos);
                n.node_type = NodeType::Tensor;
                n.p = p;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshNodeArray;
    use crate::rect::Rect;

    fn square() -> MeshNodeArray {
        MeshNodeArray::create(&Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn sides_go_clockwise() {
        let mesh = square();
        let patch = mesh.patch(0, 0);

        assert_eq!(patch.get_point(0, 0), Point::new(0.0, 0.0));
        assert_eq!(patch.get_point(0, 3), Point::new(10.0, 0.0));
        assert_eq!(patch.get_point(1, 3), Point::new(10.0, 10.0));
        assert_eq!(patch.get_point(2, 3), Point::new(0.0, 10.0));
        assert_eq!(patch.get_point(3, 3), Point::new(0.0, 0.0));

        // Side 2 runs right to left, side 3 bottom to top.
        assert_eq!(patch.side_node_position(2, 1), (3, 2));
        assert_eq!(patch.side_node_position(3, 1), (2, 0));
    }

    #[test]
    fn coons_point_of_flat_square_is_bilinear() {
        let mesh = square();
        let patch = mesh.patch(0, 0);

        let expected = [
            Point::new(10.0 / 3.0, 10.0 / 3.0),
            Point::new(20.0 / 3.0, 10.0 / 3.0),
            Point::new(20.0 / 3.0, 20.0 / 3.0),
            Point::new(10.0 / 3.0, 20.0 / 3.0),
        ];

        for (k, e) in expected.iter().enumerate() {
            assert!(patch.coons_tensor_point(k).approx_eq(e));
            assert!(!patch.tensor_is_set(k));
            assert!(patch.get_tensor_point(k).approx_eq(e));
        }
    }

    #[test]
    fn set_tensor_point_overrides_coons() {
        let mut mesh = square();
        let mut patch = mesh.patch_mut(0, 0);

        patch.set_tensor_point(2, Point::new(9.0, 9.0));

        let view = patch.view();
        assert!(view.tensor_is_set(2));
        assert_eq!(view.get_tensor_point(2), Point::new(9.0, 9.0));

        // The others are pinned where the Coons construction put them.
        assert!((0..4).all(|k| view.tensor_is_set(k)));
        assert!(view
            .get_tensor_point(0)
            .approx_eq(&Point::new(10.0 / 3.0, 10.0 / 3.0)));
        assert!(view
            .get_tensor_point(3)
            .approx_eq(&Point::new(10.0 / 3.0, 20.0 / 3.0)));
    }

    #[test]
    fn update_nodes_moves_unset_handles_with_their_corners() {
        let mut mesh = square();
        let mut patch = mesh.patch_mut(0, 0);

        patch.set_point(0, 3, Point::new(30.0, 0.0), true);
        patch.update_nodes();

        let view = patch.view();
        assert!(view.get_point(0, 1).approx_eq(&Point::new(10.0, 0.0)));
        assert!(view.get_point(0, 2).approx_eq(&Point::new(20.0, 0.0)));

        // Side 1 now runs from (30, 0) to (10, 10).
        assert!(view.get_point(1, 1).approx_eq(&Point::new(30.0 - 20.0 / 3.0, 10.0 / 3.0)));
    }

    #[test]
    fn path_type_is_shared_by_both_handles() {
        let mut mesh = square();
        let mut patch = mesh.patch_mut(0, 0);

        patch.set_path_type(2, PathType::CurveAbsolute);
        assert_eq!(patch.view().get_path_type(2), PathType::CurveAbsolute);
        assert_eq!(mesh.node(3, 1).path_type, PathType::CurveAbsolute);
        assert_eq!(mesh.node(3, 2).path_type, PathType::CurveAbsolute);
    }

    #[test]
    #[should_panic]
    fn out_of_range_patch_panics() {
        let mesh = square();
        let _ = mesh.patch(1, 0);
    }

    #[test]
    #[should_panic]
    fn invalid_side_panics() {
        let mesh = square();
        let _ = mesh.patch(0, 0).get_point(4, 0);
    }
}
