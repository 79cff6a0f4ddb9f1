//! The node grid of a mesh gradient.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

use crate::bezier::CubicBezier;
use crate::color::RgbColor;
use crate::enum_default;
use crate::float_eq::ApproxEqGeometry;
use crate::point::Point;
use crate::rect::Rect;

use super::node::{MeshNode, NodeEdge, NodeType, PathType};
use super::patch::{MeshPatch, MeshPatchMut};

/// Shape of a newly created mesh.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeshType {
    /// A rectangular grid of patches covering the bounding box.
    Normal,
    /// Wedge-shaped patches around the center of the bounding box, with
    /// their outer side on the inscribed ellipse.
    Conical,
}

enum_default!(MeshType, MeshType::Normal);

/// Parameters for [`MeshNodeArray::create_with_options`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCreateOptions {
    pub rows: usize,
    /// For conical meshes, the number of angular sections.  Fewer than
    /// four sections give a poor approximation of the ellipse, so at
    /// least four are always used.
    pub columns: usize,
    pub mesh_type: MeshType,
    pub color: RgbColor,
}

impl Default for MeshCreateOptions {
    fn default() -> MeshCreateOptions {
        MeshCreateOptions {
            rows: 1,
            columns: 1,
            mesh_type: MeshType::default(),
            color: RgbColor::unset(),
        }
    }
}

/// Positions remembered by edits that turn a feature off, so that turning
/// it back on restores the shape.  Stored as offsets from the corner each
/// node hangs from, keyed by the node's grid position.
#[derive(Debug, Default, Clone)]
pub(crate) struct Retained {
    pub handles: HashMap<(usize, usize), Point>,
    pub tensors: HashMap<(usize, usize), Point>,
}

impl Retained {
    pub fn clear(&mut self) {
        self.handles.clear();
        self.tensors.clear();
    }
}

/// A rectangular grid of `(3 * rows + 1) x (3 * columns + 1)` mesh nodes.
///
/// Patches that touch share the nodes along their common side; there is
/// a single node at each grid position, so an edit through one patch is
/// seen by all of them.
#[derive(Debug, Default, Clone)]
pub struct MeshNodeArray {
    pub(crate) nodes: Vec<Vec<MeshNode>>,
    pub(crate) retained: Retained,
}

impl MeshNodeArray {
    /// An array with no patches.
    pub fn new() -> MeshNodeArray {
        MeshNodeArray::default()
    }

    /// A single patch with the corners of `bbox`, straight sides and the
    /// default color.
    pub fn create(bbox: &Rect) -> MeshNodeArray {
        MeshNodeArray::create_with_options(bbox, &MeshCreateOptions::default())
    }

    pub fn create_with_options(bbox: &Rect, options: &MeshCreateOptions) -> MeshNodeArray {
        let mut array = MeshNodeArray::new();

        match options.mesh_type {
            MeshType::Normal => {
                array.ensure_patch(0, 0);

                let corners = bbox.corners();
                let mut patch = array.patch_mut(0, 0);

                for (k, corner) in corners.iter().enumerate() {
                    patch.set_point(k, 0, *corner, true);
                    patch.set_path_type(k, PathType::LineRelative);
                    patch.set_color(k, options.color);
                    patch.set_opacity(k, 1.0);
                }

                patch.update_nodes();
                array.update_edges();

                if options.columns > 1 {
                    array.split_column(0, options.columns - 1);
                }
            }

            MeshType::Conical => {
                let sections = options.columns.max(4);
                let center = bbox.center();
                let rx = bbox.width() / 2.0;
                let ry = bbox.height() / 2.0;
                let arc = 2.0 * PI / sections as f64;

                for i in 0..sections {
                    array.ensure_patch(0, i);

                    let start = arc * i as f64;
                    let outer = CubicBezier::arc(center, rx, ry, start, start + arc);

                    let mut patch = array.patch_mut(0, i);

                    for (pt, p) in outer.points().iter().enumerate() {
                        patch.set_point(0, pt, *p, true);
                    }

                    patch.set_point(2, 0, center, true);
                    patch.set_point(3, 0, center, true);

                    for k in 0..4 {
                        patch.set_path_type(k, PathType::LineRelative);
                        patch.set_color(k, options.color);
                        patch.set_opacity(k, 1.0);
                    }
                    patch.set_path_type(0, PathType::CurveRelative);

                    patch.update_nodes();
                }

                array.update_edges();
            }
        }

        if options.rows > 1 {
            array.split_row(0, options.rows - 1);
        }

        array.retained.clear();
        array
    }

    pub fn patch_rows(&self) -> usize {
        self.nodes.len() / 3
    }

    pub fn patch_columns(&self) -> usize {
        self.nodes.first().map_or(0, |row| row.len() / 3)
    }

    pub fn is_empty(&self) -> bool {
        self.patch_rows() == 0 || self.patch_columns() == 0
    }

    /// Dimensions of the node grid, as (rows, columns).
    pub fn node_dimensions(&self) -> (usize, usize) {
        (self.nodes.len(), self.nodes.first().map_or(0, Vec::len))
    }

    pub fn nodes(&self) -> &[Vec<MeshNode>] {
        &self.nodes
    }

    pub fn node(&self, row: usize, col: usize) -> &MeshNode {
        self.check_node(row, col);
        &self.nodes[row][col]
    }

    pub fn node_mut(&mut self, row: usize, col: usize) -> &mut MeshNode {
        self.check_node(row, col);
        &mut self.nodes[row][col]
    }

    fn check_node(&self, row: usize, col: usize) {
        let (rows, cols) = self.node_dimensions();
        assert!(
            row < rows && col < cols,
            "node ({}, {}) out of range for a {}x{} node grid",
            row,
            col,
            rows,
            cols
        );
    }

    pub fn patch(&self, row: usize, col: usize) -> MeshPatch<'_> {
        MeshPatch::new(&self.nodes, row, col)
    }

    pub fn patch_mut(&mut self, row: usize, col: usize) -> MeshPatchMut<'_> {
        MeshPatchMut::new(&mut self.nodes, row, col)
    }

    /// Number of patch corners; corners are numbered row by row.
    pub fn corner_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.patch_rows() + 1) * (self.patch_columns() + 1)
        }
    }

    /// Grid position of corner `corner`.
    pub fn corner_position(&self, corner: usize) -> (usize, usize) {
        assert!(
            corner < self.corner_count(),
            "corner {} out of range for a mesh with {} corners",
            corner,
            self.corner_count()
        );

        let ncorners = self.patch_columns() + 1;
        ((corner / ncorners) * 3, (corner % ncorners) * 3)
    }

    /// Grows the grid so that it holds patch (`prow`, `pcol`).  New nodes
    /// get the node type of their position and nothing else.
    ///
    /// Patches are added left to right and top to bottom, so the grid may
    /// be ragged until the caller squares it up with `make_rectangular`.
    pub(crate) fn ensure_patch(&mut self, prow: usize, pcol: usize) {
        let last_row = prow * 3 + 3;
        let last_col = pcol * 3 + 3;

        while self.nodes.len() <= last_row {
            self.nodes.push(Vec::new());
        }

        for (i, row) in self.nodes.iter_mut().enumerate().skip(prow * 3).take(4) {
            while row.len() <= last_col {
                let j = row.len();
                row.push(MeshNode::new(NodeType::at(i, j)));
            }
        }
    }

    /// Pads or truncates every row to `columns` patches.
    pub(crate) fn make_rectangular(&mut self, columns: usize) {
        let len = columns * 3 + 1;

        for (i, row) in self.nodes.iter_mut().enumerate() {
            row.truncate(len);
            while row.len() < len {
                let j = row.len();
                row.push(MeshNode::new(NodeType::at(i, j)));
            }
        }
    }

    /// Recomputes which outer boundaries each node lies on.
    pub fn update_edges(&mut self) {
        let (rows, cols) = self.node_dimensions();

        for (i, row) in self.nodes.iter_mut().enumerate() {
            for (j, node) in row.iter_mut().enumerate() {
                let mut edge = NodeEdge::empty();

                if i == 0 {
                    edge |= NodeEdge::TOP;
                }
                if i + 1 == rows {
                    edge |= NodeEdge::BOTTOM;
                }
                if j == 0 {
                    edge |= NodeEdge::LEFT;
                }
                if j + 1 == cols {
                    edge |= NodeEdge::RIGHT;
                }

                node.node_edge = edge;
            }
        }
    }

    /// Runs `update_nodes` on every patch.
    pub fn update_all_nodes(&mut self) {
        for i in 0..self.patch_rows() {
            for j in 0..self.patch_columns() {
                self.patch_mut(i, j).update_nodes();
            }
        }
    }

    /// Equality up to floating point noise in positions, colors and
    /// opacities; everything else must match exactly.
    pub fn approx_eq(&self, other: &MeshNodeArray) -> bool {
        if self.node_dimensions() != other.node_dimensions() {
            return false;
        }

        self.nodes
            .iter()
            .flatten()
            .zip(other.nodes.iter().flatten())
            .all(|(a, b)| {
                a.node_type == b.node_type
                    && a.set == b.set
                    && a.path_type == b.path_type
                    && a.node_edge == b.node_edge
                    && a.p.approx_eq(&b.p)
                    && a.opacity.approx_eq_geom(b.opacity)
                    && a
                        .color
                        .channels()
                        .iter()
                        .zip(b.color.channels().iter())
                        .all(|(x, y)| x.approx_eq_geom(*y))
            })
    }
}

impl PartialEq for MeshNodeArray {
    /// Retained edit state does not take part in equality.
    fn eq(&self, other: &MeshNodeArray) -> bool {
        self.nodes == other.nodes
    }
}

impl fmt::Display for MeshNodeArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.nodes.iter().enumerate() {
            writeln!(f, "row {}:", i)?;

            for (j, node) in row.iter().enumerate() {
                let kind = match node.node_type {
                    NodeType::Corner => 'o',
                    NodeType::Handle => node.path_type.to_char(),
                    NodeType::Tensor => 't',
                    NodeType::Unknown => '?',
                };

                write!(
                    f,
                    "  ({}, {}) {} {}{}",
                    i,
                    j,
                    kind,
                    node.p,
                    if node.set { "" } else { " unset" }
                )?;

                if node.node_type == NodeType::Corner {
                    write!(f, " {} {}", node.color, node.opacity)?;
                }

                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_makes_one_flat_patch() {
        let mesh = MeshNodeArray::create(&Rect::new(0.0, 0.0, 30.0, 60.0));

        assert_eq!(mesh.patch_rows(), 1);
        assert_eq!(mesh.patch_columns(), 1);
        assert_eq!(mesh.node_dimensions(), (4, 4));
        assert_eq!(mesh.corner_count(), 4);

        let patch = mesh.patch(0, 0);
        assert!(patch.get_point(0, 1).approx_eq(&Point::new(10.0, 0.0)));
        assert!(patch.get_point(1, 2).approx_eq(&Point::new(30.0, 40.0)));

        for side in 0..4 {
            assert_eq!(patch.get_path_type(side), PathType::LineRelative);
            assert_eq!(patch.get_color(side), RgbColor::unset());
        }

        for row in mesh.nodes() {
            for n in row {
                assert_eq!(n.set, n.node_type == NodeType::Corner);
            }
        }
    }

    #[test]
    fn create_with_grid_options() {
        let options = MeshCreateOptions {
            rows: 2,
            columns: 3,
            color: RgbColor::new(1.0, 0.0, 0.0),
            ..Default::default()
        };

        let mesh = MeshNodeArray::create_with_options(&Rect::new(0.0, 0.0, 30.0, 20.0), &options);

        assert_eq!(mesh.patch_rows(), 2);
        assert_eq!(mesh.patch_columns(), 3);
        assert_eq!(mesh.corner_count(), 12);

        assert!(mesh.node(3, 3).p.approx_eq(&Point::new(10.0, 10.0)));
        assert!(mesh.node(6, 9).p.approx_eq(&Point::new(30.0, 20.0)));
        assert_eq!(mesh.node(3, 6).color, RgbColor::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn conical_mesh_meets_at_the_center() {
        let options = MeshCreateOptions {
            mesh_type: MeshType::Conical,
            ..Default::default()
        };

        let mesh = MeshNodeArray::create_with_options(&Rect::new(0.0, 0.0, 20.0, 10.0), &options);

        assert_eq!(mesh.patch_rows(), 1);
        assert_eq!(mesh.patch_columns(), 4);

        for j in 0..4 {
            let patch = mesh.patch(0, j);
            assert_eq!(patch.get_path_type(0), PathType::CurveRelative);
            assert!(patch.get_point(2, 0).approx_eq(&Point::new(10.0, 5.0)));
            assert!(patch.get_point(3, 0).approx_eq(&Point::new(10.0, 5.0)));
        }

        assert!(mesh.patch(0, 0).get_point(0, 0).approx_eq(&Point::new(20.0, 5.0)));
        assert!(mesh.patch(0, 1).get_point(0, 0).approx_eq(&Point::new(10.0, 10.0)));
    }

    #[test]
    fn edges_are_flagged() {
        let mut mesh = MeshNodeArray::create(&Rect::new(0.0, 0.0, 1.0, 1.0));
        mesh.update_edges();

        assert_eq!(mesh.node(0, 0).node_edge, NodeEdge::TOP | NodeEdge::LEFT);
        assert_eq!(mesh.node(3, 3).node_edge, NodeEdge::BOTTOM | NodeEdge::RIGHT);
        assert_eq!(mesh.node(1, 1).node_edge, NodeEdge::empty());
    }

    #[test]
    fn corners_are_numbered_row_by_row() {
        let options = MeshCreateOptions {
            rows: 2,
            columns: 2,
            ..Default::default()
        };
        let mesh = MeshNodeArray::create_with_options(&Rect::new(0.0, 0.0, 1.0, 1.0), &options);

        assert_eq!(mesh.corner_position(0), (0, 0));
        assert_eq!(mesh.corner_position(2), (0, 6));
        assert_eq!(mesh.corner_position(4), (3, 3));
        assert_eq!(mesh.corner_position(8), (6, 6));
    }

    #[test]
    #[should_panic]
    fn corner_out_of_range_panics() {
        let mesh = MeshNodeArray::create(&Rect::new(0.0, 0.0, 1.0, 1.0));
        let _ = mesh.corner_position(4);
    }

    #[test]
    fn display_dumps_every_node() {
        let mesh = MeshNodeArray::create(&Rect::new(0.0, 0.0, 1.0, 1.0));
        let dump = mesh.to_string();

        assert_eq!(dump.lines().filter(|l| l.starts_with("  (")).count(), 16);
        assert!(dump.contains("(0, 0) o 0,0"));
    }
}
