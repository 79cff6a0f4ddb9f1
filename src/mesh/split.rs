//! Inserting rows and columns of patches.
//!
//! A row of patches is split by subdividing every vertical curve of node
//! positions that runs through it, so the surface is unchanged and only
//! gains an extra row of nodes.  Columns are split the same way on the
//! transposed grid.

use crate::bezier::CubicBezier;
use crate::color::average_color;
use crate::util::lerp;

use super::array::MeshNodeArray;
use super::node::{MeshNode, NodeType, PathType};

impl MeshNodeArray {
    /// Splits patch row `row` into `n + 1` rows of equal parametric height.
    pub fn split_row(&mut self, row: usize, n: usize) {
        if n == 0 {
            return;
        }

        // Cut off the last part, then split what is left into n parts.
        self.split_row_at(row, n as f64 / (n + 1) as f64);
        self.split_row(row, n - 1);
    }

    /// Splits patch column `col` into `n + 1` columns of equal parametric width.
    pub fn split_column(&mut self, col: usize, n: usize) {
        if n == 0 {
            return;
        }

        self.split_column_at(col, n as f64 / (n + 1) as f64);
        self.split_column(col, n - 1);
    }

    /// Splits patch row `row` in two at parameter `t` down the row.
    ///
    /// The new corners get colors and opacities interpolated from the
    /// corners above and below them.
    pub fn split_row_at(&mut self, row: usize, t: f64) {
        assert!(
            row < self.patch_rows(),
            "cannot split row {} of a mesh with {} rows",
            row,
            self.patch_rows()
        );
        assert!((0.0..=1.0).contains(&t), "split position {} out of range", t);

        // Derived points must be current before they are subdivided.
        for j in 0..self.patch_columns() {
            self.patch_mut(row, j).update_nodes();
        }

        let i = row * 3;
        let width = self.node_dimensions().1;

        for _ in 0..3 {
            self.nodes
                .insert(i + 3, (0..width).map(|_| MeshNode::default()).collect());
        }

        // The old bottom of the row is now at i + 6.
        let nodes = &mut self.nodes;

        for j in 0..width {
            let curve = CubicBezier::new(
                nodes[i][j].p,
                nodes[i + 1][j].p,
                nodes[i + 2][j].p,
                nodes[i + 6][j].p,
            );
            let (first, second) = curve.subdivide(t);

            for (k, p) in first.points().iter().enumerate() {
                nodes[i + k][j].p = *p;
            }
            for (k, p) in second.points().iter().enumerate() {
                nodes[i + 3 + k][j].p = *p;
            }

            if j % 3 == 0 {
                // Splitting a side: the two halves keep its path type.
                let (path_type, set) = (nodes[i + 1][j].path_type, nodes[i + 1][j].set);

                for k in 4..6 {
                    let handle = &mut nodes[i + k][j];
                    handle.node_type = NodeType::Handle;
                    handle.path_type = path_type;
                    handle.set = set;
                }

                let color = average_color(nodes[i][j].color, nodes[i + 6][j].color, t);
                let opacity = lerp(nodes[i][j].opacity, nodes[i + 6][j].opacity, t);

                let corner = &mut nodes[i + 3][j];
                corner.node_type = NodeType::Corner;
                corner.set = true;
                corner.color = color;
                corner.opacity = opacity;
            } else {
                // Splitting the inside of a patch: the new side between the
                // halves is as curved as the most curved of the sides
                // parallel to it.
                let set = nodes[i + 1][j].set || nodes[i + 2][j].set;

                for k in 4..6 {
                    let tensor = &mut nodes[i + k][j];
                    tensor.node_type = NodeType::Tensor;
                    tensor.set = set;
                }

                let path_type = [nodes[i][j].path_type, nodes[i + 6][j].path_type]
                    .iter()
                    .copied()
                    .max_by_key(|p| p.rank())
                    .unwrap_or(PathType::LineRelative);

                let handle = &mut nodes[i + 3][j];
                handle.node_type = NodeType::Handle;
                handle.path_type = path_type;
                handle.set = path_type.is_curve();
            }
        }

        self.update_edges();
        self.update_all_nodes();
        self.retained.clear();
    }

    /// Splits patch column `col` in two at parameter `t` across the column.
    pub fn split_column_at(&mut self, col: usize, t: f64) {
        assert!(
            col < self.patch_columns(),
            "cannot split column {} of a mesh with {} columns",
            col,
            self.patch_columns()
        );

        self.transpose();
        self.split_row_at(col, t);
        self.transpose();
        self.update_edges();
    }

    /// Swaps rows and columns of the node grid.  Node types are symmetric
    /// under this; edge flags are not and must be recomputed afterwards.
    pub(crate) fn transpose(&mut self) {
        let (rows, cols) = self.node_dimensions();
        let mut transposed: Vec<Vec<MeshNode>> = (0..cols).map(|_| Vec::with_capacity(rows)).collect();

        for row in self.nodes.drain(..) {
            for (j, node) in row.into_iter().enumerate() {
                transposed[j].push(node);
            }
        }

        self.nodes = transposed;
    }
}
