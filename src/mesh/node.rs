//! Nodes of the mesh grid.

use bitflags::bitflags;

use crate::color::RgbColor;
use crate::point::Point;

/// Role of a node within its patch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeType {
    Unknown,
    /// Patch vertex; carries color and opacity.
    Corner,
    /// Bézier control point along a side; carries the side's path type.
    Handle,
    /// Interior point controlling the twist of the patch.
    Tensor,
}

impl NodeType {
    /// The role of the node at grid position (`row`, `col`).
    ///
    /// Every third node in both directions is a corner; nodes strictly
    /// inside a patch are tensors; everything else lies on a side.
    pub fn at(row: usize, col: usize) -> NodeType {
        match (row % 3 == 0, col % 3 == 0) {
            (true, true) => NodeType::Corner,
            (false, false) => NodeType::Tensor,
            _ => NodeType::Handle,
        }
    }
}

bitflags! {
    /// Which outer boundaries of the mesh a node lies on.
    pub struct NodeEdge: u32 {
        const TOP = 1 << 0;
        const LEFT = 1 << 1;
        const BOTTOM = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl Default for NodeEdge {
    fn default() -> NodeEdge {
        NodeEdge::empty()
    }
}

/// Path command of a patch side, as written in the mesh path data.
///
/// Only meaningful on handle nodes; both handles of a side carry the
/// same value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathType {
    /// `l`
    LineRelative,
    /// `L`
    LineAbsolute,
    /// `c`
    CurveRelative,
    /// `C`
    CurveAbsolute,
    /// `u`, never authored
    Unset,
}

impl Default for PathType {
    fn default() -> PathType {
        PathType::Unset
    }
}

impl PathType {
    pub fn from_char(c: char) -> Option<PathType> {
        match c {
            'l' => Some(PathType::LineRelative),
            'L' => Some(PathType::LineAbsolute),
            'c' => Some(PathType::CurveRelative),
            'C' => Some(PathType::CurveAbsolute),
            'u' => Some(PathType::Unset),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            PathType::LineRelative => 'l',
            PathType::LineAbsolute => 'L',
            PathType::CurveRelative => 'c',
            PathType::CurveAbsolute => 'C',
            PathType::Unset => 'u',
        }
    }

    #[inline]
    pub fn is_line(self) -> bool {
        matches!(self, PathType::LineRelative | PathType::LineAbsolute)
    }

    #[inline]
    pub fn is_curve(self) -> bool {
        matches!(self, PathType::CurveRelative | PathType::CurveAbsolute)
    }

    /// Lines become curves and curves become lines, keeping
    /// relative/absolute.
    pub fn toggled(self) -> PathType {
        match self {
            PathType::LineRelative => PathType::CurveRelative,
            PathType::LineAbsolute => PathType::CurveAbsolute,
            PathType::CurveRelative => PathType::LineRelative,
            PathType::CurveAbsolute => PathType::LineAbsolute,
            PathType::Unset => PathType::Unset,
        }
    }

    /// When a split merges the path types of two parallel sides into the
    /// new side between them, the most "curved" one wins: `l` < `L` < `c` < `C`.
    pub(crate) fn rank(self) -> u8 {
        match self {
            PathType::Unset => 0,
            PathType::LineRelative => 1,
            PathType::LineAbsolute => 2,
            PathType::CurveRelative => 3,
            PathType::CurveAbsolute => 4,
        }
    }
}

/// One control point of the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    pub node_type: NodeType,
    pub node_edge: NodeEdge,

    /// Whether the position was authored, as opposed to derived from
    /// the corners.
    pub set: bool,

    pub p: Point,

    /// Index of the on-canvas handle that represents this node, if any.
    pub draggable: Option<usize>,

    pub path_type: PathType,

    pub color: RgbColor,
    pub opacity: f64,
}

impl Default for MeshNode {
    fn default() -> MeshNode {
        MeshNode {
            node_type: NodeType::Unknown,
            node_edge: NodeEdge::empty(),
            set: false,
            p: Point::default(),
            draggable: None,
            path_type: PathType::Unset,
            color: RgbColor::black(),
            opacity: 1.0,
        }
    }
}

impl MeshNode {
    pub fn new(node_type: NodeType) -> MeshNode {
        MeshNode {
            node_type,
            ..Default::default()
        }
    }
}
