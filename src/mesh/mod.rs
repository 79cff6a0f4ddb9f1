//! Mesh gradients: a grid of Coons patches with a color at each corner.
//!
//! A mesh of R x C patches is stored as a (3R+1) x (3C+1) array of
//! nodes.  Nodes at rows and columns that are multiples of three are
//! patch corners; the others are either Bézier handles on the patch
//! sides or tensor points inside a patch.

mod array;
mod edit;
mod io;
mod node;
mod patch;
mod path;
mod smooth;
mod split;

pub use self::array::{MeshCreateOptions, MeshNodeArray, MeshType};
pub use self::edit::{ColorSampler, MeshNodeOperation, PickOutcome};
pub use self::io::{MeshDescription, MeshPatchData, MeshRowData, MeshStopData, ReadError};
pub use self::node::{MeshNode, NodeEdge, NodeType, PathType};
pub use self::patch::{MeshPatch, MeshPatchMut};
pub use self::path::{parse_side_path, parse_tensor_points, MeshPathError, SidePath};
pub use self::smooth::{SlopeKind, SmoothingKind, SMOOTH_SUBDIVISIONS};
