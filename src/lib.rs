//! Mesh gradient topology and gradient color vectors for SVG paint servers.
//!
//! This crate has two independent parts, for use by a paint layer that
//! turns gradients into pixels:
//!
//! * [`mesh`] keeps the control points and corner colors of an SVG 2
//!   mesh gradient as a grid of Coons patches.  It can build a mesh from
//!   a bounding box or from parsed mesh rows, write it back, and edit it:
//!   toggle sides between lines and curves, toggle tensor points, split
//!   rows and columns, smooth or pick corner colors, and move the points
//!   that depend on a dragged corner.
//!
//! * [`gradient`] normalizes the stops of linear, radial and mesh
//!   gradients, resolves the references between gradients without
//!   looping on cycles, and builds a prefiltered table of colors that can
//!   be sampled by offset for each spread method.
//!
//! # Example
//!
//! ```
//! use gradmesh::gradient::{Gradient, Gradients, SpreadMethod, StopDeclaration};
//! use gradmesh::RgbColor;
//!
//! let mut gradients = Gradients::new();
//!
//! let vector = gradients.add(Gradient::linear().with_stops(vec![
//!     StopDeclaration::new(0.0, RgbColor::new(1.0, 0.0, 0.0), 1.0),
//!     StopDeclaration::new(1.0, RgbColor::new(0.0, 0.0, 1.0), 1.0),
//! ]));
//!
//! let user = gradients.add(
//!     Gradient::linear()
//!         .with_href(vector)
//!         .with_spread(SpreadMethod::Repeat),
//! );
//!
//! let color = gradients.sample_at(user, 0.5);
//! assert_eq!(color.a, 255);
//! ```
//!
//! Set the `GRADMESH_LOG` environment variable to get messages about
//! invalid input that was replaced by a fallback value.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::derive_partial_eq_without_eq)]
#![warn(nonstandard_style, rust_2018_idioms, unused)]
// Some lints no longer exist
#![warn(renamed_and_removed_lints)]
// Standalone lints
#![warn(trivial_casts, trivial_numeric_casts)]

pub use crate::color::{RgbColor, StopColor};
pub use crate::coord_units::CoordUnits;
pub use crate::error::{AttributeError, ParseError, ValueErrorKind};
pub use crate::parsers::Parse;
pub use crate::point::Point;
pub use crate::rect::{IRect, Rect};
pub use crate::transform::Transform;

mod bezier;
mod color;
mod coord_units;
mod error;
pub mod float_eq;
pub mod gradient;
mod log;
pub mod mesh;
mod parsers;
mod point;
mod rect;
mod transform;
mod unit_interval;
mod util;
