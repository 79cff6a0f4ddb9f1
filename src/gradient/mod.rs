//! Gradient vectors: stop lists, reference chains, and sampled color tables.
//!
//! A gradient may take its stops, spread method, units, transform and
//! geometry from another gradient through its `href`.  The stop list a
//! gradient finally uses is its *vector*; [`Gradients`] resolves vectors
//! across reference chains and keeps a [`ColorTable`] per gradient so that
//! a paint layer can sample colors by offset.

use cssparser::Parser;

use crate::color::RgbColor;
use crate::coord_units;
use crate::coord_units::CoordUnits;
use crate::enum_default;
use crate::error::*;
use crate::mesh::MeshNodeArray;
use crate::parse_identifiers;
use crate::parsers::Parse;
use crate::transform::Transform;

mod chain;
mod stops;
mod store;
mod table;

pub use self::chain::chase_references;
pub use self::stops::{normalize_stops, Stop, StopDeclaration};
pub use self::store::{GradientId, Gradients};
pub use self::table::{ColorTable, VECTOR_LENGTH};

// gradientUnits attribute; its default is objectBoundingBox
coord_units!(GradientUnits, CoordUnits::ObjectBoundingBox);

/// spreadMethod attribute for gradients
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SpreadMethod {
    Pad,
    Reflect,
    Repeat,
}

enum_default!(SpreadMethod, SpreadMethod::Pad);

impl Parse for SpreadMethod {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<SpreadMethod, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "pad" => SpreadMethod::Pad,
            "reflect" => SpreadMethod::Reflect,
            "repeat" => SpreadMethod::Repeat,
        )?)
    }
}

/// Parameters specific to each kind of gradient, before being resolved.
///
/// Geometry is in the gradient's units; `None` means the attribute was not
/// specified and should come from a referenced gradient or from the
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientKind {
    Linear {
        x1: Option<f64>,
        y1: Option<f64>,
        x2: Option<f64>,
        y2: Option<f64>,
    },

    Radial {
        cx: Option<f64>,
        cy: Option<f64>,
        r: Option<f64>,
        fx: Option<f64>,
        fy: Option<f64>,
        fr: Option<f64>,
    },

    Mesh(MeshNodeArray),
}

/// Parameters specific to each kind of gradient, after resolving.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedKind {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },

    Radial {
        cx: f64,
        cy: f64,
        r: f64,
        fx: f64,
        fy: f64,
        fr: f64,
    },

    Mesh(MeshNodeArray),
}

impl GradientKind {
    pub fn linear() -> GradientKind {
        GradientKind::Linear {
            x1: None,
            y1: None,
            x2: None,
            y2: None,
        }
    }

    pub fn radial() -> GradientKind {
        GradientKind::Radial {
            cx: None,
            cy: None,
            r: None,
            fx: None,
            fy: None,
            fr: None,
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        match *self {
            GradientKind::Linear { x1, y1, x2, y2 } => {
                x1.is_some() && y1.is_some() && x2.is_some() && y2.is_some()
            }

            GradientKind::Radial {
                cx,
                cy,
                r,
                fx,
                fy,
                fr,
            } => {
                cx.is_some()
                    && cy.is_some()
                    && r.is_some()
                    && fx.is_some()
                    && fy.is_some()
                    && fr.is_some()
            }

            GradientKind::Mesh(_) => true,
        }
    }

    pub(crate) fn resolve_from_fallback(&self, fallback: &GradientKind) -> GradientKind {
        match (self, fallback) {
            (
                GradientKind::Linear { x1, y1, x2, y2 },
                GradientKind::Linear {
                    x1: fx1,
                    y1: fy1,
                    x2: fx2,
                    y2: fy2,
                },
            ) => GradientKind::Linear {
                x1: x1.or(*fx1),
                y1: y1.or(*fy1),
                x2: x2.or(*fx2),
                y2: y2.or(*fy2),
            },

            (
                GradientKind::Radial {
                    cx,
                    cy,
                    r,
                    fx,
                    fy,
                    fr,
                },
                GradientKind::Radial {
                    cx: f_cx,
                    cy: f_cy,
                    r: f_r,
                    fx: f_fx,
                    fy: f_fy,
                    fr: f_fr,
                },
            ) => GradientKind::Radial {
                cx: cx.or(*f_cx),
                cy: cy.or(*f_cy),
                r: r.or(*f_r),
                fx: fx.or(*f_fx),
                fy: fy.or(*f_fy),
                fr: fr.or(*f_fr),
            },

            // Different kinds have nothing to share
            _ => self.clone(),
        }
    }

    // https://www.w3.org/TR/SVG/pservers.html#LinearGradients
    // https://www.w3.org/TR/SVG/pservers.html#RadialGradients
    pub(crate) fn resolve_from_defaults(&self) -> ResolvedKind {
        match *self {
            GradientKind::Linear { x1, y1, x2, y2 } => ResolvedKind::Linear {
                x1: x1.unwrap_or(0.0),
                y1: y1.unwrap_or(0.0),
                x2: x2.unwrap_or(1.0),
                y2: y2.unwrap_or(0.0),
            },

            GradientKind::Radial {
                cx,
                cy,
                r,
                fx,
                fy,
                fr,
            } => {
                let cx = cx.unwrap_or(0.5);
                let cy = cy.unwrap_or(0.5);

                // fx and fy fall back to the presentational value of cx and cy
                ResolvedKind::Radial {
                    cx,
                    cy,
                    r: r.unwrap_or(0.5),
                    fx: fx.unwrap_or(cx),
                    fy: fy.unwrap_or(cy),
                    fr: fr.unwrap_or(0.0),
                }
            }

            GradientKind::Mesh(ref mesh) => ResolvedKind::Mesh(mesh.clone()),
        }
    }
}

/// One gradient element, with its attributes as specified.
///
/// Use [`Gradients`] to modify a gradient once it is shared; its setters
/// invalidate the cached vector and color table of every gradient that
/// depends on the one being changed.
#[derive(Debug, Clone)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<StopDeclaration>,
    pub spread: Option<SpreadMethod>,
    pub units: Option<GradientUnits>,
    pub transform: Option<Transform>,
    pub href: Option<GradientId>,

    /// Value of `currentColor` for stops that use it.
    pub current_color: RgbColor,

    pub(crate) vector: Option<Vec<Stop>>,
    pub(crate) table: Option<ColorTable>,
}

impl Gradient {
    pub fn new(kind: GradientKind) -> Gradient {
        Gradient {
            kind,
            stops: Vec::new(),
            spread: None,
            units: None,
            transform: None,
            href: None,
            current_color: RgbColor::black(),
            vector: None,
            table: None,
        }
    }

    pub fn linear() -> Gradient {
        Gradient::new(GradientKind::linear())
    }

    pub fn radial() -> Gradient {
        Gradient::new(GradientKind::radial())
    }

    pub fn with_stops(mut self, stops: Vec<StopDeclaration>) -> Gradient {
        self.stops = stops;
        self
    }

    pub fn with_href(mut self, href: GradientId) -> Gradient {
        self.href = Some(href);
        self
    }

    pub fn with_spread(mut self, spread: SpreadMethod) -> Gradient {
        self.spread = Some(spread);
        self
    }

    /// Whether this gradient declares stops of its own.
    pub fn has_stops(&self) -> bool {
        !self.stops.is_empty()
    }

    pub(crate) fn invalidate(&mut self) {
        self.vector = None;
        self.table = None;
    }
}
