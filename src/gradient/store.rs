//! The set of gradients of a document, with their reference chains.

use std::collections::HashSet;

use rgb::RGBA8;

use crate::color::{average_color, RgbColor, StopColor};
use crate::error::AttributeError;
use crate::gradmesh_log;
use crate::parsers::{parse_attribute, NumberOrPercentage};
use crate::transform::Transform;
use crate::util::{clamp, lerp};

use super::chain;
use super::stops::{normalize_stops, Stop, StopDeclaration};
use super::table::ColorTable;
use super::{Gradient, GradientKind, GradientUnits, ResolvedKind, SpreadMethod};

/// Index of a gradient in a [`Gradients`] arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GradientId(usize);

/// Arena of gradients that may reference each other.
///
/// Normalized vectors and color tables are computed on first use and
/// cached.  Changing a gradient through one of the setters drops the
/// caches of that gradient and of every gradient whose reference chain
/// goes through it.
#[derive(Debug, Default, Clone)]
pub struct Gradients {
    gradients: Vec<Gradient>,
}

impl Gradients {
    pub fn new() -> Gradients {
        Gradients::default()
    }

    pub fn add(&mut self, mut gradient: Gradient) -> GradientId {
        if let Some(href) = gradient.href {
            self.check_id(href);
        }

        gradient.invalidate();
        self.gradients.push(gradient);
        GradientId(self.gradients.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.gradients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gradients.is_empty()
    }

    pub fn get(&self, id: GradientId) -> &Gradient {
        self.check_id(id);
        &self.gradients[id.0]
    }

    fn check_id(&self, id: GradientId) {
        assert!(
            id.0 < self.gradients.len(),
            "gradient id {} out of range (have {})",
            id.0,
            self.gradients.len()
        );
    }

    fn get_mut(&mut self, id: GradientId) -> &mut Gradient {
        self.check_id(id);
        &mut self.gradients[id.0]
    }

    /// Drops the caches of `id` and of all gradients that depend on it.
    fn invalidate(&mut self, id: GradientId) {
        let mut seen = HashSet::new();
        let mut pending = vec![id];

        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }

            self.gradients[current.0].invalidate();

            pending.extend(
                self.gradients
                    .iter()
                    .enumerate()
                    .filter(|(_, g)| g.href == Some(current))
                    .map(|(i, _)| GradientId(i)),
            );
        }
    }

    /// To be called when a gradient changed behind the arena's back, for
    /// example after a caller edited the mesh of a mesh gradient.
    pub fn on_referenced_gradient_changed(&mut self, id: GradientId) {
        self.check_id(id);
        self.invalidate(id);
    }

    pub fn set_stops(&mut self, id: GradientId, stops: Vec<StopDeclaration>) {
        self.get_mut(id).stops = stops;
        self.invalidate(id);
    }

    pub fn set_spread(&mut self, id: GradientId, spread: Option<SpreadMethod>) {
        self.get_mut(id).spread = spread;
        self.invalidate(id);
    }

    pub fn set_units(&mut self, id: GradientId, units: Option<GradientUnits>) {
        self.get_mut(id).units = units;
        self.invalidate(id);
    }

    pub fn set_transform(&mut self, id: GradientId, transform: Option<Transform>) {
        self.get_mut(id).transform = transform;
        self.invalidate(id);
    }

    pub fn set_kind(&mut self, id: GradientId, kind: GradientKind) {
        self.get_mut(id).kind = kind;
        self.invalidate(id);
    }

    pub fn set_href(&mut self, id: GradientId, href: Option<GradientId>) {
        if let Some(h) = href {
            self.check_id(h);
        }

        self.get_mut(id).href = href;
        self.invalidate(id);
    }

    pub fn set_current_color(&mut self, id: GradientId, color: RgbColor) {
        self.get_mut(id).current_color = color;
        self.invalidate(id);
    }

    /// Sets gradient attributes from their string values.
    ///
    /// Handles `spreadMethod`, `gradientUnits`, `gradientTransform`, and
    /// the geometry attributes of linear and radial gradients; others are
    /// ignored.  Attributes before the first invalid one are kept.
    pub fn set_attributes(
        &mut self,
        id: GradientId,
        attrs: &[(&str, &str)],
    ) -> Result<(), AttributeError> {
        let result = set_gradient_attributes(self.get_mut(id), attrs);
        self.invalidate(id);
        result
    }

    /// First gradient, starting at `id` itself, for which `pred` is true.
    ///
    /// Returns `None` if there is no such gradient or the chain has a cycle
    /// before one is found.
    pub fn chase_references<P>(&self, id: GradientId, mut pred: P) -> Option<GradientId>
    where
        P: FnMut(&Gradient) -> bool,
    {
        self.check_id(id);

        chain::chase_references(
            id,
            |g| self.gradients[g.0].href,
            |g| pred(&self.gradients[g.0]),
        )
    }

    /// The gradient whose stops `id` uses.
    pub fn vector_source(&self, id: GradientId) -> Option<GradientId> {
        self.chase_references(id, Gradient::has_stops)
    }

    pub fn fetch_spread(&self, id: GradientId) -> SpreadMethod {
        self.chase_references(id, |g| g.spread.is_some())
            .and_then(|g| self.gradients[g.0].spread)
            .unwrap_or_default()
    }

    pub fn fetch_units(&self, id: GradientId) -> GradientUnits {
        self.chase_references(id, |g| g.units.is_some())
            .and_then(|g| self.gradients[g.0].units)
            .unwrap_or_default()
    }

    pub fn fetch_transform(&self, id: GradientId) -> Transform {
        self.chase_references(id, |g| g.transform.is_some())
            .and_then(|g| self.gradients[g.0].transform)
            .unwrap_or_default()
    }

    /// Geometry of `id`, with unspecified values taken from the reference
    /// chain and then from the defaults.
    pub fn resolved_kind(&self, id: GradientId) -> ResolvedKind {
        let mut kind = self.get(id).kind.clone();

        self.chase_references(id, |g| {
            kind = kind.resolve_from_fallback(&g.kind);
            kind.is_resolved()
        });

        kind.resolve_from_defaults()
    }

    fn compute_vector(&self, id: GradientId) -> Vec<Stop> {
        match self.vector_source(id) {
            Some(source) => normalize_stops(&self.gradients[source.0].stops),
            None => normalize_stops(&[]),
        }
    }

    /// The normalized stops of `id`, which may come from a referenced
    /// gradient.
    pub fn ensure_vector(&mut self, id: GradientId) -> &[Stop] {
        self.check_id(id);

        if self.gradients[id.0].vector.is_none() {
            let vector = self.compute_vector(id);
            self.gradients[id.0].vector = Some(vector);
        }

        self.gradients[id.0].vector.as_deref().unwrap_or_default()
    }

    pub fn ensure_color_table(&mut self, id: GradientId) -> &ColorTable {
        let spread = self.fetch_spread(id);

        let table = match self.gradients[id.0].table.take() {
            Some(table) if table.spread() == spread => table,

            _ => {
                let current_color = self.gradients[id.0].current_color;
                ColorTable::new(self.ensure_vector(id), spread, current_color)
            }
        };

        self.gradients[id.0].table.insert(table)
    }

    pub fn sample_at(&mut self, id: GradientId, t: f64) -> RGBA8 {
        self.ensure_color_table(id).sample_at(t)
    }

    /// Makes `id` hold its vector itself instead of borrowing it.
    ///
    /// The normalized stops of the chain are copied into `id`, along with
    /// the inherited spread, units and transform, and the reference is
    /// dropped.  Returns whether anything changed.
    pub fn ensure_vector_normalized(&mut self, id: GradientId) -> bool {
        let gradient = self.get(id);

        if gradient.has_stops() && gradient.href.is_none() {
            return false;
        }

        let stops = self
            .compute_vector(id)
            .into_iter()
            .map(StopDeclaration::from)
            .collect();
        let spread = self.fetch_spread(id);
        let units = self.fetch_units(id);
        let transform = self.fetch_transform(id);
        let kind = match self.resolved_kind(id) {
            ResolvedKind::Linear { x1, y1, x2, y2 } => GradientKind::Linear {
                x1: Some(x1),
                y1: Some(y1),
                x2: Some(x2),
                y2: Some(y2),
            },

            ResolvedKind::Radial {
                cx,
                cy,
                r,
                fx,
                fy,
                fr,
            } => GradientKind::Radial {
                cx: Some(cx),
                cy: Some(cy),
                r: Some(r),
                fx: Some(fx),
                fy: Some(fy),
                fr: Some(fr),
            },

            ResolvedKind::Mesh(mesh) => GradientKind::Mesh(mesh),
        };

        let gradient = self.get_mut(id);
        gradient.stops = stops;
        gradient.spread = Some(spread);
        gradient.units = Some(units);
        gradient.transform = Some(transform);
        gradient.kind = kind;
        gradient.href = None;

        self.invalidate(id);
        true
    }

    /// Number of gradients that reference `id` directly.
    pub fn href_count(&self, id: GradientId) -> usize {
        self.check_id(id);
        self.gradients.iter().filter(|g| g.href == Some(id)).count()
    }

    /// Returns a gradient with the same vector as `id` that can be
    /// modified without affecting other users.
    ///
    /// If more than one gradient references `id`, this is a new copy of
    /// `id`; otherwise `id` itself.
    pub fn fork_vector_if_necessary(&mut self, id: GradientId) -> GradientId {
        if self.href_count(id) > 1 {
            let copy = self.get(id).clone();
            let new_id = self.add(copy);
            gradmesh_log!("(forked gradient {:?} into {:?})", id, new_id);
            new_id
        } else {
            id
        }
    }

    /// Inserts a stop at `offset` between stops `index` and `index + 1` of
    /// the vector of `id`, colored as the gradient is at that offset.
    ///
    /// The vector is normalized into `id` first.  Returns the index of the
    /// new stop.
    pub fn add_stop_between(&mut self, id: GradientId, index: usize, offset: f64) -> usize {
        self.ensure_vector_normalized(id);

        let gradient = self.get(id);
        let current_color = gradient.current_color;
        let stops = &gradient.stops;

        assert!(
            index + 1 < stops.len(),
            "no stop after stop {} of {}",
            index,
            stops.len()
        );

        let prev = stops[index];
        let next = stops[index + 1];

        let offset = clamp(offset, prev.offset, next.offset);
        let span = next.offset - prev.offset;
        let t = if span > 0.0 {
            (offset - prev.offset) / span
        } else {
            0.5
        };

        let stop = StopDeclaration {
            offset,
            color: StopColor::Specified(average_color(
                prev.color.resolve(current_color),
                next.color.resolve(current_color),
                t,
            )),
            opacity: lerp(prev.opacity, next.opacity, t),
        };

        let mut stops = self.get(id).stops.clone();
        stops.insert(index + 1, stop);
        self.set_stops(id, stops);

        index + 1
    }

    /// Mirrors the vector of `id`: the stops are reversed and each offset
    /// becomes 1 − offset.
    pub fn reverse_vector(&mut self, id: GradientId) {
        self.ensure_vector_normalized(id);

        let stops = self
            .get(id)
            .stops
            .iter()
            .rev()
            .map(|s| StopDeclaration {
                offset: 1.0 - s.offset,
                ..*s
            })
            .collect();

        self.set_stops(id, stops);
    }

    /// Whether `a` and `b` paint the same, as far as their resolved
    /// attributes go.
    pub fn is_equivalent(&self, a: GradientId, b: GradientId) -> bool {
        if a == b {
            return true;
        }

        let (ga, gb) = (self.get(a), self.get(b));
        let (va, vb) = (self.compute_vector(a), self.compute_vector(b));

        va.len() == vb.len()
            && va.iter().zip(vb.iter()).all(|(sa, sb)| {
                sa.offset == sb.offset
                    && sa.opacity == sb.opacity
                    && sa.rgb(ga.current_color) == sb.rgb(gb.current_color)
            })
            && self.fetch_spread(a) == self.fetch_spread(b)
            && self.fetch_units(a) == self.fetch_units(b)
            && self.fetch_transform(a) == self.fetch_transform(b)
            && self.resolved_kind(a) == self.resolved_kind(b)
    }
}

fn parse_coordinate(attr: &str, value: &str) -> Result<Option<f64>, AttributeError> {
    let n: NumberOrPercentage = parse_attribute(attr, value)?;
    Ok(Some(n.value))
}

fn set_gradient_attributes(
    gradient: &mut Gradient,
    attrs: &[(&str, &str)],
) -> Result<(), AttributeError> {
    for &(attr, value) in attrs {
        match attr {
            "spreadMethod" => gradient.spread = Some(parse_attribute(attr, value)?),
            "gradientUnits" => gradient.units = Some(parse_attribute(attr, value)?),
            "gradientTransform" => gradient.transform = Some(parse_attribute(attr, value)?),

            _ => match gradient.kind {
                GradientKind::Linear {
                    ref mut x1,
                    ref mut y1,
                    ref mut x2,
                    ref mut y2,
                } => match attr {
                    "x1" => *x1 = parse_coordinate(attr, value)?,
                    "y1" => *y1 = parse_coordinate(attr, value)?,
                    "x2" => *x2 = parse_coordinate(attr, value)?,
                    "y2" => *y2 = parse_coordinate(attr, value)?,
                    _ => (),
                },

                GradientKind::Radial {
                    ref mut cx,
                    ref mut cy,
                    ref mut r,
                    ref mut fx,
                    ref mut fy,
                    ref mut fr,
                } => match attr {
                    "cx" => *cx = parse_coordinate(attr, value)?,
                    "cy" => *cy = parse_coordinate(attr, value)?,
                    "r" => *r = parse_coordinate(attr, value)?,
                    "fx" => *fx = parse_coordinate(attr, value)?,
                    "fy" => *fy = parse_coordinate(attr, value)?,
                    "fr" => *fr = parse_coordinate(attr, value)?,
                    _ => (),
                },

                GradientKind::Mesh(_) => (),
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord_units::CoordUnits;
    use crate::gradient::VECTOR_LENGTH;

    fn red() -> RgbColor {
        RgbColor::new(1.0, 0.0, 0.0)
    }

    fn blue() -> RgbColor {
        RgbColor::new(0.0, 0.0, 1.0)
    }

    fn red_to_blue() -> Vec<StopDeclaration> {
        vec![
            StopDeclaration::new(0.0, red(), 1.0),
            StopDeclaration::new(1.0, blue(), 1.0),
        ]
    }

    #[test]
    fn inherits_vector_through_href() {
        let mut gradients = Gradients::new();
        let vector = gradients.add(Gradient::linear().with_stops(red_to_blue()));
        let user = gradients.add(Gradient::linear().with_href(vector));

        assert_eq!(gradients.vector_source(user), Some(vector));
        assert_eq!(gradients.ensure_vector(user).len(), 2);
        assert_eq!(
            gradients.sample_at(user, 0.0),
            gradients.sample_at(vector, 0.0)
        );
    }

    #[test]
    fn own_stops_win_over_href() {
        let mut gradients = Gradients::new();
        let vector = gradients.add(Gradient::linear().with_stops(red_to_blue()));
        let user = gradients.add(
            Gradient::linear()
                .with_href(vector)
                .with_stops(vec![StopDeclaration::new(0.5, red(), 1.0)]),
        );

        assert_eq!(gradients.vector_source(user), Some(user));
        assert_eq!(gradients.sample_at(user, 1.0), RGBA8::new(255, 0, 0, 255));
    }

    #[test]
    fn cycles_fall_back_to_defaults() {
        let mut gradients = Gradients::new();
        let a = gradients.add(Gradient::linear());
        let b = gradients.add(Gradient::linear().with_href(a));
        gradients.set_href(a, Some(b));

        assert_eq!(gradients.vector_source(a), None);
        assert_eq!(gradients.fetch_spread(a), SpreadMethod::Pad);
        assert_eq!(gradients.fetch_units(b), GradientUnits(CoordUnits::ObjectBoundingBox));
        assert_eq!(gradients.fetch_transform(a), Transform::identity());

        let stops = gradients.ensure_vector(a).to_vec();
        assert_eq!(stops.len(), 2);
        assert!(stops.iter().all(|s| s.opacity == 0.0));

        assert_eq!(gradients.sample_at(a, 0.5).a, 0);
    }

    #[test]
    fn spread_is_inherited() {
        let mut gradients = Gradients::new();
        let vector = gradients.add(
            Gradient::linear()
                .with_stops(red_to_blue())
                .with_spread(SpreadMethod::Reflect),
        );
        let user = gradients.add(Gradient::linear().with_href(vector));

        assert_eq!(gradients.fetch_spread(user), SpreadMethod::Reflect);
        assert_eq!(
            gradients.ensure_color_table(user).spread(),
            SpreadMethod::Reflect
        );
    }

    #[test]
    fn changes_invalidate_dependents() {
        let mut gradients = Gradients::new();
        let vector = gradients.add(Gradient::linear().with_stops(red_to_blue()));
        let middle = gradients.add(Gradient::linear().with_href(vector));
        let user = gradients.add(Gradient::linear().with_href(middle));

        assert_eq!(gradients.sample_at(user, 0.0), RGBA8::new(255, 0, 0, 255));
        assert!(gradients.get(user).table.is_some());

        gradients.set_stops(vector, vec![StopDeclaration::new(0.0, blue(), 1.0)]);
        assert!(gradients.get(middle).vector.is_none());
        assert!(gradients.get(user).table.is_none());

        assert_eq!(gradients.sample_at(user, 0.0), RGBA8::new(0, 0, 255, 255));

        gradients.set_spread(middle, Some(SpreadMethod::Repeat));
        assert!(gradients.get(user).table.is_none());
        assert_eq!(
            gradients.ensure_color_table(user).spread(),
            SpreadMethod::Repeat
        );
        assert_eq!(gradients.ensure_color_table(user).len(), VECTOR_LENGTH);
    }

    #[test]
    fn invalidation_survives_cycles() {
        let mut gradients = Gradients::new();
        let a = gradients.add(Gradient::linear().with_stops(red_to_blue()));
        let b = gradients.add(Gradient::linear().with_href(a));
        gradients.set_href(a, Some(b));

        gradients.ensure_color_table(b);
        gradients.on_referenced_gradient_changed(a);
        assert!(gradients.get(b).table.is_none());
    }

    #[test]
    fn resolves_geometry_through_chain() {
        let mut gradients = Gradients::new();
        let base = gradients.add(Gradient::linear());
        gradients
            .set_attributes(base, &[("x1", "25%"), ("y2", "0.5"), ("spreadMethod", "repeat")])
            .unwrap();

        let user = gradients.add(Gradient::linear().with_href(base));
        gradients.set_attributes(user, &[("x2", "0.75")]).unwrap();

        assert_eq!(
            gradients.resolved_kind(user),
            ResolvedKind::Linear {
                x1: 0.25,
                y1: 0.0,
                x2: 0.75,
                y2: 0.5,
            }
        );
        assert_eq!(gradients.fetch_spread(user), SpreadMethod::Repeat);
    }

    #[test]
    fn invalid_attribute_is_an_error() {
        let mut gradients = Gradients::new();
        let id = gradients.add(Gradient::radial());

        let err = gradients
            .set_attributes(id, &[("r", "0.25"), ("spreadMethod", "sideways")])
            .unwrap_err();
        assert_eq!(err.attr, "spreadMethod");

        match gradients.get(id).kind {
            GradientKind::Radial { r, .. } => assert_eq!(r, Some(0.25)),
            _ => unreachable!(),
        }

        gradients
            .set_attributes(id, &[("gradientTransform", "translate(10, 20)")])
            .unwrap();
        assert_eq!(
            gradients.fetch_transform(id),
            Transform::new_translate(10.0, 20.0)
        );
    }

    #[test]
    fn normalizes_inherited_vector() {
        let mut gradients = Gradients::new();
        let vector = gradients.add(
            Gradient::linear()
                .with_stops(vec![StopDeclaration::new(0.5, red(), 1.0)])
                .with_spread(SpreadMethod::Reflect),
        );
        let user = gradients.add(Gradient::linear().with_href(vector));

        assert!(gradients.ensure_vector_normalized(user));
        assert!(!gradients.ensure_vector_normalized(user));

        let g = gradients.get(user);
        assert_eq!(g.href, None);
        assert_eq!(g.stops.len(), 3);
        assert_eq!(g.spread, Some(SpreadMethod::Reflect));
        assert!(gradients.is_equivalent(user, vector));
    }

    #[test]
    fn forks_shared_vectors() {
        let mut gradients = Gradients::new();
        let vector = gradients.add(Gradient::linear().with_stops(red_to_blue()));
        let a = gradients.add(Gradient::linear().with_href(vector));

        assert_eq!(gradients.href_count(vector), 1);
        assert_eq!(gradients.fork_vector_if_necessary(vector), vector);

        let _b = gradients.add(Gradient::linear().with_href(vector));
        assert_eq!(gradients.href_count(vector), 2);

        let fork = gradients.fork_vector_if_necessary(vector);
        assert_ne!(fork, vector);
        assert_eq!(gradients.href_count(fork), 0);
        assert!(gradients.is_equivalent(fork, vector));

        gradients.set_href(a, Some(fork));
        assert_eq!(gradients.href_count(vector), 1);
    }

    #[test]
    fn adds_stop_with_interpolated_color() {
        let mut gradients = Gradients::new();
        let id = gradients.add(Gradient::linear().with_stops(red_to_blue()));

        let index = gradients.add_stop_between(id, 0, 0.25);
        assert_eq!(index, 1);

        let stop = gradients.get(id).stops[1];
        assert_eq!(stop.offset, 0.25);
        assert_eq!(
            stop.color,
            StopColor::Specified(RgbColor::new(0.75, 0.0, 0.25))
        );
        assert_eq!(stop.opacity, 1.0);
        assert_eq!(gradients.ensure_vector(id).len(), 3);
    }

    #[test]
    fn reverses_vector() {
        let mut gradients = Gradients::new();
        let id = gradients.add(Gradient::linear().with_stops(vec![
            StopDeclaration::new(0.0, red(), 1.0),
            StopDeclaration::new(0.2, blue(), 0.5),
            StopDeclaration::new(1.0, blue(), 1.0),
        ]));

        gradients.reverse_vector(id);

        let offsets: Vec<f64> = gradients.get(id).stops.iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.8, 1.0]);
        assert_eq!(gradients.get(id).stops[2].color, StopColor::Specified(red()));
        assert_eq!(gradients.sample_at(id, 1.0), RGBA8::new(255, 0, 0, 255));
    }

    #[test]
    fn equivalence_compares_resolved_values() {
        let mut gradients = Gradients::new();
        let a = gradients.add(Gradient::linear().with_stops(red_to_blue()));
        let b = gradients.add(Gradient::linear().with_stops(red_to_blue()));
        let c = gradients.add(Gradient::radial().with_stops(red_to_blue()));

        assert!(gradients.is_equivalent(a, b));
        assert!(!gradients.is_equivalent(a, c));

        gradients.set_spread(b, Some(SpreadMethod::Repeat));
        assert!(!gradients.is_equivalent(a, b));
    }

    #[test]
    #[should_panic]
    fn bad_id_panics() {
        let gradients = Gradients::new();
        gradients.get(GradientId(3));
    }
}
