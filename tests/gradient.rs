use proptest::prelude::*;
use rgb::RGBA8;

use gradmesh::gradient::{
    chase_references, normalize_stops, ColorTable, Gradient, Gradients, SpreadMethod,
    StopDeclaration, VECTOR_LENGTH,
};
use gradmesh::{RgbColor, StopColor};

fn red() -> RgbColor {
    RgbColor::new(1.0, 0.0, 0.0)
}

fn blue() -> RgbColor {
    RgbColor::new(0.0, 0.0, 1.0)
}

fn channel_diff(a: RGBA8, b: RGBA8) -> u8 {
    [
        a.r.abs_diff(b.r),
        a.g.abs_diff(b.g),
        a.b.abs_diff(b.b),
        a.a.abs_diff(b.a),
    ]
    .iter()
    .copied()
    .max()
    .unwrap_or(0)
}

prop_compose! {
    fn stop_declaration()(
        offset in -2.0..3.0f64,
        r in 0.0..=1.0f64,
        g in 0.0..=1.0f64,
        b in 0.0..=1.0f64,
        opacity in -0.5..1.5f64,
    ) -> StopDeclaration {
        StopDeclaration::new(offset, RgbColor::new(r, g, b), opacity)
    }
}

proptest! {
    #[test]
    fn normalized_stops_cover_unit_range(stops in prop::collection::vec(stop_declaration(), 0..12)) {
        let normalized = normalize_stops(&stops);

        prop_assert!(normalized.len() >= 2);
        prop_assert_eq!(normalized[0].offset, 0.0);
        prop_assert_eq!(normalized[normalized.len() - 1].offset, 1.0);

        for pair in normalized.windows(2) {
            prop_assert!(pair[0].offset <= pair[1].offset);
        }

        for s in &normalized {
            prop_assert!((0.0..=1.0).contains(&s.opacity));
        }
    }

    #[test]
    fn repeat_table_wraps(stops in prop::collection::vec(stop_declaration(), 1..6)) {
        let table = ColorTable::new(&normalize_stops(&stops), SpreadMethod::Repeat, RgbColor::black());
        let cells = table.as_slice();

        prop_assert!(channel_diff(cells[0], cells[VECTOR_LENGTH - 1]) <= 1);
    }

    #[test]
    fn chasing_always_terminates(
        links in prop::collection::vec(prop::option::of(0..8usize), 8),
        start in 0..8usize,
    ) {
        // Never matches, so the walk must end at a dead end or a cycle.
        let found = chase_references(start, |i| links[i], |_| false);
        prop_assert_eq!(found, None);
    }
}

#[test]
fn empty_gradient_is_transparent() {
    let stops = normalize_stops(&[]);

    assert_eq!(stops.len(), 2);
    assert_eq!(stops[0].offset, 0.0);
    assert_eq!(stops[1].offset, 1.0);

    for s in &stops {
        assert_eq!(s.color, StopColor::Specified(RgbColor::black()));
        assert_eq!(s.opacity, 0.0);
    }
}

#[test]
fn single_stop_fills_range() {
    let stops = normalize_stops(&[StopDeclaration::new(0.3, red(), 1.0)]);

    assert_eq!(stops.first().map(|s| s.offset), Some(0.0));
    assert_eq!(stops.last().map(|s| s.offset), Some(1.0));
    assert!(stops.iter().all(|s| s.color == StopColor::Specified(red())));

    let table = ColorTable::new(&stops, SpreadMethod::Pad, RgbColor::black());
    assert!(table
        .as_slice()
        .iter()
        .all(|c| *c == RGBA8::new(255, 0, 0, 255)));
}

#[test]
fn cyclic_references_are_not_followed_forever() {
    let mut gradients = Gradients::new();
    let a = gradients.add(Gradient::linear());
    let b = gradients.add(Gradient::linear().with_href(a));
    gradients.set_href(a, Some(b));

    assert_eq!(gradients.chase_references(a, |_| false), None);
    assert_eq!(gradients.chase_references(b, |_| false), None);

    // A gradient in the cycle can still match.
    assert_eq!(gradients.chase_references(a, |g| g.href == Some(a)), Some(b));

    assert_eq!(gradients.fetch_spread(a), SpreadMethod::Pad);
    assert_eq!(gradients.sample_at(b, 0.5), RGBA8::new(0, 0, 0, 0));
}

#[test]
fn boundary_cells_match_for_periodic_spreads() {
    let stops = normalize_stops(&[
        StopDeclaration::new(0.0, red(), 1.0),
        StopDeclaration::new(0.4, RgbColor::new(0.0, 1.0, 0.0), 0.5),
        StopDeclaration::new(1.0, blue(), 1.0),
    ]);

    for spread in &[SpreadMethod::Repeat, SpreadMethod::Reflect] {
        let table = ColorTable::new(&stops, *spread, RgbColor::black());
        let cells = table.as_slice();

        assert_eq!(cells.len(), VECTOR_LENGTH);
        assert!(channel_diff(cells[0], cells[VECTOR_LENGTH - 1]) <= 1);
    }
}

#[test]
fn shared_vector_follows_edits() {
    let mut gradients = Gradients::new();
    let vector = gradients.add(Gradient::linear().with_stops(vec![
        StopDeclaration::new(0.0, red(), 1.0),
        StopDeclaration::new(1.0, blue(), 1.0),
    ]));
    let a = gradients.add(Gradient::linear().with_href(vector));
    let b = gradients.add(Gradient::radial().with_href(vector));

    assert_eq!(gradients.sample_at(a, 0.0), RGBA8::new(255, 0, 0, 255));
    assert_eq!(gradients.sample_at(b, 1.0), RGBA8::new(0, 0, 255, 255));

    // Both users share the vector, so editing one of them needs a fork.
    let fork = gradients.fork_vector_if_necessary(vector);
    assert_ne!(fork, vector);

    gradients.reverse_vector(fork);
    gradients.set_href(a, Some(fork));

    assert_eq!(gradients.sample_at(a, 0.0), RGBA8::new(0, 0, 255, 255));
    assert_eq!(gradients.sample_at(b, 0.0), RGBA8::new(255, 0, 0, 255));
}

#[test]
fn stops_from_attributes_feed_tables() {
    let mut gradients = Gradients::new();
    let id = gradients.add(Gradient::linear().with_stops(vec![
        StopDeclaration::from_attributes(Some("0%"), Some("currentColor"), None),
        StopDeclaration::from_attributes(Some("100%"), Some("#00ff00"), Some("50%")),
    ]));
    gradients.set_current_color(id, blue());

    assert_eq!(gradients.sample_at(id, 0.0), RGBA8::new(0, 0, 255, 255));
    assert_eq!(gradients.sample_at(id, 1.0), RGBA8::new(0, 255, 0, 128));
}
