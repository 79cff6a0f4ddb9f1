use matches::matches;

use gradmesh::mesh::{
    MeshCreateOptions, MeshDescription, MeshNodeArray, MeshNodeOperation, MeshPatchData,
    MeshRowData, MeshStopData, PathType, ReadError, SmoothingKind,
};
use gradmesh::{Point, Rect, RgbColor};

fn assert_points_eq(a: &[Point], b: &[Point]) {
    assert_eq!(a.len(), b.len());

    for (p, q) in a.iter().zip(b) {
        assert!(p.approx_eq(q), "{} != {}", p, q);
    }
}

fn described_mesh() -> MeshDescription {
    let red = RgbColor::new(1.0, 0.0, 0.0);
    let green = RgbColor::new(0.0, 1.0, 0.0);
    let blue = RgbColor::new(0.0, 0.0, 1.0);

    MeshDescription {
        x: 10.0,
        y: 10.0,
        rows: vec![
            MeshRowData {
                patches: vec![
                    MeshPatchData {
                        stops: vec![
                            MeshStopData::with_color("c 5,-5 15,-5 20,0", red, 1.0),
                            MeshStopData::with_color("l 0,20", green, 0.5),
                            MeshStopData::with_color("l -20,0", blue, 1.0),
                            MeshStopData::with_color("l 0,-20", red, 0.25),
                        ],
                        tensor: Some("2,2 -2,2 -2,-2 2,-2".to_string()),
                    },
                    MeshPatchData {
                        stops: vec![
                            MeshStopData::new("l 20,0"),
                            MeshStopData::with_color("l 0,20", blue, 1.0),
                            MeshStopData::with_color("c -5,5 -15,5 -20,0", green, 1.0),
                        ],
                        tensor: None,
                    },
                ],
            },
            MeshRowData {
                patches: vec![
                    MeshPatchData {
                        stops: vec![
                            MeshStopData::new("l 0,20"),
                            MeshStopData::with_color("l -20,0", red, 1.0),
                            MeshStopData::with_color("l 0,-20", blue, 1.0),
                        ],
                        tensor: None,
                    },
                    MeshPatchData {
                        stops: vec![
                            MeshStopData::new("l 0,20"),
                            MeshStopData::with_color("l -20,0", green, 1.0),
                        ],
                        tensor: None,
                    },
                ],
            },
        ],
    }
}

#[test]
fn coons_tensors_of_flat_patch_are_bilinear() {
    let mesh = MeshNodeArray::create(&Rect::new(0.0, 0.0, 10.0, 10.0));
    let patch = mesh.patch(0, 0);

    let third = 10.0 / 3.0;
    let expected = [
        Point::new(third, third),
        Point::new(2.0 * third, third),
        Point::new(2.0 * third, 2.0 * third),
        Point::new(third, 2.0 * third),
    ];

    for (k, e) in expected.iter().enumerate() {
        assert!(patch.coons_tensor_point(k).approx_eq(e));
        assert!(!patch.tensor_is_set(k));
    }
}

#[test]
fn coons_tensors_of_curved_patch() {
    // Top side bulges upwards and right side outwards; the bottom and
    // left sides are straight.
    let desc = MeshDescription {
        x: 0.0,
        y: 0.0,
        rows: vec![MeshRowData {
            patches: vec![MeshPatchData {
                stops: vec![
                    MeshStopData::new("c 3,-3 6,-3 9,0"),
                    MeshStopData::new("c 3,3 0,6 0,9"),
                    MeshStopData::new("l -9,0"),
                    MeshStopData::new("l 0,-9"),
                ],
                tensor: None,
            }],
        }],
    };

    let mesh = MeshNodeArray::read(&desc).unwrap();
    let patch = mesh.patch(0, 0);

    // (-4 corner + 6 (near handles) - 2 (far ends of the sides through
    // the corner) + 3 (far handles) - opposite corner) / 9
    let expected = [
        Point::new(4.0, 1.0),
        Point::new(8.0, 1.0),
        Point::new(6.0, 5.0),
        Point::new(3.0, 5.0),
    ];

    for (k, e) in expected.iter().enumerate() {
        assert!(patch.coons_tensor_point(k).approx_eq(e));
        assert!(!patch.tensor_is_set(k));
        assert!(patch.get_tensor_point(k).approx_eq(e));
    }
}

#[test]
fn moving_shared_corner_is_seen_by_both_patches() {
    let options = MeshCreateOptions {
        rows: 1,
        columns: 2,
        ..Default::default()
    };
    let mut mesh = MeshNodeArray::create_with_options(&Rect::new(0.0, 0.0, 20.0, 10.0), &options);

    // Top corner of the shared side.
    let corner = 1;
    let (row, col) = mesh.corner_position(corner);
    assert_eq!((row, col), (0, 3));

    let old = mesh.node(row, col).p;
    mesh.node_mut(row, col).p = old + Point::new(1.0, -2.0);
    mesh.update_handles(corner, &[corner], old, MeshNodeOperation::Scale);

    let left = mesh.patch(0, 0);
    let right = mesh.patch(0, 1);

    // Top right corner of the left patch is the top left of the right one.
    assert_eq!(left.get_point(1, 0), right.get_point(0, 0));
    assert!(left.get_point(1, 0).approx_eq(&Point::new(11.0, -2.0)));

    // The shared side runs down the right of one and up the left of the other.
    let mut shared = right.points_for_side(3);
    shared.reverse();
    assert_points_eq(&left.points_for_side(1), &shared);
}

#[test]
fn splitting_keeps_the_boundary() {
    let mut mesh = MeshNodeArray::read(&described_mesh()).unwrap();
    let original = mesh.clone();

    let top = original.patch(0, 0).side_curve(0);
    let left = original.patch(0, 0).side_curve(3);

    mesh.split_row(0, 1);
    assert_eq!(mesh.patch_rows(), 3);

    // The top side is untouched.
    assert_points_eq(
        &mesh.patch(0, 0).side_curve(0).points(),
        &top.points(),
    );

    // The left side is cut in two at its middle.
    let (lower, upper) = left.subdivide(0.5);
    assert_points_eq(&mesh.patch(1, 0).side_curve(3).points(), &lower.points());
    assert_points_eq(&mesh.patch(0, 0).side_curve(3).points(), &upper.points());

    // The bottom of the split row is the old bottom.
    assert_points_eq(
        &mesh.patch(1, 1).side_curve(2).points(),
        &original.patch(0, 1).side_curve(2).points(),
    );
}

#[test]
fn written_mesh_reads_back_equal() {
    let mesh = MeshNodeArray::read(&described_mesh()).unwrap();
    let desc = mesh.write();
    let again = MeshNodeArray::read(&desc).unwrap();

    assert!(mesh.approx_eq(&again));
    assert_eq!(again.write(), desc);

    assert_eq!(mesh.patch(0, 0).get_path_type(0), PathType::CurveRelative);
    assert!(mesh.patch(0, 0).any_tensor_is_set());
    assert!(!mesh.patch(1, 1).any_tensor_is_set());
    assert_eq!(again.patch(0, 0).get_opacity(1), 0.5);
}

#[test]
fn created_grid_round_trips() {
    let options = MeshCreateOptions {
        rows: 2,
        columns: 3,
        color: RgbColor::new(0.2, 0.4, 0.6),
        ..Default::default()
    };
    let mesh = MeshNodeArray::create_with_options(&Rect::new(0.0, 0.0, 30.0, 20.0), &options);
    let copy = MeshNodeArray::read(&mesh.write()).unwrap();

    assert_eq!(copy.corner_count(), 12);

    for corner in 0..mesh.corner_count() {
        let (row, col) = mesh.corner_position(corner);
        assert!(mesh.node(row, col).p.approx_eq(&copy.node(row, col).p));
        assert_eq!(copy.node(row, col).color, mesh.node(row, col).color);
    }

    let twice = MeshNodeArray::read(&copy.write()).unwrap();
    assert!(copy.approx_eq(&twice));
}

#[test]
fn malformed_description_is_an_error() {
    let mut desc = described_mesh();
    desc.rows[1].patches[0].tensor = Some("1,1 2".to_string());

    assert!(matches!(
        MeshNodeArray::read(&desc),
        Err(ReadError::Tensor { row: 1, column: 0, .. })
    ));
}

#[test]
fn edits_report_what_changed() {
    let mut mesh = MeshNodeArray::read(&described_mesh()).unwrap();

    // Corners 0 and 1 share the curved top side of the first patch.
    assert_eq!(mesh.side_toggle(&[0, 1]), 1);
    assert!(mesh.patch(0, 0).get_path_type(0).is_line());

    assert_eq!(mesh.side_toggle(&[0, 1]), 1);
    assert!(mesh.patch(0, 0).get_path_type(0).is_curve());

    assert_eq!(mesh.tensor_toggle(&[0, 1, 3, 4]), 1);
    assert!(!mesh.patch(0, 0).any_tensor_is_set());

    assert_eq!(mesh.color_smooth(&[4]), 1);
}

#[test]
fn smoothing_keeps_outline_and_corner_colors() {
    let mesh = MeshNodeArray::read(&described_mesh()).unwrap();

    for kind in &[SmoothingKind::default(), SmoothingKind::Bicubic] {
        let smooth = mesh.smooth(*kind);

        assert_eq!(smooth.patch_rows(), 16);
        assert_eq!(smooth.patch_columns(), 16);

        let (rows, cols) = smooth.node_dimensions();
        assert!(smooth.node(rows - 1, cols - 1).p.approx_eq(&mesh.node(6, 6).p));

        for corner in 0..mesh.corner_count() {
            let (row, col) = mesh.corner_position(corner);
            let c = mesh.node(row, col).color;
            let s = smooth.node(row * 8, col * 8).color;

            for (a, b) in c.channels().iter().zip(s.channels().iter()) {
                assert!((a - b).abs() < 1e-9);
            }
        }
    }
}
