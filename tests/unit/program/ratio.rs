use super::*;

#[test]
fn linear_gradient_projects_onto_the_axis() {
    let t = linear_gradient_ratio(
        Affine::IDENTITY,
        Point::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Point::new(0.5, 7.0),
    );
    assert!((t - 0.25).abs() < 1e-12);

    let degenerate = linear_gradient_ratio(
        Affine::IDENTITY,
        Point::new(1.0, 1.0),
        Vec2::ZERO,
        Point::new(3.0, 3.0),
    );
    assert_eq!(degenerate, 0.0);
}

#[test]
fn linear_gradient_honours_the_inverse_transform() {
    let inverse = Affine::translate((10.0, 0.0)).inverse();
    let t = linear_gradient_ratio(
        inverse,
        Point::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Point::new(10.5, 0.0),
    );
    assert!((t - 0.5).abs() < 1e-12);
}

#[test]
fn concentric_radial_gradient_is_distance_based() {
    let t = radial_gradient_ratio(
        Affine::IDENTITY,
        Point::ZERO,
        0.0,
        Point::ZERO,
        2.0,
        Point::new(0.0, 1.0),
    )
    .unwrap();
    assert!((t - 0.5).abs() < 1e-12);
}

#[test]
fn radial_gradient_with_offset_focus() {
    // Circles from (0,0) r=1 to (4,0) r=1: the point (2, 0.5) sits on the t=0.5 circle.
    let t = radial_gradient_ratio(
        Affine::IDENTITY,
        Point::ZERO,
        1.0,
        Point::new(4.0, 0.0),
        1.0,
        Point::new(2.0, 0.5),
    )
    .unwrap();
    let center = Point::new(4.0 * t, 0.0);
    assert!(((Point::new(2.0, 0.5) - center).hypot() - 1.0).abs() < 1e-9);
}

#[test]
fn radial_gradient_without_covering_circle_is_none() {
    // Both circles collapse to points: only points on the segment are covered.
    let t = radial_gradient_ratio(
        Affine::IDENTITY,
        Point::ZERO,
        0.0,
        Point::new(1.0, 0.0),
        0.0,
        Point::new(0.5, 3.0),
    );
    assert_eq!(t, None);
}

#[test]
fn blend_ratios_clamp_and_handle_equal_radii() {
    assert_eq!(linear_blend_ratio(Vec2::new(1.0, 0.0), 0.0, Point::new(2.0, 0.0)), 1.0);
    assert_eq!(linear_blend_ratio(Vec2::new(1.0, 0.0), 0.0, Point::new(-2.0, 0.0)), 0.0);
    assert!((linear_blend_ratio(Vec2::new(0.5, 0.0), 0.25, Point::new(1.0, 0.0)) - 0.25).abs() < 1e-12);

    let t = radial_blend_ratio(Affine::IDENTITY, 1.0, 3.0, Point::new(2.0, 0.0));
    assert!((t - 0.5).abs() < 1e-12);
    assert_eq!(radial_blend_ratio(Affine::IDENTITY, 1.0, 1.0, Point::new(2.0, 0.0)), 0.0);
}

#[test]
fn barycentric_weights_sum_to_one() {
    let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
    let inv = barycentric_inverse_determinant(pts);
    assert!(inv != 0.0);

    let w = barycentric_weights(pts, inv, None, Point::new(0.0, 0.0));
    assert!((w[0] - 1.0).abs() < 1e-12 && w[1].abs() < 1e-12 && w[2].abs() < 1e-12);

    let w = barycentric_weights(pts, inv, None, Point::new(0.25, 0.25));
    assert!((w[0] + w[1] + w[2] - 1.0).abs() < 1e-12);
    assert!((w[1] - 0.25).abs() < 1e-12);
    assert!((w[2] - 0.25).abs() < 1e-12);
}

#[test]
fn perspective_weights_favour_nearer_corners() {
    let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)];
    let inv = barycentric_inverse_determinant(pts);
    let p = Point::new(0.5, 0.0);
    let flat = barycentric_weights(pts, inv, Some([1.0, 1.0, 1.0]), p);
    assert!((flat[0] - 0.5).abs() < 1e-12);
    let deep = barycentric_weights(pts, inv, Some([1.0, 3.0, 1.0]), p);
    assert!((deep[0] - 0.75).abs() < 1e-12);
    assert!((deep[1] - 0.25).abs() < 1e-12);
}

#[test]
fn degenerate_triangle_uses_first_corner() {
    let pts = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
    let inv = barycentric_inverse_determinant(pts);
    assert_eq!(inv, 0.0);
    assert_eq!(barycentric_weights(pts, inv, None, Point::new(5.0, 1.0)), [1.0, 0.0, 0.0]);
}

#[test]
fn phong_adds_diffuse_for_a_head_on_light() {
    let ambient = Vec4::new(0.1, 0.1, 0.1, 1.0);
    let diffuse = Vec4::new(0.5, 0.5, 0.5, 1.0);
    let out = phong(
        8.0,
        ambient,
        diffuse,
        Vec4::ZERO,
        Vec4::new(0.0, 0.0, -1.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        [(Vec4::new(0.0, 0.0, 1.0, 0.0), Vec4::ONE)],
    );
    assert!(out.approx_eq(Vec4::new(0.6, 0.6, 0.6, 1.0), 1e-12));

    let behind = phong(
        8.0,
        ambient,
        diffuse,
        Vec4::ONE,
        Vec4::ZERO,
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        [(Vec4::new(0.0, 0.0, -1.0, 0.0), Vec4::ONE)],
    );
    assert_eq!(behind, ambient);
}

#[test]
fn filter_applies_matrix_then_translation() {
    let mut m = [0.0; 16];
    m[0] = 0.5;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m[3] = 0.25; // r += 0.25 * a
    let out = filter(&m, Vec4::new(0.0, 0.1, 0.0, 0.0), Vec4::new(1.0, 0.5, 0.25, 1.0));
    assert!(out.approx_eq(Vec4::new(0.75, 0.6, 0.25, 1.0), 1e-12));
}

#[test]
fn nested_circles_cover_every_point() {
    assert!(radial_gradient_covers_plane(Point::ZERO, 0.0, Point::ZERO, 1.0));
    assert!(radial_gradient_covers_plane(Point::ZERO, 4.0, Point::new(1.0, 0.0), 1.0));
    assert!(!radial_gradient_covers_plane(Point::ZERO, 1.0, Point::new(4.0, 0.0), 1.0));

    for p in [Point::new(9.0, -3.0), Point::new(0.1, 0.2), Point::new(-50.0, 7.0)] {
        let t = radial_gradient_ratio(Affine::IDENTITY, Point::ZERO, 4.0, Point::new(1.0, 0.0), 1.0, p);
        assert!(t.is_some());
    }
}
