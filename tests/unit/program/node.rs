use super::*;

fn rgba(r: f64, g: f64, b: f64, a: f64) -> RenderProgram {
    RenderProgram::color(Vec4::new(r, g, b, a))
}

#[test]
fn color_flags_follow_alpha() {
    let opaque = rgba(1.0, 0.0, 0.0, 1.0);
    assert!(opaque.is_fully_opaque());
    assert!(!opaque.is_fully_transparent());

    let clear = RenderProgram::transparent();
    assert!(clear.is_fully_transparent());
    assert!(!clear.is_fully_opaque());

    let half = rgba(0.25, 0.0, 0.0, 0.5);
    assert!(!half.is_fully_opaque() && !half.is_fully_transparent());
}

#[test]
fn alpha_combines_with_child_flags() {
    let opaque = rgba(1.0, 1.0, 1.0, 1.0);
    assert!(RenderProgram::alpha(1.0, opaque.clone()).unwrap().is_fully_opaque());
    assert!(!RenderProgram::alpha(0.5, opaque.clone()).unwrap().is_fully_opaque());
    assert!(RenderProgram::alpha(0.0, opaque).unwrap().is_fully_transparent());
    assert!(RenderProgram::alpha(f64::NAN, rgba(0.0, 0.0, 0.0, 1.0)).is_err());
}

#[test]
fn stack_is_opaque_when_any_layer_is() {
    let s = RenderProgram::stack(vec![
        rgba(0.0, 0.0, 0.0, 1.0),
        rgba(0.1, 0.0, 0.0, 0.5),
    ]);
    assert!(s.is_fully_opaque());
    assert!(RenderProgram::stack(Vec::new()).is_fully_transparent());
}

#[test]
fn compose_flags_follow_porter_duff() {
    let o = rgba(0.0, 0.0, 1.0, 1.0);
    let t = RenderProgram::transparent();
    let over = RenderProgram::blend_compose(ComposeType::Over, BlendType::Normal, t.clone(), o.clone());
    assert!(over.is_fully_opaque());
    let in_ = RenderProgram::blend_compose(ComposeType::In, BlendType::Multiply, o.clone(), t.clone());
    assert!(in_.is_fully_transparent());
    let out = RenderProgram::blend_compose(ComposeType::Out, BlendType::Normal, o.clone(), o.clone());
    assert!(out.is_fully_transparent());
    let xor = RenderProgram::blend_compose(ComposeType::Xor, BlendType::Normal, o.clone(), t.clone());
    assert!(xor.is_fully_opaque());
    let atop = RenderProgram::blend_compose(ComposeType::Atop, BlendType::Screen, t, o);
    assert!(atop.is_fully_opaque());
}

#[test]
fn accuracy_drives_needs_flags() {
    let zero = rgba(0.0, 0.0, 0.0, 1.0);
    let one = rgba(1.0, 1.0, 1.0, 1.0);
    let centroid = RenderProgram::linear_blend(
        Vec2::new(1.0, 0.0),
        0.0,
        RenderGradientAccuracy::UnsplitCentroid,
        zero.clone(),
        one.clone(),
    )
    .unwrap();
    assert!(centroid.needs_centroid() && centroid.needs_area() && !centroid.needs_face());

    let split = RenderProgram::linear_blend(
        Vec2::new(1.0, 0.0),
        0.0,
        RenderGradientAccuracy::SplitPixelCenter,
        zero,
        one,
    )
    .unwrap();
    assert!(split.needs_face() && !split.needs_centroid());

    let wrapped = RenderProgram::premultiply(RenderProgram::stack(vec![centroid]));
    assert!(wrapped.needs_centroid());
}

#[test]
fn path_boolean_needs_face() {
    let p = RenderProgram::path_boolean(
        RenderPath::new(3, Default::default()),
        rgba(1.0, 0.0, 0.0, 1.0),
        RenderProgram::transparent(),
    );
    assert!(p.is_path_boolean());
    assert!(p.needs_face());
}

#[test]
fn constructors_validate_child_counts_and_geometry() {
    let c = rgba(0.0, 0.0, 0.0, 1.0);
    assert!(RenderProgram::new(RenderProgramKind::Premultiply, vec![]).is_err());
    assert!(RenderProgram::new(RenderProgramKind::Stack, vec![]).is_ok());
    assert!(
        RenderProgram::new(
            RenderProgramKind::Phong { alpha: 2.0 },
            vec![c.clone(), c.clone(), c.clone(), c.clone(), c.clone(), c.clone()]
        )
        .is_err()
    );
    assert!(
        RenderProgram::radial_blend(
            Affine::scale(0.0),
            0.0,
            1.0,
            RenderGradientAccuracy::default(),
            c.clone(),
            c.clone()
        )
        .is_err()
    );
    let unsorted = vec![
        RenderGradientStop::new(0.5, c.clone()),
        RenderGradientStop::new(0.1, c.clone()),
    ];
    assert!(
        RenderProgram::linear_gradient(
            Affine::IDENTITY,
            Point::ZERO,
            Point::new(1.0, 0.0),
            unsorted,
            ExtendMode::Pad,
            RenderGradientAccuracy::default()
        )
        .is_err()
    );
    assert!(
        RenderProgram::linear_blend_between(
            Point::ZERO,
            Point::ZERO,
            RenderGradientAccuracy::default(),
            c.clone(),
            c
        )
        .is_err()
    );
}

#[test]
fn blend_between_points_maps_endpoints_to_zero_and_one() {
    let c = RenderProgram::transparent();
    let p = RenderProgram::linear_blend_between(
        Point::new(2.0, 0.0),
        Point::new(6.0, 0.0),
        RenderGradientAccuracy::default(),
        c.clone(),
        c,
    )
    .unwrap();
    let RenderProgramKind::LinearBlend {
        scaled_normal,
        offset,
        ..
    } = p.kind()
    else {
        panic!("expected a linear blend");
    };
    let t = |x: f64| scaled_normal.dot(Vec2::new(x, 0.0)) - offset;
    assert!(t(2.0).abs() < 1e-12);
    assert!((t(6.0) - 1.0).abs() < 1e-12);
}

#[test]
fn structural_equality_ignores_identity() {
    let a = RenderProgram::premultiply(rgba(0.5, 0.5, 0.5, 0.5));
    let b = RenderProgram::premultiply(rgba(0.5, 0.5, 0.5, 0.5));
    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));
    assert_ne!(a, RenderProgram::unpremultiply(rgba(0.5, 0.5, 0.5, 0.5)));
    assert_eq!(a.node_count(), 2);
}
