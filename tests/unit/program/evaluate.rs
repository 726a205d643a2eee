use super::*;
use crate::color::{BlendType, ComposeType};
use crate::foundation::core::{Affine, Rect, Vec2};
use crate::program::gradient::{ExtendMode, RenderGradientAccuracy, RenderGradientStop};
use crate::program::path::RenderPath;

fn ctx() -> RenderEvaluationContext {
    RenderEvaluationContext::full_pixel(0, 0)
}

fn centroid_ctx(x: f64, y: f64) -> RenderEvaluationContext {
    RenderEvaluationContext::new(Rect::new(0.0, 0.0, 1.0, 1.0))
        .unwrap()
        .with_centroid(Point::new(x, y))
        .unwrap()
}

#[test]
fn constant_color_evaluates_to_itself() {
    let c = Vec4::new(0.2, 0.3, 0.4, 1.0);
    assert_eq!(RenderProgram::color(c).evaluate(&ctx()).unwrap(), c);
}

#[test]
fn premultiply_scales_rgb_by_alpha() {
    let p = RenderProgram::premultiply(RenderProgram::color(Vec4::new(0.25, 0.5, 1.0, 0.5)));
    assert_eq!(
        p.evaluate(&ctx()).unwrap(),
        Vec4::new(0.125, 0.25, 0.5, 0.5)
    );
}

#[test]
fn unpremultiply_of_transparent_is_zero() {
    let p = RenderProgram::unpremultiply(RenderProgram::transparent());
    assert_eq!(p.evaluate(&ctx()).unwrap(), Vec4::ZERO);
}

#[test]
fn linear_gradient_interpolates_between_first_stops() {
    let s0 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    let s1 = Vec4::new(0.0, 1.0, 0.0, 1.0);
    let s2 = Vec4::new(0.0, 0.0, 1.0, 1.0);
    let g = RenderProgram::linear_gradient(
        Affine::IDENTITY,
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        vec![
            RenderGradientStop::new(0.0, RenderProgram::color(s0)),
            RenderGradientStop::new(0.2, RenderProgram::color(s1)),
            RenderGradientStop::new(1.0, RenderProgram::color(s2)),
        ],
        ExtendMode::Pad,
        RenderGradientAccuracy::UnsplitCentroid,
    )
    .unwrap();
    let out = g.evaluate(&centroid_ctx(0.1, 0.5)).unwrap();
    assert!(out.approx_eq(s0.lerp(s1, 0.5), 1e-12));
}

#[test]
fn stack_of_opaque_layers_shows_the_top() {
    let top = Vec4::new(0.0, 0.0, 1.0, 1.0);
    let s = RenderProgram::stack(vec![
        RenderProgram::color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
        RenderProgram::color(Vec4::new(0.0, 1.0, 0.0, 1.0)),
        RenderProgram::color(top),
    ]);
    assert_eq!(s.evaluate(&ctx()).unwrap(), top);
}

#[test]
fn translucent_stack_composites_top_over_bottom() {
    let s = RenderProgram::stack(vec![
        RenderProgram::color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
        RenderProgram::color(Vec4::new(0.0, 0.5, 0.0, 0.5)),
    ]);
    let out = s.evaluate(&ctx()).unwrap();
    assert!(out.approx_eq(Vec4::new(0.5, 0.5, 0.0, 1.0), 1e-12));
}

#[test]
fn linear_blend_samples_pixel_center() {
    let p = RenderProgram::linear_blend(
        Vec2::new(0.25, 0.0),
        0.0,
        RenderGradientAccuracy::UnsplitPixelCenter,
        RenderProgram::color(Vec4::ZERO),
        RenderProgram::color(Vec4::ONE),
    )
    .unwrap();
    let out = p.evaluate(&RenderEvaluationContext::full_pixel(1, 0)).unwrap();
    assert!(out.approx_eq(Vec4::splat(0.375), 1e-12));
}

#[test]
fn radial_gradient_outside_every_circle_is_transparent() {
    let g = RenderProgram::radial_gradient(
        Affine::IDENTITY,
        Point::new(0.0, 0.0),
        0.0,
        Point::new(10.0, 0.0),
        0.0,
        vec![
            RenderGradientStop::new(0.0, RenderProgram::color(Vec4::ONE)),
            RenderGradientStop::new(1.0, RenderProgram::color(Vec4::ONE)),
        ],
        ExtendMode::Pad,
        RenderGradientAccuracy::UnsplitPixelCenter,
    )
    .unwrap();
    let out = g.evaluate(&RenderEvaluationContext::full_pixel(3, 4)).unwrap();
    assert_eq!(out, Vec4::ZERO);
}

#[test]
fn blend_compose_normal_over_matches_stack_blend() {
    let a = Vec4::new(0.0, 0.25, 0.0, 0.5);
    let b = Vec4::new(0.5, 0.0, 0.0, 1.0);
    let p = RenderProgram::blend_compose(
        ComposeType::Over,
        BlendType::Normal,
        RenderProgram::color(a),
        RenderProgram::color(b),
    );
    assert_eq!(p.evaluate(&ctx()).unwrap(), stack_blend(a, b));
}

#[test]
fn unpremultiplied_output_is_honoured() {
    let p = RenderProgram::color(Vec4::new(0.25, 0.0, 0.0, 0.5));
    let c = ctx().with_premultiplied_output(false);
    assert_eq!(p.evaluate(&c).unwrap(), Vec4::new(0.5, 0.0, 0.0, 0.5));
}

#[test]
fn unresolved_path_boolean_is_an_error() {
    let p = RenderProgram::path_boolean(
        RenderPath::new(1, Default::default()),
        RenderProgram::color(Vec4::ONE),
        RenderProgram::transparent(),
    );
    assert!(matches!(p.evaluate(&ctx()), Err(GlintError::Execution(_))));
}
