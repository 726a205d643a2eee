use super::*;
use crate::context::RenderEvaluationContext;
use crate::foundation::core::{Point, Vec4};
use crate::program::gradient::{ExtendMode, RenderGradientAccuracy, RenderGradientStop};
use crate::program::path::FillRule;

fn rgba(r: f64, g: f64, b: f64, a: f64) -> RenderProgram {
    RenderProgram::color(Vec4::new(r, g, b, a))
}

#[test]
fn path_inclusion_picks_branches_per_path() {
    let red = rgba(1.0, 0.0, 0.0, 1.0);
    let blue = rgba(0.0, 0.0, 1.0, 1.0);
    let p = RenderProgram::stack(vec![
        RenderProgram::path_boolean(
            RenderPath::new(1, FillRule::NonZero),
            red.clone(),
            RenderProgram::transparent(),
        ),
        RenderProgram::path_boolean(
            RenderPath::new(2, FillRule::EvenOdd),
            blue.clone(),
            RenderProgram::transparent(),
        ),
    ]);
    let resolved = p.with_path_inclusion(|path| path.id == 1);
    assert_eq!(resolved.children()[0], red);
    assert_eq!(resolved.children()[1], RenderProgram::transparent());
    assert!(!resolved.needs_face());
}

#[test]
fn shared_subtrees_stay_shared() {
    let shared = RenderProgram::premultiply(rgba(0.5, 0.5, 0.5, 0.5));
    let p = RenderProgram::stack(vec![
        RenderProgram::normalize(shared.clone()),
        RenderProgram::normalize(shared.clone()),
    ]);
    let mut visits = 0;
    let out = p.replace(&mut |node| {
        if matches!(node.kind(), RenderProgramKind::Premultiply) {
            visits += 1;
            Some(RenderProgram::unpremultiply(node.children()[0].clone()))
        } else {
            None
        }
    });
    assert_eq!(visits, 1);
    let a = &out.children()[0].children()[0];
    let b = &out.children()[1].children()[0];
    assert!(a.ptr_eq(b));
    assert!(matches!(a.kind(), RenderProgramKind::Unpremultiply));
}

#[test]
fn untouched_programs_keep_their_handles() {
    let p = RenderProgram::normalize(rgba(0.0, 0.0, 1.0, 0.0));
    assert!(p.replace(&mut |_| None).ptr_eq(&p));
}

#[test]
fn translated_blend_samples_the_moved_position() {
    let blend = RenderProgram::linear_blend_between(
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        RenderGradientAccuracy::UnsplitPixelCenter,
        rgba(0.0, 0.0, 0.0, 1.0),
        rgba(1.0, 1.0, 1.0, 1.0),
    )
    .unwrap();
    let moved = blend.transformed(Affine::translate((10.0, 0.0))).unwrap();
    let before = blend
        .evaluate(&RenderEvaluationContext::full_pixel(1, 0))
        .unwrap();
    let after = moved
        .evaluate(&RenderEvaluationContext::full_pixel(11, 0))
        .unwrap();
    assert!(before.approx_eq(after, 1e-12));
}

#[test]
fn scaled_gradient_stretches_with_the_transform() {
    let gradient = RenderProgram::linear_gradient(
        Affine::IDENTITY,
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        vec![
            RenderGradientStop::new(0.0, rgba(0.0, 0.0, 0.0, 1.0)),
            RenderGradientStop::new(1.0, rgba(1.0, 1.0, 1.0, 1.0)),
        ],
        ExtendMode::Pad,
        RenderGradientAccuracy::UnsplitPixelCenter,
    )
    .unwrap();
    let scaled = gradient.transformed(Affine::scale(2.0)).unwrap();
    let before = gradient
        .evaluate(&RenderEvaluationContext::full_pixel(0, 0))
        .unwrap();
    let ctx = RenderEvaluationContext::new(crate::foundation::core::Rect::new(0.0, 0.0, 2.0, 2.0))
        .unwrap();
    let after = scaled.evaluate(&ctx).unwrap();
    assert!(before.approx_eq(after, 1e-12));
    assert!(gradient.transformed(Affine::scale(0.0)).is_err());
}
