use super::*;
use crate::foundation::core::{Vec2, Vec4};
use crate::program::RenderGradientAccuracy;

fn c(v: f64) -> RenderProgram {
    RenderProgram::color(Vec4::new(v, v, v, 0.5))
}

fn blend(zero: RenderProgram, one: RenderProgram) -> RenderProgram {
    RenderProgram::linear_blend(
        Vec2::new(1.0, 0.0),
        0.0,
        RenderGradientAccuracy::UnsplitPixelCenter,
        zero,
        one,
    )
    .unwrap()
}

fn res(stack_depth: usize, return_depth: usize) -> ProgramResources {
    ProgramResources {
        stack_depth,
        return_depth,
    }
}

#[test]
fn color_needs_one_slot() {
    assert_eq!(c(0.1).resources(), res(1, 0));
    assert_eq!(RenderProgram::normalize(c(0.1)).resources(), res(1, 0));
}

#[test]
fn stack_layers_sit_on_the_accumulator() {
    let p = RenderProgram::stack(vec![c(0.1), c(0.2), c(0.3)]);
    assert_eq!(p.resources(), res(2, 0));
    assert_eq!(RenderProgram::stack(vec![]).resources(), res(1, 0));
}

#[test]
fn blend_reserves_ratio_and_continuations() {
    assert_eq!(blend(c(0.1), c(0.2)).resources(), res(3, 2));
    assert_eq!(blend(blend(c(0.1), c(0.2)), c(0.3)).resources(), res(4, 4));
    assert_eq!(blend(c(0.3), blend(c(0.1), c(0.2))).resources(), res(5, 3));
}

#[test]
fn compose_evaluates_children_in_sequence() {
    let p = RenderProgram::blend_compose(
        Default::default(),
        Default::default(),
        c(0.1),
        RenderProgram::stack(vec![c(0.2), c(0.3)]),
    );
    assert_eq!(p.resources(), res(3, 0));
}

#[test]
fn check_reports_the_exceeded_limit() {
    let limits = ExecutionLimits {
        max_stack_depth: 2,
        max_return_depth: 1,
        ..Default::default()
    };
    assert!(res(2, 1).check(&limits).is_ok());
    assert!(matches!(res(3, 0).check(&limits), Err(GlintError::Limits(_))));
    assert!(matches!(res(1, 2).check(&limits), Err(GlintError::Limits(_))));
}
