//! Direct recursive evaluation of a program tree. This is the reference the stack machines are
//! checked against.

use crate::color::{blend_compose, premultiply, stack_blend, unpremultiply};
use crate::context::RenderEvaluationContext;
use crate::foundation::core::{Point, Vec4};
use crate::foundation::error::{GlintError, GlintResult};
use crate::foundation::math::is_opaque_alpha;
use crate::program::gradient::{StopSelection, select_stops};
use crate::program::node::{RenderProgram, RenderProgramKind};
use crate::program::ratio;

/// Applies a position-independent variant to already evaluated children.
///
/// Returns `None` for variants whose value depends on the sample position or on which children
/// get evaluated at all.
pub(crate) fn apply_pointwise(kind: &RenderProgramKind, inputs: &[Vec4]) -> Option<Vec4> {
    use RenderProgramKind as K;

    let first = inputs.first().copied().unwrap_or(Vec4::ZERO);
    let value = match kind {
        K::Color(c) => *c,
        K::Premultiply => premultiply(first),
        K::Unpremultiply => unpremultiply(first),
        K::ColorSpaceConversion(conversion) => conversion.apply(first),
        K::Alpha { alpha } => first * *alpha,
        K::Normalize => first.normalized(),
        K::Filter {
            matrix,
            translation,
        } => ratio::filter(matrix, *translation, first),
        K::Phong { alpha } => {
            if inputs.len() < 5 {
                return None;
            }
            let lights = inputs[5..].chunks_exact(2).map(|pair| (pair[0], pair[1]));
            ratio::phong(
                *alpha, inputs[0], inputs[1], inputs[2], inputs[3], inputs[4], lights,
            )
        }
        K::BlendCompose { compose, blend } => {
            let b = inputs.get(1).copied().unwrap_or(Vec4::ZERO);
            blend_compose(first, b, *compose, *blend)
        }
        K::LinearBlend { .. }
        | K::RadialBlend { .. }
        | K::BarycentricBlend { .. }
        | K::LinearGradient { .. }
        | K::RadialGradient { .. }
        | K::Stack
        | K::PathBoolean { .. } => return None,
    };
    Some(value)
}

impl RenderProgram {
    /// Evaluates the tree at one sample.
    ///
    /// Path booleans cannot be decided here; resolve them with
    /// [`RenderProgram::with_path_inclusion`] first.
    pub fn evaluate(&self, ctx: &RenderEvaluationContext) -> GlintResult<Vec4> {
        let value = self.evaluate_premultiplied(ctx)?;
        Ok(if ctx.premultiplied_output {
            value
        } else {
            unpremultiply(value)
        })
    }

    fn evaluate_premultiplied(&self, ctx: &RenderEvaluationContext) -> GlintResult<Vec4> {
        use RenderProgramKind as K;

        let children = self.children();
        let eval = |i: usize| children[i].evaluate_premultiplied(ctx);
        let sample = |p: &RenderProgram| -> Point {
            p.kind()
                .accuracy()
                .map(|a| ctx.sample_point(a))
                .unwrap_or_else(|| ctx.pixel_center())
        };

        match self.kind() {
            K::LinearBlend {
                scaled_normal,
                offset,
                ..
            } => {
                let t = ratio::linear_blend_ratio(*scaled_normal, *offset, sample(self));
                blend_two(t, || eval(0), || eval(1))
            }
            K::RadialBlend {
                transform,
                radius0,
                radius1,
                ..
            } => {
                let t = ratio::radial_blend_ratio(
                    transform.inverse(),
                    *radius0,
                    *radius1,
                    sample(self),
                );
                blend_two(t, || eval(0), || eval(1))
            }
            K::BarycentricBlend { points, depths, .. } => {
                let inv_det = ratio::barycentric_inverse_determinant(*points);
                let w = ratio::barycentric_weights(*points, inv_det, *depths, sample(self));
                Ok(eval(0)? * w[0] + eval(1)? * w[1] + eval(2)? * w[2])
            }
            K::LinearGradient {
                transform,
                start,
                end,
                ratios,
                extend,
                ..
            } => {
                let t = ratio::linear_gradient_ratio(
                    transform.inverse(),
                    *start,
                    *end - *start,
                    sample(self),
                );
                gradient_value(ratios, extend.apply(t), eval)
            }
            K::RadialGradient {
                transform,
                start,
                start_radius,
                end,
                end_radius,
                ratios,
                extend,
                ..
            } => {
                let Some(t) = ratio::radial_gradient_ratio(
                    transform.inverse(),
                    *start,
                    *start_radius,
                    *end,
                    *end_radius,
                    sample(self),
                ) else {
                    return Ok(Vec4::ZERO);
                };
                gradient_value(ratios, extend.apply(t), eval)
            }
            K::Stack => {
                let Some((top, below)) = children.split_last() else {
                    return Ok(Vec4::ZERO);
                };
                let mut acc = top.evaluate_premultiplied(ctx)?;
                for layer in below.iter().rev() {
                    if is_opaque_alpha(acc.w) {
                        break;
                    }
                    acc = stack_blend(acc, layer.evaluate_premultiplied(ctx)?);
                }
                Ok(acc)
            }
            K::PathBoolean { path } => Err(GlintError::execution(format!(
                "path boolean for path {} must be resolved before evaluation",
                path.id
            ))),
            kind => {
                let inputs = children
                    .iter()
                    .map(|c| c.evaluate_premultiplied(ctx))
                    .collect::<GlintResult<Vec<_>>>()?;
                apply_pointwise(kind, &inputs).ok_or_else(|| {
                    GlintError::execution(format!("cannot evaluate {}", kind.name()))
                })
            }
        }
    }
}

/// Skips the unused side at the clamped ends, like the compiled dispatch does.
fn blend_two(
    t: f64,
    zero: impl FnOnce() -> GlintResult<Vec4>,
    one: impl FnOnce() -> GlintResult<Vec4>,
) -> GlintResult<Vec4> {
    if t <= 0.0 {
        zero()
    } else if t >= 1.0 {
        one()
    } else {
        Ok(zero()?.lerp(one()?, t))
    }
}

fn gradient_value(
    ratios: &[f64],
    t: f64,
    eval: impl Fn(usize) -> GlintResult<Vec4>,
) -> GlintResult<Vec4> {
    match select_stops(ratios, t) {
        StopSelection::Single(i) => eval(i),
        StopSelection::Between { index, local_ratio } => {
            Ok(eval(index)?.lerp(eval(index + 1)?, local_ratio))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/program/evaluate.rs"]
mod tests;
