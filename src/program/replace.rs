use std::collections::HashMap;

use crate::foundation::core::{Affine, Vec2, ensure_invertible};
use crate::foundation::error::GlintResult;
use crate::program::node::{RenderProgram, RenderProgramKind};
use crate::program::path::RenderPath;

impl RenderProgram {
    /// Bottom-up rewrite: children are rewritten first, then `f` may replace the rebuilt node.
    ///
    /// Each distinct node is visited once, so subtrees shared inside the input stay shared in the
    /// output. Untouched subtrees are returned as the original handles.
    pub fn replace(
        &self,
        f: &mut impl FnMut(&RenderProgram) -> Option<RenderProgram>,
    ) -> RenderProgram {
        let mut memo = HashMap::new();
        replace_memo(self, f, &mut memo)
    }

    /// Resolves every path boolean to its inside or outside branch.
    pub fn with_path_inclusion(&self, is_inside: impl Fn(&RenderPath) -> bool) -> RenderProgram {
        self.replace(&mut |node| match node.kind() {
            RenderProgramKind::PathBoolean { path } => {
                let branch = if is_inside(path) { 0 } else { 1 };
                Some(node.children()[branch].clone())
            }
            _ => None,
        })
    }

    /// The same program drawn through `transform`: every position-dependent node samples
    /// `transform^-1 * p` where it previously sampled `p`.
    pub fn transformed(&self, transform: Affine) -> GlintResult<RenderProgram> {
        ensure_invertible(transform, "program transform")?;
        Ok(self.replace(&mut |node| {
            transformed_kind(node.kind(), transform)
                .map(|kind| RenderProgram::from_parts(kind, node.children().to_vec()))
        }))
    }
}

fn replace_memo(
    program: &RenderProgram,
    f: &mut impl FnMut(&RenderProgram) -> Option<RenderProgram>,
    memo: &mut HashMap<usize, RenderProgram>,
) -> RenderProgram {
    if let Some(done) = memo.get(&program.identity()) {
        return done.clone();
    }

    let mut children = Vec::with_capacity(program.children().len());
    for child in program.children() {
        children.push(replace_memo(child, &mut *f, memo));
    }
    let changed = children
        .iter()
        .zip(program.children())
        .any(|(new, old)| !new.ptr_eq(old));
    let rebuilt = if changed {
        program.with_children(children)
    } else {
        program.clone()
    };
    let out = f(&rebuilt).unwrap_or(rebuilt);

    memo.insert(program.identity(), out.clone());
    out
}

fn transformed_kind(kind: &RenderProgramKind, transform: Affine) -> Option<RenderProgramKind> {
    use RenderProgramKind as K;

    let out = match kind {
        K::LinearBlend {
            scaled_normal,
            offset,
            accuracy,
        } => {
            // t(p') = n . (M p' + v) - o with (M, v) the inverse transform.
            let [a, b, c, d, e, f] = transform.inverse().as_coeffs();
            let n = *scaled_normal;
            K::LinearBlend {
                scaled_normal: Vec2::new(a * n.x + b * n.y, c * n.x + d * n.y),
                offset: offset - n.dot(Vec2::new(e, f)),
                accuracy: *accuracy,
            }
        }
        K::RadialBlend {
            transform: t,
            radius0,
            radius1,
            accuracy,
        } => K::RadialBlend {
            transform: transform * *t,
            radius0: *radius0,
            radius1: *radius1,
            accuracy: *accuracy,
        },
        K::BarycentricBlend {
            points,
            depths,
            accuracy,
        } => K::BarycentricBlend {
            points: points.map(|p| transform * p),
            depths: *depths,
            accuracy: *accuracy,
        },
        K::LinearGradient {
            transform: t,
            start,
            end,
            ratios,
            extend,
            accuracy,
        } => K::LinearGradient {
            transform: transform * *t,
            start: *start,
            end: *end,
            ratios: ratios.clone(),
            extend: *extend,
            accuracy: *accuracy,
        },
        K::RadialGradient {
            transform: t,
            start,
            start_radius,
            end,
            end_radius,
            ratios,
            extend,
            accuracy,
        } => K::RadialGradient {
            transform: transform * *t,
            start: *start,
            start_radius: *start_radius,
            end: *end,
            end_radius: *end_radius,
            ratios: ratios.clone(),
            extend: *extend,
            accuracy: *accuracy,
        },
        _ => return None,
    };
    Some(out)
}

#[cfg(test)]
#[path = "../../tests/unit/program/replace.rs"]
mod tests;
