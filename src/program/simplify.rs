use crate::color::{BlendType, ComposeType};
use crate::foundation::core::Vec4;
use crate::program::evaluate::apply_pointwise;
use crate::program::node::{RenderProgram, RenderProgramKind, SimplifiedState};
use crate::program::ratio::radial_gradient_covers_plane;

impl RenderProgram {
    /// Algebraically simplified equivalent of this program.
    ///
    /// Results are cached on the node: calling this again, or on its own output, returns the same
    /// handle. Unsimplifiable programs return themselves.
    pub fn simplified(&self) -> RenderProgram {
        match self.simplified_state().get_or_init(|| simplify_node(self)) {
            SimplifiedState::Itself => self.clone(),
            SimplifiedState::Replaced(p) => p.clone(),
        }
    }

    /// Whether [`RenderProgram::simplified`] already returned this node unchanged.
    pub fn is_simplified(&self) -> bool {
        matches!(self.simplified_state().get(), Some(SimplifiedState::Itself))
    }
}

fn simplify_node(program: &RenderProgram) -> SimplifiedState {
    let children: Vec<RenderProgram> = program.children().iter().map(|c| c.simplified()).collect();
    let changed = children
        .iter()
        .zip(program.children())
        .any(|(new, old)| !new.ptr_eq(old));
    let rebuilt = if changed {
        program.with_children(children)
    } else {
        program.clone()
    };

    match rewrite(&rebuilt) {
        Some(replacement) => SimplifiedState::Replaced(replacement.simplified()),
        None if changed => {
            let _ = rebuilt.simplified_state().set(SimplifiedState::Itself);
            SimplifiedState::Replaced(rebuilt)
        }
        None => SimplifiedState::Itself,
    }
}

/// One rewrite step on a node whose children are already simplified.
fn rewrite(program: &RenderProgram) -> Option<RenderProgram> {
    use RenderProgramKind as K;

    let kind = program.kind();
    if matches!(kind, K::Color(_)) {
        return None;
    }
    if program.is_fully_transparent() {
        return Some(RenderProgram::transparent());
    }

    let children = program.children();
    if let Some(folded) = fold_constant(kind, children) {
        return Some(RenderProgram::color(folded));
    }

    match kind {
        K::Alpha { alpha } => {
            let child = &children[0];
            if *alpha == 1.0 {
                return Some(child.clone());
            }
            if let K::Alpha { alpha: inner } = child.kind() {
                return Some(RenderProgram::from_parts(
                    K::Alpha {
                        alpha: alpha * inner,
                    },
                    child.children().to_vec(),
                ));
            }
            None
        }
        K::ColorSpaceConversion(outer) => match children[0].kind() {
            K::ColorSpaceConversion(inner) if inner.inverse() == *outer => {
                Some(children[0].children()[0].clone())
            }
            _ => None,
        },
        K::LinearBlend { .. } | K::RadialBlend { .. } | K::BarycentricBlend { .. } => {
            all_equal(children).then(|| children[0].clone())
        }
        K::LinearGradient { .. } => all_equal(children).then(|| children[0].clone()),
        K::RadialGradient {
            start,
            start_radius,
            end,
            end_radius,
            ..
        } => {
            let covered = radial_gradient_covers_plane(*start, *start_radius, *end, *end_radius);
            (covered && all_equal(children)).then(|| children[0].clone())
        }
        K::Stack => simplify_stack(children),
        K::BlendCompose {
            compose: ComposeType::Over,
            blend: BlendType::Normal,
        } => {
            let (a, b) = (&children[0], &children[1]);
            if a.is_fully_transparent() {
                Some(b.clone())
            } else if b.is_fully_transparent() || a.is_fully_opaque() {
                Some(a.clone())
            } else {
                None
            }
        }
        K::PathBoolean { .. } => (children[0] == children[1]).then(|| children[0].clone()),
        _ => None,
    }
}

fn fold_constant(kind: &RenderProgramKind, children: &[RenderProgram]) -> Option<Vec4> {
    let inputs = children
        .iter()
        .map(RenderProgram::as_color)
        .collect::<Option<Vec<_>>>()?;
    let folded = apply_pointwise(kind, &inputs)?;
    folded.is_finite().then_some(folded)
}

fn all_equal(children: &[RenderProgram]) -> bool {
    children.windows(2).all(|w| w[0] == w[1])
}

fn simplify_stack(children: &[RenderProgram]) -> Option<RenderProgram> {
    let mut layers: Vec<RenderProgram> = Vec::with_capacity(children.len());
    let mut changed = false;
    for child in children {
        if matches!(child.kind(), RenderProgramKind::Stack) {
            layers.extend(child.children().iter().cloned());
            changed = true;
        } else {
            layers.push(child.clone());
        }
    }

    let before = layers.len();
    layers.retain(|l| !l.is_fully_transparent());
    if let Some(top_opaque) = layers.iter().rposition(RenderProgram::is_fully_opaque) {
        layers.drain(..top_opaque);
    }
    changed |= layers.len() != before;

    match layers.len() {
        0 => Some(RenderProgram::transparent()),
        1 => layers.pop(),
        _ if changed => Some(RenderProgram::stack(layers)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/program/simplify.rs"]
mod tests;
