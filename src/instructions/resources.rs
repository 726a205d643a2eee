use crate::config::ExecutionLimits;
use crate::foundation::error::{GlintError, GlintResult};
use crate::program::{RenderProgram, RenderProgramKind};

/// Peak operand and return stack usage of a compiled program, derived from its tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgramResources {
    pub stack_depth: usize,
    pub return_depth: usize,
}

impl ProgramResources {
    pub fn check(&self, limits: &ExecutionLimits) -> GlintResult<()> {
        if self.stack_depth > limits.max_stack_depth {
            return Err(GlintError::limits(format!(
                "program needs an operand stack of {} (limit {})",
                self.stack_depth, limits.max_stack_depth
            )));
        }
        if self.return_depth > limits.max_return_depth {
            return Err(GlintError::limits(format!(
                "program needs a return stack of {} (limit {})",
                self.return_depth, limits.max_return_depth
            )));
        }
        Ok(())
    }

    fn offset(self, stack: usize, returns: usize) -> Self {
        Self {
            stack_depth: self.stack_depth + stack,
            return_depth: self.return_depth + returns,
        }
    }

    fn max(self, other: Self) -> Self {
        Self {
            stack_depth: self.stack_depth.max(other.stack_depth),
            return_depth: self.return_depth.max(other.return_depth),
        }
    }
}

impl RenderProgram {
    /// Stack requirements of the instructions [`RenderProgram::write_instructions`] produces.
    pub fn resources(&self) -> ProgramResources {
        use RenderProgramKind as K;

        let children = self.children();
        let child = |i: usize| children[i].resources();
        // Children evaluated in order, each on top of the results of the ones before it.
        let sequential = || {
            children
                .iter()
                .enumerate()
                .map(|(i, c)| c.resources().offset(i, 0))
                .fold(ProgramResources::default(), ProgramResources::max)
        };

        match self.kind() {
            K::Color(_) => ProgramResources {
                stack_depth: 1,
                return_depth: 0,
            },
            K::Premultiply
            | K::Unpremultiply
            | K::ColorSpaceConversion(_)
            | K::Alpha { .. }
            | K::Normalize
            | K::Filter { .. } => child(0),
            K::Phong { .. } | K::BlendCompose { .. } | K::BarycentricBlend { .. } => sequential(),
            K::LinearBlend { .. } | K::RadialBlend { .. } => {
                // Blending: ratio below `zero`, then ratio and zero's value below `one`.
                child(0).offset(1, 2).max(child(1).offset(2, 1))
            }
            K::LinearGradient { .. } | K::RadialGradient { .. } => children
                .iter()
                .map(|c| c.resources().offset(2, 2))
                .fold(ProgramResources::default(), ProgramResources::max),
            K::Stack => match children.split_last() {
                None => ProgramResources {
                    stack_depth: 1,
                    return_depth: 0,
                },
                Some((top, below)) => below
                    .iter()
                    .map(|c| c.resources().offset(1, 0))
                    .fold(top.resources(), ProgramResources::max),
            },
            K::PathBoolean { .. } => child(0).max(child(1)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/instructions/resources.rs"]
mod tests;
