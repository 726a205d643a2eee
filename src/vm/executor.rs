//! Host interpreter of the instruction set.
//!
//! The dispatch rules here are the ones `gpu/render_program.wgsl` implements; both push the
//! continuation addresses before jumping into a callee block, so control only ever moves forward
//! or back to an address taken from the return stack.

use smallvec::SmallVec;

use crate::color::{blend_compose, premultiply, stack_blend, unpremultiply};
use crate::config::ExecutionLimits;
use crate::context::RenderEvaluationContext;
use crate::foundation::core::{Vec2, Vec4};
use crate::foundation::error::{GlintError, GlintResult};
use crate::foundation::math::{affine_from_f32, is_opaque_alpha, point_from_f32};
use crate::instructions::instruction::{
    BarycentricInstruction, BlendRatioInstruction, BlendRatioKind, GradientRatioInstruction,
    GradientRatioKind, LocationId, RenderInstruction,
};
use crate::program::ratio;
use crate::program::{StopSelection, select_stops};
use crate::vm::program::ExecutableProgram;
use crate::vm::stack::ExecutionStack;

#[derive(Clone, Copy, Debug, Default)]
pub struct RenderExecutor {
    limits: ExecutionLimits,
}

impl RenderExecutor {
    pub fn new(limits: ExecutionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Runs `program` for one sample and returns its color.
    pub fn execute(
        &self,
        program: &ExecutableProgram,
        ctx: &RenderEvaluationContext,
    ) -> GlintResult<Vec4> {
        let mut machine = Machine {
            program,
            ctx,
            stack: ExecutionStack::new(self.limits),
            ip: 0,
        };

        let mut iterations: u64 = 0;
        loop {
            iterations += 1;
            if iterations > self.limits.max_iterations {
                tracing::warn!(
                    max_iterations = self.limits.max_iterations,
                    ip = machine.ip,
                    "render program hit the iteration cap"
                );
                return Err(GlintError::execution(format!(
                    "iteration cap of {} reached",
                    self.limits.max_iterations
                )));
            }
            if machine.step()? {
                break;
            }
        }

        let value = machine.stack.finish()?;
        Ok(if ctx.premultiplied_output {
            value
        } else {
            unpremultiply(value)
        })
    }
}

struct Machine<'a> {
    program: &'a ExecutableProgram,
    ctx: &'a RenderEvaluationContext,
    stack: ExecutionStack,
    ip: usize,
}

impl Machine<'_> {
    /// Executes one instruction; `true` at `Exit`.
    fn step(&mut self) -> GlintResult<bool> {
        let program = self.program;
        let instruction = program.get(self.ip).ok_or_else(|| {
            GlintError::execution(format!("instruction pointer {} ran past the end", self.ip))
        })?;
        self.ip += 1;

        match instruction {
            RenderInstruction::Location(_) => {}
            RenderInstruction::Exit => return Ok(true),
            RenderInstruction::Return => self.ip = self.stack.pop_return()?,
            RenderInstruction::PushColor(c) => self.stack.push(Vec4::from_f32(*c))?,
            RenderInstruction::OpaqueJump { target } => {
                if is_opaque_alpha(self.stack.peek()?.w) {
                    self.ip = program.address(*target)?;
                }
            }
            RenderInstruction::StackBlend => {
                let [foreground, background] = self.stack.pop_n()?;
                self.stack.push(stack_blend(foreground, background))?;
            }
            RenderInstruction::Blend => {
                let [ratio, zero, one] = self.stack.pop_n()?;
                self.stack.push(zero.lerp(one, ratio.x))?;
            }
            RenderInstruction::BlendCompose { compose, blend } => {
                let [a, b] = self.stack.pop_n()?;
                self.stack.push(blend_compose(a, b, *compose, *blend))?;
            }
            RenderInstruction::Premultiply => self.unary(premultiply)?,
            RenderInstruction::Unpremultiply => self.unary(unpremultiply)?,
            RenderInstruction::ColorSpaceConversion(conversion) => {
                self.unary(|v| conversion.apply(v))?
            }
            RenderInstruction::MultiplyScalar(s) => self.unary(|v| v * f64::from(*s))?,
            RenderInstruction::Normalize => self.unary(Vec4::normalized)?,
            RenderInstruction::Filter {
                matrix,
                translation,
            } => {
                let matrix = matrix.map(f64::from);
                let translation = Vec4::from_f32(*translation);
                self.unary(|v| ratio::filter(&matrix, translation, v))?
            }
            RenderInstruction::Phong { alpha, light_count } => {
                self.phong(f64::from(*alpha), *light_count as usize)?
            }
            RenderInstruction::ComputeBlendRatio(i) => self.blend_ratio(i)?,
            RenderInstruction::ComputeGradientRatio(i) => self.gradient_ratio(i)?,
            RenderInstruction::BarycentricBlend(i) => self.barycentric(i)?,
        }
        Ok(false)
    }

    fn unary(&mut self, f: impl FnOnce(Vec4) -> Vec4) -> GlintResult<()> {
        let v = self.stack.pop()?;
        self.stack.push(f(v))
    }

    fn jump(&mut self, location: LocationId) -> GlintResult<()> {
        self.ip = self.program.address(location)?;
        Ok(())
    }

    fn call_then(&mut self, location: LocationId) -> GlintResult<()> {
        let address = self.program.address(location)?;
        self.stack.push_return(address)
    }

    fn phong(&mut self, alpha: f64, light_count: usize) -> GlintResult<()> {
        let count = 5 + 2 * light_count;
        if self.stack.len() < count {
            return Err(GlintError::execution(format!(
                "phong needs {count} operands, stack has {}",
                self.stack.len()
            )));
        }
        let mut inputs: SmallVec<[Vec4; 16]> = SmallVec::with_capacity(count);
        for _ in 0..count {
            inputs.push(self.stack.pop()?);
        }
        inputs.reverse();
        let lights = inputs[5..].chunks_exact(2).map(|pair| (pair[0], pair[1]));
        let lit = ratio::phong(
            alpha, inputs[0], inputs[1], inputs[2], inputs[3], inputs[4], lights,
        );
        self.stack.push(lit)
    }

    fn blend_ratio(&mut self, i: &BlendRatioInstruction) -> GlintResult<()> {
        let p = self.ctx.sample_point(i.accuracy);
        let t = match i.kind {
            BlendRatioKind::Linear {
                scaled_normal,
                offset,
            } => ratio::linear_blend_ratio(
                Vec2::new(f64::from(scaled_normal[0]), f64::from(scaled_normal[1])),
                f64::from(offset),
                p,
            ),
            BlendRatioKind::Radial {
                inverse_transform,
                radius0,
                radius1,
            } => ratio::radial_blend_ratio(
                affine_from_f32(inverse_transform),
                f64::from(radius0),
                f64::from(radius1),
                p,
            ),
        };

        if t <= 0.0 {
            self.call_then(i.end)?;
            self.jump(i.zero)
        } else if t >= 1.0 {
            self.call_then(i.end)?;
            self.jump(i.one)
        } else {
            self.stack.push(Vec4::splat(t))?;
            self.call_then(i.blend)?;
            self.call_then(i.one)?;
            self.jump(i.zero)
        }
    }

    fn gradient_ratio(&mut self, i: &GradientRatioInstruction) -> GlintResult<()> {
        let p = self.ctx.sample_point(i.accuracy);
        let t = match i.kind {
            GradientRatioKind::Linear {
                inverse_transform,
                start,
                delta,
            } => Some(ratio::linear_gradient_ratio(
                affine_from_f32(inverse_transform),
                point_from_f32(start),
                point_from_f32(delta).to_vec2(),
                p,
            )),
            GradientRatioKind::Radial {
                inverse_transform,
                start,
                start_radius,
                end,
                end_radius,
            } => ratio::radial_gradient_ratio(
                affine_from_f32(inverse_transform),
                point_from_f32(start),
                f64::from(start_radius),
                point_from_f32(end),
                f64::from(end_radius),
                p,
            ),
        };
        let Some(t) = t else {
            self.stack.push(Vec4::ZERO)?;
            return self.jump(i.end);
        };

        let stop = |index: usize| -> GlintResult<LocationId> {
            i.stops
                .get(index)
                .copied()
                .ok_or_else(|| GlintError::execution(format!("gradient stop {index} is missing")))
        };
        match select_stops(&i.ratios, i.extend.apply(t)) {
            StopSelection::Single(index) => {
                self.call_then(i.end)?;
                self.jump(stop(index)?)
            }
            StopSelection::Between { index, local_ratio } => {
                self.stack.push(Vec4::splat(local_ratio))?;
                self.call_then(i.blend)?;
                self.call_then(stop(index + 1)?)?;
                self.jump(stop(index)?)
            }
        }
    }

    fn barycentric(&mut self, i: &BarycentricInstruction) -> GlintResult<()> {
        let [a, b, c] = self.stack.pop_n()?;
        let p = self.ctx.sample_point(i.accuracy);
        let w = ratio::barycentric_weights(
            i.points.map(point_from_f32),
            f64::from(i.inverse_determinant),
            i.depths.map(|z| z.map(f64::from)),
            p,
        );
        self.stack.push(a * w[0] + b * w[1] + c * w[2])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/vm/executor.rs"]
mod tests;
