//! Lowering of program trees to the flat instruction list.
//!
//! Position-dependent nodes compile to a ratio instruction that dispatches into callee blocks.
//! Each callee ends in `Return`; the dispatch pushes the continuation(s) before jumping, so only
//! forward addresses are ever referenced.

use crate::config::CompileOptions;
use crate::foundation::core::{Vec2, Vec4};
use crate::foundation::error::{GlintError, GlintResult};
use crate::foundation::math::{affine_to_f32, point_to_f32};
use crate::instructions::instruction::{
    BarycentricInstruction, BlendRatioInstruction, BlendRatioKind, GradientRatioInstruction,
    GradientRatioKind, LocationId, RenderInstruction,
};
use crate::program::ratio::barycentric_inverse_determinant;
use crate::program::{ExtendMode, RenderGradientAccuracy, RenderProgram, RenderProgramKind};

/// Accumulates instructions and hands out location ids unique to this writer.
#[derive(Debug, Default)]
pub struct InstructionWriter {
    instructions: Vec<RenderInstruction>,
    next_location: u32,
}

impl InstructionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_location(&mut self) -> LocationId {
        let id = LocationId(self.next_location);
        self.next_location += 1;
        id
    }

    pub fn push(&mut self, instruction: RenderInstruction) {
        self.instructions.push(instruction);
    }

    pub fn mark(&mut self, location: LocationId) {
        self.instructions.push(RenderInstruction::Location(location));
    }

    pub fn instructions(&self) -> &[RenderInstruction] {
        &self.instructions
    }

    pub fn finish(self) -> Vec<RenderInstruction> {
        self.instructions
    }

    /// Appends the instructions that leave `program`'s value on top of the stack.
    pub fn write_program(&mut self, program: &RenderProgram) -> GlintResult<()> {
        use RenderProgramKind as K;

        let children = program.children();
        match program.kind() {
            K::Color(c) => {
                if !c.is_finite() {
                    return Err(GlintError::compile(format!("color {c:?} is not finite")));
                }
                self.push(RenderInstruction::PushColor(c.to_f32()))
            }
            K::Premultiply => self.unary(&children[0], RenderInstruction::Premultiply)?,
            K::Unpremultiply => self.unary(&children[0], RenderInstruction::Unpremultiply)?,
            K::ColorSpaceConversion(c) => {
                self.unary(&children[0], RenderInstruction::ColorSpaceConversion(*c))?
            }
            K::Alpha { alpha } => {
                self.unary(&children[0], RenderInstruction::MultiplyScalar(*alpha as f32))?
            }
            K::Normalize => self.unary(&children[0], RenderInstruction::Normalize)?,
            K::Filter {
                matrix,
                translation,
            } => self.unary(
                &children[0],
                RenderInstruction::Filter {
                    matrix: matrix.map(|v| v as f32),
                    translation: translation.to_f32(),
                },
            )?,
            K::Phong { alpha } => {
                for child in children {
                    self.write_program(child)?;
                }
                self.push(RenderInstruction::Phong {
                    alpha: *alpha as f32,
                    light_count: ((children.len() - 5) / 2) as u32,
                });
            }
            K::BlendCompose { compose, blend } => {
                self.write_program(&children[0])?;
                self.write_program(&children[1])?;
                self.push(RenderInstruction::BlendCompose {
                    compose: *compose,
                    blend: *blend,
                });
            }
            K::Stack => self.write_stack(children)?,
            K::LinearBlend {
                scaled_normal,
                offset,
                accuracy,
            } => self.write_blend(
                BlendRatioKind::Linear {
                    scaled_normal: vec2_to_f32(*scaled_normal),
                    offset: *offset as f32,
                },
                *accuracy,
                children,
            )?,
            K::RadialBlend {
                transform,
                radius0,
                radius1,
                accuracy,
            } => self.write_blend(
                BlendRatioKind::Radial {
                    inverse_transform: affine_to_f32(transform.inverse()),
                    radius0: *radius0 as f32,
                    radius1: *radius1 as f32,
                },
                *accuracy,
                children,
            )?,
            K::LinearGradient {
                transform,
                start,
                end,
                ratios,
                extend,
                accuracy,
            } => {
                let kind = GradientRatioKind::Linear {
                    inverse_transform: affine_to_f32(transform.inverse()),
                    start: point_to_f32(*start),
                    delta: vec2_to_f32(*end - *start),
                };
                self.write_gradient(kind, *accuracy, *extend, ratios, children)?
            }
            K::RadialGradient {
                transform,
                start,
                start_radius,
                end,
                end_radius,
                ratios,
                extend,
                accuracy,
            } => {
                let kind = GradientRatioKind::Radial {
                    inverse_transform: affine_to_f32(transform.inverse()),
                    start: point_to_f32(*start),
                    start_radius: *start_radius as f32,
                    end: point_to_f32(*end),
                    end_radius: *end_radius as f32,
                };
                self.write_gradient(kind, *accuracy, *extend, ratios, children)?
            }
            K::BarycentricBlend {
                points,
                depths,
                accuracy,
            } => {
                for child in children {
                    self.write_program(child)?;
                }
                self.push(RenderInstruction::BarycentricBlend(BarycentricInstruction {
                    accuracy: *accuracy,
                    points: points.map(point_to_f32),
                    inverse_determinant: barycentric_inverse_determinant(*points) as f32,
                    depths: depths.map(|z| z.map(|v| v as f32)),
                }));
            }
            K::PathBoolean { path } => {
                return Err(GlintError::compile(format!(
                    "path boolean for path {} must be resolved before compiling",
                    path.id
                )));
            }
        }
        Ok(())
    }

    fn unary(&mut self, child: &RenderProgram, op: RenderInstruction) -> GlintResult<()> {
        self.write_program(child)?;
        self.push(op);
        Ok(())
    }

    fn write_stack(&mut self, layers: &[RenderProgram]) -> GlintResult<()> {
        let Some((top, below)) = layers.split_last() else {
            self.push(RenderInstruction::PushColor(Vec4::ZERO.to_f32()));
            return Ok(());
        };
        self.write_program(top)?;
        if below.is_empty() {
            return Ok(());
        }
        let end = self.new_location();
        for layer in below.iter().rev() {
            self.push(RenderInstruction::OpaqueJump { target: end });
            self.write_program(layer)?;
            self.push(RenderInstruction::StackBlend);
        }
        self.mark(end);
        Ok(())
    }

    fn write_blend(
        &mut self,
        kind: BlendRatioKind,
        accuracy: RenderGradientAccuracy,
        children: &[RenderProgram],
    ) -> GlintResult<()> {
        let zero = self.new_location();
        let one = self.new_location();
        let blend = self.new_location();
        let end = self.new_location();
        self.push(RenderInstruction::ComputeBlendRatio(BlendRatioInstruction {
            kind,
            accuracy,
            zero,
            one,
            blend,
            end,
        }));
        for (location, child) in [zero, one].into_iter().zip(children) {
            self.mark(location);
            self.write_program(child)?;
            self.push(RenderInstruction::Return);
        }
        self.mark(blend);
        self.push(RenderInstruction::Blend);
        self.mark(end);
        Ok(())
    }

    fn write_gradient(
        &mut self,
        kind: GradientRatioKind,
        accuracy: RenderGradientAccuracy,
        extend: ExtendMode,
        ratios: &[f64],
        children: &[RenderProgram],
    ) -> GlintResult<()> {
        let stops: Vec<LocationId> = children.iter().map(|_| self.new_location()).collect();
        let blend = self.new_location();
        let end = self.new_location();
        self.push(RenderInstruction::ComputeGradientRatio(
            GradientRatioInstruction {
                kind,
                accuracy,
                extend,
                ratios: ratios.iter().map(|r| *r as f32).collect(),
                stops: stops.clone(),
                blend,
                end,
            },
        ));
        for (location, child) in stops.into_iter().zip(children) {
            self.mark(location);
            self.write_program(child)?;
            self.push(RenderInstruction::Return);
        }
        self.mark(blend);
        self.push(RenderInstruction::Blend);
        self.mark(end);
        Ok(())
    }
}

fn vec2_to_f32(v: Vec2) -> [f32; 2] {
    [v.x as f32, v.y as f32]
}

impl RenderProgram {
    /// The program followed by `Exit`, exactly as built (no simplification).
    pub fn write_instructions(&self) -> GlintResult<Vec<RenderInstruction>> {
        let mut writer = InstructionWriter::new();
        writer.write_program(self)?;
        writer.push(RenderInstruction::Exit);
        Ok(writer.finish())
    }
}

/// Simplifies (unless disabled), checks stack requirements against the limits, then lowers.
#[tracing::instrument(skip(program))]
pub fn compile_instructions(
    program: &RenderProgram,
    options: &CompileOptions,
) -> GlintResult<Vec<RenderInstruction>> {
    let program = if options.simplify {
        let simplified = program.simplified();
        tracing::debug!(
            nodes_before = program.node_count(),
            nodes_after = simplified.node_count(),
            "simplified program"
        );
        simplified
    } else {
        program.clone()
    };

    program.resources().check(&options.limits)?;
    let instructions = program.write_instructions()?;
    tracing::debug!(instructions = instructions.len(), "lowered program");
    Ok(instructions)
}

#[cfg(test)]
#[path = "../../tests/unit/instructions/writer.rs"]
mod tests;
