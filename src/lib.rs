//! glint is the shading core of a GPU vector renderer.
//!
//! A [`RenderProgram`] is an expression tree describing what color one sample of a clipped face
//! gets: constant colors, gradients, blends, lighting and color-space conversions. Programs go
//! through a fixed pipeline:
//!
//! 1. **Simplify**: [`RenderProgram::simplified`] folds constants and removes dead layers.
//! 2. **Compile**: [`RenderProgram::write_instructions`] lowers the tree to a flat
//!    [`RenderInstruction`] list with forward-only jumps.
//! 3. **Encode** (optional): [`to_binary`] packs the list into dwords; many programs can share one
//!    [`ProgramBuffer`].
//! 4. **Execute**: the host [`RenderExecutor`] and the WGSL interpreter ([`RENDER_PROGRAM_WGSL`],
//!    modelled by [`execute_invocation`]) run the same stack machine and return one premultiplied
//!    RGBA color per sample.
//!
//! Geometry (clipping, face partitioning, tiling) and GPU resource management live outside this
//! crate; they hand in a [`RenderEvaluationContext`] per sample.
#![forbid(unsafe_code)]

mod color;
mod config;
mod context;
mod foundation;
mod gpu;
mod instructions;
mod program;
mod raster;
mod vm;

pub use color::{
    BlendType, ColorSpaceConversion, ComposeType, blend_compose, premultiply, stack_blend,
    unpremultiply,
};
pub use config::{CompileOptions, EvaluateThreading, ExecutionLimits};
pub use context::{EdgedFace, LinearEdge, RenderEvaluationContext};
pub use foundation::core::{Affine, Point, Rect, Vec2, Vec4};
pub use foundation::error::{GlintError, GlintResult};
pub use foundation::math::{OPAQUE_EPSILON, WordsFingerprint};
pub use gpu::{
    ERROR_COLOR, GPU_MAX_ITERATIONS, GPU_RETURN_STACK_SIZE, GPU_STACK_SIZE, GpuEvaluationContext,
    InstructionWords, RENDER_PROGRAM_WGSL, execute_invocation,
};
pub use instructions::{
    BarycentricInstruction, BlendRatioInstruction, BlendRatioKind, GradientRatioInstruction,
    GradientRatioKind, InstructionWriter, LocationId, Opcode, ProgramBuffer, ProgramResources,
    RenderInstruction, binary_length, compile_instructions, disassemble, from_binary,
    instructions_equal, to_binary, write_binary,
};
pub use program::{
    ExtendMode, FillRule, GradientStopDef, LightDef, ProgramFlags, RenderGradientAccuracy,
    RenderGradientStop, RenderPath, RenderProgram, RenderProgramDef, RenderProgramKind,
    StopSelection, select_stops,
};
pub use raster::{RasterFrame, rasterize};
pub use vm::{
    ExecutableProgram, ExecutionStack, RenderExecutor, evaluate_batch, evaluate_batch_with,
};
