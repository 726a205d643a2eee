//! GPU interpreter: the WGSL source handed to the dispatch layer, and a Rust model of a single
//! invocation used to check the shader's semantics on the host.

pub(crate) mod invocation;

pub use invocation::{
    ERROR_COLOR, GPU_MAX_ITERATIONS, GPU_RETURN_STACK_SIZE, GPU_STACK_SIZE, GpuEvaluationContext,
    InstructionWords, execute_invocation,
};

/// Compute shader evaluating one program per invocation.
///
/// Bindings (group 0): `instructions: array<u32>`, `contexts: array<EvaluationContext>` laid out
/// as [`GpuEvaluationContext`], `edges: array<vec4f>`, and `output: array<vec4f>`.
pub const RENDER_PROGRAM_WGSL: &str = include_str!("render_program.wgsl");

#[cfg(test)]
#[path = "../../tests/unit/gpu/shader.rs"]
mod tests;
