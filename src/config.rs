use crate::foundation::error::{GlintError, GlintResult};

/// Bounds shared by the host executor and the static resource check.
///
/// The defaults match the fixed stack sizes and iteration cap of the GPU interpreter, so any
/// program accepted under the defaults runs on the GPU without hitting the error color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExecutionLimits {
    pub max_stack_depth: usize,
    pub max_return_depth: usize,
    pub max_iterations: u64,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_stack_depth: 16,
            max_return_depth: 16,
            max_iterations: 100_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Run the simplifier before lowering.
    pub simplify: bool,
    pub limits: ExecutionLimits,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            simplify: true,
            limits: ExecutionLimits::default(),
        }
    }
}

/// How [`crate::evaluate_batch`] spreads contexts over threads.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EvaluateThreading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
}

impl Default for EvaluateThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 256,
            threads: None,
        }
    }
}

impl EvaluateThreading {
    pub(crate) fn normalized_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> GlintResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GlintError::validation(
            "evaluate threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GlintError::execution(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
