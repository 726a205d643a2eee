use rayon::prelude::*;

use crate::config::{EvaluateThreading, build_thread_pool};
use crate::context::RenderEvaluationContext;
use crate::foundation::core::Vec4;
use crate::foundation::error::GlintResult;
use crate::vm::executor::RenderExecutor;
use crate::vm::program::ExecutableProgram;

/// Evaluates one program for many independent samples, in order.
///
/// With `threading.parallel` the contexts are processed chunk by chunk on a dedicated rayon pool.
#[tracing::instrument(skip(program, contexts), fields(samples = contexts.len()))]
pub fn evaluate_batch(
    program: &ExecutableProgram,
    contexts: &[RenderEvaluationContext],
    threading: &EvaluateThreading,
) -> GlintResult<Vec<Vec4>> {
    evaluate_batch_with(&RenderExecutor::default(), program, contexts, threading)
}

/// [`evaluate_batch`] with explicit executor limits.
pub fn evaluate_batch_with(
    executor: &RenderExecutor,
    program: &ExecutableProgram,
    contexts: &[RenderEvaluationContext],
    threading: &EvaluateThreading,
) -> GlintResult<Vec<Vec4>> {
    if !threading.parallel {
        return contexts
            .iter()
            .map(|ctx| executor.execute(program, ctx))
            .collect();
    }

    let pool = build_thread_pool(threading.threads)?;
    let chunk_size = threading.normalized_chunk_size();
    let mut out = Vec::with_capacity(contexts.len());
    for chunk in contexts.chunks(chunk_size) {
        let values = pool.install(|| {
            chunk
                .par_iter()
                .map(|ctx| executor.execute(program, ctx))
                .collect::<GlintResult<Vec<_>>>()
        })?;
        out.extend(values);
    }
    tracing::debug!(
        samples = out.len(),
        threads = pool.current_num_threads(),
        "evaluated batch"
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/vm/batch.rs"]
mod tests;
