//! Host stack machine: resolved programs, the executor, and batch evaluation.

pub(crate) mod batch;
pub(crate) mod executor;
pub(crate) mod program;
pub(crate) mod stack;

pub use batch::{evaluate_batch, evaluate_batch_with};
pub use executor::RenderExecutor;
pub use program::ExecutableProgram;
pub use stack::ExecutionStack;
