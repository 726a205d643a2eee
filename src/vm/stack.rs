use smallvec::SmallVec;

use crate::config::ExecutionLimits;
use crate::foundation::core::Vec4;
use crate::foundation::error::{GlintError, GlintResult};

/// Operand and return-address stacks of one host execution.
///
/// Sized inline for the default limits; deeper limits spill to the heap.
#[derive(Debug)]
pub struct ExecutionStack {
    values: SmallVec<[Vec4; 16]>,
    returns: SmallVec<[usize; 16]>,
    limits: ExecutionLimits,
}

impl ExecutionStack {
    pub fn new(limits: ExecutionLimits) -> Self {
        Self {
            values: SmallVec::new(),
            returns: SmallVec::new(),
            limits,
        }
    }

    pub fn push(&mut self, value: Vec4) -> GlintResult<()> {
        if self.values.len() >= self.limits.max_stack_depth {
            return Err(GlintError::execution(format!(
                "operand stack overflow (limit {})",
                self.limits.max_stack_depth
            )));
        }
        self.values.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> GlintResult<Vec4> {
        self.values
            .pop()
            .ok_or_else(|| GlintError::execution("operand stack underflow"))
    }

    /// Pops `N` values, returned bottom-most first.
    pub fn pop_n<const N: usize>(&mut self) -> GlintResult<[Vec4; N]> {
        let mut out = [Vec4::ZERO; N];
        for slot in out.iter_mut().rev() {
            *slot = self.pop()?;
        }
        Ok(out)
    }

    pub fn peek(&self) -> GlintResult<Vec4> {
        self.values
            .last()
            .copied()
            .ok_or_else(|| GlintError::execution("operand stack is empty"))
    }

    pub fn push_return(&mut self, address: usize) -> GlintResult<()> {
        if self.returns.len() >= self.limits.max_return_depth {
            return Err(GlintError::execution(format!(
                "return stack overflow (limit {})",
                self.limits.max_return_depth
            )));
        }
        self.returns.push(address);
        Ok(())
    }

    pub fn pop_return(&mut self) -> GlintResult<usize> {
        self.returns
            .pop()
            .ok_or_else(|| GlintError::execution("return without a pending call"))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn return_depth(&self) -> usize {
        self.returns.len()
    }

    /// The single remaining value at `Exit`.
    pub fn finish(mut self) -> GlintResult<Vec4> {
        if self.values.len() != 1 || !self.returns.is_empty() {
            return Err(GlintError::execution(format!(
                "exit with {} values and {} pending returns",
                self.values.len(),
                self.returns.len()
            )));
        }
        self.pop()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/vm/stack.rs"]
mod tests;
