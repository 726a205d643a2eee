use std::collections::HashMap;

use crate::config::CompileOptions;
use crate::foundation::error::{GlintError, GlintResult};
use crate::instructions::codec;
use crate::instructions::instruction::{LocationId, RenderInstruction};
use crate::instructions::writer::compile_instructions;
use crate::program::RenderProgram;

/// An instruction list with its location markers resolved to instruction indices.
///
/// Construction checks that every jump resolves and moves forward; execution never has to look
/// at a marker again.
#[derive(Clone, Debug)]
pub struct ExecutableProgram {
    instructions: Vec<RenderInstruction>,
    addresses: HashMap<LocationId, usize>,
}

impl ExecutableProgram {
    pub fn from_instructions(list: Vec<RenderInstruction>) -> GlintResult<Self> {
        let mut instructions = Vec::with_capacity(list.len());
        let mut addresses = HashMap::new();
        for instruction in list {
            match instruction {
                RenderInstruction::Location(id) => {
                    if addresses.insert(id, instructions.len()).is_some() {
                        return Err(GlintError::validation(format!(
                            "location {id} is declared twice"
                        )));
                    }
                }
                other => instructions.push(other),
            }
        }

        for (index, instruction) in instructions.iter().enumerate() {
            for target in instruction.targets() {
                let Some(&address) = addresses.get(&target) else {
                    return Err(GlintError::validation(format!(
                        "location {target} is never declared"
                    )));
                };
                if address <= index {
                    return Err(GlintError::validation(format!(
                        "jump from {index} to {target} does not move forward"
                    )));
                }
            }
        }
        Ok(Self {
            instructions,
            addresses,
        })
    }

    /// Decodes the program at `offset` of a dword buffer.
    pub fn from_binary(words: &[u32], offset: usize) -> GlintResult<Self> {
        Self::from_instructions(codec::from_binary(words, offset)?)
    }

    pub fn compile(program: &RenderProgram, options: &CompileOptions) -> GlintResult<Self> {
        Self::from_instructions(compile_instructions(program, options)?)
    }

    /// Instructions without location markers.
    pub fn instructions(&self) -> &[RenderInstruction] {
        &self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&RenderInstruction> {
        self.instructions.get(index)
    }

    pub(crate) fn address(&self, location: LocationId) -> GlintResult<usize> {
        self.addresses
            .get(&location)
            .copied()
            .ok_or_else(|| GlintError::execution(format!("unresolved location {location}")))
    }
}
