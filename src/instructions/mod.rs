//! Flat instruction form of a program: object instructions, the writer that produces them,
//! and the dword codec shared with the GPU interpreter.

pub(crate) mod codec;
pub(crate) mod equality;
pub(crate) mod instruction;
pub(crate) mod opcode;
pub(crate) mod resources;
pub(crate) mod writer;

pub use codec::{ProgramBuffer, from_binary, to_binary, write_binary};
pub use equality::instructions_equal;
pub use instruction::{
    BarycentricInstruction, BlendRatioInstruction, BlendRatioKind, GradientRatioInstruction,
    GradientRatioKind, LocationId, RenderInstruction, disassemble,
};
pub use opcode::{Opcode, binary_length};
pub use resources::ProgramResources;
pub use writer::{InstructionWriter, compile_instructions};
