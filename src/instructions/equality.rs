use std::collections::HashMap;

use crate::instructions::instruction::{LocationId, RenderInstruction};

/// Structural equality that ignores how locations are numbered and where markers sit.
///
/// Each id is replaced by the index of the first real instruction following its marker, so
/// a list compared against its decoded binary form is equal even though the ids differ.
pub fn instructions_equal(a: &[RenderInstruction], b: &[RenderInstruction]) -> bool {
    canonical(a) == canonical(b)
}

fn canonical(instructions: &[RenderInstruction]) -> Vec<RenderInstruction> {
    let mut positions = HashMap::<LocationId, u32>::new();
    let mut index = 0u32;
    for instruction in instructions {
        match instruction {
            RenderInstruction::Location(id) => {
                positions.insert(*id, index);
            }
            _ => index += 1,
        }
    }
    instructions
        .iter()
        .filter(|i| !matches!(i, RenderInstruction::Location(_)))
        .map(|i| {
            i.map_locations(|id| LocationId(positions.get(&id).copied().unwrap_or(u32::MAX)))
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/instructions/equality.rs"]
mod tests;
