//! Dword encoding of instruction lists.
//!
//! Jump targets are stored as offsets relative to the jumping instruction's first word, so an
//! encoded program can be copied to any position of a shared buffer unchanged.

use std::collections::{BTreeMap, HashMap};

use crate::color::{BlendType, ComposeType};
use crate::foundation::error::{GlintError, GlintResult};
use crate::foundation::math::{WordsFingerprint, fingerprint_words};
use crate::instructions::instruction::{
    BarycentricInstruction, BlendRatioInstruction, BlendRatioKind, GradientRatioInstruction,
    GradientRatioKind, LocationId, RenderInstruction, opcode_conversion,
};
use crate::instructions::opcode::{BARYCENTRIC_PERSPECTIVE_FLAG, Opcode, binary_length};
use crate::program::{ExtendMode, RenderGradientAccuracy};

/// Encodes a list ending in `Exit`.
#[tracing::instrument(skip(instructions), fields(len = instructions.len()))]
pub fn to_binary(instructions: &[RenderInstruction]) -> GlintResult<Vec<u32>> {
    let last = instructions
        .iter()
        .rev()
        .find(|i| !matches!(i, RenderInstruction::Location(_)));
    if last != Some(&RenderInstruction::Exit) {
        return Err(GlintError::encode("instruction list must end with exit"));
    }

    let mut addresses = HashMap::<LocationId, u32>::new();
    let mut total: u32 = 0;
    for instruction in instructions {
        if let RenderInstruction::Location(id) = instruction
            && addresses.insert(*id, total).is_some()
        {
            return Err(GlintError::encode(format!("location {id} is declared twice")));
        }
        total = total
            .checked_add(instruction.binary_length())
            .ok_or_else(|| GlintError::encode("instruction list too long"))?;
    }

    let mut words = Vec::with_capacity(total as usize);
    for instruction in instructions {
        if matches!(instruction, RenderInstruction::Location(_)) {
            continue;
        }
        let address = words.len() as u32;
        let resolve = |id: LocationId| -> GlintResult<u32> {
            let target = addresses
                .get(&id)
                .copied()
                .ok_or_else(|| GlintError::encode(format!("location {id} is never declared")))?;
            if target <= address {
                return Err(GlintError::encode(format!(
                    "jump to {id} is not forward ({target} <= {address})"
                )));
            }
            Ok(target - address)
        };
        encode_instruction(instruction, &resolve, &mut words)?;

        let written = words.len() as u32 - address;
        if written != instruction.binary_length() {
            return Err(GlintError::encode(format!(
                "wrote {written} words for a {}-word instruction",
                instruction.binary_length()
            )));
        }
    }
    tracing::debug!(words = words.len(), "encoded instructions");
    Ok(words)
}

/// Appends the encoding to `out` and returns the dword offset it starts at.
pub fn write_binary(out: &mut Vec<u32>, instructions: &[RenderInstruction]) -> GlintResult<u32> {
    let words = to_binary(instructions)?;
    let offset = u32::try_from(out.len())
        .map_err(|_| GlintError::encode("instruction buffer exceeds u32 addressing"))?;
    out.extend_from_slice(&words);
    Ok(offset)
}

fn bits(v: f32) -> u32 {
    v.to_bits()
}

fn encode_instruction(
    instruction: &RenderInstruction,
    resolve: &impl Fn(LocationId) -> GlintResult<u32>,
    out: &mut Vec<u32>,
) -> GlintResult<()> {
    let Some(opcode) = instruction.opcode() else {
        return Ok(());
    };
    let op = opcode as u32;

    match instruction {
        RenderInstruction::PushColor(c) => {
            out.push(op);
            out.extend(c.map(bits));
        }
        RenderInstruction::OpaqueJump { target } => {
            out.push(op);
            out.push(resolve(*target)?);
        }
        RenderInstruction::BlendCompose { compose, blend } => {
            out.push(op | (*compose as u32) << 8 | (*blend as u32) << 16);
        }
        RenderInstruction::MultiplyScalar(s) => {
            out.push(op);
            out.push(bits(*s));
        }
        RenderInstruction::Filter {
            matrix,
            translation,
        } => {
            out.push(op);
            out.extend(matrix.map(bits));
            out.extend(translation.map(bits));
        }
        RenderInstruction::Phong { alpha, light_count } => {
            if *light_count > 0x00ff_ffff {
                return Err(GlintError::encode("phong light count does not fit 24 bits"));
            }
            out.push(op | light_count << 8);
            out.push(bits(*alpha));
        }
        RenderInstruction::ComputeBlendRatio(i) => {
            out.push(op | (i.accuracy as u32) << 8);
            match i.kind {
                BlendRatioKind::Linear {
                    scaled_normal,
                    offset,
                } => {
                    out.extend(scaled_normal.map(bits));
                    out.push(bits(offset));
                }
                BlendRatioKind::Radial {
                    inverse_transform,
                    radius0,
                    radius1,
                } => {
                    out.extend(inverse_transform.map(bits));
                    out.push(bits(radius0));
                    out.push(bits(radius1));
                }
            }
            for id in [i.zero, i.one, i.blend, i.end] {
                out.push(resolve(id)?);
            }
        }
        RenderInstruction::ComputeGradientRatio(i) => {
            let n = i.ratios.len();
            if n == 0 || n > 0xffff || i.stops.len() != n {
                return Err(GlintError::encode(format!(
                    "gradient needs 1..=65535 stops with one location each, got {n} ratios and {} stops",
                    i.stops.len()
                )));
            }
            out.push(op | (i.accuracy as u32) << 8 | (i.extend as u32) << 12 | (n as u32) << 16);
            match i.kind {
                GradientRatioKind::Linear {
                    inverse_transform,
                    start,
                    delta,
                } => {
                    out.extend(inverse_transform.map(bits));
                    out.extend(start.map(bits));
                    out.extend(delta.map(bits));
                }
                GradientRatioKind::Radial {
                    inverse_transform,
                    start,
                    start_radius,
                    end,
                    end_radius,
                } => {
                    out.extend(inverse_transform.map(bits));
                    out.extend(start.map(bits));
                    out.push(bits(start_radius));
                    out.extend(end.map(bits));
                    out.push(bits(end_radius));
                }
            }
            out.push(resolve(i.blend)?);
            out.push(resolve(i.end)?);
            out.extend(i.ratios.iter().copied().map(bits));
            for stop in &i.stops {
                out.push(resolve(*stop)?);
            }
        }
        RenderInstruction::BarycentricBlend(i) => {
            let flag = if i.depths.is_some() {
                BARYCENTRIC_PERSPECTIVE_FLAG
            } else {
                0
            };
            out.push(op | flag | (i.accuracy as u32) << 16);
            out.push(bits(i.inverse_determinant));
            for p in i.points {
                out.extend(p.map(bits));
            }
            if let Some(z) = i.depths {
                out.extend(z.map(bits));
            }
        }
        _ => out.push(op),
    }
    Ok(())
}

/// Sequential reader over one instruction's words.
struct WordReader<'a> {
    words: &'a [u32],
    pos: usize,
    address: usize,
}

impl WordReader<'_> {
    fn word(&mut self) -> GlintResult<u32> {
        let w = self
            .words
            .get(self.pos)
            .copied()
            .ok_or_else(|| GlintError::decode("instruction truncated"))?;
        self.pos += 1;
        Ok(w)
    }

    fn float(&mut self) -> GlintResult<f32> {
        Ok(f32::from_bits(self.word()?))
    }

    fn floats<const N: usize>(&mut self) -> GlintResult<[f32; N]> {
        let mut out = [0.0; N];
        for v in &mut out {
            *v = self.float()?;
        }
        Ok(out)
    }

    /// Relative offset to an absolute address, temporarily stored as the location id.
    fn target(&mut self) -> GlintResult<LocationId> {
        let offset = self.word()?;
        if offset == 0 {
            return Err(GlintError::decode(format!(
                "jump at {} does not move forward",
                self.address
            )));
        }
        let target = (self.address as u64) + u64::from(offset);
        u32::try_from(target)
            .map(LocationId)
            .map_err(|_| GlintError::decode("jump target out of range"))
    }
}

fn accuracy(v: u32) -> GlintResult<RenderGradientAccuracy> {
    u8::try_from(v)
        .ok()
        .and_then(RenderGradientAccuracy::from_u8)
        .ok_or_else(|| GlintError::decode(format!("invalid gradient accuracy {v}")))
}

fn decode_instruction(opcode: Opcode, r: &mut WordReader<'_>) -> GlintResult<RenderInstruction> {
    let header = r.word()?;
    Ok(match opcode {
        Opcode::Exit => RenderInstruction::Exit,
        Opcode::Return => RenderInstruction::Return,
        Opcode::PushColor => RenderInstruction::PushColor(r.floats()?),
        Opcode::OpaqueJump => RenderInstruction::OpaqueJump {
            target: r.target()?,
        },
        Opcode::StackBlend => RenderInstruction::StackBlend,
        Opcode::Blend => RenderInstruction::Blend,
        Opcode::BlendCompose => {
            let compose = ComposeType::from_u8((header >> 8) as u8)
                .ok_or_else(|| GlintError::decode("invalid compose type"))?;
            let blend = BlendType::from_u8((header >> 16) as u8)
                .ok_or_else(|| GlintError::decode("invalid blend type"))?;
            RenderInstruction::BlendCompose { compose, blend }
        }
        Opcode::Premultiply => RenderInstruction::Premultiply,
        Opcode::Unpremultiply => RenderInstruction::Unpremultiply,
        Opcode::SrgbToLinearSrgb
        | Opcode::LinearSrgbToSrgb
        | Opcode::LinearSrgbToOklab
        | Opcode::OklabToLinearSrgb
        | Opcode::LinearDisplayP3ToLinearSrgb
        | Opcode::LinearSrgbToLinearDisplayP3 => {
            let conversion = opcode_conversion(opcode)
                .ok_or_else(|| GlintError::decode("unmapped conversion opcode"))?;
            RenderInstruction::ColorSpaceConversion(conversion)
        }
        Opcode::MultiplyScalar => RenderInstruction::MultiplyScalar(r.float()?),
        Opcode::Normalize => RenderInstruction::Normalize,
        Opcode::Filter => RenderInstruction::Filter {
            matrix: r.floats()?,
            translation: r.floats()?,
        },
        Opcode::Phong => RenderInstruction::Phong {
            light_count: header >> 8,
            alpha: r.float()?,
        },
        Opcode::ComputeLinearBlendRatio | Opcode::ComputeRadialBlendRatio => {
            let kind = if opcode == Opcode::ComputeLinearBlendRatio {
                BlendRatioKind::Linear {
                    scaled_normal: r.floats()?,
                    offset: r.float()?,
                }
            } else {
                BlendRatioKind::Radial {
                    inverse_transform: r.floats()?,
                    radius0: r.float()?,
                    radius1: r.float()?,
                }
            };
            RenderInstruction::ComputeBlendRatio(BlendRatioInstruction {
                kind,
                accuracy: accuracy((header >> 8) & 0xff)?,
                zero: r.target()?,
                one: r.target()?,
                blend: r.target()?,
                end: r.target()?,
            })
        }
        Opcode::ComputeLinearGradientRatio | Opcode::ComputeRadialGradientRatio => {
            let kind = if opcode == Opcode::ComputeLinearGradientRatio {
                GradientRatioKind::Linear {
                    inverse_transform: r.floats()?,
                    start: r.floats()?,
                    delta: r.floats()?,
                }
            } else {
                GradientRatioKind::Radial {
                    inverse_transform: r.floats()?,
                    start: r.floats()?,
                    start_radius: r.float()?,
                    end: r.floats()?,
                    end_radius: r.float()?,
                }
            };
            let n = (header >> 16) as usize;
            if n == 0 {
                return Err(GlintError::decode("gradient without stops"));
            }
            let extend = ExtendMode::from_u8(((header >> 12) & 0xf) as u8)
                .ok_or_else(|| GlintError::decode("invalid extend mode"))?;
            let blend = r.target()?;
            let end = r.target()?;
            let ratios = (0..n).map(|_| r.float()).collect::<GlintResult<Vec<_>>>()?;
            let stops = (0..n).map(|_| r.target()).collect::<GlintResult<Vec<_>>>()?;
            RenderInstruction::ComputeGradientRatio(GradientRatioInstruction {
                kind,
                accuracy: accuracy((header >> 8) & 0xf)?,
                extend,
                ratios,
                stops,
                blend,
                end,
            })
        }
        Opcode::BarycentricBlend => {
            let inverse_determinant = r.float()?;
            let points = [r.floats()?, r.floats()?, r.floats()?];
            let depths = if header & BARYCENTRIC_PERSPECTIVE_FLAG != 0 {
                Some(r.floats()?)
            } else {
                None
            };
            RenderInstruction::BarycentricBlend(BarycentricInstruction {
                accuracy: accuracy((header >> 16) & 0xff)?,
                points,
                inverse_determinant,
                depths,
            })
        }
    })
}

/// Decodes the program starting at `offset`, up to and including its `Exit`.
///
/// One `Location` marker is materialized per distinct jump target, numbered in address order.
#[tracing::instrument(skip(words), fields(len = words.len()))]
pub fn from_binary(words: &[u32], offset: usize) -> GlintResult<Vec<RenderInstruction>> {
    let mut decoded: Vec<(u32, RenderInstruction)> = Vec::new();
    let mut address = offset;
    loop {
        let first = *words.get(address).ok_or_else(|| {
            GlintError::decode(format!("stream ended at {address} without exit"))
        })?;
        let opcode = Opcode::from_word(first).ok_or_else(|| {
            GlintError::decode(format!("unknown opcode 0x{:02x} at {address}", first & 0xff))
        })?;
        let len = binary_length(first)? as usize;
        let end = address + len;
        let slice = words.get(address..end).ok_or_else(|| {
            GlintError::decode(format!("{} at {address} is truncated", opcode.name()))
        })?;
        let mut reader = WordReader {
            words: slice,
            pos: 0,
            address,
        };
        let instruction = decode_instruction(opcode, &mut reader)?;
        let address32 = u32::try_from(address)
            .map_err(|_| GlintError::decode("stream exceeds u32 addressing"))?;
        decoded.push((address32, instruction));
        if opcode == Opcode::Exit {
            break;
        }
        address = end;
    }

    let boundaries: HashMap<u32, usize> = decoded
        .iter()
        .enumerate()
        .map(|(index, (addr, _))| (*addr, index))
        .collect();
    let mut targets = BTreeMap::<u32, LocationId>::new();
    for (_, instruction) in &decoded {
        for target in instruction.targets() {
            if !boundaries.contains_key(&target.0) {
                return Err(GlintError::decode(format!(
                    "jump target {} is not an instruction boundary",
                    target.0
                )));
            }
            targets.insert(target.0, LocationId(0));
        }
    }
    for (index, id) in targets.values_mut().enumerate() {
        *id = LocationId(index as u32);
    }

    let mut out = Vec::with_capacity(decoded.len() + targets.len());
    for (addr, instruction) in decoded {
        if let Some(id) = targets.get(&addr) {
            out.push(RenderInstruction::Location(*id));
        }
        out.push(instruction.map_locations(|raw| targets.get(&raw.0).copied().unwrap_or(raw)));
    }
    Ok(out)
}

/// Many encoded programs in one dword buffer, with identical programs stored once.
#[derive(Debug, Default)]
pub struct ProgramBuffer {
    words: Vec<u32>,
    known: HashMap<WordsFingerprint, (u32, usize)>,
    programs: usize,
}

impl ProgramBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes and appends `instructions`, returning the program's dword offset.
    pub fn push(&mut self, instructions: &[RenderInstruction]) -> GlintResult<u32> {
        let words = to_binary(instructions)?;
        self.push_words(&words)
    }

    /// Appends an already encoded program, reusing an identical earlier copy when present.
    pub fn push_words(&mut self, words: &[u32]) -> GlintResult<u32> {
        self.programs += 1;
        let fingerprint = fingerprint_words(words);
        if let Some((offset, len)) = self.known.get(&fingerprint).copied() {
            let start = offset as usize;
            if self.words.get(start..start + len) == Some(words) {
                return Ok(offset);
            }
        }
        let offset = u32::try_from(self.words.len())
            .map_err(|_| GlintError::encode("program buffer exceeds u32 addressing"))?;
        self.words.extend_from_slice(words);
        self.known.insert(fingerprint, (offset, words.len()));
        tracing::debug!(offset, len = words.len(), "appended program to buffer");
        Ok(offset)
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn into_words(self) -> Vec<u32> {
        self.words
    }

    /// Number of programs pushed, duplicates included.
    pub fn program_count(&self) -> usize {
        self.programs
    }

    /// Number of distinct programs stored.
    pub fn unique_count(&self) -> usize {
        self.known.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/instructions/codec.rs"]
mod tests;
