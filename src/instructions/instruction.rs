use std::fmt;

use smallvec::SmallVec;

use crate::color::{BlendType, ColorSpaceConversion, ComposeType};
use crate::instructions::opcode::{
    BARYCENTRIC_PERSPECTIVE_WORDS, BARYCENTRIC_WORDS, LINEAR_BLEND_RATIO_WORDS,
    LINEAR_GRADIENT_RATIO_BASE_WORDS, Opcode, RADIAL_BLEND_RATIO_WORDS,
    RADIAL_GRADIENT_RATIO_BASE_WORDS,
};
use crate::program::{ExtendMode, RenderGradientAccuracy};

/// Jump target marker. Ids are only meaningful within the list that declares them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlendRatioKind {
    Linear {
        scaled_normal: [f32; 2],
        offset: f32,
    },
    Radial {
        inverse_transform: [f32; 6],
        radius0: f32,
        radius1: f32,
    },
}

/// Computes a blend ratio and dispatches to the `zero`/`one` programs and the `blend` step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendRatioInstruction {
    pub kind: BlendRatioKind,
    pub accuracy: RenderGradientAccuracy,
    pub zero: LocationId,
    pub one: LocationId,
    pub blend: LocationId,
    pub end: LocationId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientRatioKind {
    Linear {
        inverse_transform: [f32; 6],
        start: [f32; 2],
        delta: [f32; 2],
    },
    Radial {
        inverse_transform: [f32; 6],
        start: [f32; 2],
        start_radius: f32,
        end: [f32; 2],
        end_radius: f32,
    },
}

/// Computes a gradient ratio and dispatches to one or two stop programs.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientRatioInstruction {
    pub kind: GradientRatioKind,
    pub accuracy: RenderGradientAccuracy,
    pub extend: ExtendMode,
    pub ratios: Vec<f32>,
    /// One entry per ratio.
    pub stops: Vec<LocationId>,
    pub blend: LocationId,
    pub end: LocationId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarycentricInstruction {
    pub accuracy: RenderGradientAccuracy,
    pub points: [[f32; 2]; 3],
    /// Zero for a degenerate triangle.
    pub inverse_determinant: f32,
    pub depths: Option<[f32; 3]>,
}

/// Object form of one instruction, plus the zero-width `Location` marker.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderInstruction {
    Location(LocationId),
    Exit,
    Return,
    PushColor([f32; 4]),
    OpaqueJump { target: LocationId },
    StackBlend,
    Blend,
    BlendCompose { compose: ComposeType, blend: BlendType },
    Premultiply,
    Unpremultiply,
    ColorSpaceConversion(ColorSpaceConversion),
    MultiplyScalar(f32),
    Normalize,
    Filter { matrix: [f32; 16], translation: [f32; 4] },
    Phong { alpha: f32, light_count: u32 },
    ComputeBlendRatio(BlendRatioInstruction),
    ComputeGradientRatio(GradientRatioInstruction),
    BarycentricBlend(BarycentricInstruction),
}

pub(crate) fn conversion_opcode(conversion: ColorSpaceConversion) -> Opcode {
    match conversion {
        ColorSpaceConversion::SrgbToLinearSrgb => Opcode::SrgbToLinearSrgb,
        ColorSpaceConversion::LinearSrgbToSrgb => Opcode::LinearSrgbToSrgb,
        ColorSpaceConversion::LinearSrgbToOklab => Opcode::LinearSrgbToOklab,
        ColorSpaceConversion::OklabToLinearSrgb => Opcode::OklabToLinearSrgb,
        ColorSpaceConversion::LinearDisplayP3ToLinearSrgb => Opcode::LinearDisplayP3ToLinearSrgb,
        ColorSpaceConversion::LinearSrgbToLinearDisplayP3 => Opcode::LinearSrgbToLinearDisplayP3,
    }
}

pub(crate) fn opcode_conversion(opcode: Opcode) -> Option<ColorSpaceConversion> {
    ColorSpaceConversion::ALL
        .into_iter()
        .find(|c| conversion_opcode(*c) == opcode)
}

impl RenderInstruction {
    /// `None` for location markers.
    pub fn opcode(&self) -> Option<Opcode> {
        Some(match self {
            Self::Location(_) => return None,
            Self::Exit => Opcode::Exit,
            Self::Return => Opcode::Return,
            Self::PushColor(_) => Opcode::PushColor,
            Self::OpaqueJump { .. } => Opcode::OpaqueJump,
            Self::StackBlend => Opcode::StackBlend,
            Self::Blend => Opcode::Blend,
            Self::BlendCompose { .. } => Opcode::BlendCompose,
            Self::Premultiply => Opcode::Premultiply,
            Self::Unpremultiply => Opcode::Unpremultiply,
            Self::ColorSpaceConversion(c) => conversion_opcode(*c),
            Self::MultiplyScalar(_) => Opcode::MultiplyScalar,
            Self::Normalize => Opcode::Normalize,
            Self::Filter { .. } => Opcode::Filter,
            Self::Phong { .. } => Opcode::Phong,
            Self::ComputeBlendRatio(i) => match i.kind {
                BlendRatioKind::Linear { .. } => Opcode::ComputeLinearBlendRatio,
                BlendRatioKind::Radial { .. } => Opcode::ComputeRadialBlendRatio,
            },
            Self::ComputeGradientRatio(i) => match i.kind {
                GradientRatioKind::Linear { .. } => Opcode::ComputeLinearGradientRatio,
                GradientRatioKind::Radial { .. } => Opcode::ComputeRadialGradientRatio,
            },
            Self::BarycentricBlend(_) => Opcode::BarycentricBlend,
        })
    }

    /// Encoded size in dwords; location markers take no space.
    pub fn binary_length(&self) -> u32 {
        match self {
            Self::Location(_) => 0,
            Self::PushColor(_) => 5,
            Self::OpaqueJump { .. } | Self::MultiplyScalar(_) | Self::Phong { .. } => 2,
            Self::Filter { .. } => 21,
            Self::ComputeBlendRatio(i) => match i.kind {
                BlendRatioKind::Linear { .. } => LINEAR_BLEND_RATIO_WORDS,
                BlendRatioKind::Radial { .. } => RADIAL_BLEND_RATIO_WORDS,
            },
            Self::ComputeGradientRatio(i) => {
                let base = match i.kind {
                    GradientRatioKind::Linear { .. } => LINEAR_GRADIENT_RATIO_BASE_WORDS,
                    GradientRatioKind::Radial { .. } => RADIAL_GRADIENT_RATIO_BASE_WORDS,
                };
                base + 2 * i.ratios.len() as u32
            }
            Self::BarycentricBlend(i) => {
                if i.depths.is_some() {
                    BARYCENTRIC_PERSPECTIVE_WORDS
                } else {
                    BARYCENTRIC_WORDS
                }
            }
            _ => 1,
        }
    }

    /// Every location this instruction may transfer control to.
    pub fn targets(&self) -> SmallVec<[LocationId; 4]> {
        match self {
            Self::OpaqueJump { target } => SmallVec::from_slice(&[*target]),
            Self::ComputeBlendRatio(i) => SmallVec::from_slice(&[i.zero, i.one, i.blend, i.end]),
            Self::ComputeGradientRatio(i) => {
                let mut out: SmallVec<[LocationId; 4]> = i.stops.iter().copied().collect();
                out.push(i.blend);
                out.push(i.end);
                out
            }
            _ => SmallVec::new(),
        }
    }

    /// Copy with every location id (markers and targets) passed through `f`.
    pub fn map_locations(&self, mut f: impl FnMut(LocationId) -> LocationId) -> Self {
        match self {
            Self::Location(id) => Self::Location(f(*id)),
            Self::OpaqueJump { target } => Self::OpaqueJump { target: f(*target) },
            Self::ComputeBlendRatio(i) => Self::ComputeBlendRatio(BlendRatioInstruction {
                zero: f(i.zero),
                one: f(i.one),
                blend: f(i.blend),
                end: f(i.end),
                ..*i
            }),
            Self::ComputeGradientRatio(i) => {
                Self::ComputeGradientRatio(GradientRatioInstruction {
                    stops: i.stops.iter().map(|s| f(*s)).collect(),
                    blend: f(i.blend),
                    end: f(i.end),
                    ..i.clone()
                })
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for RenderInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(opcode) = self.opcode() else {
            if let Self::Location(id) = self {
                return write!(f, "{id}:");
            }
            return Ok(());
        };
        write!(f, "  {}", opcode.name())?;
        match self {
            Self::PushColor(c) => write!(f, " {} {} {} {}", c[0], c[1], c[2], c[3]),
            Self::OpaqueJump { target } => write!(f, " {target}"),
            Self::BlendCompose { compose, blend } => write!(f, " {compose:?} {blend:?}"),
            Self::MultiplyScalar(s) => write!(f, " {s}"),
            Self::Phong { alpha, light_count } => write!(f, " alpha={alpha} lights={light_count}"),
            Self::ComputeBlendRatio(i) => write!(
                f,
                " {:?} zero={} one={} blend={} end={}",
                i.accuracy, i.zero, i.one, i.blend, i.end
            ),
            Self::ComputeGradientRatio(i) => {
                write!(f, " {:?} {:?}", i.accuracy, i.extend)?;
                for (ratio, stop) in i.ratios.iter().zip(&i.stops) {
                    write!(f, " {ratio}->{stop}")?;
                }
                write!(f, " blend={} end={}", i.blend, i.end)
            }
            Self::BarycentricBlend(i) => {
                write!(f, " {:?}", i.accuracy)?;
                if i.depths.is_some() {
                    write!(f, " perspective")?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// One instruction per line, for logs and test failure messages.
pub fn disassemble(instructions: &[RenderInstruction]) -> String {
    let mut out = String::new();
    for instruction in instructions {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/instructions/instruction.rs"]
mod tests;
