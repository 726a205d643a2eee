//! Opcode catalog of the binary instruction stream.
//!
//! The low byte of an instruction's first dword is its opcode; the remaining 24 bits carry small
//! inline operands. The numbering is shared with `gpu/render_program.wgsl`.

use crate::foundation::error::{GlintError, GlintResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Exit = 0x00,
    Return = 0x01,
    /// Followed by four `f32` channels.
    PushColor = 0x02,
    /// Followed by a forward offset; jumps when the top of stack has alpha 1.
    OpaqueJump = 0x03,
    StackBlend = 0x04,
    Blend = 0x05,
    /// Compose type in bits 8..16, blend type in bits 16..24.
    BlendCompose = 0x06,
    Premultiply = 0x07,
    Unpremultiply = 0x08,
    SrgbToLinearSrgb = 0x09,
    LinearSrgbToSrgb = 0x0A,
    LinearSrgbToOklab = 0x0B,
    OklabToLinearSrgb = 0x0C,
    LinearDisplayP3ToLinearSrgb = 0x0D,
    LinearSrgbToLinearDisplayP3 = 0x0E,
    /// Followed by the `f32` factor.
    MultiplyScalar = 0x0F,
    Normalize = 0x10,
    /// Followed by a row-major 4x4 matrix and a translation, all `f32`.
    Filter = 0x11,
    /// Light count in bits 8..32, followed by the `f32` shininess.
    Phong = 0x12,
    ComputeLinearBlendRatio = 0x13,
    ComputeRadialBlendRatio = 0x14,
    /// Accuracy in bits 8..12, extend in 12..16, stop count in 16..32.
    ComputeLinearGradientRatio = 0x15,
    ComputeRadialGradientRatio = 0x16,
    /// Perspective flag in bit 8, accuracy in bits 16..24.
    BarycentricBlend = 0x17,
}

pub(crate) const LINEAR_BLEND_RATIO_WORDS: u32 = 8;
pub(crate) const RADIAL_BLEND_RATIO_WORDS: u32 = 13;
pub(crate) const LINEAR_GRADIENT_RATIO_BASE_WORDS: u32 = 13;
pub(crate) const RADIAL_GRADIENT_RATIO_BASE_WORDS: u32 = 15;
pub(crate) const BARYCENTRIC_WORDS: u32 = 8;
pub(crate) const BARYCENTRIC_PERSPECTIVE_WORDS: u32 = 11;
pub(crate) const BARYCENTRIC_PERSPECTIVE_FLAG: u32 = 1 << 8;

impl Opcode {
    pub const ALL: [Self; 24] = [
        Self::Exit,
        Self::Return,
        Self::PushColor,
        Self::OpaqueJump,
        Self::StackBlend,
        Self::Blend,
        Self::BlendCompose,
        Self::Premultiply,
        Self::Unpremultiply,
        Self::SrgbToLinearSrgb,
        Self::LinearSrgbToSrgb,
        Self::LinearSrgbToOklab,
        Self::OklabToLinearSrgb,
        Self::LinearDisplayP3ToLinearSrgb,
        Self::LinearSrgbToLinearDisplayP3,
        Self::MultiplyScalar,
        Self::Normalize,
        Self::Filter,
        Self::Phong,
        Self::ComputeLinearBlendRatio,
        Self::ComputeRadialBlendRatio,
        Self::ComputeLinearGradientRatio,
        Self::ComputeRadialGradientRatio,
        Self::BarycentricBlend,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(usize::from(v)).copied()
    }

    pub fn from_word(word: u32) -> Option<Self> {
        Self::from_u8((word & 0xff) as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Return => "return",
            Self::PushColor => "push_color",
            Self::OpaqueJump => "opaque_jump",
            Self::StackBlend => "stack_blend",
            Self::Blend => "blend",
            Self::BlendCompose => "blend_compose",
            Self::Premultiply => "premultiply",
            Self::Unpremultiply => "unpremultiply",
            Self::SrgbToLinearSrgb => "srgb_to_linear_srgb",
            Self::LinearSrgbToSrgb => "linear_srgb_to_srgb",
            Self::LinearSrgbToOklab => "linear_srgb_to_oklab",
            Self::OklabToLinearSrgb => "oklab_to_linear_srgb",
            Self::LinearDisplayP3ToLinearSrgb => "linear_display_p3_to_linear_srgb",
            Self::LinearSrgbToLinearDisplayP3 => "linear_srgb_to_linear_display_p3",
            Self::MultiplyScalar => "multiply_scalar",
            Self::Normalize => "normalize",
            Self::Filter => "filter",
            Self::Phong => "phong",
            Self::ComputeLinearBlendRatio => "compute_linear_blend_ratio",
            Self::ComputeRadialBlendRatio => "compute_radial_blend_ratio",
            Self::ComputeLinearGradientRatio => "compute_linear_gradient_ratio",
            Self::ComputeRadialGradientRatio => "compute_radial_gradient_ratio",
            Self::BarycentricBlend => "barycentric_blend",
        }
    }
}

/// Length in dwords of the instruction starting with `first_word`.
pub fn binary_length(first_word: u32) -> GlintResult<u32> {
    let opcode = Opcode::from_word(first_word).ok_or_else(|| {
        GlintError::decode(format!("unknown opcode 0x{:02x}", first_word & 0xff))
    })?;
    let stops = first_word >> 16;
    Ok(match opcode {
        Opcode::PushColor => 5,
        Opcode::OpaqueJump | Opcode::MultiplyScalar | Opcode::Phong => 2,
        Opcode::Filter => 21,
        Opcode::ComputeLinearBlendRatio => LINEAR_BLEND_RATIO_WORDS,
        Opcode::ComputeRadialBlendRatio => RADIAL_BLEND_RATIO_WORDS,
        Opcode::ComputeLinearGradientRatio => LINEAR_GRADIENT_RATIO_BASE_WORDS + 2 * stops,
        Opcode::ComputeRadialGradientRatio => RADIAL_GRADIENT_RATIO_BASE_WORDS + 2 * stops,
        Opcode::BarycentricBlend => {
            if first_word & BARYCENTRIC_PERSPECTIVE_FLAG != 0 {
                BARYCENTRIC_PERSPECTIVE_WORDS
            } else {
                BARYCENTRIC_WORDS
            }
        }
        _ => 1,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/instructions/opcode.rs"]
mod tests;
