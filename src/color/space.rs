use crate::foundation::core::Vec4;

/// Fixed analytic color-space conversions applied to the RGB channels of a color.
///
/// Alpha is never touched. Conversions expect straight (unpremultiplied) input; programs that
/// carry premultiplied colors wrap them in unpremultiply/premultiply nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpaceConversion {
    SrgbToLinearSrgb,
    LinearSrgbToSrgb,
    LinearSrgbToOklab,
    OklabToLinearSrgb,
    LinearDisplayP3ToLinearSrgb,
    LinearSrgbToLinearDisplayP3,
}

impl ColorSpaceConversion {
    pub const ALL: [Self; 6] = [
        Self::SrgbToLinearSrgb,
        Self::LinearSrgbToSrgb,
        Self::LinearSrgbToOklab,
        Self::OklabToLinearSrgb,
        Self::LinearDisplayP3ToLinearSrgb,
        Self::LinearSrgbToLinearDisplayP3,
    ];

    pub fn apply(self, color: Vec4) -> Vec4 {
        match self {
            Self::SrgbToLinearSrgb => srgb_to_linear_srgb(color),
            Self::LinearSrgbToSrgb => linear_srgb_to_srgb(color),
            Self::LinearSrgbToOklab => linear_srgb_to_oklab(color),
            Self::OklabToLinearSrgb => oklab_to_linear_srgb(color),
            Self::LinearDisplayP3ToLinearSrgb => linear_display_p3_to_linear_srgb(color),
            Self::LinearSrgbToLinearDisplayP3 => linear_srgb_to_linear_display_p3(color),
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            Self::SrgbToLinearSrgb => Self::LinearSrgbToSrgb,
            Self::LinearSrgbToSrgb => Self::SrgbToLinearSrgb,
            Self::LinearSrgbToOklab => Self::OklabToLinearSrgb,
            Self::OklabToLinearSrgb => Self::LinearSrgbToOklab,
            Self::LinearDisplayP3ToLinearSrgb => Self::LinearSrgbToLinearDisplayP3,
            Self::LinearSrgbToLinearDisplayP3 => Self::LinearDisplayP3ToLinearSrgb,
        }
    }
}

pub fn premultiply(color: Vec4) -> Vec4 {
    Vec4::new(
        color.x * color.w,
        color.y * color.w,
        color.z * color.w,
        color.w,
    )
}

/// Zero alpha yields the zero vector instead of 0/0.
pub fn unpremultiply(color: Vec4) -> Vec4 {
    if color.w == 0.0 {
        Vec4::ZERO
    } else {
        let inv = 1.0 / color.w;
        Vec4::new(color.x * inv, color.y * inv, color.z * inv, color.w)
    }
}

fn srgb_channel_to_linear(c: f64) -> f64 {
    let a = c.abs();
    let v = if a <= 0.04045 {
        a / 12.92
    } else {
        ((a + 0.055) / 1.055).powf(2.4)
    };
    v.copysign(c)
}

fn linear_channel_to_srgb(c: f64) -> f64 {
    let a = c.abs();
    let v = if a <= 0.003_130_8 {
        a * 12.92
    } else {
        1.055 * a.powf(1.0 / 2.4) - 0.055
    };
    v.copysign(c)
}

pub fn srgb_to_linear_srgb(color: Vec4) -> Vec4 {
    Vec4::new(
        srgb_channel_to_linear(color.x),
        srgb_channel_to_linear(color.y),
        srgb_channel_to_linear(color.z),
        color.w,
    )
}

pub fn linear_srgb_to_srgb(color: Vec4) -> Vec4 {
    Vec4::new(
        linear_channel_to_srgb(color.x),
        linear_channel_to_srgb(color.y),
        linear_channel_to_srgb(color.z),
        color.w,
    )
}

fn mat3(m: &[[f64; 3]; 3], c: Vec4) -> Vec4 {
    Vec4::new(
        m[0][0] * c.x + m[0][1] * c.y + m[0][2] * c.z,
        m[1][0] * c.x + m[1][1] * c.y + m[1][2] * c.z,
        m[2][0] * c.x + m[2][1] * c.y + m[2][2] * c.z,
        c.w,
    )
}

const LINEAR_SRGB_TO_LMS: [[f64; 3]; 3] = [
    [0.412_221_470_8, 0.536_332_536_3, 0.051_445_992_9],
    [0.211_903_498_2, 0.680_699_545_1, 0.107_396_956_6],
    [0.088_302_461_9, 0.281_718_837_6, 0.629_978_700_5],
];

const LMS_TO_OKLAB: [[f64; 3]; 3] = [
    [0.210_454_255_3, 0.793_617_785_0, -0.004_072_046_8],
    [1.977_998_495_1, -2.428_592_205_0, 0.450_593_709_9],
    [0.025_904_037_1, 0.782_771_766_2, -0.808_675_766_0],
];

const OKLAB_TO_LMS: [[f64; 3]; 3] = [
    [1.0, 0.396_337_777_4, 0.215_803_757_3],
    [1.0, -0.105_561_345_8, -0.063_854_172_8],
    [1.0, -0.089_484_177_5, -1.291_485_548_0],
];

const LMS_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [4.076_741_662_1, -3.307_711_591_3, 0.230_969_929_2],
    [-1.268_438_004_6, 2.609_757_401_1, -0.341_319_396_5],
    [-0.004_196_086_3, -0.703_418_614_7, 1.707_614_701_0],
];

const LINEAR_DISPLAY_P3_TO_LINEAR_SRGB: [[f64; 3]; 3] = [
    [1.224_940_176_3, -0.224_940_176_3, 0.0],
    [-0.042_056_954_7, 1.042_056_954_7, 0.0],
    [-0.019_637_554_6, -0.078_636_045_6, 1.098_273_600_2],
];

const LINEAR_SRGB_TO_LINEAR_DISPLAY_P3: [[f64; 3]; 3] = [
    [0.822_461_968_7, 0.177_538_031_3, 0.0],
    [0.033_194_199_4, 0.966_805_800_6, 0.0],
    [0.017_082_630_6, 0.072_397_440_5, 0.910_519_929_0],
];

pub fn linear_srgb_to_oklab(color: Vec4) -> Vec4 {
    let lms = mat3(&LINEAR_SRGB_TO_LMS, color);
    mat3(&LMS_TO_OKLAB, lms.map(f64::cbrt).with_w(color.w))
}

pub fn oklab_to_linear_srgb(color: Vec4) -> Vec4 {
    let lms = mat3(&OKLAB_TO_LMS, color);
    mat3(&LMS_TO_LINEAR_SRGB, lms.map(|v| v * v * v).with_w(color.w))
}

pub fn linear_display_p3_to_linear_srgb(color: Vec4) -> Vec4 {
    mat3(&LINEAR_DISPLAY_P3_TO_LINEAR_SRGB, color)
}

pub fn linear_srgb_to_linear_display_p3(color: Vec4) -> Vec4 {
    mat3(&LINEAR_SRGB_TO_LINEAR_DISPLAY_P3, color)
}

#[cfg(test)]
#[path = "../../tests/unit/color/space.rs"]
mod tests;
