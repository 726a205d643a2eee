use crate::color::space::unpremultiply;
use crate::foundation::core::Vec4;

/// Porter-Duff compositing operator applied after blending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ComposeType {
    #[default]
    Over = 0,
    In = 1,
    Out = 2,
    Atop = 3,
    Xor = 4,
    Plus = 5,
    PlusLighter = 6,
}

/// Blend mode mixing source and backdrop colors (W3C compositing catalog).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BlendType {
    #[default]
    Normal = 0,
    Multiply = 1,
    Screen = 2,
    Overlay = 3,
    Darken = 4,
    Lighten = 5,
    ColorDodge = 6,
    ColorBurn = 7,
    HardLight = 8,
    SoftLight = 9,
    Difference = 10,
    Exclusion = 11,
    Hue = 12,
    Saturation = 13,
    Color = 14,
    Luminosity = 15,
}

impl ComposeType {
    pub const ALL: [Self; 7] = [
        Self::Over,
        Self::In,
        Self::Out,
        Self::Atop,
        Self::Xor,
        Self::Plus,
        Self::PlusLighter,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(usize::from(v)).copied()
    }
}

impl BlendType {
    pub const ALL: [Self; 16] = [
        Self::Normal,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(usize::from(v)).copied()
    }
}

/// Painter's-order "over" of a premultiplied foreground onto a premultiplied background.
pub fn stack_blend(foreground: Vec4, background: Vec4) -> Vec4 {
    foreground + background * (1.0 - foreground.w)
}

/// Blend the premultiplied source `a` with the premultiplied backdrop `b`, then composite.
pub fn blend_compose(a: Vec4, b: Vec4, compose: ComposeType, blend: BlendType) -> Vec4 {
    let blended = if blend == BlendType::Normal {
        a
    } else {
        let src = unpremultiply(a);
        let dst = unpremultiply(b);
        let mixed = blend_rgb(blend, dst, src);
        let rgb = src * (1.0 - b.w) + mixed * b.w;
        Vec4::new(rgb.x * a.w, rgb.y * a.w, rgb.z * a.w, a.w)
    };

    match compose {
        ComposeType::Over => blended + b * (1.0 - a.w),
        ComposeType::In => blended * b.w,
        ComposeType::Out => blended * (1.0 - b.w),
        ComposeType::Atop => blended * b.w + b * (1.0 - a.w),
        ComposeType::Xor => blended * (1.0 - b.w) + b * (1.0 - a.w),
        ComposeType::Plus => blended + b,
        ComposeType::PlusLighter => (blended + b).min_each(1.0),
    }
}

/// `B(cb, cs)` on straight RGB; the `w` channel of the result is unspecified.
fn blend_rgb(blend: BlendType, cb: Vec4, cs: Vec4) -> Vec4 {
    let sep = |f: fn(f64, f64) -> f64| Vec4::new(f(cb.x, cs.x), f(cb.y, cs.y), f(cb.z, cs.z), 0.0);
    match blend {
        BlendType::Normal => cs,
        BlendType::Multiply => sep(|b, s| b * s),
        BlendType::Screen => sep(screen),
        BlendType::Overlay => sep(|b, s| hard_light(s, b)),
        BlendType::Darken => sep(f64::min),
        BlendType::Lighten => sep(f64::max),
        BlendType::ColorDodge => sep(color_dodge),
        BlendType::ColorBurn => sep(color_burn),
        BlendType::HardLight => sep(hard_light),
        BlendType::SoftLight => sep(soft_light),
        BlendType::Difference => sep(|b, s| (b - s).abs()),
        BlendType::Exclusion => sep(|b, s| b + s - 2.0 * b * s),
        BlendType::Hue => set_lum(set_sat(cs, sat(cb)), lum(cb)),
        BlendType::Saturation => set_lum(set_sat(cb, sat(cs)), lum(cb)),
        BlendType::Color => set_lum(cs, lum(cb)),
        BlendType::Luminosity => set_lum(cb, lum(cs)),
    }
}

fn screen(b: f64, s: f64) -> f64 {
    b + s - b * s
}

fn hard_light(b: f64, s: f64) -> f64 {
    if s <= 0.5 {
        b * 2.0 * s
    } else {
        screen(b, 2.0 * s - 1.0)
    }
}

fn color_dodge(b: f64, s: f64) -> f64 {
    if b == 0.0 {
        0.0
    } else if s >= 1.0 {
        1.0
    } else {
        (b / (1.0 - s)).min(1.0)
    }
}

fn color_burn(b: f64, s: f64) -> f64 {
    if b >= 1.0 {
        1.0
    } else if s <= 0.0 {
        0.0
    } else {
        1.0 - ((1.0 - b) / s).min(1.0)
    }
}

fn soft_light(b: f64, s: f64) -> f64 {
    if s <= 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        let d = if b <= 0.25 {
            ((16.0 * b - 12.0) * b + 4.0) * b
        } else {
            b.sqrt()
        };
        b + (2.0 * s - 1.0) * (d - b)
    }
}

fn lum(c: Vec4) -> f64 {
    0.3 * c.x + 0.59 * c.y + 0.11 * c.z
}

fn sat(c: Vec4) -> f64 {
    c.x.max(c.y).max(c.z) - c.x.min(c.y).min(c.z)
}

fn clip_color(c: Vec4) -> Vec4 {
    let l = lum(c);
    let n = c.x.min(c.y).min(c.z);
    let x = c.x.max(c.y).max(c.z);
    let mut out = c;
    if n < 0.0 && l - n > 0.0 {
        let k = l / (l - n);
        out = out.map(|v| l + (v - l) * k);
    }
    if x > 1.0 && x - l > 0.0 {
        let k = (1.0 - l) / (x - l);
        out = out.map(|v| l + (v - l) * k);
    }
    out
}

fn set_lum(c: Vec4, l: f64) -> Vec4 {
    let d = l - lum(c);
    clip_color(Vec4::new(c.x + d, c.y + d, c.z + d, 0.0))
}

fn set_sat(c: Vec4, s: f64) -> Vec4 {
    let lo = c.x.min(c.y).min(c.z);
    let hi = c.x.max(c.y).max(c.z);
    if hi > lo {
        let k = s / (hi - lo);
        Vec4::new((c.x - lo) * k, (c.y - lo) * k, (c.z - lo) * k, 0.0)
    } else {
        Vec4::ZERO
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/blend.rs"]
mod tests;
