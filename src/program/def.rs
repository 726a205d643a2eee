//! Serializable description of a program, for fixtures and tooling.
//!
//! ```json
//! { "type": "stack", "layers": [
//!     { "type": "color", "color": [1, 0, 0, 1] },
//!     { "type": "alpha", "alpha": 0.5, "child": { "type": "color", "color": [0, 0, 1, 1] } }
//! ] }
//! ```

use crate::color::{BlendType, ColorSpaceConversion, ComposeType};
use crate::foundation::core::{Affine, Point, Vec2, Vec4};
use crate::foundation::error::{GlintError, GlintResult};
use crate::program::gradient::{ExtendMode, RenderGradientAccuracy, RenderGradientStop};
use crate::program::node::{RenderProgram, RenderProgramKind};
use crate::program::path::RenderPath;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderProgramDef {
    Color {
        color: [f64; 4],
    },
    Premultiply {
        child: Box<RenderProgramDef>,
    },
    Unpremultiply {
        child: Box<RenderProgramDef>,
    },
    ColorSpaceConversion {
        conversion: ColorSpaceConversion,
        child: Box<RenderProgramDef>,
    },
    Alpha {
        alpha: f64,
        child: Box<RenderProgramDef>,
    },
    Normalize {
        child: Box<RenderProgramDef>,
    },
    LinearBlend {
        scaled_normal: [f64; 2],
        offset: f64,
        #[serde(default)]
        accuracy: RenderGradientAccuracy,
        zero: Box<RenderProgramDef>,
        one: Box<RenderProgramDef>,
    },
    RadialBlend {
        #[serde(default = "identity_transform")]
        transform: [f64; 6],
        radius0: f64,
        radius1: f64,
        #[serde(default)]
        accuracy: RenderGradientAccuracy,
        zero: Box<RenderProgramDef>,
        one: Box<RenderProgramDef>,
    },
    BarycentricBlend {
        points: [[f64; 2]; 3],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depths: Option<[f64; 3]>,
        #[serde(default)]
        accuracy: RenderGradientAccuracy,
        a: Box<RenderProgramDef>,
        b: Box<RenderProgramDef>,
        c: Box<RenderProgramDef>,
    },
    LinearGradient {
        #[serde(default = "identity_transform")]
        transform: [f64; 6],
        start: [f64; 2],
        end: [f64; 2],
        stops: Vec<GradientStopDef>,
        #[serde(default)]
        extend: ExtendMode,
        #[serde(default)]
        accuracy: RenderGradientAccuracy,
    },
    RadialGradient {
        #[serde(default = "identity_transform")]
        transform: [f64; 6],
        start: [f64; 2],
        start_radius: f64,
        end: [f64; 2],
        end_radius: f64,
        stops: Vec<GradientStopDef>,
        #[serde(default)]
        extend: ExtendMode,
        #[serde(default)]
        accuracy: RenderGradientAccuracy,
    },
    Filter {
        matrix: [f64; 16],
        #[serde(default)]
        translation: [f64; 4],
        child: Box<RenderProgramDef>,
    },
    Phong {
        alpha: f64,
        ambient: Box<RenderProgramDef>,
        diffuse: Box<RenderProgramDef>,
        specular: Box<RenderProgramDef>,
        position: Box<RenderProgramDef>,
        normal: Box<RenderProgramDef>,
        #[serde(default)]
        lights: Vec<LightDef>,
    },
    BlendCompose {
        #[serde(default)]
        compose: ComposeType,
        #[serde(default)]
        blend: BlendType,
        a: Box<RenderProgramDef>,
        b: Box<RenderProgramDef>,
    },
    Stack {
        layers: Vec<RenderProgramDef>,
    },
    PathBoolean {
        path: RenderPath,
        inside: Box<RenderProgramDef>,
        outside: Box<RenderProgramDef>,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStopDef {
    pub ratio: f64,
    pub program: RenderProgramDef,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LightDef {
    pub direction: RenderProgramDef,
    pub color: RenderProgramDef,
}

fn identity_transform() -> [f64; 6] {
    Affine::IDENTITY.as_coeffs()
}

fn point(p: [f64; 2]) -> Point {
    Point::new(p[0], p[1])
}

impl RenderProgramDef {
    pub fn from_json(json: &str) -> GlintResult<Self> {
        serde_json::from_str(json).map_err(|e| GlintError::serde(e.to_string()))
    }

    pub fn to_json(&self) -> GlintResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GlintError::serde(e.to_string()))
    }

    /// Builds the validated program tree.
    pub fn build(&self) -> GlintResult<RenderProgram> {
        use RenderProgramDef as D;
        use RenderProgramKind as K;

        let (kind, children) = match self {
            D::Color { color } => (K::Color(Vec4::from_array(*color)), Vec::new()),
            D::Premultiply { child } => (K::Premultiply, vec![child.build()?]),
            D::Unpremultiply { child } => (K::Unpremultiply, vec![child.build()?]),
            D::ColorSpaceConversion { conversion, child } => {
                (K::ColorSpaceConversion(*conversion), vec![child.build()?])
            }
            D::Alpha { alpha, child } => (K::Alpha { alpha: *alpha }, vec![child.build()?]),
            D::Normalize { child } => (K::Normalize, vec![child.build()?]),
            D::LinearBlend {
                scaled_normal,
                offset,
                accuracy,
                zero,
                one,
            } => (
                K::LinearBlend {
                    scaled_normal: Vec2::new(scaled_normal[0], scaled_normal[1]),
                    offset: *offset,
                    accuracy: *accuracy,
                },
                vec![zero.build()?, one.build()?],
            ),
            D::RadialBlend {
                transform,
                radius0,
                radius1,
                accuracy,
                zero,
                one,
            } => (
                K::RadialBlend {
                    transform: Affine::new(*transform),
                    radius0: *radius0,
                    radius1: *radius1,
                    accuracy: *accuracy,
                },
                vec![zero.build()?, one.build()?],
            ),
            D::BarycentricBlend {
                points,
                depths,
                accuracy,
                a,
                b,
                c,
            } => (
                K::BarycentricBlend {
                    points: points.map(point),
                    depths: *depths,
                    accuracy: *accuracy,
                },
                vec![a.build()?, b.build()?, c.build()?],
            ),
            D::LinearGradient {
                transform,
                start,
                end,
                stops,
                extend,
                accuracy,
            } => {
                let stops = build_stops(stops)?;
                return RenderProgram::linear_gradient(
                    Affine::new(*transform),
                    point(*start),
                    point(*end),
                    stops,
                    *extend,
                    *accuracy,
                );
            }
            D::RadialGradient {
                transform,
                start,
                start_radius,
                end,
                end_radius,
                stops,
                extend,
                accuracy,
            } => {
                let stops = build_stops(stops)?;
                return RenderProgram::radial_gradient(
                    Affine::new(*transform),
                    point(*start),
                    *start_radius,
                    point(*end),
                    *end_radius,
                    stops,
                    *extend,
                    *accuracy,
                );
            }
            D::Filter {
                matrix,
                translation,
                child,
            } => (
                K::Filter {
                    matrix: *matrix,
                    translation: Vec4::from_array(*translation),
                },
                vec![child.build()?],
            ),
            D::Phong {
                alpha,
                ambient,
                diffuse,
                specular,
                position,
                normal,
                lights,
            } => {
                let mut children = vec![
                    ambient.build()?,
                    diffuse.build()?,
                    specular.build()?,
                    position.build()?,
                    normal.build()?,
                ];
                for light in lights {
                    children.push(light.direction.build()?);
                    children.push(light.color.build()?);
                }
                (K::Phong { alpha: *alpha }, children)
            }
            D::BlendCompose {
                compose,
                blend,
                a,
                b,
            } => (
                K::BlendCompose {
                    compose: *compose,
                    blend: *blend,
                },
                vec![a.build()?, b.build()?],
            ),
            D::Stack { layers } => (
                K::Stack,
                layers
                    .iter()
                    .map(RenderProgramDef::build)
                    .collect::<GlintResult<Vec<_>>>()?,
            ),
            D::PathBoolean {
                path,
                inside,
                outside,
            } => (
                K::PathBoolean { path: *path },
                vec![inside.build()?, outside.build()?],
            ),
        };
        RenderProgram::new(kind, children)
    }
}

fn build_stops(stops: &[GradientStopDef]) -> GlintResult<Vec<RenderGradientStop>> {
    stops
        .iter()
        .map(|s| Ok(RenderGradientStop::new(s.ratio, s.program.build()?)))
        .collect()
}

impl RenderProgram {
    /// Parses and builds a [`RenderProgramDef`] JSON document.
    pub fn from_json(json: &str) -> GlintResult<RenderProgram> {
        RenderProgramDef::from_json(json)?.build()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/program/def.rs"]
mod tests;
