use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::color::{BlendType, ColorSpaceConversion, ComposeType};
use crate::foundation::core::{
    Affine, Point, Vec2, Vec4, ensure_finite, ensure_finite_point, ensure_invertible,
};
use crate::foundation::error::{GlintError, GlintResult};
use crate::program::gradient::{
    ExtendMode, RenderGradientAccuracy, RenderGradientStop, validate_ratios,
};
use crate::program::path::RenderPath;
use crate::program::ratio::radial_gradient_covers_plane;

/// Variant and parameters of a program node. Children live on the node itself.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderProgramKind {
    /// Constant premultiplied color.
    Color(Vec4),
    Premultiply,
    Unpremultiply,
    ColorSpaceConversion(ColorSpaceConversion),
    /// Multiplies all four channels of the child.
    Alpha {
        alpha: f64,
    },
    Normalize,
    /// `t = dot(scaled_normal, p) - offset`; children `[zero, one]`.
    LinearBlend {
        scaled_normal: Vec2,
        offset: f64,
        accuracy: RenderGradientAccuracy,
    },
    /// `t` from the distance to the origin of `transform`'s local space; children `[zero, one]`.
    RadialBlend {
        transform: Affine,
        radius0: f64,
        radius1: f64,
        accuracy: RenderGradientAccuracy,
    },
    /// Children `[a, b, c]` weighted by barycentric coordinates of `points`.
    BarycentricBlend {
        points: [Point; 3],
        /// Per-corner depth for perspective-correct weights.
        depths: Option<[f64; 3]>,
        accuracy: RenderGradientAccuracy,
    },
    /// One child per stop ratio.
    LinearGradient {
        transform: Affine,
        start: Point,
        end: Point,
        ratios: Vec<f64>,
        extend: ExtendMode,
        accuracy: RenderGradientAccuracy,
    },
    /// Two-point conical gradient; one child per stop ratio.
    RadialGradient {
        transform: Affine,
        start: Point,
        start_radius: f64,
        end: Point,
        end_radius: f64,
        ratios: Vec<f64>,
        extend: ExtendMode,
        accuracy: RenderGradientAccuracy,
    },
    /// Row-major 4x4 color matrix plus translation.
    Filter {
        matrix: [f64; 16],
        translation: Vec4,
    },
    /// Children: ambient, diffuse, specular, position, normal, then (direction, color) pairs.
    Phong {
        alpha: f64,
    },
    /// Children `[a, b]`: source on top of backdrop.
    BlendCompose {
        compose: ComposeType,
        blend: BlendType,
    },
    /// Children bottom to top.
    Stack,
    /// Children `[inside, outside]`.
    PathBoolean {
        path: RenderPath,
    },
}

impl RenderProgramKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Premultiply => "premultiply",
            Self::Unpremultiply => "unpremultiply",
            Self::ColorSpaceConversion(_) => "color_space_conversion",
            Self::Alpha { .. } => "alpha",
            Self::Normalize => "normalize",
            Self::LinearBlend { .. } => "linear_blend",
            Self::RadialBlend { .. } => "radial_blend",
            Self::BarycentricBlend { .. } => "barycentric_blend",
            Self::LinearGradient { .. } => "linear_gradient",
            Self::RadialGradient { .. } => "radial_gradient",
            Self::Filter { .. } => "filter",
            Self::Phong { .. } => "phong",
            Self::BlendCompose { .. } => "blend_compose",
            Self::Stack => "stack",
            Self::PathBoolean { .. } => "path_boolean",
        }
    }

    /// Sampling accuracy of position-dependent variants.
    pub fn accuracy(&self) -> Option<RenderGradientAccuracy> {
        match self {
            Self::LinearBlend { accuracy, .. }
            | Self::RadialBlend { accuracy, .. }
            | Self::BarycentricBlend { accuracy, .. }
            | Self::LinearGradient { accuracy, .. }
            | Self::RadialGradient { accuracy, .. } => Some(*accuracy),
            _ => None,
        }
    }

    /// True when the value depends on where the sample is taken.
    pub fn is_position_dependent(&self) -> bool {
        self.accuracy().is_some()
    }

    fn validate(&self, children: &[RenderProgram]) -> GlintResult<()> {
        let n = children.len();
        let expect = |want: usize| -> GlintResult<()> {
            if n == want {
                Ok(())
            } else {
                Err(GlintError::validation(format!(
                    "{} expects {want} children, got {n}",
                    self.name()
                )))
            }
        };

        match self {
            Self::Color(c) => {
                if !c.is_finite() {
                    return Err(GlintError::validation("color must be finite"));
                }
                expect(0)
            }
            Self::Premultiply
            | Self::Unpremultiply
            | Self::ColorSpaceConversion(_)
            | Self::Normalize => expect(1),
            Self::Alpha { alpha } => {
                ensure_finite(*alpha, "alpha")?;
                expect(1)
            }
            Self::LinearBlend {
                scaled_normal,
                offset,
                ..
            } => {
                ensure_finite(scaled_normal.x, "linear blend normal")?;
                ensure_finite(scaled_normal.y, "linear blend normal")?;
                ensure_finite(*offset, "linear blend offset")?;
                expect(2)
            }
            Self::RadialBlend {
                transform,
                radius0,
                radius1,
                ..
            } => {
                ensure_invertible(*transform, "radial blend transform")?;
                ensure_finite(*radius0, "radial blend radius")?;
                ensure_finite(*radius1, "radial blend radius")?;
                expect(2)
            }
            Self::BarycentricBlend { points, depths, .. } => {
                for p in points {
                    ensure_finite_point(*p, "barycentric point")?;
                }
                if let Some(z) = depths {
                    for d in z {
                        ensure_finite(*d, "barycentric depth")?;
                        if *d == 0.0 {
                            return Err(GlintError::validation(
                                "barycentric depth must be non-zero",
                            ));
                        }
                    }
                }
                expect(3)
            }
            Self::LinearGradient {
                transform,
                start,
                end,
                ratios,
                ..
            } => {
                ensure_invertible(*transform, "linear gradient transform")?;
                ensure_finite_point(*start, "linear gradient start")?;
                ensure_finite_point(*end, "linear gradient end")?;
                validate_ratios(ratios)?;
                expect(ratios.len())
            }
            Self::RadialGradient {
                transform,
                start,
                start_radius,
                end,
                end_radius,
                ratios,
                ..
            } => {
                ensure_invertible(*transform, "radial gradient transform")?;
                ensure_finite_point(*start, "radial gradient start")?;
                ensure_finite_point(*end, "radial gradient end")?;
                for r in [start_radius, end_radius] {
                    ensure_finite(*r, "radial gradient radius")?;
                    if *r < 0.0 {
                        return Err(GlintError::validation(
                            "radial gradient radius must be >= 0",
                        ));
                    }
                }
                validate_ratios(ratios)?;
                expect(ratios.len())
            }
            Self::Filter {
                matrix,
                translation,
            } => {
                if !matrix.iter().all(|v| v.is_finite()) || !translation.is_finite() {
                    return Err(GlintError::validation("filter matrix must be finite"));
                }
                expect(1)
            }
            Self::Phong { alpha } => {
                ensure_finite(*alpha, "phong alpha")?;
                if n < 5 || (n - 5) % 2 != 0 {
                    return Err(GlintError::validation(format!(
                        "phong expects 5 children plus direction/color pairs, got {n}"
                    )));
                }
                Ok(())
            }
            Self::BlendCompose { .. } | Self::PathBoolean { .. } => expect(2),
            Self::Stack => Ok(()),
        }
    }
}

/// Facts derived bottom-up when a node is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgramFlags {
    pub is_fully_transparent: bool,
    pub is_fully_opaque: bool,
    pub needs_face: bool,
    pub needs_area: bool,
    pub needs_centroid: bool,
    pub is_path_boolean: bool,
}

fn compute_flags(kind: &RenderProgramKind, children: &[RenderProgram]) -> ProgramFlags {
    use RenderProgramKind as K;

    let all_transparent = children.iter().all(|c| c.flags().is_fully_transparent);
    let all_opaque = children.iter().all(|c| c.flags().is_fully_opaque);
    let child = |i: usize| children.get(i).map(|c| c.flags()).unwrap_or_default();

    let (is_fully_transparent, is_fully_opaque) = match kind {
        K::Color(c) => (*c == Vec4::ZERO, c.w == 1.0),
        K::Premultiply | K::Unpremultiply | K::ColorSpaceConversion(_) => {
            (child(0).is_fully_transparent, child(0).is_fully_opaque)
        }
        K::Alpha { alpha } => (
            *alpha == 0.0 || child(0).is_fully_transparent,
            *alpha == 1.0 && child(0).is_fully_opaque,
        ),
        K::Normalize => (child(0).is_fully_transparent, false),
        K::Filter { .. } => (false, false),
        K::LinearBlend { .. }
        | K::RadialBlend { .. }
        | K::BarycentricBlend { .. }
        | K::LinearGradient { .. }
        | K::PathBoolean { .. } => (all_transparent, all_opaque),
        K::RadialGradient {
            start,
            start_radius,
            end,
            end_radius,
            ..
        } => (
            all_transparent,
            all_opaque && radial_gradient_covers_plane(*start, *start_radius, *end, *end_radius),
        ),
        K::Phong { .. } => (false, child(0).is_fully_opaque),
        K::BlendCompose { compose, .. } => compose_flags(*compose, child(0), child(1)),
        K::Stack => (
            all_transparent,
            children.iter().any(|c| c.flags().is_fully_opaque),
        ),
    };

    let accuracy = kind.accuracy();
    let is_path_boolean = matches!(kind, K::PathBoolean { .. });
    let reads_centroid = accuracy.is_some_and(RenderGradientAccuracy::reads_centroid);

    ProgramFlags {
        is_fully_transparent,
        is_fully_opaque,
        needs_face: is_path_boolean
            || accuracy.is_some_and(RenderGradientAccuracy::needs_face)
            || children.iter().any(|c| c.flags().needs_face),
        needs_area: reads_centroid || children.iter().any(|c| c.flags().needs_area),
        needs_centroid: reads_centroid || children.iter().any(|c| c.flags().needs_centroid),
        is_path_boolean,
    }
}

/// Porter-Duff coverage reduction of source `a` over backdrop `b`.
fn compose_flags(compose: ComposeType, a: ProgramFlags, b: ProgramFlags) -> (bool, bool) {
    let (at, ao) = (a.is_fully_transparent, a.is_fully_opaque);
    let (bt, bo) = (b.is_fully_transparent, b.is_fully_opaque);
    match compose {
        ComposeType::Over | ComposeType::PlusLighter => (at && bt, ao || bo),
        ComposeType::In => (at || bt, ao && bo),
        ComposeType::Out => (at || bo, ao && bt),
        ComposeType::Atop => (bt, bo),
        ComposeType::Xor => ((at && bt) || (ao && bo), (ao && bt) || (at && bo)),
        ComposeType::Plus => (at && bt, (ao && bt) || (at && bo)),
    }
}

pub(crate) enum SimplifiedState {
    Itself,
    Replaced(RenderProgram),
}

struct ProgramNode {
    kind: RenderProgramKind,
    children: Vec<RenderProgram>,
    flags: ProgramFlags,
    simplified: OnceLock<SimplifiedState>,
}

/// Immutable, cheaply cloned handle to a program tree.
///
/// Structurally equal programs compare equal; [`RenderProgram::ptr_eq`] checks node identity.
#[derive(Clone)]
pub struct RenderProgram(Arc<ProgramNode>);

impl RenderProgram {
    /// Builds a node after checking child counts and parameters.
    pub fn new(kind: RenderProgramKind, children: Vec<RenderProgram>) -> GlintResult<Self> {
        kind.validate(&children)?;
        Ok(Self::from_parts(kind, children))
    }

    pub(crate) fn from_parts(kind: RenderProgramKind, children: Vec<RenderProgram>) -> Self {
        let flags = compute_flags(&kind, &children);
        Self(Arc::new(ProgramNode {
            kind,
            children,
            flags,
            simplified: OnceLock::new(),
        }))
    }

    /// Unchecked; non-finite colors are rejected when the program is lowered.
    /// `RenderProgram::new(RenderProgramKind::Color(..), vec![])` validates up front.
    pub fn color(color: Vec4) -> Self {
        Self::from_parts(RenderProgramKind::Color(color), Vec::new())
    }

    pub fn transparent() -> Self {
        Self::color(Vec4::ZERO)
    }

    pub fn premultiply(child: RenderProgram) -> Self {
        Self::from_parts(RenderProgramKind::Premultiply, vec![child])
    }

    pub fn unpremultiply(child: RenderProgram) -> Self {
        Self::from_parts(RenderProgramKind::Unpremultiply, vec![child])
    }

    pub fn convert(conversion: ColorSpaceConversion, child: RenderProgram) -> Self {
        Self::from_parts(
            RenderProgramKind::ColorSpaceConversion(conversion),
            vec![child],
        )
    }

    pub fn alpha(alpha: f64, child: RenderProgram) -> GlintResult<Self> {
        Self::new(RenderProgramKind::Alpha { alpha }, vec![child])
    }

    pub fn normalize(child: RenderProgram) -> Self {
        Self::from_parts(RenderProgramKind::Normalize, vec![child])
    }

    pub fn linear_blend(
        scaled_normal: Vec2,
        offset: f64,
        accuracy: RenderGradientAccuracy,
        zero: RenderProgram,
        one: RenderProgram,
    ) -> GlintResult<Self> {
        Self::new(
            RenderProgramKind::LinearBlend {
                scaled_normal,
                offset,
                accuracy,
            },
            vec![zero, one],
        )
    }

    /// Linear blend reaching `zero` at `start` and `one` at `end`.
    pub fn linear_blend_between(
        start: Point,
        end: Point,
        accuracy: RenderGradientAccuracy,
        zero: RenderProgram,
        one: RenderProgram,
    ) -> GlintResult<Self> {
        let delta = end - start;
        let len2 = delta.hypot2();
        if len2 <= f64::EPSILON || !len2.is_finite() {
            return Err(GlintError::validation(
                "linear blend needs distinct, finite endpoints",
            ));
        }
        let scaled_normal = delta / len2;
        let offset = scaled_normal.dot(start.to_vec2());
        Self::linear_blend(scaled_normal, offset, accuracy, zero, one)
    }

    pub fn radial_blend(
        transform: Affine,
        radius0: f64,
        radius1: f64,
        accuracy: RenderGradientAccuracy,
        zero: RenderProgram,
        one: RenderProgram,
    ) -> GlintResult<Self> {
        Self::new(
            RenderProgramKind::RadialBlend {
                transform,
                radius0,
                radius1,
                accuracy,
            },
            vec![zero, one],
        )
    }

    pub fn barycentric_blend(
        points: [Point; 3],
        accuracy: RenderGradientAccuracy,
        a: RenderProgram,
        b: RenderProgram,
        c: RenderProgram,
    ) -> GlintResult<Self> {
        Self::new(
            RenderProgramKind::BarycentricBlend {
                points,
                depths: None,
                accuracy,
            },
            vec![a, b, c],
        )
    }

    /// Perspective-correct barycentric blend with per-corner depths.
    pub fn barycentric_perspective_blend(
        points: [Point; 3],
        depths: [f64; 3],
        accuracy: RenderGradientAccuracy,
        a: RenderProgram,
        b: RenderProgram,
        c: RenderProgram,
    ) -> GlintResult<Self> {
        Self::new(
            RenderProgramKind::BarycentricBlend {
                points,
                depths: Some(depths),
                accuracy,
            },
            vec![a, b, c],
        )
    }

    pub fn linear_gradient(
        transform: Affine,
        start: Point,
        end: Point,
        stops: Vec<RenderGradientStop>,
        extend: ExtendMode,
        accuracy: RenderGradientAccuracy,
    ) -> GlintResult<Self> {
        let (ratios, children) = split_stops(stops);
        Self::new(
            RenderProgramKind::LinearGradient {
                transform,
                start,
                end,
                ratios,
                extend,
                accuracy,
            },
            children,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn radial_gradient(
        transform: Affine,
        start: Point,
        start_radius: f64,
        end: Point,
        end_radius: f64,
        stops: Vec<RenderGradientStop>,
        extend: ExtendMode,
        accuracy: RenderGradientAccuracy,
    ) -> GlintResult<Self> {
        let (ratios, children) = split_stops(stops);
        Self::new(
            RenderProgramKind::RadialGradient {
                transform,
                start,
                start_radius,
                end,
                end_radius,
                ratios,
                extend,
                accuracy,
            },
            children,
        )
    }

    pub fn filter(matrix: [f64; 16], translation: Vec4, child: RenderProgram) -> GlintResult<Self> {
        Self::new(
            RenderProgramKind::Filter {
                matrix,
                translation,
            },
            vec![child],
        )
    }

    /// Phong lighting; `lights` are `(direction, color)` pairs.
    pub fn phong(
        alpha: f64,
        ambient: RenderProgram,
        diffuse: RenderProgram,
        specular: RenderProgram,
        position: RenderProgram,
        normal: RenderProgram,
        lights: Vec<(RenderProgram, RenderProgram)>,
    ) -> GlintResult<Self> {
        let mut children = vec![ambient, diffuse, specular, position, normal];
        for (direction, color) in lights {
            children.push(direction);
            children.push(color);
        }
        Self::new(RenderProgramKind::Phong { alpha }, children)
    }

    pub fn blend_compose(
        compose: ComposeType,
        blend: BlendType,
        a: RenderProgram,
        b: RenderProgram,
    ) -> Self {
        Self::from_parts(RenderProgramKind::BlendCompose { compose, blend }, vec![a, b])
    }

    /// Painter's-order stack, `layers[0]` at the bottom.
    pub fn stack(layers: Vec<RenderProgram>) -> Self {
        Self::from_parts(RenderProgramKind::Stack, layers)
    }

    pub fn path_boolean(path: RenderPath, inside: RenderProgram, outside: RenderProgram) -> Self {
        Self::from_parts(RenderProgramKind::PathBoolean { path }, vec![inside, outside])
    }

    pub fn kind(&self) -> &RenderProgramKind {
        &self.0.kind
    }

    pub fn children(&self) -> &[RenderProgram] {
        &self.0.children
    }

    pub fn flags(&self) -> ProgramFlags {
        self.0.flags
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.0.flags.is_fully_transparent
    }

    pub fn is_fully_opaque(&self) -> bool {
        self.0.flags.is_fully_opaque
    }

    pub fn needs_face(&self) -> bool {
        self.0.flags.needs_face
    }

    pub fn needs_area(&self) -> bool {
        self.0.flags.needs_area
    }

    pub fn needs_centroid(&self) -> bool {
        self.0.flags.needs_centroid
    }

    pub fn is_path_boolean(&self) -> bool {
        self.0.flags.is_path_boolean
    }

    /// The constant color of a `Color` node.
    pub fn as_color(&self) -> Option<Vec4> {
        match self.kind() {
            RenderProgramKind::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Node identity, not structural equality.
    pub fn ptr_eq(&self, other: &RenderProgram) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of nodes reachable from this one, counting shared nodes once per reference.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Self::node_count).sum::<usize>()
    }

    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    pub(crate) fn with_children(&self, children: Vec<RenderProgram>) -> Self {
        Self::from_parts(self.0.kind.clone(), children)
    }

    pub(crate) fn simplified_state(&self) -> &OnceLock<SimplifiedState> {
        &self.0.simplified
    }
}

fn split_stops(stops: Vec<RenderGradientStop>) -> (Vec<f64>, Vec<RenderProgram>) {
    stops.into_iter().map(|s| (s.ratio, s.program)).unzip()
}

impl PartialEq for RenderProgram {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.0.kind == other.0.kind && self.0.children == other.0.children)
    }
}

impl fmt::Debug for RenderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.children.is_empty() {
            return fmt::Debug::fmt(&self.0.kind, f);
        }
        f.debug_struct("RenderProgram")
            .field("kind", &self.0.kind)
            .field("children", &self.0.children)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/program/node.rs"]
mod tests;
