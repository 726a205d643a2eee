//! Position-to-parameter math shared by the tree evaluator and both stack machines.
//!
//! Every function here has a defined value for degenerate input (zero-length gradient vectors,
//! equal radii, collinear triangles) so no interpreter ever propagates NaN from these.

use crate::foundation::core::{Affine, Point, Vec2, Vec4};

pub(crate) fn linear_blend_ratio(scaled_normal: Vec2, offset: f64, p: Point) -> f64 {
    (scaled_normal.dot(p.to_vec2()) - offset).clamp(0.0, 1.0)
}

pub(crate) fn radial_blend_ratio(inverse_transform: Affine, radius0: f64, radius1: f64, p: Point) -> f64 {
    let span = radius1 - radius0;
    if span == 0.0 {
        return 0.0;
    }
    let d = (inverse_transform * p).to_vec2().hypot();
    ((d - radius0) / span).clamp(0.0, 1.0)
}

/// Unextended parameter of `p` projected onto `start + delta * t`.
pub(crate) fn linear_gradient_ratio(
    inverse_transform: Affine,
    start: Point,
    delta: Vec2,
    p: Point,
) -> f64 {
    let len2 = delta.hypot2();
    if len2 == 0.0 {
        return 0.0;
    }
    ((inverse_transform * p) - start).dot(delta) / len2
}

/// Two-point conical gradient parameter: the largest `t` whose circle
/// `(start + (end - start) t, r0 + (r1 - r0) t)` passes through `p` with a non-negative radius.
/// `None` means no circle covers `p`, which renders as transparent.
pub(crate) fn radial_gradient_ratio(
    inverse_transform: Affine,
    start: Point,
    start_radius: f64,
    end: Point,
    end_radius: f64,
    p: Point,
) -> Option<f64> {
    const EPS: f64 = 1e-12;
    let local = inverse_transform * p;
    let cd = end - start;
    let pd = local - start;
    let dr = end_radius - start_radius;

    let a = cd.hypot2() - dr * dr;
    let b = pd.dot(cd) + start_radius * dr;
    let c = pd.hypot2() - start_radius * start_radius;
    let radius_ok = |t: f64| start_radius + t * dr >= 0.0;

    if a.abs() < EPS {
        if b.abs() < EPS {
            return None;
        }
        let t = c / (2.0 * b);
        return radius_ok(t).then_some(t);
    }

    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t1 = (b + sq) / a;
    let t2 = (b - sq) / a;
    let (hi, lo) = if t1 >= t2 { (t1, t2) } else { (t2, t1) };
    if radius_ok(hi) {
        Some(hi)
    } else if radius_ok(lo) {
        Some(lo)
    } else {
        None
    }
}

/// True when one circle strictly contains the other, so every point gets a ratio.
pub(crate) fn radial_gradient_covers_plane(
    start: Point,
    start_radius: f64,
    end: Point,
    end_radius: f64,
) -> bool {
    (end_radius - start_radius).abs() - (end - start).hypot() > 1e-9
}

/// `1 / det` of the triangle, or 0 for a degenerate triangle.
pub(crate) fn barycentric_inverse_determinant(points: [Point; 3]) -> f64 {
    let [a, b, c] = points;
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if det.abs() <= f64::EPSILON * 16.0 {
        0.0
    } else {
        1.0 / det
    }
}

/// Weights of the three corner programs; a degenerate triangle puts all weight on the first.
pub(crate) fn barycentric_weights(
    points: [Point; 3],
    inverse_determinant: f64,
    depths: Option<[f64; 3]>,
    p: Point,
) -> [f64; 3] {
    if inverse_determinant == 0.0 {
        return [1.0, 0.0, 0.0];
    }
    let [a, b, c] = points;
    let la = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) * inverse_determinant;
    let lb = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) * inverse_determinant;
    let lc = 1.0 - la - lb;
    let linear = [la, lb, lc];

    let Some(z) = depths else {
        return linear;
    };
    if z.iter().any(|&d| d == 0.0) {
        return linear;
    }
    let w = [la / z[0], lb / z[1], lc / z[2]];
    let sum = w[0] + w[1] + w[2];
    if sum == 0.0 {
        linear
    } else {
        [w[0] / sum, w[1] / sum, w[2] / sum]
    }
}

/// Ambient plus per-light diffuse/specular terms, clamped to `[0, 1]`.
///
/// Directions and normals live in `xyz`; the result keeps the ambient alpha.
pub(crate) fn phong(
    alpha: f64,
    ambient: Vec4,
    diffuse: Vec4,
    specular: Vec4,
    position: Vec4,
    normal: Vec4,
    lights: impl IntoIterator<Item = (Vec4, Vec4)>,
) -> Vec4 {
    let view = (-position).with_w(0.0).normalized();
    let view = if view == Vec4::ZERO {
        Vec4::new(0.0, 0.0, 1.0, 0.0)
    } else {
        view
    };
    let normal = normal.with_w(0.0);

    let mut result = ambient;
    for (direction, color) in lights {
        let direction = direction.with_w(0.0);
        let dot_nl = normal.dot3(direction);
        if dot_nl <= 0.0 {
            continue;
        }
        let reflected = normal * (2.0 * dot_nl) - direction;
        let spec = reflected.dot3(view).max(0.0).powf(alpha);
        let contribution = color.component_mul(diffuse * dot_nl + specular * spec);
        result += contribution.with_w(0.0);
    }
    result.clamped(0.0, 1.0)
}

/// Row-major 4x4 color matrix plus translation.
pub(crate) fn filter(matrix: &[f64; 16], translation: Vec4, color: Vec4) -> Vec4 {
    let c = color.to_array();
    let row = |i: usize| -> f64 { (0..4).map(|j| matrix[i * 4 + j] * c[j]).sum::<f64>() };
    Vec4::new(row(0), row(1), row(2), row(3)) + translation
}

#[cfg(test)]
#[path = "../../tests/unit/program/ratio.rs"]
mod tests;
