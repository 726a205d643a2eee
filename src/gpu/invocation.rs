//! Rust model of one invocation of `render_program.wgsl`.
//!
//! Everything here mirrors the shader: fixed-size stacks, dwords read straight from the buffer
//! (out-of-range reads yield 0, which decodes as `Exit`), no error values. Any fault (stack
//! overflow or underflow, unknown opcode, bad final stack, iteration cap) produces
//! [`ERROR_COLOR`].

use smallvec::SmallVec;

use crate::color::{ColorSpaceConversion, blend_compose, premultiply, stack_blend, unpremultiply};
use crate::color::{BlendType, ComposeType};
use crate::context::RenderEvaluationContext;
use crate::foundation::core::{Affine, Point, Vec2, Vec4};
use crate::foundation::math::{affine_from_f32, is_opaque_alpha};
use crate::instructions::instruction::opcode_conversion;
use crate::instructions::opcode::{BARYCENTRIC_PERSPECTIVE_FLAG, Opcode};
use crate::program::ratio;
use crate::program::{ExtendMode, RenderGradientAccuracy, StopSelection, select_stops};

pub const GPU_STACK_SIZE: usize = 16;
pub const GPU_RETURN_STACK_SIZE: usize = 16;
pub const GPU_MAX_ITERATIONS: u32 = 100_000;
/// Output of an invocation that faulted.
pub const ERROR_COLOR: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

// Leaves room for the longest instruction so operand addresses never wrap.
const MAX_ADDRESS: u32 = u32::MAX - (1 << 18);

/// Read access to the instruction storage buffer.
pub trait InstructionWords {
    /// The dword at `index`, or 0 past the end.
    fn word(&self, index: u32) -> u32;

    fn float(&self, index: u32) -> f32 {
        f32::from_bits(self.word(index))
    }
}

impl InstructionWords for [u32] {
    fn word(&self, index: u32) -> u32 {
        self.get(index as usize).copied().unwrap_or(0)
    }
}

impl InstructionWords for Vec<u32> {
    fn word(&self, index: u32) -> u32 {
        self.as_slice().word(index)
    }
}

/// Per-invocation context exactly as laid out in the shader's storage buffer (64 bytes).
///
/// Edges live in a separate buffer as `(x0, y0, x1, y1)` quadruples; `edges_offset` and
/// `num_edges` count edges, not floats. Counts are ordered `min_x, min_y, max_x, max_y`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GpuEvaluationContext {
    pub bounds: [f32; 4],
    pub centroid: [f32; 2],
    pub area: f32,
    pub has_centroid: u32,
    pub counts: [i32; 4],
    pub edges_offset: u32,
    pub num_edges: u32,
    pub premultiplied_output: u32,
    /// Used by the shader entry point to find this invocation's program.
    pub program_offset: u32,
}

impl GpuEvaluationContext {
    /// Packs a host context, appending its face edges to `edges`.
    pub fn from_context(ctx: &RenderEvaluationContext, edges: &mut Vec<f32>) -> Self {
        let b = ctx.bounds;
        let edges_offset = (edges.len() / 4) as u32;
        let (counts, num_edges) = match &ctx.face {
            Some(face) => {
                for e in &face.edges {
                    edges.extend(
                        [e.start.x, e.start.y, e.end.x, e.end.y].map(|v| v as f32),
                    );
                }
                (
                    [
                        face.min_x_count,
                        face.min_y_count,
                        face.max_x_count,
                        face.max_y_count,
                    ],
                    face.edges.len() as u32,
                )
            }
            None => ([1; 4], 0),
        };
        let centroid = ctx.centroid.unwrap_or(Point::ORIGIN);
        Self {
            bounds: [b.x0, b.y0, b.x1, b.y1].map(|v| v as f32),
            centroid: [centroid.x as f32, centroid.y as f32],
            area: ctx.area as f32,
            has_centroid: u32::from(ctx.centroid.is_some()),
            counts,
            edges_offset,
            num_edges,
            premultiplied_output: u32::from(ctx.premultiplied_output),
            program_offset: 0,
        }
    }

    pub fn with_program_offset(mut self, offset: u32) -> Self {
        self.program_offset = offset;
        self
    }

    fn center(&self) -> [f32; 2] {
        let b = self.bounds;
        [0.5 * (b[0] + b[2]), 0.5 * (b[1] + b[3])]
    }
}

/// Runs the program at dword `offset` for one sample.
pub fn execute_invocation<W: InstructionWords + ?Sized>(
    words: &W,
    offset: u32,
    ctx: &GpuEvaluationContext,
    edges: &[f32],
) -> [f32; 4] {
    let mut invocation = Invocation {
        words,
        ctx,
        edges,
        stack: [[0.0; 4]; GPU_STACK_SIZE],
        sp: 0,
        returns: [0; GPU_RETURN_STACK_SIZE],
        rp: 0,
        centroid: None,
    };
    invocation.run(offset).unwrap_or(ERROR_COLOR)
}

struct Invocation<'a, W: ?Sized> {
    words: &'a W,
    ctx: &'a GpuEvaluationContext,
    edges: &'a [f32],
    stack: [[f32; 4]; GPU_STACK_SIZE],
    sp: usize,
    returns: [u32; GPU_RETURN_STACK_SIZE],
    rp: usize,
    centroid: Option<[f32; 2]>,
}

impl<W: InstructionWords + ?Sized> Invocation<'_, W> {
    fn push(&mut self, v: [f32; 4]) -> Option<()> {
        let slot = self.stack.get_mut(self.sp)?;
        *slot = v;
        self.sp += 1;
        Some(())
    }

    fn pop(&mut self) -> Option<[f32; 4]> {
        self.sp = self.sp.checked_sub(1)?;
        Some(self.stack[self.sp])
    }

    fn push_vec(&mut self, v: Vec4) -> Option<()> {
        self.push(v.to_f32())
    }

    fn pop_vec(&mut self) -> Option<Vec4> {
        self.pop().map(Vec4::from_f32)
    }

    fn push_return(&mut self, address: u32) -> Option<()> {
        let slot = self.returns.get_mut(self.rp)?;
        *slot = address;
        self.rp += 1;
        Some(())
    }

    fn pop_return(&mut self) -> Option<u32> {
        self.rp = self.rp.checked_sub(1)?;
        Some(self.returns[self.rp])
    }

    fn unary(&mut self, f: impl FnOnce(Vec4) -> Vec4) -> Option<()> {
        let v = self.pop_vec()?;
        self.push_vec(f(v))
    }

    /// Absolute address of the relative jump stored at `ip + slot`.
    fn target(&self, ip: u32, slot: u32) -> u32 {
        ip.wrapping_add(self.words.word(ip + slot))
    }

    fn vec2(&self, index: u32) -> Vec2 {
        Vec2::new(
            f64::from(self.words.float(index)),
            f64::from(self.words.float(index + 1)),
        )
    }

    fn point(&self, index: u32) -> Point {
        self.vec2(index).to_point()
    }

    fn affine(&self, index: u32) -> Affine {
        affine_from_f32(std::array::from_fn(|i| self.words.float(index + i as u32)))
    }

    fn sample_point(&mut self, accuracy: u32) -> Option<Point> {
        let accuracy = RenderGradientAccuracy::from_u8(u8::try_from(accuracy).ok()?)?;
        let [x, y] = if accuracy.reads_centroid() {
            self.centroid()?
        } else {
            self.ctx.center()
        };
        Some(Point::new(f64::from(x), f64::from(y)))
    }

    /// The supplied centroid, or one integrated from the face edges and bound counts.
    fn centroid(&mut self) -> Option<[f32; 2]> {
        if let Some(c) = self.centroid {
            return Some(c);
        }
        let c = if self.ctx.has_centroid != 0 {
            self.ctx.centroid
        } else {
            self.face_centroid()?
        };
        self.centroid = Some(c);
        Some(c)
    }

    fn face_centroid(&self) -> Option<[f32; 2]> {
        if self.ctx.num_edges > GPU_MAX_ITERATIONS {
            return None;
        }
        let [x0, y0, x1, y1] = self.ctx.bounds;
        let [min_x, min_y, max_x, max_y] = self.ctx.counts.map(|c| c as f32);
        let mut area = 0.0f32;
        let mut cx = 0.0f32;
        let mut cy = 0.0f32;
        let mut add = |e: [f32; 4], weight: f32| {
            let cross = weight * (e[0] * e[3] - e[2] * e[1]);
            area += cross;
            cx += cross * (e[0] + e[2]);
            cy += cross * (e[1] + e[3]);
        };
        for i in 0..self.ctx.num_edges {
            let base = (self.ctx.edges_offset + i) as usize * 4;
            let e = std::array::from_fn(|k| self.edges.get(base + k).copied().unwrap_or(0.0));
            add(e, 1.0);
        }
        add([x0, y0, x1, y0], min_y);
        add([x1, y0, x1, y1], max_x);
        add([x1, y1, x0, y1], max_y);
        add([x0, y1, x0, y0], min_x);

        let area = 0.5 * area;
        if area.abs() <= f32::EPSILON {
            return Some(self.ctx.center());
        }
        let k = 1.0 / (6.0 * area);
        Some([cx * k, cy * k])
    }

    fn run(&mut self, offset: u32) -> Option<[f32; 4]> {
        let mut ip = offset;
        for _ in 0..GPU_MAX_ITERATIONS {
            if ip >= MAX_ADDRESS {
                return None;
            }
            let header = self.words.word(ip);
            let opcode = Opcode::from_word(header)?;
            match opcode {
                Opcode::Exit => {
                    if self.sp != 1 || self.rp != 0 {
                        return None;
                    }
                    let v = self.stack[0];
                    return Some(if self.ctx.premultiplied_output != 0 {
                        v
                    } else {
                        unpremultiply(Vec4::from_f32(v)).to_f32()
                    });
                }
                Opcode::Return => {
                    ip = self.pop_return()?;
                    continue;
                }
                Opcode::PushColor => {
                    let c = std::array::from_fn(|i| self.words.float(ip + 1 + i as u32));
                    self.push(c)?;
                }
                Opcode::OpaqueJump => {
                    let top = self.stack[self.sp.checked_sub(1)?];
                    if is_opaque_alpha(f64::from(top[3])) {
                        ip = self.target(ip, 1);
                        continue;
                    }
                }
                Opcode::StackBlend => {
                    let background = self.pop_vec()?;
                    let foreground = self.pop_vec()?;
                    self.push_vec(stack_blend(foreground, background))?;
                }
                Opcode::Blend => {
                    let one = self.pop_vec()?;
                    let zero = self.pop_vec()?;
                    let t = self.pop_vec()?.x;
                    self.push_vec(zero.lerp(one, t))?;
                }
                Opcode::BlendCompose => {
                    let compose = ComposeType::from_u8((header >> 8) as u8)?;
                    let blend = BlendType::from_u8((header >> 16) as u8)?;
                    let b = self.pop_vec()?;
                    let a = self.pop_vec()?;
                    self.push_vec(blend_compose(a, b, compose, blend))?;
                }
                Opcode::Premultiply => self.unary(premultiply)?,
                Opcode::Unpremultiply => self.unary(unpremultiply)?,
                Opcode::SrgbToLinearSrgb
                | Opcode::LinearSrgbToSrgb
                | Opcode::LinearSrgbToOklab
                | Opcode::OklabToLinearSrgb
                | Opcode::LinearDisplayP3ToLinearSrgb
                | Opcode::LinearSrgbToLinearDisplayP3 => {
                    let conversion: ColorSpaceConversion = opcode_conversion(opcode)?;
                    self.unary(|v| conversion.apply(v))?;
                }
                Opcode::MultiplyScalar => {
                    let s = f64::from(self.words.float(ip + 1));
                    self.unary(|v| v * s)?;
                }
                Opcode::Normalize => self.unary(Vec4::normalized)?,
                Opcode::Filter => {
                    let matrix: [f64; 16] =
                        std::array::from_fn(|i| f64::from(self.words.float(ip + 1 + i as u32)));
                    let translation = Vec4::from_f32(std::array::from_fn(|i| {
                        self.words.float(ip + 17 + i as u32)
                    }));
                    self.unary(|v| ratio::filter(&matrix, translation, v))?;
                }
                Opcode::Phong => self.phong(header, ip)?,
                Opcode::ComputeLinearBlendRatio | Opcode::ComputeRadialBlendRatio => {
                    ip = self.blend_ratio(opcode, header, ip)?;
                    continue;
                }
                Opcode::ComputeLinearGradientRatio | Opcode::ComputeRadialGradientRatio => {
                    ip = self.gradient_ratio(opcode, header, ip)?;
                    continue;
                }
                Opcode::BarycentricBlend => self.barycentric(header, ip)?,
            }
            ip += crate::instructions::opcode::binary_length(header).ok()?;
        }
        None
    }

    fn phong(&mut self, header: u32, ip: u32) -> Option<()> {
        let count = 5 + 2 * (header >> 8) as usize;
        let base = self.sp.checked_sub(count)?;
        let inputs: SmallVec<[Vec4; 16]> = self.stack[base..self.sp]
            .iter()
            .map(|v| Vec4::from_f32(*v))
            .collect();
        self.sp = base;
        let lights = inputs[5..].chunks_exact(2).map(|pair| (pair[0], pair[1]));
        let lit = ratio::phong(
            f64::from(self.words.float(ip + 1)),
            inputs[0],
            inputs[1],
            inputs[2],
            inputs[3],
            inputs[4],
            lights,
        );
        self.push_vec(lit)
    }

    /// Returns the next instruction pointer.
    fn blend_ratio(&mut self, opcode: Opcode, header: u32, ip: u32) -> Option<u32> {
        let p = self.sample_point((header >> 8) & 0xff)?;
        let (t, locations) = if opcode == Opcode::ComputeLinearBlendRatio {
            let t = ratio::linear_blend_ratio(
                self.vec2(ip + 1),
                f64::from(self.words.float(ip + 3)),
                p,
            );
            (t, 4)
        } else {
            let t = ratio::radial_blend_ratio(
                self.affine(ip + 1),
                f64::from(self.words.float(ip + 7)),
                f64::from(self.words.float(ip + 8)),
                p,
            );
            (t, 9)
        };
        let [zero, one, blend, end] = [0, 1, 2, 3].map(|i| self.target(ip, locations + i));

        if t <= 0.0 {
            self.push_return(end)?;
            Some(zero)
        } else if t >= 1.0 {
            self.push_return(end)?;
            Some(one)
        } else {
            self.push_vec(Vec4::splat(t))?;
            self.push_return(blend)?;
            self.push_return(one)?;
            Some(zero)
        }
    }

    fn gradient_ratio(&mut self, opcode: Opcode, header: u32, ip: u32) -> Option<u32> {
        let p = self.sample_point((header >> 8) & 0xf)?;
        let extend = ExtendMode::from_u8(((header >> 12) & 0xf) as u8)?;
        let n = header >> 16;
        let linear = opcode == Opcode::ComputeLinearGradientRatio;
        let base = if linear { 13 } else { 15 };
        let blend = self.target(ip, base - 2);
        let end = self.target(ip, base - 1);

        let t = if linear {
            Some(ratio::linear_gradient_ratio(
                self.affine(ip + 1),
                self.point(ip + 7),
                self.vec2(ip + 9),
                p,
            ))
        } else {
            ratio::radial_gradient_ratio(
                self.affine(ip + 1),
                self.point(ip + 7),
                f64::from(self.words.float(ip + 9)),
                self.point(ip + 10),
                f64::from(self.words.float(ip + 12)),
                p,
            )
        };
        let Some(t) = t else {
            self.push(Vec4::ZERO.to_f32())?;
            return Some(end);
        };

        let words = self.words;
        let ratios: SmallVec<[f32; 8]> = (0..n).map(|i| words.float(ip + base + i)).collect();
        let stop = |i: usize| ip.wrapping_add(words.word(ip + base + n + i as u32));
        match select_stops(&ratios, extend.apply(t)) {
            StopSelection::Single(i) => {
                self.push_return(end)?;
                Some(stop(i))
            }
            StopSelection::Between { index, local_ratio } => {
                self.push_vec(Vec4::splat(local_ratio))?;
                self.push_return(blend)?;
                self.push_return(stop(index + 1))?;
                Some(stop(index))
            }
        }
    }

    fn barycentric(&mut self, header: u32, ip: u32) -> Option<()> {
        let c = self.pop_vec()?;
        let b = self.pop_vec()?;
        let a = self.pop_vec()?;
        let p = self.sample_point((header >> 16) & 0xff)?;
        let points = [self.point(ip + 2), self.point(ip + 4), self.point(ip + 6)];
        let depths = (header & BARYCENTRIC_PERSPECTIVE_FLAG != 0)
            .then(|| std::array::from_fn(|i| f64::from(self.words.float(ip + 8 + i as u32))));
        let w = ratio::barycentric_weights(points, f64::from(self.words.float(ip + 1)), depths, p);
        self.push_vec(a * w[0] + b * w[1] + c * w[2])
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gpu/invocation.rs"]
mod tests;
