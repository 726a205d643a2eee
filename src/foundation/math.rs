use kurbo::{Affine, Point};
use xxhash_rust::xxh3::Xxh3;

/// Alpha values within this distance of 1 count as fully covering for the opaque-jump test.
pub const OPAQUE_EPSILON: f64 = 1e-8;

const XXH3_SEED: u64 = 0x6c69_6e74_9e37_79b9;

pub(crate) fn is_opaque_alpha(alpha: f64) -> bool {
    (alpha - 1.0).abs() <= OPAQUE_EPSILON
}

pub(crate) fn affine_to_f32(a: Affine) -> [f32; 6] {
    a.as_coeffs().map(|c| c as f32)
}

pub(crate) fn affine_from_f32(c: [f32; 6]) -> Affine {
    Affine::new(c.map(f64::from))
}

pub(crate) fn point_to_f32(p: Point) -> [f32; 2] {
    [p.x as f32, p.y as f32]
}

pub(crate) fn point_from_f32(p: [f32; 2]) -> Point {
    Point::new(f64::from(p[0]), f64::from(p[1]))
}

/// Stable 128-bit fingerprint of an encoded instruction stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WordsFingerprint {
    pub hi: u64,
    pub lo: u64,
}

pub(crate) fn fingerprint_words(words: &[u32]) -> WordsFingerprint {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(&(words.len() as u64).to_le_bytes());
    for w in words {
        h.update(&w.to_le_bytes());
    }
    let v = h.digest128();
    WordsFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
