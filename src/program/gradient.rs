use crate::foundation::core::ensure_finite;
use crate::foundation::error::{GlintError, GlintResult};
use crate::program::RenderProgram;

/// Where a position-dependent program samples its context.
///
/// The `Split*` variants additionally ask the geometry engine to split faces along blend and
/// stop boundaries; evaluation itself samples exactly like the matching unsplit variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum RenderGradientAccuracy {
    SplitAccurate = 0,
    SplitCentroid = 1,
    SplitPixelCenter = 2,
    UnsplitCentroid = 3,
    #[default]
    UnsplitPixelCenter = 4,
}

impl RenderGradientAccuracy {
    pub const ALL: [Self; 5] = [
        Self::SplitAccurate,
        Self::SplitCentroid,
        Self::SplitPixelCenter,
        Self::UnsplitCentroid,
        Self::UnsplitPixelCenter,
    ];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(usize::from(v)).copied()
    }

    pub fn reads_centroid(self) -> bool {
        matches!(
            self,
            Self::SplitAccurate | Self::SplitCentroid | Self::UnsplitCentroid
        )
    }

    pub fn needs_face(self) -> bool {
        matches!(
            self,
            Self::SplitAccurate | Self::SplitCentroid | Self::SplitPixelCenter
        )
    }
}

/// How gradient ratios outside `[0, 1]` are folded back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ExtendMode {
    #[default]
    Pad = 0,
    Reflect = 1,
    Repeat = 2,
}

impl ExtendMode {
    pub const ALL: [Self; 3] = [Self::Pad, Self::Reflect, Self::Repeat];

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(usize::from(v)).copied()
    }

    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Pad => t.clamp(0.0, 1.0),
            Self::Repeat => t - t.floor(),
            Self::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderGradientStop {
    pub ratio: f64,
    pub program: RenderProgram,
}

impl RenderGradientStop {
    pub fn new(ratio: f64, program: RenderProgram) -> Self {
        Self { ratio, program }
    }
}

pub(crate) fn validate_ratios(ratios: &[f64]) -> GlintResult<()> {
    if ratios.is_empty() {
        return Err(GlintError::validation("gradient needs at least one stop"));
    }
    if ratios.len() > usize::from(u16::MAX) {
        return Err(GlintError::validation("gradient has too many stops"));
    }
    for &r in ratios {
        ensure_finite(r, "gradient stop ratio")?;
    }
    if ratios.windows(2).any(|w| w[1] < w[0]) {
        return Err(GlintError::validation(
            "gradient stop ratios must be sorted in non-decreasing order",
        ));
    }
    Ok(())
}

/// Which stop program(s) a gradient ratio lands on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StopSelection {
    Single(usize),
    /// Interpolate stop `index` towards stop `index + 1` by `local_ratio`.
    Between { index: usize, local_ratio: f64 },
}

/// Linear scan over a sorted ratio table.
pub fn select_stops<R: Copy + Into<f64>>(ratios: &[R], t: f64) -> StopSelection {
    let n = ratios.len();
    let r = |i: usize| -> f64 { ratios[i].into() };
    if n <= 1 || t <= r(0) {
        return StopSelection::Single(0);
    }
    if t >= r(n - 1) {
        return StopSelection::Single(n - 1);
    }
    for i in 0..n - 1 {
        if t < r(i + 1) {
            let span = r(i + 1) - r(i);
            let local_ratio = if span > 0.0 { (t - r(i)) / span } else { 0.0 };
            return StopSelection::Between {
                index: i,
                local_ratio,
            };
        }
    }
    StopSelection::Single(n - 1)
}

#[cfg(test)]
#[path = "../../tests/unit/program/gradient.rs"]
mod tests;
