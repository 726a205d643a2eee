//! The RenderProgram expression tree: construction, flags, simplification, rewriting and direct
//! evaluation.

pub(crate) mod def;
pub(crate) mod evaluate;
pub(crate) mod gradient;
pub(crate) mod node;
pub(crate) mod path;
pub(crate) mod ratio;
pub(crate) mod replace;
pub(crate) mod simplify;

pub use def::{GradientStopDef, LightDef, RenderProgramDef};
pub use gradient::{
    ExtendMode, RenderGradientAccuracy, RenderGradientStop, StopSelection, select_stops,
};
pub use node::{ProgramFlags, RenderProgram, RenderProgramKind};
pub use path::{FillRule, RenderPath};
