pub(crate) mod blend;
pub(crate) mod space;

pub use blend::{BlendType, ComposeType, blend_compose, stack_blend};
pub use space::{ColorSpaceConversion, premultiply, unpremultiply};
