//! Pixel-grid evaluation of a program into RGBA8 frames.

pub(crate) mod frame;
pub(crate) mod rasterize;

pub use frame::RasterFrame;
pub use rasterize::rasterize;
