use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Vec4;
use crate::foundation::error::{GlintError, GlintResult};

/// Premultiplied RGBA8 pixels in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32) -> GlintResult<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| GlintError::validation("raster frame dimensions overflow"))?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy for encoders that expect unassociated alpha.
    pub fn to_rgba_image(&self) -> GlintResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| GlintError::validation("raster frame data does not match its size"))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> GlintResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), width = self.width, height = self.height, "wrote png");
        Ok(())
    }
}

/// Clamps a premultiplied color to `[0, 1]` and quantizes it.
pub(crate) fn quantize(color: Vec4) -> [u8; 4] {
    color
        .clamped(0.0, 1.0)
        .to_array()
        .map(|c| (c * 255.0).round() as u8)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/frame.rs"]
mod tests;
