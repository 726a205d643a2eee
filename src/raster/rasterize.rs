use rayon::prelude::*;

use crate::config::{EvaluateThreading, build_thread_pool};
use crate::context::RenderEvaluationContext;
use crate::foundation::error::GlintResult;
use crate::raster::frame::{RasterFrame, quantize};
use crate::vm::{ExecutableProgram, RenderExecutor};

/// Evaluates `program` once per pixel, with each pixel a fully covered unit square.
#[tracing::instrument(skip(program, threading))]
pub fn rasterize(
    program: &ExecutableProgram,
    width: u32,
    height: u32,
    threading: &EvaluateThreading,
) -> GlintResult<RasterFrame> {
    let mut frame = RasterFrame::new(width, height)?;
    if frame.data.is_empty() {
        return Ok(frame);
    }
    let executor = RenderExecutor::default();
    let row_bytes = width as usize * 4;

    let fill_row = |(y, row): (usize, &mut [u8])| -> GlintResult<()> {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let ctx = RenderEvaluationContext::full_pixel(x as i32, y as i32);
            px.copy_from_slice(&quantize(executor.execute(program, &ctx)?));
        }
        Ok(())
    };

    if threading.parallel {
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| {
            frame
                .data
                .par_chunks_mut(row_bytes)
                .enumerate()
                .try_for_each(fill_row)
        })?;
    } else {
        frame
            .data
            .chunks_mut(row_bytes)
            .enumerate()
            .try_for_each(fill_row)?;
    }
    tracing::debug!(width, height, "rasterized program");
    Ok(frame)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rasterize.rs"]
mod tests;
