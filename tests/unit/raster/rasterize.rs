use super::*;
use crate::config::CompileOptions;
use crate::foundation::core::{Point, Vec4};
use crate::program::{RenderGradientAccuracy, RenderProgram};

fn horizontal_ramp(width: f64) -> ExecutableProgram {
    let p = RenderProgram::linear_blend_between(
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        RenderGradientAccuracy::UnsplitPixelCenter,
        RenderProgram::color(Vec4::new(0.0, 0.0, 0.0, 1.0)),
        RenderProgram::color(Vec4::new(1.0, 1.0, 1.0, 1.0)),
    )
    .unwrap();
    ExecutableProgram::compile(&p, &CompileOptions::default()).unwrap()
}

#[test]
fn solid_color_fills_every_pixel() {
    let p = RenderProgram::color(Vec4::new(0.0, 0.5, 0.0, 0.5));
    let exe = ExecutableProgram::compile(&p, &CompileOptions::default()).unwrap();
    let frame = rasterize(&exe, 4, 3, &EvaluateThreading::default()).unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px == [0, 128, 0, 128]));
}

#[test]
fn ramp_samples_pixel_centers() {
    let frame = rasterize(&horizontal_ramp(4.0), 4, 1, &EvaluateThreading::default()).unwrap();
    let reds: Vec<u8> = (0..4).map(|x| frame.pixel(x, 0).unwrap()[0]).collect();
    // Centers at 0.5, 1.5, 2.5, 3.5 of a 4 px ramp.
    assert_eq!(reds, vec![32, 96, 159, 223]);
}

#[test]
fn parallel_rows_match_sequential() {
    let exe = horizontal_ramp(16.0);
    let sequential = rasterize(&exe, 16, 9, &EvaluateThreading::default()).unwrap();
    let threading = EvaluateThreading {
        parallel: true,
        threads: Some(2),
        ..Default::default()
    };
    assert_eq!(rasterize(&exe, 16, 9, &threading).unwrap(), sequential);
}

#[test]
fn empty_frame() {
    let frame = rasterize(&horizontal_ramp(1.0), 0, 5, &EvaluateThreading::default()).unwrap();
    assert!(frame.data.is_empty());
}
