use super::*;
use crate::context::{EdgedFace, LinearEdge};
use crate::foundation::core::Rect;
use crate::instructions::{RenderInstruction, to_binary};
use crate::program::RenderProgram;

fn pixel() -> GpuEvaluationContext {
    let mut edges = Vec::new();
    GpuEvaluationContext::from_context(&RenderEvaluationContext::full_pixel(0, 0), &mut edges)
}

fn words_of(program: &RenderProgram) -> Vec<u32> {
    to_binary(&program.write_instructions().unwrap()).unwrap()
}

#[test]
fn constant_color() {
    let words = words_of(&RenderProgram::color(Vec4::new(0.1, 0.2, 0.3, 0.4)));
    assert_eq!(
        execute_invocation(&words, 0, &pixel(), &[]),
        [0.1, 0.2, 0.3, 0.4]
    );
}

#[test]
fn reads_past_the_buffer_decode_as_exit() {
    // A lone push with no exit: the zero word after it is an exit with one value.
    let words = [Opcode::PushColor as u32, 0, 0, 0, 1.0f32.to_bits()];
    assert_eq!(execute_invocation(&words[..], 0, &pixel(), &[]), [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn faults_produce_the_error_color() {
    let ctx = pixel();
    // Unknown opcode.
    assert_eq!(execute_invocation(&[0x7f, 0][..], 0, &ctx, &[]), ERROR_COLOR);
    // Exit with an empty stack.
    assert_eq!(execute_invocation(&[0u32][..], 0, &ctx, &[]), ERROR_COLOR);
    // Underflow.
    assert_eq!(
        execute_invocation(&[Opcode::StackBlend as u32, 0][..], 0, &ctx, &[]),
        ERROR_COLOR
    );
    // Return without a call.
    assert_eq!(
        execute_invocation(&[Opcode::Return as u32][..], 0, &ctx, &[]),
        ERROR_COLOR
    );
}

#[test]
fn stack_overflow_is_a_fault() {
    let mut instructions = vec![RenderInstruction::PushColor([0.0; 4]); GPU_STACK_SIZE + 1];
    instructions.push(RenderInstruction::Exit);
    let words = to_binary(&instructions).unwrap();
    assert_eq!(execute_invocation(&words, 0, &pixel(), &[]), ERROR_COLOR);
}

#[test]
fn self_jump_hits_the_iteration_cap() {
    // Opaque jump with a zero offset never advances.
    let words = [
        Opcode::PushColor as u32,
        0,
        0,
        0,
        1.0f32.to_bits(),
        Opcode::OpaqueJump as u32,
        0,
    ];
    assert_eq!(execute_invocation(&words[..], 0, &pixel(), &[]), ERROR_COLOR);
}

#[test]
fn unpremultiplied_output_flag() {
    let words = words_of(&RenderProgram::color(Vec4::new(0.25, 0.0, 0.0, 0.5)));
    let ctx = GpuEvaluationContext {
        premultiplied_output: 0,
        ..pixel()
    };
    assert_eq!(execute_invocation(&words, 0, &ctx, &[]), [0.5, 0.0, 0.0, 0.5]);
}

#[test]
fn context_packing() {
    let face = EdgedFace::new(
        vec![LinearEdge::new(
            crate::foundation::core::Point::new(2.0, 3.0),
            crate::foundation::core::Point::new(3.0, 4.0),
        )],
        Rect::new(2.0, 3.0, 3.0, 4.0),
        0,
        1,
        1,
        0,
    )
    .unwrap();
    let ctx = RenderEvaluationContext::from_face(face).unwrap();
    let mut edges = vec![9.0; 4];
    let gpu = GpuEvaluationContext::from_context(&ctx, &mut edges);
    assert_eq!(gpu.edges_offset, 1);
    assert_eq!(gpu.num_edges, 1);
    assert_eq!(&edges[4..], &[2.0, 3.0, 3.0, 4.0]);
    assert_eq!(gpu.counts, [0, 1, 1, 0]);
    assert_eq!(gpu.bounds, [2.0, 3.0, 3.0, 4.0]);
    assert_eq!(gpu.has_centroid, 1);
    assert_eq!(gpu.premultiplied_output, 1);
    assert_eq!(gpu.with_program_offset(12).program_offset, 12);
}

#[test]
fn centroid_is_integrated_from_the_face_when_missing() {
    // Lower-right triangle of the unit pixel: diagonal plus the bottom and right sides.
    let face = EdgedFace::new(
        vec![LinearEdge::new(
            crate::foundation::core::Point::new(1.0, 1.0),
            crate::foundation::core::Point::new(0.0, 0.0),
        )],
        Rect::new(0.0, 0.0, 1.0, 1.0),
        0,
        1,
        1,
        0,
    )
    .unwrap();
    let expected = face.centroid().unwrap();
    let host = RenderEvaluationContext::from_face(face).unwrap();
    let mut edges = Vec::new();
    let gpu = GpuEvaluationContext {
        has_centroid: 0,
        ..GpuEvaluationContext::from_context(&host, &mut edges)
    };

    // A blend from x = 0 to x = 1 sampled at the centroid reads back the centroid's x.
    let p = RenderProgram::linear_blend_between(
        crate::foundation::core::Point::new(0.0, 0.0),
        crate::foundation::core::Point::new(1.0, 0.0),
        RenderGradientAccuracy::UnsplitCentroid,
        RenderProgram::color(Vec4::ZERO),
        RenderProgram::color(Vec4::ONE),
    )
    .unwrap();
    let out = execute_invocation(&words_of(&p), 0, &gpu, &edges);
    assert!((f64::from(out[0]) - expected.x).abs() < 1e-5);
}

#[test]
fn programs_run_at_an_offset() {
    let mut buffer = vec![0xffff_ffffu32; 5];
    let words = words_of(&RenderProgram::color(Vec4::new(0.0, 1.0, 0.0, 1.0)));
    buffer.extend(words);
    assert_eq!(execute_invocation(&buffer, 5, &pixel(), &[]), [0.0, 1.0, 0.0, 1.0]);
}
