use super::*;

#[test]
fn opcodes_are_numbered_by_position() {
    for (i, op) in Opcode::ALL.iter().enumerate() {
        assert_eq!(*op as usize, i);
        assert_eq!(Opcode::from_u8(i as u8), Some(*op));
    }
    assert_eq!(Opcode::from_u8(0x18), None);
    assert_eq!(Opcode::from_u8(0xff), None);
}

#[test]
fn opcode_is_read_from_the_low_byte() {
    assert_eq!(Opcode::from_word(0x0004_0315), Some(Opcode::ComputeLinearGradientRatio));
    assert_eq!(Opcode::from_word(0xffff_ff00), Some(Opcode::Exit));
}

#[test]
fn fixed_lengths() {
    assert_eq!(binary_length(Opcode::Exit as u32).unwrap(), 1);
    assert_eq!(binary_length(Opcode::PushColor as u32).unwrap(), 5);
    assert_eq!(binary_length(Opcode::OpaqueJump as u32).unwrap(), 2);
    assert_eq!(binary_length(Opcode::MultiplyScalar as u32).unwrap(), 2);
    assert_eq!(binary_length(Opcode::Filter as u32).unwrap(), 21);
    assert_eq!(binary_length(Opcode::Phong as u32 | 3 << 8).unwrap(), 2);
    assert_eq!(binary_length(Opcode::BlendCompose as u32 | 0x0203_00).unwrap(), 1);
    assert_eq!(binary_length(Opcode::ComputeLinearBlendRatio as u32).unwrap(), 8);
    assert_eq!(binary_length(Opcode::ComputeRadialBlendRatio as u32).unwrap(), 13);
}

#[test]
fn gradient_length_counts_stops() {
    let linear = Opcode::ComputeLinearGradientRatio as u32 | 3 << 16;
    let radial = Opcode::ComputeRadialGradientRatio as u32 | 2 << 16 | 1 << 12;
    assert_eq!(binary_length(linear).unwrap(), 13 + 6);
    assert_eq!(binary_length(radial).unwrap(), 15 + 4);
}

#[test]
fn barycentric_length_follows_perspective_flag() {
    let op = Opcode::BarycentricBlend as u32 | 3 << 16;
    assert_eq!(binary_length(op).unwrap(), 8);
    assert_eq!(binary_length(op | BARYCENTRIC_PERSPECTIVE_FLAG).unwrap(), 11);
}

#[test]
fn unknown_opcode_is_a_decode_error() {
    assert!(matches!(binary_length(0x42), Err(GlintError::Decode(_))));
}

#[test]
fn names_are_unique() {
    let mut names: Vec<_> = Opcode::ALL.iter().map(|o| o.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), Opcode::ALL.len());
}
