use super::*;

const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
const HALF_BLUE: Vec4 = Vec4::new(0.0, 0.0, 0.5, 0.5);

#[test]
fn normal_over_matches_stack_blend() {
    let a = HALF_BLUE;
    let b = RED;
    assert_eq!(
        blend_compose(a, b, ComposeType::Over, BlendType::Normal),
        stack_blend(a, b)
    );
    assert_eq!(stack_blend(a, b), Vec4::new(0.5, 0.0, 0.5, 1.0));
}

#[test]
fn porter_duff_alpha_follows_the_operator_table() {
    let a = Vec4::new(0.3, 0.3, 0.3, 0.6);
    let b = Vec4::new(0.2, 0.1, 0.0, 0.5);
    let alpha = |c| blend_compose(a, b, c, BlendType::Normal).w;
    assert!((alpha(ComposeType::Over) - (0.6 + 0.5 * 0.4)).abs() < 1e-12);
    assert!((alpha(ComposeType::In) - 0.3).abs() < 1e-12);
    assert!((alpha(ComposeType::Out) - 0.3).abs() < 1e-12);
    assert!((alpha(ComposeType::Atop) - 0.5).abs() < 1e-12);
    assert!((alpha(ComposeType::Xor) - (0.3 + 0.2)).abs() < 1e-12);
    assert!((alpha(ComposeType::Plus) - 1.1).abs() < 1e-12);
    assert!((alpha(ComposeType::PlusLighter) - 1.0).abs() < 1e-12);
}

#[test]
fn multiply_of_opaque_colors_multiplies_channels() {
    let a = Vec4::new(0.5, 1.0, 0.25, 1.0);
    let b = Vec4::new(0.5, 0.5, 1.0, 1.0);
    let c = blend_compose(a, b, ComposeType::Over, BlendType::Multiply);
    assert!(c.approx_eq(Vec4::new(0.25, 0.5, 0.25, 1.0), 1e-12));
}

#[test]
fn blend_over_transparent_backdrop_is_the_source() {
    let a = Vec4::new(0.2, 0.4, 0.1, 0.5);
    for blend in BlendType::ALL {
        let c = blend_compose(a, Vec4::ZERO, ComposeType::Over, blend);
        assert!(c.approx_eq(a, 1e-12), "{blend:?}: {c:?}");
    }
}

#[test]
fn luminosity_keeps_backdrop_hue_for_gray_source() {
    let gray = Vec4::new(0.5, 0.5, 0.5, 1.0);
    let c = blend_compose(gray, RED, ComposeType::Over, BlendType::Luminosity);
    assert!(c.is_finite());
    assert!(c.x > c.y && c.x > c.z);
}

#[test]
fn mode_bytes_decode_back_to_variants() {
    for c in ComposeType::ALL {
        assert_eq!(ComposeType::from_u8(c as u8), Some(c));
    }
    for b in BlendType::ALL {
        assert_eq!(BlendType::from_u8(b as u8), Some(b));
    }
    assert_eq!(ComposeType::from_u8(200), None);
    assert_eq!(BlendType::from_u8(16), None);
}
