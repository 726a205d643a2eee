use super::*;

#[test]
fn premultiply_scales_rgb_by_alpha() {
    let c = premultiply(Vec4::new(0.25, 0.5, 1.0, 0.5));
    assert_eq!(c, Vec4::new(0.125, 0.25, 0.5, 0.5));
}

#[test]
fn unpremultiply_of_zero_alpha_is_zero_not_nan() {
    assert_eq!(unpremultiply(Vec4::ZERO), Vec4::ZERO);
    assert_eq!(unpremultiply(Vec4::new(0.3, 0.2, 0.1, 0.0)), Vec4::ZERO);
}

#[test]
fn every_conversion_round_trips_through_its_inverse() {
    let c = Vec4::new(0.2, 0.45, 0.8, 0.7);
    for conv in ColorSpaceConversion::ALL {
        let back = conv.inverse().apply(conv.apply(c));
        assert!(back.approx_eq(c, 1e-6), "{conv:?}: {back:?}");
        assert_eq!(conv.apply(c).w, c.w);
    }
}

#[test]
fn oklab_of_white_has_unit_lightness_and_no_chroma() {
    let lab = linear_srgb_to_oklab(Vec4::new(1.0, 1.0, 1.0, 1.0));
    assert!((lab.x - 1.0).abs() < 1e-4);
    assert!(lab.y.abs() < 1e-4);
    assert!(lab.z.abs() < 1e-4);
}

#[test]
fn srgb_transfer_is_odd_symmetric() {
    let c = srgb_to_linear_srgb(Vec4::new(-0.5, 0.5, 0.0, 1.0));
    assert!((c.x + c.y).abs() < 1e-12);
    assert_eq!(c.z, 0.0);
}

#[test]
fn transparent_black_is_a_fixed_point_of_every_conversion() {
    for conv in ColorSpaceConversion::ALL {
        assert!(conv.apply(Vec4::ZERO).approx_eq(Vec4::ZERO, 1e-12));
    }
}
