use super::*;

#[test]
fn normalized_zero_vector_stays_zero() {
    assert_eq!(Vec4::ZERO.normalized(), Vec4::ZERO);
    let n = Vec4::new(3.0, 0.0, 4.0, 0.0).normalized();
    assert!(n.approx_eq(Vec4::new(0.6, 0.0, 0.8, 0.0), 1e-12));
}

#[test]
fn lerp_hits_endpoints_and_midpoint() {
    let a = Vec4::new(0.0, 0.0, 0.0, 1.0);
    let b = Vec4::new(1.0, 0.5, 0.25, 1.0);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert!(
        a.lerp(b, 0.5)
            .approx_eq(Vec4::new(0.5, 0.25, 0.125, 1.0), 1e-12)
    );
}

#[test]
fn f32_conversion_is_exact_for_representable_values() {
    let v = Vec4::new(0.125, 0.25, 0.5, 1.0);
    assert_eq!(Vec4::from_f32(v.to_f32()), v);
}

#[test]
fn invertibility_check_rejects_degenerate_transforms() {
    assert!(ensure_invertible(Affine::IDENTITY, "t").is_ok());
    assert!(ensure_invertible(Affine::scale_non_uniform(1.0, 0.0), "t").is_err());
    assert!(ensure_invertible(Affine::translate((f64::NAN, 0.0)), "t").is_err());
    assert!(ensure_finite(f64::INFINITY, "x").is_err());
}
