use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GlintError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(GlintError::compile("x").to_string().contains("compile error:"));
    assert!(GlintError::encode("x").to_string().contains("encode error:"));
    assert!(GlintError::decode("x").to_string().contains("decode error:"));
    assert!(
        GlintError::execution("x")
            .to_string()
            .contains("execution error:")
    );
    assert!(GlintError::limits("x").to_string().contains("limits error:"));
    assert!(
        GlintError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GlintError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
