use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SegmenterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SegmenterError::not_ready("x")
            .to_string()
            .contains("not ready:")
    );
    assert!(
        SegmenterError::empty_mask("x")
            .to_string()
            .contains("empty mask:")
    );
    assert!(
        SegmenterError::service("x")
            .to_string()
            .contains("service error:")
    );
    assert!(
        SegmenterError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SegmenterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let e = serde_json::from_str::<u32>("nope").unwrap_err();
    assert!(matches!(SegmenterError::from(e), SegmenterError::Serde(_)));
}
