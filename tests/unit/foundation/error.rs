use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CardError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        CardError::asset_missing("x")
            .to_string()
            .contains("asset missing:")
    );
    assert!(
        CardError::layer_render("x")
            .to_string()
            .contains("layer render error:")
    );
    assert!(
        CardError::unsupported_layer_type("x")
            .to_string()
            .contains("unsupported layer type:")
    );
    assert!(
        CardError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CardError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_structural_errors_are_fatal() {
    assert!(CardError::configuration("no template").is_fatal());
    assert!(CardError::serde("bad json").is_fatal());
    assert!(!CardError::asset_missing("bg.png").is_fatal());
    assert!(!CardError::layer_render("boom").is_fatal());
    assert!(!CardError::unsupported_layer_type("sticker").is_fatal());
}
