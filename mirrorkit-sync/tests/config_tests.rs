use mirrorkit_sync::{MirrorConfig, SyncError};
use pretty_assertions::assert_eq;
use std::time::Duration;

#[test]
fn defaults_are_valid() {
    let config = MirrorConfig::default();
    config.validate().unwrap();
    assert_eq!(config.product_page_size, 25);
    assert_eq!(config.category_page_size, 10);
    assert_eq!(config.variation_page_size, 25);
    assert_eq!(config.shipping_class_page_size, 25);
    assert_eq!(config.shutdown_timeout(), Duration::from_secs(5));
    assert!(config.storage.path.is_none());
}

#[test]
fn partial_json_keeps_other_defaults() {
    let config = MirrorConfig::from_json_str(
        r#"{ "product_page_size": 50, "storage": { "path": "/tmp/mirror.db" } }"#,
    )
    .unwrap();
    assert_eq!(config.product_page_size, 50);
    assert_eq!(config.review_page_size, 25);
    assert_eq!(config.storage.path.as_deref(), Some(std::path::Path::new("/tmp/mirror.db")));
    assert!(config.storage.wal);
}

#[test]
fn zero_page_size_is_rejected() {
    let err = MirrorConfig::from_json_str(r#"{ "review_page_size": 0 }"#).unwrap_err();
    match err {
        SyncError::Config(message) => assert!(message.contains("review_page_size")),
        other => panic!("unexpected error: {other}"),
    }
    let err = MirrorConfig::from_json_str(r#"{ "variation_page_size": 0 }"#).unwrap_err();
    assert!(matches!(err, SyncError::Config(message) if message.contains("variation_page_size")));
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = MirrorConfig::from_json_str("{ product_page_size: ").unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));
}
