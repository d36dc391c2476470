use mirrorkit_model::{
    MirrorEntity, Product, ProductCategory, ProductReview, ProductShippingClass, ProductVariation, SitePlugin,
};
use mirrorkit_types::{ScopeId, StableKey};
use pretty_assertions::assert_eq;
use serde_json::json;

// ── Stable keys ──────────────────────────────────────────────────

#[test]
fn plugin_key_prefers_slug() {
    let plugin = SitePlugin::new("Akismet").with_slug("akismet");
    assert_eq!(plugin.stable_key(), StableKey::slug("akismet"));
}

#[test]
fn plugin_key_falls_back_to_name() {
    assert_eq!(SitePlugin::new("Hello").stable_key(), StableKey::name("Hello"));
    let empty_slug = SitePlugin::new("Hello").with_slug("");
    assert_eq!(empty_slug.stable_key(), StableKey::name("Hello"));
}

#[test]
fn remote_id_keys() {
    assert_eq!(Product::new(11, "Mug").stable_key(), StableKey::remote(11));
    assert_eq!(ProductReview::new(5, 11).stable_key(), StableKey::remote(5));
    assert_eq!(ProductCategory::new(3, "Kitchen").stable_key(), StableKey::remote(3));
    assert_eq!(ProductVariation::new(11, 40).stable_key(), StableKey::remote(40));
    assert_eq!(ProductShippingClass::new(8, "Heavy").stable_key(), StableKey::remote(8));
}

#[test]
fn nameless_plugin_key_survives_serde() {
    let key = SitePlugin::new("").stable_key();
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(serde_json::from_str::<StableKey>(&json).unwrap(), key);
}

// ── Scope ────────────────────────────────────────────────────────

#[test]
fn in_scope_sets_parent() {
    let product = Product::new(1, "Mug").in_scope(ScopeId::new(7));
    assert_eq!(product.local_parent_id(), ScopeId::new(7));
    assert_eq!(product.local_site_id, ScopeId::new(7));
}

#[test]
fn variations_are_scoped_by_product() {
    let product_scope = ScopeId::new(31);
    let variation = ProductVariation::new(11, 40).in_scope(product_scope);
    assert_eq!(variation.local_parent_id(), product_scope);
    assert_eq!(variation.local_product_id, product_scope);
    assert_eq!(variation.remote_product_id, 11);
}

#[test]
fn default_scope_is_zero() {
    assert_eq!(SitePlugin::new("x").local_parent_id(), ScopeId::new(0));
}

// ── Reviews ──────────────────────────────────────────────────────

#[test]
fn spam_and_trash_detection() {
    let mut review = ProductReview::new(1, 2);
    assert!(!review.is_spam_or_trash());
    review.status = "spam".into();
    assert!(review.is_spam_or_trash());
    review.status = "TRASH".into();
    assert!(review.is_spam_or_trash());
    review.status = "hold".into();
    assert!(!review.is_spam_or_trash());
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn partial_payload_fills_defaults() {
    let product: Product =
        serde_json::from_value(json!({"remote_product_id": 9, "name": "Cap", "price": "5.00"})).unwrap();
    assert_eq!(product.remote_product_id, 9);
    assert_eq!(product.price, "5.00");
    assert_eq!(product.sku, "");
    assert_eq!(product.local_site_id, ScopeId::new(0));
}

#[test]
fn plugin_json_roundtrip() {
    let plugin = SitePlugin {
        display_name: "Jetpack".into(),
        version: Some("13.1".into()),
        is_active: true,
        ..SitePlugin::new("jetpack/jetpack").with_slug("jetpack")
    }
    .in_scope(ScopeId::new(2));
    let value = serde_json::to_value(&plugin).unwrap();
    assert_eq!(value["local_site_id"], json!(2));
    let back: SitePlugin = serde_json::from_value(value).unwrap();
    assert_eq!(back, plugin);
}
