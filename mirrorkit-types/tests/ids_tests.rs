use mirrorkit_types::{RequestId, ScopeId, StableKey};
use proptest::prelude::*;
use std::collections::HashSet;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::{Builder, Uuid};

// ── ScopeId ───────────────────────────────────────────────────────

#[test]
fn scope_id_roundtrip() {
    let scope = ScopeId::new(7);
    assert_eq!(scope.get(), 7);
    assert_eq!(ScopeId::from(7), scope);
    assert_eq!(scope.to_string(), "7");
}

#[test]
fn scope_id_from_str() {
    assert_eq!(ScopeId::from_str(" 12 ").unwrap(), ScopeId::new(12));
    assert!(ScopeId::from_str("site-12").is_err());
}

#[test]
fn scope_id_serde_is_transparent() {
    let json = serde_json::to_string(&ScopeId::new(3)).unwrap();
    assert_eq!(json, "3");
    let back: ScopeId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ScopeId::new(3));
}

// ── RequestId ─────────────────────────────────────────────────────

#[test]
fn request_id_new_is_unique() {
    let ids: HashSet<RequestId> = (0..100).map(|_| RequestId::new()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn request_id_display_and_parse() {
    let id = RequestId::new();
    let parsed = RequestId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
    let via_from_str: RequestId = id.to_string().parse().unwrap();
    assert_eq!(id, via_from_str);
}

#[test]
fn request_id_parse_invalid() {
    assert!(RequestId::parse("not-a-uuid").is_err());
}

#[test]
fn request_ids_order_by_issue_time() {
    let earlier = RequestId::from_uuid(Builder::from_unix_timestamp_millis(1_000, &[0xff; 10]).into_uuid());
    let later = RequestId::from_uuid(Builder::from_unix_timestamp_millis(2_000, &[0x00; 10]).into_uuid());
    assert!(earlier < later);
    assert_eq!(earlier.issued_at_ms(), Some(1_000));
    assert_eq!(later.issued_at_ms(), Some(2_000));
}

#[test]
fn request_ids_sort_into_creation_order() {
    let mut created = Vec::new();
    for _ in 0..5 {
        created.push(RequestId::new());
        std::thread::sleep(Duration::from_millis(2));
    }
    let mut sorted = created.clone();
    sorted.reverse();
    sorted.sort();
    assert_eq!(sorted, created);
}

#[test]
fn new_request_id_is_stamped_with_now() {
    let now_ms = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_millis() as u64;
    let id = RequestId::new();
    let issued = id.issued_at_ms().unwrap();
    assert!(issued.abs_diff(now_ms) < 5_000, "issued {issued}, now {now_ms}");
    assert!(id.age().unwrap() < Duration::from_secs(5));
}

#[test]
fn request_id_without_timestamp_has_no_age() {
    let id = RequestId::from_uuid(Uuid::new_v4());
    assert_eq!(id.issued_at_ms(), None);
    assert_eq!(id.age(), None);
}

// ── StableKey ─────────────────────────────────────────────────────

#[test]
fn stable_key_sources_never_collide() {
    assert_ne!(StableKey::remote(5), StableKey::slug("5"));
    assert_ne!(StableKey::slug("akismet"), StableKey::name("akismet"));
}

#[test]
fn stable_key_remote_id() {
    assert_eq!(StableKey::remote(42).remote_id(), Some(42));
    assert_eq!(StableKey::slug("hello").remote_id(), None);
}

#[test]
fn stable_key_parse_valid() {
    assert_eq!("remote:9".parse::<StableKey>().unwrap(), StableKey::remote(9));
    assert_eq!("slug:jetpack".parse::<StableKey>().unwrap(), StableKey::slug("jetpack"));
    assert_eq!("name:Hello Dolly".parse::<StableKey>().unwrap(), StableKey::name("Hello Dolly"));
}

#[test]
fn stable_key_parse_invalid() {
    assert!("remote:abc".parse::<StableKey>().is_err());
    assert!("remote:".parse::<StableKey>().is_err());
    assert!("jetpack".parse::<StableKey>().is_err());
}

#[test]
fn stable_key_with_empty_text_roundtrips() {
    for key in [StableKey::name(""), StableKey::slug("")] {
        let json = serde_json::to_string(&key).unwrap();
        let back: StableKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert_eq!(key.as_str().parse::<StableKey>().unwrap(), key);
    }
    assert_ne!(StableKey::name(""), StableKey::slug(""));
}

#[test]
fn stable_key_serde_rejects_unprefixed() {
    let ok: StableKey = serde_json::from_str(r#""remote:1""#).unwrap();
    assert_eq!(ok, StableKey::remote(1));
    assert!(serde_json::from_str::<StableKey>(r#""1""#).is_err());
}

proptest! {
    #[test]
    fn stable_key_text_roundtrips(id in any::<i64>(), slug in "[a-z0-9-]{1,40}") {
        let remote = StableKey::remote(id);
        prop_assert_eq!(remote.as_str().parse::<StableKey>().unwrap(), remote.clone());
        prop_assert_eq!(remote.remote_id(), Some(id));

        let by_slug = StableKey::slug(&slug);
        prop_assert_eq!(by_slug.to_string().parse::<StableKey>().unwrap(), by_slug);
    }
}
