//! Identifier types used throughout mirrorkit.
//!
//! Request ids use UUID v7 so they sort by issue time in logs.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Local id of the parent that owns a group of mirrored entities.
///
/// Assigned by the local store when the parent itself (a site, a product) was
/// created. Scope-wide operations never look past this id. The default (`0`)
/// marks an entity that has not been placed in a scope yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(i64);

impl ScopeId {
    /// Wraps a raw local id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw local id.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ScopeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScopeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| Error::InvalidScope(format!("{s:?}: {e}")))
    }
}

/// Correlates a request action with the result action that answers it.
///
/// Ids order by the time they were issued, so sorting answered requests
/// restores the order they were made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request id with the current timestamp.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a request id from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parses a request id from a string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        s.parse()
    }

    /// Unix time in milliseconds at which the id was issued. `None` for
    /// UUIDs that carry no timestamp.
    pub fn issued_at_ms(&self) -> Option<u64> {
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        Some(secs * 1_000 + u64::from(nanos) / 1_000_000)
    }

    /// How long ago the id was issued.
    pub fn age(&self) -> Option<Duration> {
        let issued = UNIX_EPOCH + Duration::from_millis(self.issued_at_ms()?);
        Some(SystemTime::now().duration_since(issued).unwrap_or_default())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identity of an entity within its scope across reconciliation passes.
///
/// Two entities with the same scope and the same stable key are the same
/// entity and are merged by the store. The textual form carries the source
/// of the key (`remote:42`, `slug:akismet`, `name:Akismet`) so keys drawn from
/// different fields can never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StableKey(String);

impl StableKey {
    const REMOTE: &'static str = "remote:";
    const SLUG: &'static str = "slug:";
    const NAME: &'static str = "name:";

    /// Key drawn from the id the remote system assigned.
    #[must_use]
    pub fn remote(id: i64) -> Self {
        Self(format!("{}{id}", Self::REMOTE))
    }

    /// Key drawn from a slug.
    #[must_use]
    pub fn slug(slug: &str) -> Self {
        Self(format!("{}{slug}", Self::SLUG))
    }

    /// Key drawn from a display name, for entities with neither id nor slug.
    #[must_use]
    pub fn name(name: &str) -> Self {
        Self(format!("{}{name}", Self::NAME))
    }

    /// Returns the remote id if this key was drawn from one.
    pub fn remote_id(&self) -> Option<i64> {
        self.0.strip_prefix(Self::REMOTE).and_then(|s| s.parse().ok())
    }

    /// Returns the stored textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StableKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix(Self::REMOTE) {
            let id: i64 = id
                .parse()
                .map_err(|e| Error::InvalidStableKey(format!("{s:?}: {e}")))?;
            return Ok(Self::remote(id));
        }
        // Text keys may be empty.
        if s.starts_with(Self::SLUG) || s.starts_with(Self::NAME) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidStableKey(s.to_string()))
        }
    }
}

impl TryFrom<String> for StableKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StableKey> for String {
    fn from(key: StableKey) -> Self {
        key.0
    }
}
