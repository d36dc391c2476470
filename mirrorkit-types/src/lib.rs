//! Core type definitions for mirrorkit.
//!
//! This crate defines the small, kind-agnostic value types every other
//! mirrorkit crate depends on:
//! - [`ScopeId`]: the local id of the parent an entity belongs to (a site, a product)
//! - [`StableKey`]: the identity of an entity across reconciliation passes
//! - [`RequestId`]: correlates a request action with its result (UUID v7)
//!
//! Concrete entity kinds live in `mirrorkit-model`.

mod ids;

pub use ids::{RequestId, ScopeId, StableKey};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing identifier types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid scope id: {0}")]
    InvalidScope(String),

    #[error("invalid stable key: {0}")]
    InvalidStableKey(String),
}
