//! Local store for mirrorkit.
//!
//! Persists mirrored entity collections in SQLite, partitioned by scope.
//!
//! # Architecture
//!
//! - [`LocalStore`] is the contract the reconciler and facades program against
//! - [`MirrorStore`] implements it with one table per entity kind, the full
//!   entity kept as JSON and indexed fields extracted into columns
//! - Replace-all runs in a single transaction and is rolled back on failure

mod config;
mod error;
mod local_store;
mod sqlite_store;

pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};
pub use local_store::LocalStore;
pub use sqlite_store::MirrorStore;

use rusqlite::Connection;
use std::time::Duration;
use tracing::warn;

/// Open a SQLite connection configured for the mirror.
///
/// Creates missing parent directories for file databases and enables
/// write-ahead logging when asked to. In-memory databases ignore `wal`.
pub fn open_sqlite(config: &StorageConfig) -> StorageResult<Connection> {
    let conn = match &config.path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        }
        None => Connection::open_in_memory()?,
    };
    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    if config.wal && config.path.is_some() {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        if !mode.eq_ignore_ascii_case("wal") {
            warn!(mode = %mode, "write-ahead logging unavailable, using fallback journal");
        }
    }
    Ok(conn)
}
