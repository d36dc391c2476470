//! SQLite-backed [`LocalStore`].
//!
//! One table per entity kind, created on first use:
//!
//! | column            | contents                                  |
//! |-------------------|-------------------------------------------|
//! | `id`              | autoincrement, gives insertion order      |
//! | `local_parent_id` | scope                                     |
//! | `stable_key`      | [`StableKey`] text form                   |
//! | `data_json`       | the full entity                           |
//! | `f_*`             | one column per indexed field              |
//!
//! `(local_parent_id, stable_key)` is unique, which makes upsert a single
//! `INSERT .. ON CONFLICT DO UPDATE`.

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};
use crate::local_store::LocalStore;
use crate::open_sqlite;
use mirrorkit_model::{EntityKind, EntitySchema, FieldType, IndexedField, MirrorEntity, SortOrder};
use mirrorkit_types::{ScopeId, StableKey};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Local mirror of remote collections, persisted in SQLite.
///
/// A single connection sits behind a mutex, so a replace-all transaction and
/// a reader on another thread never interleave: the reader sees either the
/// old or the new generation of a scope.
pub struct MirrorStore {
    inner: Mutex<Inner>,
}

struct Inner {
    conn: Connection,
    tables: HashSet<EntityKind>,
}

impl MirrorStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open_with_config(&StorageConfig::at(path.as_ref()))
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open_with_config(&StorageConfig::in_memory())
    }

    pub fn open_with_config(config: &StorageConfig) -> StorageResult<Self> {
        let conn = open_sqlite(config)?;
        debug!(path = ?config.path, "mirror store opened");
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                tables: HashSet::new(),
            }),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Locks the store and makes sure the table for `E` exists.
    fn prepared<E: MirrorEntity>(&self) -> StorageResult<(MutexGuard<'_, Inner>, EntitySchema)> {
        let schema = E::schema();
        let mut inner = self.lock()?;
        inner.ensure_table(&schema)?;
        Ok((inner, schema))
    }
}

impl Inner {
    fn ensure_table(&mut self, schema: &EntitySchema) -> StorageResult<()> {
        if self.tables.contains(&schema.kind) {
            return Ok(());
        }
        let table = schema.kind.table_name();
        let columns: String = schema
            .indexed_fields
            .iter()
            .map(|f| format!("{} {},\n", f.column, f.field_type.sql_type()))
            .collect();
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                local_parent_id INTEGER NOT NULL,
                stable_key TEXT NOT NULL,
                data_json TEXT NOT NULL,
                {columns}
                UNIQUE(local_parent_id, stable_key)
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_scope ON {table}(local_parent_id, id);
            "
        ))?;
        self.add_missing_columns(schema)?;
        self.tables.insert(schema.kind);
        Ok(())
    }

    /// Brings a table created by an older schema up to date, backfilling new
    /// columns from the stored JSON.
    fn add_missing_columns(&self, schema: &EntitySchema) -> StorageResult<()> {
        let table = schema.kind.table_name();
        let existing: HashSet<String> = {
            let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(1))?
                .collect::<Result<_, _>>()?;
            names
        };
        for field in schema.indexed_fields.iter().filter(|f| !existing.contains(&f.column)) {
            self.conn.execute_batch(&format!(
                "ALTER TABLE {table} ADD COLUMN {} {}",
                field.column,
                field.field_type.sql_type()
            ))?;
            let backfilled = self.conn.execute(
                &format!("UPDATE {table} SET {} = json_extract(data_json, ?1)", field.column),
                params![json_path(&field.field_path)],
            )?;
            debug!(table, column = %field.column, backfilled, "added indexed column");
        }
        Ok(())
    }
}

/// "/a/b" -> "$.a.b"
fn json_path(pointer: &str) -> String {
    let mut path = String::from("$");
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        path.push('.');
        path.push_str(segment);
    }
    path
}

fn column_value(field: &IndexedField, data: &serde_json::Value) -> Value {
    let Some(v) = field.extract(data) else {
        return Value::Null;
    };
    match field.field_type {
        FieldType::Text => Value::Text(v.as_str().map_or_else(|| v.to_string(), str::to_owned)),
        FieldType::Integer => v
            .as_i64()
            .or_else(|| v.as_bool().map(i64::from))
            .map_or(Value::Null, Value::Integer),
        FieldType::Real => v.as_f64().map_or(Value::Null, Value::Real),
        FieldType::Bool => v
            .as_bool()
            .map(i64::from)
            .or_else(|| v.as_i64())
            .map_or(Value::Null, Value::Integer),
    }
}

fn upsert_row<E: MirrorEntity>(
    conn: &Connection,
    schema: &EntitySchema,
    scope: ScopeId,
    entity: &E,
) -> StorageResult<usize> {
    let entity = entity.clone().in_scope(scope);
    let data = serde_json::to_value(&entity)?;
    let key = entity.stable_key();

    let mut columns = vec!["local_parent_id", "stable_key", "data_json"];
    columns.extend(schema.indexed_fields.iter().map(|f| f.column.as_str()));
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = columns[2..]
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(local_parent_id, stable_key) DO UPDATE SET {}",
        schema.kind.table_name(),
        columns.join(", "),
        placeholders.join(", "),
        updates.join(", "),
    );

    let mut values = vec![
        Value::Integer(scope.get()),
        Value::Text(key.to_string()),
        Value::Text(data.to_string()),
    ];
    values.extend(schema.indexed_fields.iter().map(|f| column_value(f, &data)));

    let rows = conn.prepare_cached(&sql)?.execute(params_from_iter(values))?;
    Ok(rows)
}

fn read_rows<E: MirrorEntity>(conn: &Connection, sql: &str, scope: ScopeId) -> StorageResult<Vec<E>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params![scope.get()], |row| row.get::<_, String>(0))?;
    let mut entities = Vec::new();
    for json in rows {
        entities.push(serde_json::from_str(&json?)?);
    }
    Ok(entities)
}

fn count_rows(conn: &Connection, table: &str, scope: ScopeId) -> StorageResult<usize> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE local_parent_id = ?1"),
        params![scope.get()],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

fn replace_in_tx<E: MirrorEntity>(
    tx: &Transaction<'_>,
    schema: &EntitySchema,
    scope: ScopeId,
    entities: &[E],
) -> StorageResult<(usize, usize)> {
    let table = schema.kind.table_name();
    let removed = tx.execute(
        &format!("DELETE FROM {table} WHERE local_parent_id = ?1"),
        params![scope.get()],
    )?;
    for entity in entities {
        upsert_row(tx, schema, scope, entity)?;
    }
    let stored = count_rows(tx, table, scope)?;
    Ok((removed, stored))
}

impl LocalStore for MirrorStore {
    fn upsert_one<E: MirrorEntity>(&self, scope: ScopeId, entity: Option<&E>) -> StorageResult<usize> {
        let Some(entity) = entity else {
            return Ok(0);
        };
        let (inner, schema) = self.prepared::<E>()?;
        upsert_row(&inner.conn, &schema, scope, entity)
    }

    fn read_all_for_scope<E: MirrorEntity>(&self, scope: ScopeId) -> StorageResult<Vec<E>> {
        let (inner, schema) = self.prepared::<E>()?;
        let sql = format!(
            "SELECT data_json FROM {} WHERE local_parent_id = ?1 ORDER BY id ASC",
            schema.kind.table_name()
        );
        read_rows(&inner.conn, &sql, scope)
    }

    fn read_all_for_scope_ordered<E: MirrorEntity>(
        &self,
        scope: ScopeId,
        order: &SortOrder,
    ) -> StorageResult<Vec<E>> {
        let (inner, schema) = self.prepared::<E>()?;
        let field = schema.field(&order.field_path).ok_or_else(|| {
            StorageError::InvalidOrdering(format!("{} does not index {}", schema.kind, order.field_path))
        })?;
        let collate = if field.field_type == FieldType::Text {
            " COLLATE NOCASE"
        } else {
            ""
        };
        let direction = if order.descending { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT data_json FROM {} WHERE local_parent_id = ?1 ORDER BY {}{collate} {direction}, id ASC",
            schema.kind.table_name(),
            field.column,
        );
        read_rows(&inner.conn, &sql, scope)
    }

    fn replace_all_for_scope<E: MirrorEntity>(&self, scope: ScopeId, entities: &[E]) -> StorageResult<usize> {
        let (mut inner, schema) = self.prepared::<E>()?;
        let tx = inner.conn.transaction()?;
        match replace_in_tx(&tx, &schema, scope, entities) {
            Ok((removed, stored)) => {
                tx.commit()?;
                debug!(kind = %schema.kind, %scope, removed, stored, "scope replaced");
                Ok(stored)
            }
            Err(e) => {
                // Dropping the transaction rolls it back.
                drop(tx);
                warn!(kind = %schema.kind, %scope, error = %e, "replace-all rolled back");
                Err(e)
            }
        }
    }

    fn delete_all_for_scope<E: MirrorEntity>(&self, scope: ScopeId) -> StorageResult<usize> {
        let (inner, schema) = self.prepared::<E>()?;
        let removed = inner.conn.execute(
            &format!("DELETE FROM {} WHERE local_parent_id = ?1", schema.kind.table_name()),
            params![scope.get()],
        )?;
        debug!(kind = %schema.kind, %scope, removed, "scope cleared");
        Ok(removed)
    }

    fn get_by_key<E: MirrorEntity>(&self, scope: ScopeId, key: &StableKey) -> StorageResult<Option<E>> {
        let (inner, schema) = self.prepared::<E>()?;
        let json: Option<String> = inner
            .conn
            .query_row(
                &format!(
                    "SELECT data_json FROM {} WHERE local_parent_id = ?1 AND stable_key = ?2",
                    schema.kind.table_name()
                ),
                params![scope.get(), key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| serde_json::from_str(&j)).transpose().map_err(Into::into)
    }

    fn delete_one<E: MirrorEntity>(&self, scope: ScopeId, key: &StableKey) -> StorageResult<usize> {
        let (inner, schema) = self.prepared::<E>()?;
        let removed = inner.conn.execute(
            &format!(
                "DELETE FROM {} WHERE local_parent_id = ?1 AND stable_key = ?2",
                schema.kind.table_name()
            ),
            params![scope.get(), key.as_str()],
        )?;
        Ok(removed)
    }

    fn count_for_scope<E: MirrorEntity>(&self, scope: ScopeId) -> StorageResult<usize> {
        let (inner, schema) = self.prepared::<E>()?;
        count_rows(&inner.conn, schema.kind.table_name(), scope)
    }
}
