//! FTS5-based search index using SQLite full-text search
//!
//! Each entity gets one virtual table in the search database. Columns carry
//! the wire names of the entity attributes so that `firstName:Ada` style
//! column filters work as-is, and the whole record is kept as JSON in an
//! unindexed `_source` column.

use super::query::with_default_or;
use super::SearchIndex;
use crate::domain::{Entity, FieldKind, Order, Page, PageRequest};
use anyhow::{anyhow, Context, Result};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

const SOURCE_COLUMN: &str = "_source";

/// Opens the search database shared by every entity index.
pub fn open_search_db(db_path: &Path) -> Result<Arc<Mutex<Connection>>> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open search database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.pragma_update(None, "journal_mode", "WAL")?;

    Ok(Arc::new(Mutex::new(conn)))
}

/// Messages FTS5 uses when it cannot parse a MATCH expression.
const REJECTED_QUERY_MESSAGES: [&str; 3] =
    ["fts5: syntax error", "no such column", "unterminated string"];

/// Whether FTS5 refused the MATCH expression itself (bad syntax, unknown
/// column in a filter). Other failures, a missing table included, are not.
fn is_rejected_query(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(message)) if e.code == ErrorCode::Unknown => {
            REJECTED_QUERY_MESSAGES
                .iter()
                .any(|rejected| message.contains(rejected))
        }
        _ => false,
    }
}

pub struct Fts5SearchIndex<E> {
    conn: Arc<Mutex<Connection>>,
    table: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity<Id = i64>> Fts5SearchIndex<E> {
    /// Creates the entity's virtual table if missing. Documents already in the
    /// table are kept.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        let table = format!("{}_index", E::NAME);
        let columns = std::iter::once(E::ID.name.to_string())
            .chain(E::FIELDS.iter().map(|f| f.name.to_string()))
            .chain(std::iter::once(format!("{} UNINDEXED", SOURCE_COLUMN)))
            .collect::<Vec<_>>()
            .join(", ");
        {
            let guard = conn
                .lock()
                .map_err(|_| anyhow!("search database lock poisoned"))?;
            guard.execute_batch(&format!(
                "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING fts5({});",
                table, columns
            ))?;
        }
        debug!("FTS5 index table {} ready", table);

        Ok(Self {
            conn,
            table,
            _entity: PhantomData,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("search database lock poisoned"))
    }

    fn order_by(sort: &[Order]) -> Result<String> {
        if sort.is_empty() {
            return Ok("rank, rowid ASC".to_string());
        }
        let mut terms = Vec::with_capacity(sort.len() + 1);
        for order in sort {
            let field = E::field(&order.property)
                .ok_or_else(|| anyhow!("unknown sort property '{}'", order.property))?;
            let expr = if field == E::ID {
                "rowid".to_string()
            } else if field.kind == FieldKind::Integer {
                format!("CAST({} AS INTEGER)", field.name)
            } else {
                field.name.to_string()
            };
            terms.push(format!("{} {}", expr, order.direction.as_sql()));
        }
        terms.push("rowid ASC".to_string());
        Ok(terms.join(", "))
    }

    fn decode(source: &str) -> Result<E> {
        serde_json::from_str(source).context("Corrupt search document")
    }
}

impl<E: Entity<Id = i64>> SearchIndex<E> for Fts5SearchIndex<E> {
    fn save(&self, record: &E) -> Result<()> {
        let id = record
            .id()
            .ok_or_else(|| anyhow!("cannot index a {} without id", E::NAME))?;
        let source = serde_json::to_string(record)?;

        let mut values = vec![Value::Integer(id), Value::Text(id.to_string())];
        values.extend(record.field_values().iter().map(|v| match v.to_index_text() {
            Some(text) => Value::Text(text),
            None => Value::Null,
        }));
        values.push(Value::Text(source));

        let placeholders = (1..=values.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let columns = std::iter::once("rowid")
            .chain(std::iter::once(E::ID.name))
            .chain(E::FIELDS.iter().map(|f| f.name))
            .chain(std::iter::once(SOURCE_COLUMN))
            .collect::<Vec<_>>()
            .join(", ");

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!("DELETE FROM {} WHERE rowid = ?1", self.table),
            params![id],
        )?;
        tx.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.table, columns, placeholders
            ),
            params_from_iter(values),
        )?;
        tx.commit()?;
        Ok(())
    }

    fn find_by_id(&self, id: &i64) -> Result<Option<E>> {
        let conn = self.lock()?;
        let source: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE rowid = ?1",
                    SOURCE_COLUMN, self.table
                ),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        source.as_deref().map(Self::decode).transpose()
    }

    fn delete(&self, id: &i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!("DELETE FROM {} WHERE rowid = ?1", self.table),
            params![id],
        )?;
        Ok(())
    }

    fn search(&self, query: &str, request: &PageRequest) -> Result<Page<E>> {
        let order_by = Self::order_by(&request.sort)?;
        let expression = with_default_or(query);
        let conn = self.lock()?;

        let total: i64 = match conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {0} WHERE {0} MATCH ?1",
                self.table
            ),
            params![expression],
            |row| row.get(0),
        ) {
            Ok(total) => total,
            Err(e) if is_rejected_query(&e) => {
                warn!("FTS5 rejected query {:?} on {}: {}", query, self.table, e);
                return Ok(Page::empty(request));
            }
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {1} FROM {0} WHERE {0} MATCH ?1 ORDER BY {2} LIMIT ?2 OFFSET ?3",
            self.table, SOURCE_COLUMN, order_by
        ))?;
        let rows = stmt
            .query_map(
                params![expression, request.size as i64, request.offset() as i64],
                |row| row.get::<_, String>(0),
            )?
            .collect::<rusqlite::Result<Vec<_>>>();
        let sources = match rows {
            Ok(sources) => sources,
            Err(e) if is_rejected_query(&e) => {
                warn!("FTS5 rejected query {:?} on {}: {}", query, self.table, e);
                return Ok(Page::empty(request));
            }
            Err(e) => return Err(e.into()),
        };

        let content = sources
            .iter()
            .map(|s| Self::decode(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(content, request, total as u64))
    }

    fn delete_all(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(&format!("DELETE FROM {}", self.table), [])?;
        Ok(())
    }

    fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(total as u64)
    }
}
