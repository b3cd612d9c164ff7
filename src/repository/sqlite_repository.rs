use super::records::{sql_value, SqlRecord};
use super::schema::PRIMARY_SCHEMA;
use super::{Repository, StoreError, TxMode};
use crate::domain::{Order, Page, PageRequest};
use crate::server::metrics::record_db_query;
use anyhow::Result;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Transaction, TransactionBehavior,
};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::debug;

/// Opens (or creates) the primary database. Every repository shares the
/// returned connection.
pub fn open_primary_db<P: AsRef<Path>>(db_path: P) -> Result<Arc<Mutex<Connection>>> {
    let conn = PRIMARY_SCHEMA.open(db_path.as_ref(), "primary")?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub struct SqliteRepository<E> {
    conn: Arc<Mutex<Connection>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: SqlRecord> SqliteRepository<E> {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    /// Runs `f` inside its own transaction, committed only when `f` succeeds.
    fn in_transaction<T>(
        &self,
        mode: TxMode,
        operation: &str,
        f: impl FnOnce(&Transaction) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let start = Instant::now();
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let behavior = match mode {
            TxMode::ReadOnly => TransactionBehavior::Deferred,
            TxMode::ReadWrite => TransactionBehavior::Immediate,
        };
        let tx = conn.transaction_with_behavior(behavior)?;
        let result = f(&tx)?;
        tx.commit()?;
        record_db_query(
            &format!("{}_{}_{}", E::TABLE, operation, mode.label()),
            start.elapsed(),
        );
        Ok(result)
    }

    fn select_columns() -> String {
        std::iter::once(E::ID.column)
            .chain(E::FIELDS.iter().map(|f| f.column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn order_by(sort: &[Order]) -> Result<String, StoreError> {
        let mut terms = Vec::with_capacity(sort.len() + 1);
        let mut sorted_by_id = false;
        for order in sort {
            let field = E::field(&order.property)
                .ok_or_else(|| StoreError::UnknownSortProperty(order.property.clone()))?;
            sorted_by_id |= field == E::ID;
            terms.push(format!("{} {}", field.column, order.direction.as_sql()));
        }
        // Stable pages when the requested order has ties.
        if !sorted_by_id {
            terms.push(format!("{} ASC", E::ID.column));
        }
        Ok(terms.join(", "))
    }

    fn field_params(record: &E) -> Vec<Value> {
        record.field_values().into_iter().map(sql_value).collect()
    }

    fn insert_row(tx: &Transaction, record: E) -> Result<E, StoreError> {
        let sql = if E::FIELDS.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", E::TABLE)
        } else {
            let columns = E::FIELDS
                .iter()
                .map(|f| f.column)
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = (1..=E::FIELDS.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                E::TABLE,
                columns,
                placeholders
            )
        };
        tx.execute(&sql, params_from_iter(Self::field_params(&record)))?;
        Ok(record.with_generated_id(tx.last_insert_rowid()))
    }

    fn insert(&self, record: E) -> Result<E, StoreError> {
        self.in_transaction(TxMode::ReadWrite, "insert", move |tx| {
            Self::insert_row(tx, record)
        })
    }

    /// Overwrites the row with `id`. When no such row exists the record is
    /// persisted as a new row under a freshly generated id, the caller's id is
    /// never written.
    fn update(&self, id: E::Id, record: E) -> Result<E, StoreError> {
        self.in_transaction(TxMode::ReadWrite, "update", move |tx| {
            let changed = if E::FIELDS.is_empty() {
                tx.query_row(
                    &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", E::TABLE, E::ID.column),
                    params![E::id_value(&id)],
                    |row| row.get::<_, i64>(0),
                )? as usize
            } else {
                let assignments = E::FIELDS
                    .iter()
                    .enumerate()
                    .map(|(i, f)| format!("{} = ?{}", f.column, i + 1))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE {} SET {} WHERE {} = ?{}",
                    E::TABLE,
                    assignments,
                    E::ID.column,
                    E::FIELDS.len() + 1
                );
                let mut values = Self::field_params(&record);
                values.push(E::id_value(&id));
                tx.execute(&sql, params_from_iter(values))?
            };
            if changed == 0 {
                debug!("{} {} is not stored, saving it as a new row", E::NAME, id);
                return Self::insert_row(tx, record);
            }
            Ok(record)
        })
    }

    /// Natural keys are written as given, replacing any stored attributes.
    fn upsert(&self, id: E::Id, record: E) -> Result<E, StoreError> {
        self.in_transaction(TxMode::ReadWrite, "upsert", move |tx| {
            let columns = Self::select_columns();
            let placeholders = (1..=E::FIELDS.len() + 1)
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let on_conflict = if E::FIELDS.is_empty() {
                "DO NOTHING".to_string()
            } else {
                let assignments = E::FIELDS
                    .iter()
                    .map(|f| format!("{0} = excluded.{0}", f.column))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("DO UPDATE SET {}", assignments)
            };
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) {}",
                E::TABLE,
                columns,
                placeholders,
                E::ID.column,
                on_conflict
            );
            let mut values = vec![E::id_value(&id)];
            values.extend(Self::field_params(&record));
            tx.execute(&sql, params_from_iter(values))?;
            Ok(record)
        })
    }
}

impl<E: SqlRecord> Repository<E> for SqliteRepository<E> {
    fn save(&self, record: E) -> Result<E, StoreError> {
        match record.id() {
            None if E::GENERATED_ID => self.insert(record),
            None => Err(StoreError::MissingKey { entity: E::NAME }),
            Some(id) if E::GENERATED_ID => self.update(id, record),
            Some(id) => self.upsert(id, record),
        }
    }

    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        self.in_transaction(TxMode::ReadOnly, "find_by_id", |tx| {
            let sql = format!(
                "SELECT {} FROM {} WHERE {} = ?1",
                Self::select_columns(),
                E::TABLE,
                E::ID.column
            );
            Ok(tx
                .query_row(&sql, params![E::id_value(id)], |row| E::from_row(row))
                .optional()?)
        })
    }

    fn find_all(&self, request: &PageRequest) -> Result<Page<E>, StoreError> {
        let order_by = Self::order_by(&request.sort)?;
        self.in_transaction(TxMode::ReadOnly, "find_all", |tx| {
            let total: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM {}", E::TABLE),
                [],
                |row| row.get(0),
            )?;
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM {} ORDER BY {} LIMIT ?1 OFFSET ?2",
                Self::select_columns(),
                E::TABLE,
                order_by
            ))?;
            let content = stmt
                .query_map(
                    params![request.size as i64, request.offset() as i64],
                    |row| E::from_row(row),
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(Page::new(content, request, total as u64))
        })
    }

    fn delete(&self, id: &E::Id) -> Result<(), StoreError> {
        self.in_transaction(TxMode::ReadWrite, "delete", |tx| {
            tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?1", E::TABLE, E::ID.column),
                params![E::id_value(id)],
            )?;
            Ok(())
        })
    }

    fn count(&self) -> Result<u64, StoreError> {
        self.in_transaction(TxMode::ReadOnly, "count", |tx| {
            let total: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM {}", E::TABLE),
                [],
                |row| row.get(0),
            )?;
            Ok(total as u64)
        })
    }

    fn find_everything(&self) -> Result<Vec<E>, StoreError> {
        self.in_transaction(TxMode::ReadOnly, "find_everything", |tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT {} FROM {} ORDER BY {} ASC",
                Self::select_columns(),
                E::TABLE,
                E::ID.column
            ))?;
            let records = stmt
                .query_map([], |row| E::from_row(row))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }
}
