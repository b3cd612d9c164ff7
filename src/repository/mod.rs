//! Primary store: the relational source of truth for every entity.

mod records;
mod schema;
mod sqlite_repository;

pub use records::SqlRecord;
pub use schema::PRIMARY_SCHEMA;
pub use sqlite_repository::{open_primary_db, SqliteRepository};

use crate::domain::{Entity, Page, PageRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} cannot be saved without its key")]
    MissingKey { entity: &'static str },

    #[error("unknown sort property '{0}'")]
    UnknownSortProperty(String),

    #[error("primary database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Transaction scope of a single repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    ReadOnly,
    ReadWrite,
}

impl TxMode {
    pub fn label(&self) -> &'static str {
        match self {
            TxMode::ReadOnly => "read",
            TxMode::ReadWrite => "write",
        }
    }
}

pub trait Repository<E: Entity>: Send + Sync {
    /// Inserts records without an id and updates the others. A generated id
    /// that is not stored is saved as a new row with a new id.
    fn save(&self, record: E) -> Result<E, StoreError>;

    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>, StoreError>;

    fn find_all(&self, request: &PageRequest) -> Result<Page<E>, StoreError>;

    /// Deleting an id that is not stored is not an error.
    fn delete(&self, id: &E::Id) -> Result<(), StoreError>;

    fn count(&self) -> Result<u64, StoreError>;

    /// Every stored record, in id order.
    fn find_everything(&self) -> Result<Vec<E>, StoreError>;
}
