//! Search index trait and the no-op implementation

use crate::domain::{Entity, Page, PageRequest};
use anyhow::Result;

/// Denormalised copy of an entity, searchable by free text.
///
/// The index never originates records: it only holds what the entity service
/// mirrored into it, keyed by the primary identifier.
pub trait SearchIndex<E: Entity>: Send + Sync {
    /// Inserts or replaces the document for `record`.
    fn save(&self, record: &E) -> Result<()>;

    fn find_by_id(&self, id: &E::Id) -> Result<Option<E>>;

    fn delete(&self, id: &E::Id) -> Result<()>;

    /// Runs a `field:value` query. Queries the engine refuses to run yield an
    /// empty page.
    fn search(&self, query: &str, request: &PageRequest) -> Result<Page<E>>;

    fn delete_all(&self) -> Result<()>;

    fn count(&self) -> Result<u64>;
}

/// Index used when search is disabled: accepts every write, finds nothing.
pub struct NoOpSearchIndex;

impl<E: Entity> SearchIndex<E> for NoOpSearchIndex {
    fn save(&self, _record: &E) -> Result<()> {
        Ok(())
    }

    fn find_by_id(&self, _id: &E::Id) -> Result<Option<E>> {
        Ok(None)
    }

    fn delete(&self, _id: &E::Id) -> Result<()> {
        Ok(())
    }

    fn search(&self, _query: &str, request: &PageRequest) -> Result<Page<E>> {
        Ok(Page::empty(request))
    }

    fn delete_all(&self) -> Result<()> {
        Ok(())
    }

    fn count(&self) -> Result<u64> {
        Ok(0)
    }
}
