use crate::domain::{Page, PageRequest, WireMapping};
use crate::repository::{Repository, StoreError};
use crate::search::SearchIndex;
use crate::server::metrics::record_index_divergence;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Index(#[from] anyhow::Error),
}

/// State of the search index after a write that reached the primary store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSync {
    Synced,
    /// The primary write stands but the index no longer mirrors it.
    Diverged { reason: String },
}

impl IndexSync {
    pub fn is_diverged(&self) -> bool {
        matches!(self, IndexSync::Diverged { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Saved<T> {
    pub value: T,
    pub index: IndexSync,
}

/// Writes go to the primary store first and are then mirrored into the search
/// index. Reads come from the primary store, searches from the index.
///
/// The two writes are not atomic: when the index write fails the primary write
/// is kept and the outcome is reported as [`IndexSync::Diverged`].
pub struct EntityService<E: WireMapping> {
    repository: Arc<dyn Repository<E>>,
    search_index: Arc<dyn SearchIndex<E>>,
}

impl<E: WireMapping> Clone for EntityService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            search_index: self.search_index.clone(),
        }
    }
}

impl<E: WireMapping> EntityService<E> {
    pub fn new(repository: Arc<dyn Repository<E>>, search_index: Arc<dyn SearchIndex<E>>) -> Self {
        Self {
            repository,
            search_index,
        }
    }

    fn index_outcome(operation: &str, result: anyhow::Result<()>) -> IndexSync {
        match result {
            Ok(()) => IndexSync::Synced,
            Err(e) => {
                warn!(
                    "Search index diverged from primary store on {} {}: {:#}",
                    E::NAME,
                    operation,
                    e
                );
                record_index_divergence(E::NAME, operation);
                IndexSync::Diverged {
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    pub fn save(&self, dto: E::Dto) -> Result<Saved<E::Dto>, ServiceError> {
        debug!("Request to save {} : {:?}", E::NAME, dto);
        let record = E::from_dto(dto);
        let saved = self.repository.save(record)?;
        let value = saved.to_dto();
        let index = Self::index_outcome("save", self.search_index.save(&saved));
        Ok(Saved { value, index })
    }

    pub fn find_all(&self, request: &PageRequest) -> Result<Page<E::Dto>, ServiceError> {
        debug!("Request to get all {}", E::NAME);
        Ok(self.repository.find_all(request)?.map(|e| e.to_dto()))
    }

    pub fn find_one(&self, id: &E::Id) -> Result<Option<E::Dto>, ServiceError> {
        debug!("Request to get {} : {}", E::NAME, id);
        Ok(self.repository.find_by_id(id)?.map(|e| e.to_dto()))
    }

    pub fn delete(&self, id: &E::Id) -> Result<IndexSync, ServiceError> {
        debug!("Request to delete {} : {}", E::NAME, id);
        self.repository.delete(id)?;
        Ok(Self::index_outcome("delete", self.search_index.delete(id)))
    }

    pub fn search(&self, query: &str, request: &PageRequest) -> Result<Page<E::Dto>, ServiceError> {
        debug!("Request to search for a page of {} for query {}", E::NAME, query);
        Ok(self.search_index.search(query, request)?.map(|e| e.to_dto()))
    }

    /// Drops every indexed document and mirrors the primary store again.
    pub fn reindex(&self) -> Result<usize, ServiceError> {
        self.search_index.delete_all()?;
        let records = self.repository.find_everything()?;
        for record in &records {
            self.search_index.save(record)?;
        }
        info!("Reindexed {} {} records", records.len(), E::NAME);
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Employee, EmployeeDto, Job, JobHistory, Order};
    use crate::repository::{SqliteRepository, PRIMARY_SCHEMA};
    use crate::search::Fts5SearchIndex;
    use anyhow::bail;
    use rusqlite::Connection;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Real FTS5 index whose writes can be made to fail on demand.
    struct FlakySearchIndex<E> {
        inner: Fts5SearchIndex<E>,
        failing: AtomicBool,
    }

    impl<E: crate::domain::Entity<Id = i64>> FlakySearchIndex<E> {
        fn new() -> Self {
            let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
            Self {
                inner: Fts5SearchIndex::new(conn).unwrap(),
                failing: AtomicBool::new(false),
            }
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> anyhow::Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                bail!("search engine unavailable");
            }
            Ok(())
        }
    }

    impl<E: crate::domain::Entity<Id = i64>> SearchIndex<E> for FlakySearchIndex<E> {
        fn save(&self, record: &E) -> anyhow::Result<()> {
            self.check()?;
            self.inner.save(record)
        }

        fn find_by_id(&self, id: &i64) -> anyhow::Result<Option<E>> {
            self.inner.find_by_id(id)
        }

        fn delete(&self, id: &i64) -> anyhow::Result<()> {
            self.check()?;
            self.inner.delete(id)
        }

        fn search(&self, query: &str, request: &PageRequest) -> anyhow::Result<Page<E>> {
            self.inner.search(query, request)
        }

        fn delete_all(&self) -> anyhow::Result<()> {
            self.check()?;
            self.inner.delete_all()
        }

        fn count(&self) -> anyhow::Result<u64> {
            self.inner.count()
        }
    }

    struct Fixture<E: WireMapping> {
        primary: Arc<Mutex<Connection>>,
        service: EntityService<E>,
        repository: Arc<SqliteRepository<E>>,
        index: Arc<FlakySearchIndex<E>>,
    }

    fn fixture<E>() -> Fixture<E>
    where
        E: WireMapping<Id = i64> + crate::repository::SqlRecord,
    {
        let conn = Connection::open_in_memory().unwrap();
        PRIMARY_SCHEMA.create(&conn).unwrap();
        let primary = Arc::new(Mutex::new(conn));
        let repository = Arc::new(SqliteRepository::<E>::new(primary.clone()));
        let index = Arc::new(FlakySearchIndex::<E>::new());
        Fixture {
            primary,
            service: EntityService::new(repository.clone(), index.clone()),
            repository,
            index,
        }
    }

    fn job(title: &str) -> Job {
        Job {
            job_title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn save_writes_primary_then_mirrors_into_index() {
        let f = fixture::<Job>();

        let saved = f.service.save(job("Clerk")).unwrap();

        assert_eq!(saved.index, IndexSync::Synced);
        let id = saved.value.id.unwrap();
        assert_eq!(f.repository.find_by_id(&id).unwrap(), Some(saved.value.clone()));
        assert_eq!(f.index.find_by_id(&id).unwrap(), Some(saved.value));
    }

    #[test]
    fn update_replaces_both_copies() {
        let f = fixture::<Job>();
        let created = f.service.save(job("Clerk")).unwrap().value;

        let updated = f
            .service
            .save(Job {
                id: created.id,
                ..job("Manager")
            })
            .unwrap();

        assert_eq!(updated.index, IndexSync::Synced);
        assert_eq!(f.repository.count().unwrap(), 1);
        assert_eq!(f.index.count().unwrap(), 1);
        assert_eq!(
            f.index.find_by_id(&created.id.unwrap()).unwrap(),
            Some(updated.value)
        );
    }

    #[test]
    fn index_failure_after_primary_write_is_degraded_success() {
        let f = fixture::<JobHistory>();
        f.index.set_failing(true);

        let saved = f.service.save(JobHistory::default()).unwrap();

        assert!(saved.index.is_diverged());
        let id = saved.value.id.unwrap();
        assert_eq!(f.service.find_one(&id).unwrap(), Some(saved.value));
        assert_eq!(f.index.find_by_id(&id).unwrap(), None);
        assert!(f
            .service
            .search(&format!("id:{}", id), &PageRequest::default())
            .unwrap()
            .content
            .is_empty());
    }

    #[test]
    fn primary_failure_leaves_index_untouched() {
        let f = fixture::<Job>();
        f.primary
            .lock()
            .unwrap()
            .execute("DROP TABLE job", [])
            .unwrap();

        let result = f.service.save(job("Ghost"));

        assert!(matches!(
            result,
            Err(ServiceError::Store(StoreError::Sqlite(_)))
        ));
        assert_eq!(f.index.count().unwrap(), 0);
    }

    #[test]
    fn update_of_unknown_id_is_saved_and_mirrored_under_a_new_id() {
        let f = fixture::<Job>();

        let saved = f
            .service
            .save(Job {
                id: Some(77),
                ..job("Ghost")
            })
            .unwrap();

        assert_eq!(saved.index, IndexSync::Synced);
        let id = saved.value.id.unwrap();
        assert_ne!(id, 77);
        assert_eq!(f.index.find_by_id(&77).unwrap(), None);
        assert_eq!(f.index.find_by_id(&id).unwrap(), Some(saved.value));
    }

    #[test]
    fn delete_removes_primary_then_index() {
        let f = fixture::<Job>();
        let id = f.service.save(job("Clerk")).unwrap().value.id.unwrap();

        assert_eq!(f.service.delete(&id).unwrap(), IndexSync::Synced);

        assert_eq!(f.service.find_one(&id).unwrap(), None);
        assert_eq!(f.index.find_by_id(&id).unwrap(), None);
    }

    #[test]
    fn delete_with_failing_index_leaves_stale_document() {
        let f = fixture::<Job>();
        let id = f.service.save(job("Clerk")).unwrap().value.id.unwrap();
        f.index.set_failing(true);

        assert!(f.service.delete(&id).unwrap().is_diverged());

        assert_eq!(f.service.find_one(&id).unwrap(), None);
        let hits = f
            .service
            .search("jobTitle:clerk", &PageRequest::default())
            .unwrap();
        assert_eq!(hits.content.len(), 1);
    }

    #[test]
    fn reads_come_from_primary_and_searches_from_index() {
        let f = fixture::<Job>();
        let only_primary = f.repository.save(job("Auditor")).unwrap();
        let only_indexed = Job {
            id: Some(500),
            ..job("Phantom")
        };
        f.index.save(&only_indexed).unwrap();

        assert_eq!(
            f.service.find_one(&only_primary.id.unwrap()).unwrap(),
            Some(only_primary.clone())
        );
        assert_eq!(f.service.find_one(&500).unwrap(), None);

        let all = f.service.find_all(&PageRequest::default()).unwrap();
        assert_eq!(all.content, vec![only_primary]);

        assert!(f
            .service
            .search("jobTitle:auditor", &PageRequest::default())
            .unwrap()
            .content
            .is_empty());
        assert_eq!(
            f.service
                .search("jobTitle:phantom", &PageRequest::default())
                .unwrap()
                .content,
            vec![only_indexed]
        );
    }

    #[test]
    fn reindex_repairs_divergence() {
        let f = fixture::<Job>();
        f.index.set_failing(true);
        for title in ["Clerk", "Teller", "Porter"] {
            assert!(f.service.save(job(title)).unwrap().index.is_diverged());
        }
        f.index.set_failing(false);
        f.index
            .save(&Job {
                id: Some(99),
                ..job("Stale")
            })
            .unwrap();

        assert_eq!(f.service.reindex().unwrap(), 3);

        assert_eq!(f.index.count().unwrap(), 3);
        assert_eq!(f.index.find_by_id(&99).unwrap(), None);
        let page = f
            .service
            .search(
                "jobTitle:teller OR jobTitle:porter",
                &PageRequest::default().sorted(Order::asc("jobTitle")),
            )
            .unwrap();
        let titles: Vec<_> = page
            .content
            .into_iter()
            .map(|j| j.job_title.unwrap())
            .collect();
        assert_eq!(titles, vec!["Porter", "Teller"]);
    }

    #[test]
    fn employee_service_speaks_dtos_and_indexes_records() {
        let f = fixture::<Employee>();

        let saved = f
            .service
            .save(EmployeeDto {
                first_name: Some("Grace".to_string()),
                last_name: Some("Hopper".to_string()),
                ..Default::default()
            })
            .unwrap()
            .value;

        let id = saved.id.unwrap();
        let indexed: Employee = f.index.find_by_id(&id).unwrap().unwrap();
        assert_eq!(indexed.to_dto(), saved);

        let hits = f
            .service
            .search("lastName:hopper", &PageRequest::default())
            .unwrap();
        assert_eq!(hits.content, vec![saved]);
    }
}
