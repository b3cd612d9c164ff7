//! Factory function for creating the per-entity search indexes

use super::{open_search_db, Fts5SearchIndex, NoOpSearchIndex, SearchIndex};
use crate::config::SearchEngine;
use crate::domain::{Employee, Job, JobHistory};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One index per searchable entity, all backed by the same engine.
#[derive(Clone)]
pub struct SearchIndexes {
    pub employees: Arc<dyn SearchIndex<Employee>>,
    pub jobs: Arc<dyn SearchIndex<Job>>,
    pub job_histories: Arc<dyn SearchIndex<JobHistory>>,
}

/// Create the search indexes for the configured search engine
///
/// # Arguments
/// * `engine` - The search engine type to create
/// * `db_dir` - Directory for database files (used by FTS5)
pub fn create_search_indexes(engine: &SearchEngine, db_dir: &Path) -> Result<SearchIndexes> {
    match engine {
        SearchEngine::Fts5 => {
            let db_path = db_dir.join("search.db");
            info!("Creating FTS5 search indexes at {:?}", db_path);
            let conn = open_search_db(&db_path)?;
            Ok(SearchIndexes {
                employees: Arc::new(Fts5SearchIndex::<Employee>::new(conn.clone())?),
                jobs: Arc::new(Fts5SearchIndex::<Job>::new(conn.clone())?),
                job_histories: Arc::new(Fts5SearchIndex::<JobHistory>::new(conn)?),
            })
        }
        SearchEngine::NoOp => {
            info!("Creating NoOp search indexes (search disabled)");
            Ok(SearchIndexes {
                employees: Arc::new(NoOpSearchIndex),
                jobs: Arc::new(NoOpSearchIndex),
                job_histories: Arc::new(NoOpSearchIndex),
            })
        }
    }
}
