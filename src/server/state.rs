use axum::extract::FromRef;

use crate::domain::{Authority, Employee, Job, JobHistory};
use crate::repository::{Repository, SqliteRepository};
use crate::search::SearchIndexes;
use crate::service::EntityService;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::ServerConfig;

pub type GuardedAuthorityRepository = Arc<dyn Repository<Authority>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub employees: EntityService<Employee>,
    pub jobs: EntityService<Job>,
    pub job_histories: EntityService<JobHistory>,
    pub authorities: GuardedAuthorityRepository,
}

impl ServerState {
    /// Wires one SQLite repository per entity on the shared primary connection
    /// to the matching search index.
    pub fn new(
        config: ServerConfig,
        primary_db: Arc<Mutex<Connection>>,
        search_indexes: SearchIndexes,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_string(),
            employees: EntityService::new(
                Arc::new(SqliteRepository::<Employee>::new(primary_db.clone())),
                search_indexes.employees,
            ),
            jobs: EntityService::new(
                Arc::new(SqliteRepository::<Job>::new(primary_db.clone())),
                search_indexes.jobs,
            ),
            job_histories: EntityService::new(
                Arc::new(SqliteRepository::<JobHistory>::new(primary_db.clone())),
                search_indexes.job_histories,
            ),
            authorities: Arc::new(SqliteRepository::<Authority>::new(primary_db)),
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for EntityService<Employee> {
    fn from_ref(input: &ServerState) -> Self {
        input.employees.clone()
    }
}

impl FromRef<ServerState> for EntityService<Job> {
    fn from_ref(input: &ServerState) -> Self {
        input.jobs.clone()
    }
}

impl FromRef<ServerState> for EntityService<JobHistory> {
    fn from_ref(input: &ServerState) -> Self {
        input.job_histories.clone()
    }
}

impl FromRef<ServerState> for GuardedAuthorityRepository {
    fn from_ref(input: &ServerState) -> Self {
        input.authorities.clone()
    }
}
