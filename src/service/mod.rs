//! Entity services: the only code path writing both the primary store and the
//! search index.

mod entity_service;

pub use entity_service::{EntityService, IndexSync, Saved, ServiceError};
