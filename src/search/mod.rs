mod factory;
mod fts5_index;
mod query;
mod search_index;

pub use factory::{create_search_indexes, SearchIndexes};
pub use fts5_index::{open_search_db, Fts5SearchIndex};
pub use search_index::*;
