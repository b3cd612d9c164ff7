mod alerts;
pub mod config;
mod error;
mod extract;
mod http_layers;
pub mod metrics;
mod pagination;
mod resource;
pub mod server;
pub mod state;

pub use config::{ServerConfig, DEFAULT_APP_NAME};
pub use error::ApiError;
pub use http_layers::*;
pub use resource::RestResource;
#[allow(unused_imports)] // Used by main.rs
pub use server::{make_app, run_server};
pub use state::ServerState;
