//! HR directory server library
//!
//! Exposes the internal modules to the binary and to the end-to-end tests.

pub mod config;
pub mod domain;
pub mod repository;
pub mod search;
pub mod server;
pub mod service;
pub mod sqlite_persistence;

pub use server::{make_app, run_server, RequestsLoggingLevel, ServerState};
