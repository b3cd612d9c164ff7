//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, JOBS};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_job() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_one(JOBS, 1).await;
//!     assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! }
//! ```

mod client;
mod constants;
mod server;

// Public API - this is what tests import
pub use client::{header, TestClient};
pub use constants::*;
pub use server::TestServer;
