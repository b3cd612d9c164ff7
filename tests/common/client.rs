//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint family. When API routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Entity resources
    // ========================================================================

    /// POST /api/{resource}
    pub async fn create(&self, resource: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}/api/{}", self.base_url, resource))
            .json(body)
            .send()
            .await
            .expect("Create request failed")
    }

    /// PUT /api/{resource}
    pub async fn update(&self, resource: &str, body: &Value) -> Response {
        self.client
            .put(format!("{}/api/{}", self.base_url, resource))
            .json(body)
            .send()
            .await
            .expect("Update request failed")
    }

    /// POST /api/{resource} with a raw, possibly malformed, JSON body
    pub async fn create_raw(&self, resource: &str, body: &str) -> Response {
        self.client
            .post(format!("{}/api/{}", self.base_url, resource))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Create request failed")
    }

    /// GET /api/{resource} with the given query parameters
    pub async fn get_all(&self, resource: &str, params: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/{}", self.base_url, resource))
            .query(params)
            .send()
            .await
            .expect("Get all request failed")
    }

    /// GET /api/{resource}/{id}
    pub async fn get_one(&self, resource: &str, id: i64) -> Response {
        self.get_path(&format!("/api/{}/{}", resource, id)).await
    }

    /// DELETE /api/{resource}/{id}
    pub async fn delete(&self, resource: &str, id: i64) -> Response {
        self.client
            .delete(format!("{}/api/{}/{}", self.base_url, resource, id))
            .send()
            .await
            .expect("Delete request failed")
    }

    /// GET /api/_search/{resource}?query=...
    pub async fn search(&self, resource: &str, query: &str) -> Response {
        self.search_page(resource, &[("query", query)]).await
    }

    /// GET /api/_search/{resource} with arbitrary parameters
    pub async fn search_page(&self, resource: &str, params: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/_search/{}", self.base_url, resource))
            .query(params)
            .send()
            .await
            .expect("Search request failed")
    }

    /// Creates an entity and returns its assigned id.
    pub async fn create_ok(&self, resource: &str, body: &Value) -> i64 {
        let response = self.create(resource, body).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Create on {} failed",
            resource
        );
        let created: Value = response.json().await.expect("Created body is not JSON");
        created["id"].as_i64().expect("Created entity has no id")
    }

    // ========================================================================
    // Other endpoints
    // ========================================================================

    /// GET an arbitrary path on the server
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Get request failed")
    }

    pub async fn get_authorities(&self, params: &[(&str, &str)]) -> Response {
        self.get_all("authorities", params).await
    }

    pub async fn management_info(&self) -> Response {
        self.get_path("/management/info").await
    }
}

/// Reads a header as text, `None` when missing.
pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
