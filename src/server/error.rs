use super::alerts::failure_alert;
use super::metrics::record_error;
use crate::repository::StoreError;
use crate::service::ServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400 with `X-{app}-error` / `X-{app}-params` alert headers.
    #[error("bad request on {entity}: error.{key}")]
    Rejected {
        app: String,
        entity: &'static str,
        key: &'static str,
    },

    /// 400 without alert headers.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found")]
    NotFound,

    #[error("internal error on {path}: {message}")]
    Internal { path: String, message: String },
}

impl ApiError {
    pub fn rejected(app: &str, entity: &'static str, key: &'static str) -> Self {
        ApiError::Rejected {
            app: app.to_string(),
            entity,
            key,
        }
    }

    /// Maps a service failure on `path` to a server fault.
    pub fn from_service(path: &str, err: ServiceError) -> Self {
        ApiError::Internal {
            path: path.to_string(),
            message: format!("{:#}", anyhow::Error::from(err)),
        }
    }

    pub fn from_store(path: &str, err: StoreError) -> Self {
        Self::from_service(path, ServiceError::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Rejected { app, entity, key } => {
                (StatusCode::BAD_REQUEST, failure_alert(&app, entity, key)).into_response()
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal { path, message } => {
                error!("Internal server error on {}: {}", path, message);
                record_error("internal", &path);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "error.internalServerError" })),
                )
                    .into_response()
            }
        }
    }
}
