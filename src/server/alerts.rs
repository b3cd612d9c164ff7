//! Alert headers read by the web client to show notifications.
//!
//! Success: `X-{app}-alert: {app}.{entity}.{action}` and `X-{app}-params: {id}`.
//! Failure: `X-{app}-error: error.{key}` and `X-{app}-params: {entity}`.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use tracing::warn;

fn insert(headers: &mut HeaderMap, name: String, value: String) {
    match (
        HeaderName::try_from(name.as_str()),
        HeaderValue::try_from(value.as_str()),
    ) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => warn!("Dropping invalid alert header {}: {}", name, value),
    }
}

fn alert(app: &str, message: String, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, format!("X-{}-alert", app), message);
    insert(&mut headers, format!("X-{}-params", app), param.to_string());
    headers
}

pub fn entity_creation_alert(app: &str, entity: &str, id: &str) -> HeaderMap {
    alert(app, format!("{}.{}.created", app, entity), id)
}

pub fn entity_update_alert(app: &str, entity: &str, id: &str) -> HeaderMap {
    alert(app, format!("{}.{}.updated", app, entity), id)
}

pub fn entity_deletion_alert(app: &str, entity: &str, id: &str) -> HeaderMap {
    alert(app, format!("{}.{}.deleted", app, entity), id)
}

pub fn failure_alert(app: &str, entity: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(
        &mut headers,
        format!("X-{}-error", app),
        format!("error.{}", error_key),
    );
    insert(&mut headers, format!("X-{}-params", app), entity.to_string());
    headers
}

/// Added next to a success alert when the search index missed the write.
pub fn index_divergence_warning(headers: &mut HeaderMap, app: &str, entity: &str) {
    insert(
        headers,
        format!("X-{}-warning", app),
        format!("{}.{}.indexDiverged", app, entity),
    );
}
