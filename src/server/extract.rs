//! Request extractors shared by the entity resources.

use super::error::ApiError;
use super::ServerConfig;
use crate::domain::{Entity, PageDefaults, PageRequest, WireMapping};
use axum::extract::{FromRef, FromRequest, Request};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

/// Raw `page`, `size`, repeated `sort` and `query` parameters. Numbers are
/// kept as text so that garbage falls back to defaults instead of failing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    #[serde(default)]
    pub sort: Vec<String>,
    pub query: Option<String>,
}

impl PageQuery {
    /// Builds the page request for `E`, rejecting sort properties `E` does not have.
    pub fn page_request<E: Entity>(
        &self,
        defaults: PageDefaults,
        app_name: &str,
    ) -> Result<PageRequest, ApiError> {
        let request = PageRequest::from_params(
            self.page.as_deref(),
            self.size.as_deref(),
            &self.sort,
            defaults,
        );
        if let Some(order) = request.sort.iter().find(|o| E::field(&o.property).is_none()) {
            debug!("Rejecting unknown {} sort property {}", E::NAME, order.property);
            return Err(ApiError::rejected(app_name, E::NAME, "badsort"));
        }
        Ok(request)
    }
}

/// JSON body holding the wire shape of `E`. Malformed bodies are answered
/// with a 400 carrying the `invalidjson` failure alert.
pub struct EntityJson<E: WireMapping>(pub E::Dto);

impl<S, E> FromRequest<S> for EntityJson<E>
where
    E: WireMapping,
    S: Send + Sync,
    ServerConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<E::Dto>::from_request(req, state).await {
            Ok(Json(dto)) => Ok(EntityJson(dto)),
            Err(rejection) => {
                debug!("Invalid {} body: {}", E::NAME, rejection.body_text());
                let config = ServerConfig::from_ref(state);
                Err(ApiError::rejected(&config.app_name, E::NAME, "invalidjson"))
            }
        }
    }
}
