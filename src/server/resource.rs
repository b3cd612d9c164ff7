//! REST resources: `/api/{path}` CRUD, `/api/_search/{path}` and authorities.

use super::alerts::{
    entity_creation_alert, entity_deletion_alert, entity_update_alert, index_divergence_warning,
};
use super::error::ApiError;
use super::extract::{EntityJson, PageQuery};
use super::pagination::{pagination_headers, search_pagination_headers};
use super::state::{GuardedAuthorityRepository, ServerState};
use super::ServerConfig;
use crate::domain::{Authority, Employee, Job, JobHistory, WireMapping};
use crate::service::{EntityService, IndexSync};
use axum::extract::{FromRef, Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::Query;
use tracing::debug;

/// An entity exposed under `/api/{PATH}` and `/api/_search/{PATH}`.
pub trait RestResource: WireMapping<Id = i64> {
    const PATH: &'static str;

    fn resource_url() -> String {
        format!("/api/{}", Self::PATH)
    }

    fn search_url() -> String {
        format!("/api/_search/{}", Self::PATH)
    }
}

impl RestResource for Employee {
    const PATH: &'static str = "employees";
}

impl RestResource for Job {
    const PATH: &'static str = "jobs";
}

impl RestResource for JobHistory {
    const PATH: &'static str = "job-histories";
}

fn saved_id<E: RestResource>(dto: &E::Dto) -> Result<i64, ApiError> {
    E::dto_id(dto).ok_or_else(|| ApiError::Internal {
        path: E::resource_url(),
        message: format!("saved {} came back without id", E::NAME),
    })
}

fn warn_on_divergence<E: RestResource>(headers: &mut HeaderMap, app: &str, index: &IndexSync) {
    if index.is_diverged() {
        index_divergence_warning(headers, app, E::NAME);
    }
}

fn create<E: RestResource>(
    service: &EntityService<E>,
    config: &ServerConfig,
    dto: E::Dto,
) -> Result<Response, ApiError> {
    let saved = service
        .save(dto)
        .map_err(|e| ApiError::from_service(&E::resource_url(), e))?;
    let id = saved_id::<E>(&saved.value)?;

    let mut headers = entity_creation_alert(&config.app_name, E::NAME, &id.to_string());
    warn_on_divergence::<E>(&mut headers, &config.app_name, &saved.index);
    if let Ok(location) = HeaderValue::try_from(format!("{}/{}", E::resource_url(), id)) {
        headers.insert(header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(saved.value)).into_response())
}

async fn create_entity<E>(
    State(service): State<EntityService<E>>,
    State(config): State<ServerConfig>,
    EntityJson(dto): EntityJson<E>,
) -> Result<Response, ApiError>
where
    E: RestResource,
    EntityService<E>: FromRef<ServerState>,
{
    debug!("REST request to save {} : {:?}", E::NAME, dto);
    if E::dto_id(&dto).is_some() {
        return Err(ApiError::rejected(&config.app_name, E::NAME, "idexists"));
    }
    create(&service, &config, dto)
}

/// Bodies without id take the create path. An id the primary store does not
/// know is saved as a new record, the response carries its generated id.
async fn update_entity<E>(
    State(service): State<EntityService<E>>,
    State(config): State<ServerConfig>,
    EntityJson(dto): EntityJson<E>,
) -> Result<Response, ApiError>
where
    E: RestResource,
    EntityService<E>: FromRef<ServerState>,
{
    debug!("REST request to update {} : {:?}", E::NAME, dto);
    if E::dto_id(&dto).is_none() {
        return create(&service, &config, dto);
    }
    let saved = service
        .save(dto)
        .map_err(|e| ApiError::from_service(&E::resource_url(), e))?;
    let id = saved_id::<E>(&saved.value)?;

    let mut headers = entity_update_alert(&config.app_name, E::NAME, &id.to_string());
    warn_on_divergence::<E>(&mut headers, &config.app_name, &saved.index);
    Ok((StatusCode::OK, headers, Json(saved.value)).into_response())
}

async fn list_entities<E>(
    State(service): State<EntityService<E>>,
    State(config): State<ServerConfig>,
    Query(params): Query<PageQuery>,
) -> Result<Response, ApiError>
where
    E: RestResource,
    EntityService<E>: FromRef<ServerState>,
{
    debug!("REST request to get a page of {}", E::NAME);
    let request = params.page_request::<E>(config.pagination, &config.app_name)?;
    let page = service
        .find_all(&request)
        .map_err(|e| ApiError::from_service(&E::resource_url(), e))?;
    let headers = pagination_headers(&page, &E::resource_url());
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

async fn get_entity<E>(
    State(service): State<EntityService<E>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError>
where
    E: RestResource,
    EntityService<E>: FromRef<ServerState>,
{
    debug!("REST request to get {} : {}", E::NAME, id);
    match service
        .find_one(&id)
        .map_err(|e| ApiError::from_service(&E::resource_url(), e))?
    {
        Some(dto) => Ok(Json(dto).into_response()),
        None => Err(ApiError::NotFound),
    }
}

async fn delete_entity<E>(
    State(service): State<EntityService<E>>,
    State(config): State<ServerConfig>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError>
where
    E: RestResource,
    EntityService<E>: FromRef<ServerState>,
{
    debug!("REST request to delete {} : {}", E::NAME, id);
    let index = service
        .delete(&id)
        .map_err(|e| ApiError::from_service(&E::resource_url(), e))?;
    let mut headers = entity_deletion_alert(&config.app_name, E::NAME, &id.to_string());
    warn_on_divergence::<E>(&mut headers, &config.app_name, &index);
    Ok((StatusCode::OK, headers).into_response())
}

async fn search_entities<E>(
    State(service): State<EntityService<E>>,
    State(config): State<ServerConfig>,
    Query(params): Query<PageQuery>,
) -> Result<Response, ApiError>
where
    E: RestResource,
    EntityService<E>: FromRef<ServerState>,
{
    let Some(query) = params.query.as_deref() else {
        return Err(ApiError::BadRequest("missing query parameter".to_string()));
    };
    debug!("REST request to search for a page of {} for query {}", E::NAME, query);
    let request = params.page_request::<E>(config.pagination, &config.app_name)?;
    let page = service
        .search(query, &request)
        .map_err(|e| ApiError::from_service(&E::search_url(), e))?;
    let headers = search_pagination_headers(query, &page, &E::search_url());
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

pub fn make_entity_routes<E>() -> Router<ServerState>
where
    E: RestResource,
    EntityService<E>: FromRef<ServerState>,
{
    Router::new()
        .route(
            &E::resource_url(),
            get(list_entities::<E>)
                .post(create_entity::<E>)
                .put(update_entity::<E>),
        )
        .route(
            &format!("{}/{{id}}", E::resource_url()),
            get(get_entity::<E>).delete(delete_entity::<E>),
        )
        .route(&E::search_url(), get(search_entities::<E>))
}

const AUTHORITIES_URL: &str = "/api/authorities";

async fn list_authorities(
    State(authorities): State<GuardedAuthorityRepository>,
    State(config): State<ServerConfig>,
    Query(params): Query<PageQuery>,
) -> Result<Response, ApiError> {
    debug!("REST request to get a page of authorities");
    let request = params.page_request::<Authority>(config.pagination, &config.app_name)?;
    let page = authorities
        .find_all(&request)
        .map_err(|e| ApiError::from_store(AUTHORITIES_URL, e))?;
    let headers = pagination_headers(&page, AUTHORITIES_URL);
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

async fn get_authority(
    State(authorities): State<GuardedAuthorityRepository>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    debug!("REST request to get authority : {}", name);
    match authorities
        .find_by_id(&name)
        .map_err(|e| ApiError::from_store(AUTHORITIES_URL, e))?
    {
        Some(authority) => Ok(Json(authority).into_response()),
        None => Err(ApiError::NotFound),
    }
}

pub fn make_authority_routes() -> Router<ServerState> {
    Router::new()
        .route(AUTHORITIES_URL, get(list_authorities))
        .route(&format!("{}/{{name}}", AUTHORITIES_URL), get(get_authority))
}
