use axum::{extract::State, http::StatusCode, Json};
use models::{
    review::{Review, ReviewDraft},
    service::{Service, ServiceDraft, ServicePatch},
};
use serde::{Deserialize, Serialize};
use service::{
    pagination::Page,
    query::ListingQuery,
    stats::{CategoryInfo, ServiceStats},
};
use common::types::ApiResponse;
use uuid::Uuid;

use super::{created, ok, ApiResult};
use crate::{errors::JsonApiError, extract::{ApiJson, ApiPath, ApiQuery}, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

#[utoipa::path(
    get, path = "/api/services", tag = "services",
    params(
        ("category" = Option<String>, Query, description = "Category id or `all`"),
        ("isActive" = Option<bool>, Query,),
        ("minPrice" = Option<f64>, Query,),
        ("maxPrice" = Option<f64>, Query,),
        ("search" = Option<String>, Query, description = "Substring of title, description or tags"),
        ("providerId" = Option<Uuid>, Query,),
        ("page" = Option<u32>, Query,),
        ("limit" = Option<u32>, Query,),
    ),
    responses((status = 200, description = "Page of services"), (status = 400, description = "Unknown category"))
)]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<ListingQuery>) -> ApiResult<Page<Service>> {
    match &state.marketplace {
        Some(m) => ok(m.catalog.list(&q).await?),
        None => ok(state.mock.list_services(&q)?),
    }
}

#[utoipa::path(get, path = "/api/services/categories", tag = "services", responses((status = 200, description = "Categories with counts")))]
pub async fn categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryInfo>> {
    match &state.marketplace {
        Some(m) => ok(m.catalog.categories().await?),
        None => ok(state.mock.categories()),
    }
}

#[utoipa::path(get, path = "/api/services/stats", tag = "services", responses((status = 200, description = "Catalogue statistics")))]
pub async fn stats(State(state): State<AppState>) -> ApiResult<ServiceStats> {
    match &state.marketplace {
        Some(m) => ok(m.catalog.stats().await?),
        None => ok(state.mock.stats()),
    }
}

#[utoipa::path(
    get, path = "/api/services/popular", tag = "services",
    params(("limit" = Option<usize>, Query,)),
    responses((status = 200, description = "Popular services, best rated first"))
)]
pub async fn popular(State(state): State<AppState>, ApiQuery(q): ApiQuery<PopularQuery>) -> ApiResult<Vec<Service>> {
    match &state.marketplace {
        Some(m) => ok(m.catalog.popular(q.limit).await?),
        None => ok(state.mock.popular(q.limit)),
    }
}

#[utoipa::path(
    get, path = "/api/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Service> {
    match &state.marketplace {
        Some(m) => ok(m.catalog.get(id).await?),
        None => ok(state.mock.get_service(id)?),
    }
}

#[utoipa::path(
    post, path = "/api/services", tag = "services",
    request_body = crate::openapi::ServiceDraftDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 503, description = "Storage unavailable"))
)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<ServiceDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Service>>), JsonApiError> {
    created(state.marketplace()?.catalog.create(draft).await?)
}

#[utoipa::path(
    put, path = "/api/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = crate::openapi::ServicePatchDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn update(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>, ApiJson(patch): ApiJson<ServicePatch>) -> ApiResult<Service> {
    ok(state.marketplace()?.catalog.update(id, patch).await?)
}

#[utoipa::path(
    delete, path = "/api/services/{id}", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "Deleted"), (status = 400, description = "Service has active bookings"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Deleted> {
    state.marketplace()?.catalog.delete(id).await?;
    ok(Deleted { id })
}

#[utoipa::path(
    get, path = "/api/services/{id}/reviews", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses((status = 200, description = "Reviews, newest first"), (status = 404, description = "Not Found"))
)]
pub async fn reviews(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Vec<Review>> {
    ok(state.marketplace()?.catalog.reviews(id).await?)
}

#[utoipa::path(
    post, path = "/api/services/{id}/reviews", tag = "services",
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = crate::openapi::ReviewDraftDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Rating outside 1..=5"), (status = 404, description = "Not Found"))
)]
pub async fn add_review(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<ReviewDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), JsonApiError> {
    created(state.marketplace()?.catalog.add_review(id, draft).await?)
}
