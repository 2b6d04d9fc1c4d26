use axum::extract::State;
use models::{provider_service::ProviderService, user::User};
use serde::Deserialize;
use service::{pagination::Page, providers::ProviderStatusChange, query::ProviderQuery};
use uuid::Uuid;

use super::{ok, ApiResult};
use crate::{extract::{ApiJson, ApiPath, ApiQuery}, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ProviderStatusInput {
    pub status: String,
}

#[utoipa::path(
    get, path = "/api/admin/providers", tag = "admin",
    params(
        ("status" = Option<String>, Query, description = "pending, under_review, approved, rejected or suspended"),
        ("search" = Option<String>, Query, description = "Name or email substring"),
        ("page" = Option<u32>, Query,),
        ("limit" = Option<u32>, Query,),
    ),
    responses((status = 200, description = "Page of providers"), (status = 400, description = "Unknown status"))
)]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<ProviderQuery>) -> ApiResult<Page<User>> {
    ok(state.marketplace()?.providers.list_providers(&q).await?)
}

#[utoipa::path(
    patch, path = "/api/admin/providers/{id}/status", tag = "admin",
    params(("id" = Uuid, Path, description = "Provider ID")),
    request_body = crate::openapi::ProviderStatusDoc,
    responses((status = 200, description = "Updated; approval lists the created services"), (status = 400, description = "Invalid transition"), (status = 404, description = "Not Found"))
)]
pub async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ProviderStatusInput>,
) -> ApiResult<ProviderStatusChange> {
    ok(state.marketplace()?.providers.update_provider_status(id, &input.status).await?)
}

#[utoipa::path(
    post, path = "/api/admin/providers/{id}/services/sync", tag = "admin",
    params(("id" = Uuid, Path, description = "Provider ID")),
    responses((status = 200, description = "Newly created provider services"), (status = 400, description = "Provider not approved"), (status = 404, description = "Not Found"))
)]
pub async fn sync_services(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Vec<ProviderService>> {
    ok(state.marketplace()?.providers.sync_services(id).await?)
}
