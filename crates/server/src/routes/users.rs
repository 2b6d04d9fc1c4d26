use axum::{extract::State, http::StatusCode, Json};
use common::types::ApiResponse;
use models::user::{ProviderProfile, User, UserDraft};
use uuid::Uuid;

use super::{created, ok, ApiResult};
use crate::{errors::JsonApiError, extract::{ApiJson, ApiPath}, state::AppState};

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = crate::openapi::UserDraftDoc,
    responses((status = 201, description = "Registered"), (status = 400, description = "Validation Error"), (status = 409, description = "Email already registered"))
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<UserDraft>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), JsonApiError> {
    created(state.marketplace()?.providers.register(draft).await?)
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<User> {
    ok(state.marketplace()?.providers.get(id).await?)
}

#[utoipa::path(
    put, path = "/api/users/{id}/provider-profile", tag = "users",
    params(("id" = Uuid, Path, description = "Provider ID")),
    request_body = crate::openapi::ProviderProfileDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Not a provider"), (status = 404, description = "Not Found"))
)]
pub async fn update_provider_profile(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(profile): ApiJson<ProviderProfile>,
) -> ApiResult<User> {
    ok(state.marketplace()?.providers.update_provider_profile(id, profile).await?)
}
