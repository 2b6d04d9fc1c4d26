use axum::extract::State;
use models::provider_service::{ProviderService, ProviderServicePatch};
use service::{pagination::Page, query::ListingQuery};
use tracing::info;
use uuid::Uuid;

use super::{ok, ApiResult};
use crate::{extract::{ApiJson, ApiPath, ApiQuery}, state::AppState};

#[utoipa::path(
    get, path = "/api/provider-services", tag = "provider-services",
    params(
        ("providerId" = Option<Uuid>, Query,),
        ("category" = Option<String>, Query,),
        ("isActive" = Option<bool>, Query,),
        ("search" = Option<String>, Query,),
        ("page" = Option<u32>, Query,),
        ("limit" = Option<u32>, Query,),
    ),
    responses((status = 200, description = "Page of provider services"))
)]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<ListingQuery>) -> ApiResult<Page<ProviderService>> {
    match &state.marketplace {
        Some(m) => ok(m.provider_services.list(&q).await?),
        None => ok(state.mock.list_provider_services(&q)?),
    }
}

#[utoipa::path(
    get, path = "/api/provider-services/{id}", tag = "provider-services",
    params(("id" = Uuid, Path, description = "Provider service ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<ProviderService> {
    match &state.marketplace {
        Some(m) => ok(m.provider_services.get(id).await?),
        None => ok(state.mock.get_provider_service(id)?),
    }
}

#[utoipa::path(
    patch, path = "/api/provider-services/{id}", tag = "provider-services",
    params(("id" = Uuid, Path, description = "Provider service ID")),
    request_body = crate::openapi::ProviderServicePatchDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Empty patch"), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ProviderServicePatch>,
) -> ApiResult<ProviderService> {
    let updated = state.marketplace()?.provider_services.update(id, patch).await?;
    info!(%id, is_active = updated.is_active, "provider service updated");
    ok(updated)
}
