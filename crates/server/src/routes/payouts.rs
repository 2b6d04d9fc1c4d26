use axum::extract::State;
use models::payout::Payout;
use serde::Deserialize;
use service::{pagination::Page, payouts::PayoutStats, query::PayoutQuery};
use uuid::Uuid;

use super::{ok, ApiResult};
use crate::{extract::{ApiJson, ApiPath, ApiQuery}, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PayoutStatusInput {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteInput {
    pub note: String,
}

#[utoipa::path(
    get, path = "/api/admin/payouts", tag = "admin",
    params(
        ("status" = Option<String>, Query,),
        ("providerId" = Option<Uuid>, Query,),
        ("page" = Option<u32>, Query,),
        ("limit" = Option<u32>, Query,),
    ),
    responses((status = 200, description = "Page of payouts"))
)]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<PayoutQuery>) -> ApiResult<Page<Payout>> {
    ok(state.marketplace()?.payouts.list(&q).await?)
}

#[utoipa::path(get, path = "/api/admin/payouts/stats", tag = "admin", responses((status = 200, description = "Count and amount per status")))]
pub async fn stats(State(state): State<AppState>) -> ApiResult<PayoutStats> {
    ok(state.marketplace()?.payouts.stats().await?)
}

#[utoipa::path(
    get, path = "/api/admin/payouts/{id}", tag = "admin",
    params(("id" = Uuid, Path, description = "Payout ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Payout> {
    ok(state.marketplace()?.payouts.get(id).await?)
}

#[utoipa::path(
    patch, path = "/api/admin/payouts/{id}/status", tag = "admin",
    params(("id" = Uuid, Path, description = "Payout ID")),
    request_body = crate::openapi::PayoutStatusDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Invalid transition"), (status = 404, description = "Not Found"))
)]
pub async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<PayoutStatusInput>,
) -> ApiResult<Payout> {
    ok(state.marketplace()?.payouts.update_status(id, &input.status, input.note).await?)
}

#[utoipa::path(
    post, path = "/api/admin/payouts/{id}/process", tag = "admin",
    params(("id" = Uuid, Path, description = "Payout ID")),
    responses((status = 200, description = "Completed with a reference"), (status = 400, description = "Not pending or ready"), (status = 404, description = "Not Found"))
)]
pub async fn process(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Payout> {
    ok(state.marketplace()?.payouts.process(id).await?)
}

#[utoipa::path(
    post, path = "/api/admin/payouts/{id}/notes", tag = "admin",
    params(("id" = Uuid, Path, description = "Payout ID")),
    request_body = crate::openapi::NoteDoc,
    responses((status = 200, description = "Note appended"), (status = 400, description = "Empty note"), (status = 404, description = "Not Found"))
)]
pub async fn add_note(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>, ApiJson(input): ApiJson<NoteInput>) -> ApiResult<Payout> {
    ok(state.marketplace()?.payouts.add_note(id, input.note).await?)
}
