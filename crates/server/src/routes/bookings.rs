use axum::{extract::State, http::StatusCode, Json};
use common::types::ApiResponse;
use models::{
    booking::{Booking, BookingDraft},
    escrow::EscrowPayment,
};
use serde::Deserialize;
use service::{bookings::BookingStats, errors::ServiceError, pagination::Page, query::BookingQuery};
use uuid::Uuid;

use super::{created, ok, ApiResult};
use crate::{errors::JsonApiError, extract::{ApiJson, ApiPath, ApiQuery}, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[utoipa::path(
    post, path = "/api/bookings", tag = "bookings",
    request_body = crate::openapi::BookingDraftDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Service not found"))
)]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<BookingDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), JsonApiError> {
    created(state.marketplace()?.bookings.create(draft).await?)
}

#[utoipa::path(
    get, path = "/api/bookings", tag = "bookings",
    params(
        ("status" = Option<String>, Query,),
        ("clientId" = Option<Uuid>, Query,),
        ("providerId" = Option<Uuid>, Query,),
        ("serviceId" = Option<Uuid>, Query,),
        ("page" = Option<u32>, Query,),
        ("limit" = Option<u32>, Query,),
    ),
    responses((status = 200, description = "Page of bookings"))
)]
pub async fn list(State(state): State<AppState>, ApiQuery(q): ApiQuery<BookingQuery>) -> ApiResult<Page<Booking>> {
    ok(state.marketplace()?.bookings.list(&q).await?)
}

#[utoipa::path(get, path = "/api/bookings/stats", tag = "bookings", responses((status = 200, description = "Counts by status and completed revenue")))]
pub async fn stats(State(state): State<AppState>) -> ApiResult<BookingStats> {
    ok(state.marketplace()?.bookings.stats().await?)
}

#[utoipa::path(
    get, path = "/api/bookings/{id}", tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Booking> {
    ok(state.marketplace()?.bookings.get(id).await?)
}

#[utoipa::path(
    patch, path = "/api/bookings/{id}/status", tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = crate::openapi::StatusUpdateDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Invalid transition"), (status = 404, description = "Not Found"))
)]
pub async fn update_status(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<StatusUpdate>,
) -> ApiResult<Booking> {
    ok(state.marketplace()?.bookings.update_status(id, &input.status, input.reason).await?)
}

#[utoipa::path(
    get, path = "/api/bookings/{id}/escrow", tag = "bookings",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses((status = 200, description = "Escrow held for the booking"), (status = 404, description = "No escrow"))
)]
pub async fn escrow(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<EscrowPayment> {
    let escrow = state.marketplace()?.bookings.escrow_for(id).await?;
    ok(escrow.ok_or_else(|| ServiceError::not_found("escrow"))?)
}
