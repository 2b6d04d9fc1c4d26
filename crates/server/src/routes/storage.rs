use axum::extract::State;
use serde::Deserialize;
use service::dual_write::{StorageStatus, SwitchReport, SyncReport};
use tracing::info;

use super::{ok, ApiResult};
use crate::{extract::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PrimaryInput {
    pub primary: String,
}

#[utoipa::path(get, path = "/api/admin/storage/status", tag = "storage", responses((status = 200, description = "Routing flags, pending sync errors and recent operations")))]
pub async fn status(State(state): State<AppState>) -> ApiResult<StorageStatus> {
    ok(state.marketplace()?.strategy.status().await)
}

#[utoipa::path(post, path = "/api/admin/storage/sync", tag = "storage", responses((status = 200, description = "Replay report")))]
pub async fn sync(State(state): State<AppState>) -> ApiResult<SyncReport> {
    let report = state.marketplace()?.strategy.sync_data_inconsistencies().await;
    info!(attempted = report.attempted, resolved = report.resolved, failed = report.failed, "manual sync finished");
    ok(report)
}

#[utoipa::path(
    post, path = "/api/admin/storage/primary", tag = "storage",
    request_body = crate::openapi::PrimaryDoc,
    responses((status = 200, description = "Primary switched"), (status = 400, description = "Unknown store"))
)]
pub async fn switch_primary(State(state): State<AppState>, ApiJson(input): ApiJson<PrimaryInput>) -> ApiResult<SwitchReport> {
    ok(state.marketplace()?.strategy.switch_primary_database(&input.primary).await?)
}
