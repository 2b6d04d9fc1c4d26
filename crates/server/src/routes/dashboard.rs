use axum::extract::State;
use service::marketplace::DashboardSummary;

use super::{ok, ApiResult};
use crate::state::AppState;

#[utoipa::path(get, path = "/api/admin/dashboard", tag = "admin", responses((status = 200, description = "Marketplace summary")))]
pub async fn summary(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    ok(state.marketplace()?.dashboard().await?)
}
