use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use common::types::{ApiResponse, Health};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{errors::JsonApiError, openapi::ApiDoc, state::AppState};

pub mod bookings;
pub mod dashboard;
pub mod payouts;
pub mod provider_services;
pub mod providers;
pub mod services;
pub mod storage;
pub mod users;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, JsonApiError>;

pub(crate) fn ok<T: serde::Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

pub(crate) fn created<T: serde::Serialize>(data: T) -> Result<(StatusCode, Json<ApiResponse<T>>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> impl IntoResponse {
    common::metrics::encode_metrics()
}

fn api_routes() -> Router<AppState> {
    let service_routes = Router::new()
        .route("/", get(services::list).post(services::create))
        .route("/categories", get(services::categories))
        .route("/stats", get(services::stats))
        .route("/popular", get(services::popular))
        .route("/:id", get(services::get).put(services::update).delete(services::delete))
        .route("/:id/reviews", get(services::reviews).post(services::add_review));

    let provider_service_routes = Router::new()
        .route("/", get(provider_services::list))
        .route("/:id", get(provider_services::get).patch(provider_services::update));

    let booking_routes = Router::new()
        .route("/", get(bookings::list).post(bookings::create))
        .route("/stats", get(bookings::stats))
        .route("/:id", get(bookings::get))
        .route("/:id/status", patch(bookings::update_status))
        .route("/:id/escrow", get(bookings::escrow));

    let user_routes = Router::new()
        .route("/", post(users::register))
        .route("/:id", get(users::get))
        .route("/:id/provider-profile", put(users::update_provider_profile));

    let admin_routes = Router::new()
        .route("/providers", get(providers::list))
        .route("/providers/:id/status", patch(providers::update_status))
        .route("/providers/:id/services/sync", post(providers::sync_services))
        .route("/payouts", get(payouts::list))
        .route("/payouts/stats", get(payouts::stats))
        .route("/payouts/:id", get(payouts::get))
        .route("/payouts/:id/status", patch(payouts::update_status))
        .route("/payouts/:id/process", post(payouts::process))
        .route("/payouts/:id/notes", post(payouts::add_note))
        .route("/dashboard", get(dashboard::summary))
        .route("/storage/status", get(storage::status))
        .route("/storage/sync", post(storage::sync))
        .route("/storage/primary", post(storage::switch_primary));

    Router::new()
        .nest("/services", service_routes)
        .nest("/provider-services", provider_service_routes)
        .nest("/bookings", booking_routes)
        .nest("/users", user_routes)
        .nest("/admin", admin_routes)
}

/// Build the full application router: infrastructure, `/api` and Swagger UI.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest("/api", api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
