use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::MarketplaceConfig;
use serde_json::{json, Value};
use server::{startup::build_app, AppState};
use service::{
    dual_write::RoutingConfig,
    runtime::{in_memory_marketplace, InMemoryMarketplace},
};
use tower::ServiceExt;

fn live() -> (Router, InMemoryMarketplace) {
    let handles = in_memory_marketplace(RoutingConfig::default(), MarketplaceConfig::default());
    let app = build_app(AppState::live(handles.marketplace.clone()));
    (app, handles)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let res = app.clone().oneshot(req).await?;
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, value))
}

fn service_body(title: &str, provider_id: Option<&str>) -> Value {
    json!({
        "title": title,
        "description": "Fix leaking taps and pipes",
        "category": "plumbing",
        "price": 15000.0,
        "duration": 90,
        "tags": ["pipes"],
        "providerId": provider_id,
    })
}

fn booking_body(service_id: &str) -> Value {
    json!({
        "clientId": "7b0c7f5e-0c39-4d4f-9f3e-1a2b3c4d5e6f",
        "serviceId": service_id,
        "schedule": { "date": "2024-06-01", "time": "10:00" },
        "location": { "address": "12 Allen Avenue", "city": "Lagos" },
    })
}

async fn create_service(app: &Router, title: &str, provider_id: Option<&str>) -> anyhow::Result<String> {
    let (status, body) = send(app, "POST", "/api/services", Some(service_body(title, provider_id))).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    Ok(body["data"]["id"].as_str().unwrap_or_default().to_string())
}

async fn set_booking_status(app: &Router, id: &str, status: &str) -> anyhow::Result<StatusCode> {
    let (code, _) = send(app, "PATCH", &format!("/api/bookings/{id}/status"), Some(json!({ "status": status }))).await?;
    Ok(code)
}

#[tokio::test]
async fn health_is_ok() -> anyhow::Result<()> {
    let (app, _) = live();
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn unknown_category_is_rejected() -> anyhow::Result<()> {
    let (app, _) = live();
    let mut body = service_body("Roof repair", None);
    body["category"] = json!("roofing");
    let (status, body) = send(&app, "POST", "/api/services", Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap_or_default().contains("roofing"));

    let (status, _) = send(&app, "GET", "/api/services?category=roofing", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_requests_get_the_error_envelope() -> anyhow::Result<()> {
    let (app, _) = live();
    let mut body = service_body("Tap fitting", None);
    body.as_object_mut().map(|o| o.remove("price"));
    let (status, body) = send(&app, "POST", "/api/services", Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap_or_default().contains("price"), "{body}");

    let (status, body) = send(&app, "GET", "/api/services/not-a-uuid", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, body) = send(&app, "GET", "/api/bookings?page=first", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let req = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let res = app.clone().oneshot(req).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["status"], "error");
    Ok(())
}

#[tokio::test]
async fn second_page_holds_the_remainder() -> anyhow::Result<()> {
    let (app, _) = live();
    for i in 0..15 {
        create_service(&app, &format!("Plumbing job {i}"), None).await?;
    }
    let (status, body) = send(&app, "GET", "/api/services?page=2&limit=10", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["data"]["pagination"]["total"], 15);
    assert_eq!(body["data"]["pagination"]["pages"], 2);
    Ok(())
}

#[tokio::test]
async fn search_and_price_filters_apply() -> anyhow::Result<()> {
    let (app, _) = live();
    create_service(&app, "Kitchen sink", None).await?;
    let mut cheap = service_body("House cleaning", None);
    cheap["category"] = json!("cleaning");
    cheap["price"] = json!(5000.0);
    cheap["description"] = json!("Two bedroom flat");
    send(&app, "POST", "/api/services", Some(cheap)).await?;

    let (_, body) = send(&app, "GET", "/api/services?search=SINK", None).await?;
    assert_eq!(body["data"]["pagination"]["total"], 1);
    let (_, body) = send(&app, "GET", "/api/services?maxPrice=6000", None).await?;
    assert_eq!(body["data"]["items"][0]["title"], "House cleaning");
    let (_, body) = send(&app, "GET", "/api/services?category=all", None).await?;
    assert_eq!(body["data"]["pagination"]["total"], 2);
    Ok(())
}

#[tokio::test]
async fn delete_waits_for_active_bookings() -> anyhow::Result<()> {
    let (app, _) = live();
    let service_id = create_service(&app, "Burst pipe", None).await?;
    let (status, booking) = send(&app, "POST", "/api/bookings", Some(booking_body(&service_id))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let booking_id = booking["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(&app, "DELETE", &format!("/api/services/{service_id}"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(set_booking_status(&app, &booking_id, "cancelled").await?, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/api/services/{service_id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/api/services/{service_id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn completed_booking_creates_a_payout() -> anyhow::Result<()> {
    let (app, _) = live();
    let provider = "0d9b5f0a-9a4e-4c5b-8d6e-2f3a4b5c6d7e";
    let service_id = create_service(&app, "Water heater", Some(provider)).await?;
    let (_, booking) = send(&app, "POST", "/api/bookings", Some(booking_body(&service_id))).await?;
    assert_eq!(booking["data"]["pricing"]["total"], 15000.0);
    let booking_id = booking["data"]["id"].as_str().unwrap_or_default().to_string();

    assert_eq!(set_booking_status(&app, &booking_id, "completed").await?, StatusCode::BAD_REQUEST);
    for next in ["confirmed", "in-progress", "completed"] {
        assert_eq!(set_booking_status(&app, &booking_id, next).await?, StatusCode::OK, "{next}");
    }
    let (status, escrow) = send(&app, "GET", &format!("/api/bookings/{booking_id}/escrow"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(escrow["data"]["status"], "released");

    let (_, payouts) = send(&app, "GET", &format!("/api/admin/payouts?providerId={provider}"), None).await?;
    assert_eq!(payouts["data"]["pagination"]["total"], 1);
    let payout = &payouts["data"]["items"][0];
    assert_eq!(payout["status"], "pending");
    assert_eq!(payout["amount"], 13500.0);

    let (_, stats) = send(&app, "GET", "/api/bookings/stats", None).await?;
    assert_eq!(stats["data"]["byStatus"]["completed"], 1);
    assert_eq!(stats["data"]["completedRevenue"], 15000.0);
    let (_, service) = send(&app, "GET", &format!("/api/services/{service_id}"), None).await?;
    assert_eq!(service["data"]["bookingCount"], 1);
    Ok(())
}

#[tokio::test]
async fn processed_payout_is_frozen() -> anyhow::Result<()> {
    let (app, _) = live();
    let provider = "5e6f7a8b-1c2d-4e3f-9a0b-c1d2e3f4a5b6";
    let service_id = create_service(&app, "Gas leak", Some(provider)).await?;
    let (_, booking) = send(&app, "POST", "/api/bookings", Some(booking_body(&service_id))).await?;
    let booking_id = booking["data"]["id"].as_str().unwrap_or_default().to_string();
    for next in ["confirmed", "in-progress", "completed"] {
        set_booking_status(&app, &booking_id, next).await?;
    }
    let (_, payouts) = send(&app, "GET", "/api/admin/payouts", None).await?;
    let payout_id = payouts["data"]["items"][0]["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(&app, "POST", &format!("/api/admin/payouts/{payout_id}/notes"), Some(json!({ "note": "bank verified" }))).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, processed) = send(&app, "POST", &format!("/api/admin/payouts/{payout_id}/process"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(processed["data"]["status"], "completed");
    assert!(processed["data"]["reference"].as_str().unwrap_or_default().starts_with("PO-"));

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/admin/payouts/{payout_id}/status"),
        Some(json!({ "status": "cancelled" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, stats) = send(&app, "GET", "/api/admin/payouts/stats", None).await?;
    assert_eq!(stats["data"]["byStatus"]["completed"]["count"], 1);
    Ok(())
}

#[tokio::test]
async fn reviews_update_the_rating() -> anyhow::Result<()> {
    let (app, _) = live();
    let service_id = create_service(&app, "Drain unblocking", None).await?;
    let uri = format!("/api/services/{service_id}/reviews");
    for rating in [5, 4] {
        let review = json!({ "clientId": "7b0c7f5e-0c39-4d4f-9f3e-1a2b3c4d5e6f", "rating": rating });
        let (status, _) = send(&app, "POST", &uri, Some(review)).await?;
        assert_eq!(status, StatusCode::CREATED);
    }
    let bad = json!({ "clientId": "7b0c7f5e-0c39-4d4f-9f3e-1a2b3c4d5e6f", "rating": 6 });
    assert_eq!(send(&app, "POST", &uri, Some(bad)).await?.0, StatusCode::BAD_REQUEST);

    let (_, reviews) = send(&app, "GET", &uri, None).await?;
    assert_eq!(reviews["data"].as_array().map(Vec::len), Some(2));
    let (_, service) = send(&app, "GET", &format!("/api/services/{service_id}"), None).await?;
    assert_eq!(service["data"]["rating"]["average"], 4.5);
    assert_eq!(service["data"]["rating"]["count"], 2);
    assert_eq!(service["data"]["isPopular"], false);
    Ok(())
}

#[tokio::test]
async fn provider_approval_materialises_services() -> anyhow::Result<()> {
    let (app, _) = live();
    let draft = json!({
        "name": "Ada Obi",
        "email": "Ada@Example.com",
        "userType": "provider",
        "providerProfile": { "skills": ["Plumbing", "Electrical wiring", "plumbing"] },
    });
    let (status, user) = send(&app, "POST", "/api/users", Some(draft.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["data"]["providerStatus"], "pending");
    let id = user["data"]["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = send(&app, "POST", "/api/users", Some(draft)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", &format!("/api/admin/providers/{id}/services/sync"), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, change) = send(
        &app,
        "PATCH",
        &format!("/api/admin/providers/{id}/status"),
        Some(json!({ "status": "approved" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(change["data"]["previousStatus"], "pending");
    assert_eq!(change["data"]["createdServices"].as_array().map(Vec::len), Some(2));

    let (_, listed) = send(&app, "GET", &format!("/api/provider-services?providerId={id}"), None).await?;
    assert_eq!(listed["data"]["pagination"]["total"], 2);
    let (_, synced) = send(&app, "POST", &format!("/api/admin/providers/{id}/services/sync"), None).await?;
    assert_eq!(synced["data"].as_array().map(Vec::len), Some(0));

    let (_, providers) = send(&app, "GET", "/api/admin/providers?status=approved", None).await?;
    assert_eq!(providers["data"]["pagination"]["total"], 1);
    let (_, dashboard) = send(&app, "GET", "/api/admin/dashboard", None).await?;
    assert_eq!(dashboard["data"]["providersByStatus"]["approved"], 1);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_self_register() -> anyhow::Result<()> {
    let (app, _) = live();
    let draft = json!({ "name": "Root", "email": "root@example.com", "userType": "admin" });
    let (status, _) = send(&app, "POST", "/api/users", Some(draft)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn storage_primary_switch() -> anyhow::Result<()> {
    let (app, _) = live();
    let (status, _) = send(&app, "POST", "/api/admin/storage/primary", Some(json!({ "primary": "mongodb" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, report) = send(&app, "POST", "/api/admin/storage/primary", Some(json!({ "primary": "FILE" }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["previous"], "postgres");
    assert_eq!(report["data"]["primary"], "file");

    let (_, status_body) = send(&app, "GET", "/api/admin/storage/status", None).await?;
    assert_eq!(status_body["data"]["primary"], "file");
    assert_eq!(status_body["data"]["secondary"], "postgres");
    Ok(())
}

#[tokio::test]
async fn secondary_outage_is_replayed_by_sync() -> anyhow::Result<()> {
    let (app, handles) = live();
    handles.file.set_unavailable(true);
    let service_id = create_service(&app, "Shower install", None).await?;

    let (_, status_body) = send(&app, "GET", "/api/admin/storage/status", None).await?;
    assert_eq!(status_body["data"]["pendingSyncErrors"], 1);

    handles.file.set_unavailable(false);
    let (status, report) = send(&app, "POST", "/api/admin/storage/sync", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["resolved"], 1);
    assert_eq!(report["data"]["failed"], 0);

    handles.postgres.set_unavailable(true);
    let (status, body) = send(&app, "GET", &format!("/api/services/{service_id}"), None).await?;
    assert_eq!(status, StatusCode::OK, "fallback read from the mirror: {body}");
    Ok(())
}

#[tokio::test]
async fn primary_outage_answers_unavailable() -> anyhow::Result<()> {
    let (app, handles) = live();
    handles.postgres.set_unavailable(true);
    let (status, body) = send(&app, "POST", "/api/services", Some(service_body("Boiler", None))).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    Ok(())
}

#[tokio::test]
async fn mock_mode_serves_reads_only() -> anyhow::Result<()> {
    let app = build_app(AppState::mock());
    let (status, body) = send(&app, "GET", "/api/services", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 14);

    let (status, body) = send(&app, "GET", "/api/services/categories", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(11));

    let (status, _) = send(&app, "GET", "/api/provider-services", None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/api/services", Some(service_body("Mock write", None))).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let (status, _) = send(&app, "GET", "/api/bookings", None).await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}

#[tokio::test]
async fn metrics_and_docs_are_served() -> anyhow::Result<()> {
    let (app, _) = live();
    create_service(&app, "Metered", None).await?;
    let res = app.clone().oneshot(Request::builder().uri("/metrics").body(Body::empty())?).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    assert!(String::from_utf8_lossy(&bytes).contains("solutil_dual_writes_total"));

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/api/services"].is_object());
    Ok(())
}
