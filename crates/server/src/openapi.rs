use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ServiceDraftDoc {
    pub title: String,
    pub description: Option<String>,
    /// One of the catalogue categories, e.g. `plumbing`
    pub category: String,
    pub price: f64,
    /// Minutes
    pub duration: u32,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub provider_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ServicePatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<u32>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ReviewDraftDoc {
    pub client_id: Uuid,
    pub booking_id: Option<Uuid>,
    /// 1..=5
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProviderServicePatchDoc {
    pub is_active: Option<bool>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct ScheduleDoc {
    /// `YYYY-MM-DD`
    pub date: String,
    pub time: String,
}

#[derive(ToSchema)]
pub struct LocationDoc {
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct BookingDraftDoc {
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub schedule: ScheduleDoc,
    pub location: LocationDoc,
    pub notes: Option<String>,
}

#[derive(ToSchema)]
pub struct StatusUpdateDoc {
    /// pending, confirmed, in-progress, completed or cancelled
    pub status: String,
    pub reason: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserDraftDoc {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// client or provider
    pub user_type: String,
    pub provider_profile: Option<ProviderProfileDoc>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ProviderProfileDoc {
    pub skills: Vec<String>,
    pub bio: Option<String>,
}

#[derive(ToSchema)]
pub struct ProviderStatusDoc {
    /// pending, under_review, approved, rejected or suspended
    pub status: String,
}

#[derive(ToSchema)]
pub struct PayoutStatusDoc {
    /// pending, ready, completed, cancelled or failed
    pub status: String,
    pub note: Option<String>,
}

#[derive(ToSchema)]
pub struct NoteDoc { pub note: String }

#[derive(ToSchema)]
pub struct PrimaryDoc {
    /// postgres or file
    pub primary: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::services::list,
        crate::routes::services::categories,
        crate::routes::services::stats,
        crate::routes::services::popular,
        crate::routes::services::get,
        crate::routes::services::create,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::services::reviews,
        crate::routes::services::add_review,
        crate::routes::provider_services::list,
        crate::routes::provider_services::get,
        crate::routes::provider_services::update,
        crate::routes::bookings::create,
        crate::routes::bookings::list,
        crate::routes::bookings::stats,
        crate::routes::bookings::get,
        crate::routes::bookings::update_status,
        crate::routes::bookings::escrow,
        crate::routes::users::register,
        crate::routes::users::get,
        crate::routes::users::update_provider_profile,
        crate::routes::providers::list,
        crate::routes::providers::update_status,
        crate::routes::providers::sync_services,
        crate::routes::payouts::list,
        crate::routes::payouts::stats,
        crate::routes::payouts::get,
        crate::routes::payouts::update_status,
        crate::routes::payouts::process,
        crate::routes::payouts::add_note,
        crate::routes::dashboard::summary,
        crate::routes::storage::status,
        crate::routes::storage::sync,
        crate::routes::storage::switch_primary,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceDraftDoc,
            ServicePatchDoc,
            ReviewDraftDoc,
            ProviderServicePatchDoc,
            ScheduleDoc,
            LocationDoc,
            BookingDraftDoc,
            StatusUpdateDoc,
            UserDraftDoc,
            ProviderProfileDoc,
            ProviderStatusDoc,
            PayoutStatusDoc,
            NoteDoc,
            PrimaryDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "services"),
        (name = "provider-services"),
        (name = "bookings"),
        (name = "users"),
        (name = "admin"),
        (name = "storage")
    )
)]
pub struct ApiDoc;
