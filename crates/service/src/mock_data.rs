//! Static catalogue served when the server starts without a database.

use chrono::{DateTime, Utc};
use models::{
    category::Category,
    provider_service::{ProviderService, ServiceSource},
    rating::{is_popular, Rating},
    service::Service,
};
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::{
    catalog::POPULAR_LIMIT,
    errors::ServiceError,
    pagination::Page,
    query::ListingQuery,
    stats::{self, CategoryInfo, ServiceStats},
};

const BASE_TS: i64 = 1_704_067_200; // 2024-01-01T00:00:00Z

fn ts(offset_days: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_TS + offset_days * 86_400, 0).unwrap_or_default()
}

fn provider(n: u128) -> Uuid {
    Uuid::from_u128(0x5000_0000_0000_0000_0000_0000_0000_0000 + n)
}

#[allow(clippy::too_many_arguments)]
fn service(
    n: u128,
    title: &str,
    description: &str,
    category: Category,
    price: f64,
    duration: u32,
    rating: (f64, u32),
    booking_count: u32,
    tags: &[&str],
) -> Service {
    let rating = Rating { average: rating.0, count: rating.1 };
    Service {
        id: Uuid::from_u128(0x1000_0000_0000_0000_0000_0000_0000_0000 + n),
        title: title.into(),
        description: description.into(),
        category,
        price,
        duration,
        images: Vec::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        provider_id: Some(provider(n % 3)),
        is_active: true,
        rating,
        booking_count,
        is_popular: is_popular(&rating, booking_count),
        created_at: ts(n as i64),
        updated_at: ts(n as i64),
    }
}

static SERVICES: Lazy<Vec<Service>> = Lazy::new(|| {
    vec![
        service(1, "Leak detection and repair", "Find and fix leaking pipes and taps", Category::Plumbing, 15_000.0, 90, (4.8, 36), 52, &["pipes", "leak"]),
        service(2, "Water heater installation", "Install or replace electric water heaters", Category::Plumbing, 25_000.0, 120, (4.4, 12), 18, &["heater"]),
        service(3, "House rewiring", "Full or partial rewiring of residential buildings", Category::Electrical, 80_000.0, 480, (4.7, 21), 14, &["wiring"]),
        service(4, "Inverter setup", "Inverter and battery installation", Category::Electrical, 30_000.0, 180, (4.2, 9), 7, &["power", "solar"]),
        service(5, "Deep home cleaning", "Top-to-bottom cleaning for apartments and duplexes", Category::Cleaning, 20_000.0, 240, (4.9, 58), 120, &["move-out", "deep clean"]),
        service(6, "Office cleaning", "Daily or weekly office cleaning", Category::Cleaning, 35_000.0, 300, (4.3, 15), 22, &["office"]),
        service(7, "Custom wardrobe", "Built-in wardrobes made to measure", Category::Carpentry, 150_000.0, 960, (4.6, 8), 9, &["furniture"]),
        service(8, "Interior painting", "Walls and ceilings, paint supplied on request", Category::Painting, 45_000.0, 480, (4.5, 19), 25, &["walls"]),
        service(9, "AC servicing", "Split unit cleaning and gas top-up", Category::Hvac, 12_000.0, 60, (4.6, 40), 75, &["air conditioner"]),
        service(10, "Fridge repair", "Diagnosis and repair of refrigerators and freezers", Category::ApplianceRepair, 10_000.0, 90, (4.1, 11), 13, &["fridge"]),
        service(11, "Fumigation", "Residential pest control treatment", Category::PestControl, 18_000.0, 120, (4.7, 27), 31, &["termites", "cockroaches"]),
        service(12, "Lawn care", "Mowing, edging and hedge trimming", Category::Landscaping, 8_000.0, 120, (4.0, 6), 5, &["garden"]),
        service(13, "Home relocation", "Packing, loading and moving within the city", Category::Moving, 95_000.0, 600, (4.4, 10), 12, &["relocation"]),
        service(14, "Handyman hour", "Small fixes around the house", Category::Other, 5_000.0, 60, (0.0, 0), 0, &["odd jobs"]),
    ]
});

static PROVIDER_SERVICES: Lazy<Vec<ProviderService>> = Lazy::new(|| {
    SERVICES
        .iter()
        .take(6)
        .enumerate()
        .map(|(i, s)| ProviderService {
            id: Uuid::from_u128(0x2000_0000_0000_0000_0000_0000_0000_0000 + i as u128),
            provider_id: s.provider_id.unwrap_or_else(|| provider(0)),
            title: s.title.clone(),
            description: s.description.clone(),
            category: s.category,
            price: s.price,
            duration: s.duration,
            images: Vec::new(),
            tags: s.tags.clone(),
            is_active: true,
            rating: s.rating,
            booking_count: s.booking_count,
            is_popular: s.is_popular,
            source: ServiceSource::Profile,
            created_at: s.created_at,
            updated_at: s.updated_at,
        })
        .collect()
});

/// Read-only catalogue used in place of the stores.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockDataService;

impl MockDataService {
    pub fn new() -> Self {
        Self
    }

    fn services(&self) -> Vec<Service> {
        let mut out = SERVICES.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub fn list_services(&self, query: &ListingQuery) -> Result<Page<Service>, ServiceError> {
        Ok(query.pagination().apply(query.filter(self.services())?))
    }

    pub fn get_service(&self, id: Uuid) -> Result<Service, ServiceError> {
        SERVICES.iter().find(|s| s.id == id).cloned().ok_or_else(|| ServiceError::not_found("service"))
    }

    pub fn categories(&self) -> Vec<CategoryInfo> {
        stats::categories(SERVICES.as_slice())
    }

    pub fn stats(&self) -> ServiceStats {
        stats::service_stats(SERVICES.as_slice())
    }

    pub fn popular(&self, limit: Option<usize>) -> Vec<Service> {
        stats::popular(self.services(), limit.unwrap_or(POPULAR_LIMIT).clamp(1, 100))
    }

    pub fn list_provider_services(&self, query: &ListingQuery) -> Result<Page<ProviderService>, ServiceError> {
        Ok(query.pagination().apply(query.filter(PROVIDER_SERVICES.clone())?))
    }

    pub fn get_provider_service(&self, id: Uuid) -> Result<ProviderService, ServiceError> {
        PROVIDER_SERVICES
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("provider service"))
    }
}
