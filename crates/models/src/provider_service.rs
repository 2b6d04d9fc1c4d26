use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    category::Category,
    errors::ModelError,
    listing::{validate_catalogue_fields, Listing},
    rating::{is_popular, Rating},
    Document,
};

/// Where a provider service was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceSource {
    Profile,
    Onboarding,
    Skill,
}

pub const DEFAULT_PRICE: f64 = 0.0;
pub const DEFAULT_DURATION: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderService {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub price: f64,
    pub duration: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: bool,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub booking_count: u32,
    #[serde(default)]
    pub is_popular: bool,
    pub source: ServiceSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProviderService {
    pub fn new(
        provider_id: Uuid,
        title: &str,
        category: Category,
        source: ServiceSource,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider_id,
            title: title.trim().to_string(),
            description: String::new(),
            category,
            price: DEFAULT_PRICE,
            duration: DEFAULT_DURATION,
            images: Vec::new(),
            tags: Vec::new(),
            is_active: true,
            rating: Rating::default(),
            booking_count: 0,
            is_popular: false,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Identity used to skip duplicates: lowercase title plus category.
    pub fn dedup_key(&self) -> (String, Category) {
        (self.title.to_lowercase(), self.category)
    }
}

impl Document for ProviderService {
    const COLLECTION: &'static str = "provider_services";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn before_save(&mut self) -> Result<(), ModelError> {
        validate_catalogue_fields(&self.title, self.price, self.duration)?;
        self.rating.validate()?;
        self.is_popular = is_popular(&self.rating, self.booking_count);
        Ok(())
    }
}

impl Listing for ProviderService {
    fn title(&self) -> &str { &self.title }
    fn description(&self) -> &str { &self.description }
    fn tags(&self) -> &[String] { &self.tags }
    fn category(&self) -> Category { self.category }
    fn price(&self) -> f64 { self.price }
    fn is_active(&self) -> bool { self.is_active }
    fn provider_id(&self) -> Option<Uuid> { Some(self.provider_id) }
    fn rating(&self) -> Rating { self.rating }
    fn is_popular(&self) -> bool { self.is_popular }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderServicePatch {
    pub is_active: Option<bool>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl ProviderServicePatch {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.price.is_none() && self.description.is_none()
    }

    pub fn apply(self, service: &mut ProviderService) {
        if let Some(active) = self.is_active {
            service.is_active = active;
        }
        if let Some(price) = self.price {
            service.price = price;
        }
        if let Some(description) = self.description {
            service.description = description;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let ps = ProviderService::new(Uuid::new_v4(), " Tiling ", Category::Other, ServiceSource::Skill, Utc::now());
        assert_eq!(ps.title, "Tiling");
        assert_eq!(ps.price, DEFAULT_PRICE);
        assert_eq!(ps.duration, DEFAULT_DURATION);
        assert!(ps.is_active);
    }

    #[test]
    fn dedup_key_ignores_case() {
        let p = Uuid::new_v4();
        let a = ProviderService::new(p, "Deep Clean", Category::Cleaning, ServiceSource::Profile, Utc::now());
        let b = ProviderService::new(p, "deep clean", Category::Cleaning, ServiceSource::Skill, Utc::now());
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn patch_rejects_negative_price_on_save() {
        let mut ps = ProviderService::new(Uuid::new_v4(), "Wiring", Category::Electrical, ServiceSource::Profile, Utc::now());
        ProviderServicePatch { price: Some(-5.0), ..Default::default() }.apply(&mut ps);
        assert!(ps.before_save().is_err());
    }
}
