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

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub price: f64,
    /// Minutes.
    pub duration: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<Uuid>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub booking_count: u32,
    #[serde(default)]
    pub is_popular: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Service {
    const COLLECTION: &'static str = "services";

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

impl Listing for Service {
    fn title(&self) -> &str { &self.title }
    fn description(&self) -> &str { &self.description }
    fn tags(&self) -> &[String] { &self.tags }
    fn category(&self) -> Category { self.category }
    fn price(&self) -> f64 { self.price }
    fn is_active(&self) -> bool { self.is_active }
    fn provider_id(&self) -> Option<Uuid> { self.provider_id }
    fn rating(&self) -> Rating { self.rating }
    fn is_popular(&self) -> bool { self.is_popular }
}

/// Payload for creating a service. The category arrives as text so an
/// unknown value is reported as a validation error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: f64,
    pub duration: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub provider_id: Option<Uuid>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ServiceDraft {
    pub fn into_service(self, now: DateTime<Utc>) -> Result<Service, ModelError> {
        let category = self.category.parse()?;
        let mut service = Service {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description,
            category,
            price: self.price,
            duration: self.duration,
            images: self.images,
            tags: self.tags,
            provider_id: self.provider_id,
            is_active: self.is_active.unwrap_or(true),
            rating: Rating::default(),
            booking_count: 0,
            is_popular: false,
            created_at: now,
            updated_at: now,
        };
        service.before_save()?;
        Ok(service)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub duration: Option<u32>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

impl ServicePatch {
    pub fn apply(self, service: &mut Service) -> Result<(), ModelError> {
        if let Some(category) = self.category {
            service.category = category.parse()?;
        }
        if let Some(title) = self.title {
            service.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            service.description = description;
        }
        if let Some(price) = self.price {
            service.price = price;
        }
        if let Some(duration) = self.duration {
            service.duration = duration;
        }
        if let Some(images) = self.images {
            service.images = images;
        }
        if let Some(tags) = self.tags {
            service.tags = tags;
        }
        if let Some(active) = self.is_active {
            service.is_active = active;
        }
        Ok(())
    }
}
