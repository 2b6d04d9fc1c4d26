use uuid::Uuid;

use crate::{category::Category, rating::Rating, Document};

/// Catalogue-shaped documents: services and provider services.
pub trait Listing: Document {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn tags(&self) -> &[String];
    fn category(&self) -> Category;
    fn price(&self) -> f64;
    fn is_active(&self) -> bool;
    fn provider_id(&self) -> Option<Uuid>;
    fn rating(&self) -> Rating;
    fn is_popular(&self) -> bool;

    /// Case-insensitive substring match over title, description and tags.
    fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title().to_lowercase().contains(&needle)
            || self.description().to_lowercase().contains(&needle)
            || self.tags().iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

pub(crate) fn validate_catalogue_fields(title: &str, price: f64, duration: u32) -> Result<(), crate::ModelError> {
    if title.trim().is_empty() {
        return Err(crate::ModelError::validation("title must not be empty"));
    }
    if !price.is_finite() || price < 0.0 {
        return Err(crate::ModelError::validation("price must be >= 0"));
    }
    if duration == 0 {
        return Err(crate::ModelError::validation("duration must be > 0 minutes"));
    }
    Ok(())
}
