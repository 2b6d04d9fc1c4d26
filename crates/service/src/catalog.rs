use std::sync::Arc;

use chrono::Utc;
use models::{
    booking::Booking,
    rating::Rating,
    review::{Review, ReviewDraft},
    service::{Service, ServiceDraft, ServicePatch},
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    dual_write::DualWriteStrategy,
    errors::ServiceError,
    pagination::Page,
    query::ListingQuery,
    repository::Repository,
    stats::{self, CategoryInfo, ServiceStats},
};

pub const POPULAR_LIMIT: usize = 10;

/// Service catalogue: listings, reviews and the booking-count bookkeeping.
#[derive(Clone)]
pub struct ServiceCatalog {
    services: Repository<Service>,
    reviews: Repository<Review>,
    bookings: Repository<Booking>,
}

impl ServiceCatalog {
    pub fn new(strategy: Arc<DualWriteStrategy>) -> Self {
        Self {
            services: Repository::new(strategy.clone()),
            reviews: Repository::new(strategy.clone()),
            bookings: Repository::new(strategy),
        }
    }

    pub async fn list(&self, query: &ListingQuery) -> Result<Page<Service>, ServiceError> {
        let items = query.filter(self.services.all().await?)?;
        Ok(query.pagination().apply(items))
    }

    pub async fn categories(&self) -> Result<Vec<CategoryInfo>, ServiceError> {
        Ok(stats::categories(&self.services.all().await?))
    }

    pub async fn stats(&self) -> Result<ServiceStats, ServiceError> {
        Ok(stats::service_stats(&self.services.all().await?))
    }

    pub async fn popular(&self, limit: Option<usize>) -> Result<Vec<Service>, ServiceError> {
        Ok(stats::popular(self.services.all().await?, limit.unwrap_or(POPULAR_LIMIT).clamp(1, 100)))
    }

    pub async fn get(&self, id: Uuid) -> Result<Service, ServiceError> {
        self.services.find(id, "service").await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: ServiceDraft) -> Result<Service, ServiceError> {
        let service = self.services.insert(draft.into_service(Utc::now())?).await?;
        info!(service_id = %service.id, category = %service.category, "service created");
        Ok(service)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: ServicePatch) -> Result<Service, ServiceError> {
        let mut service = self.get(id).await?;
        patch.apply(&mut service)?;
        self.services.save(service).await
    }

    /// Refuses while pending, confirmed or in-progress bookings reference the service.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get(id).await?;
        let active = self
            .bookings
            .find_where(|b| b.service_id == id && b.status.is_active())
            .await?
            .len();
        if active > 0 {
            return Err(ServiceError::validation(format!(
                "service has {active} active booking(s) and cannot be deleted"
            )));
        }
        if !self.services.delete(id).await? {
            return Err(ServiceError::not_found("service"));
        }
        info!(service_id = %id, "service deleted");
        Ok(())
    }

    pub async fn reviews(&self, service_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        self.get(service_id).await?;
        self.reviews.find_where(|r| r.service_id == service_id).await
    }

    /// Store a review and recompute the service's rating aggregate.
    #[instrument(skip(self, draft))]
    pub async fn add_review(&self, service_id: Uuid, draft: ReviewDraft) -> Result<Review, ServiceError> {
        let mut service = self.get(service_id).await?;
        let review = self.reviews.insert(draft.into_review(service_id, Utc::now())?).await?;
        let scores = self.reviews.find_where(|r| r.service_id == service_id).await?;
        service.rating = Rating::from_scores(scores.iter().map(|r| r.rating));
        self.services.save(service).await?;
        Ok(review)
    }

    /// Bump the booking count; saving recomputes popularity.
    pub async fn record_booking(&self, service_id: Uuid) -> Result<Service, ServiceError> {
        let mut service = self.get(service_id).await?;
        service.booking_count += 1;
        self.services.save(service).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dual_write::RoutingConfig, test_support::memory_pair};
    use models::category::Category;

    pub(crate) fn draft(title: &str, category: &str) -> ServiceDraft {
        ServiceDraft {
            title: title.into(),
            description: "desc".into(),
            category: category.into(),
            price: 2500.0,
            duration: 60,
            images: vec![],
            tags: vec![],
            provider_id: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let catalog = ServiceCatalog::new(memory_pair(RoutingConfig::default()).strategy);
        let err = catalog.create(draft("Horoscope", "astrology")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
    }

    #[tokio::test]
    async fn reviews_update_rating_and_popularity() -> Result<(), ServiceError> {
        let catalog = ServiceCatalog::new(memory_pair(RoutingConfig::default()).strategy);
        let s = catalog.create(draft("Repaint", "painting")).await?;
        for _ in 0..10 {
            catalog.record_booking(s.id).await?;
        }
        for rating in [5, 4] {
            catalog
                .add_review(s.id, ReviewDraft { client_id: Uuid::new_v4(), booking_id: None, rating, comment: None })
                .await?;
        }
        let s = catalog.get(s.id).await?;
        assert_eq!(s.rating, Rating { average: 4.5, count: 2 });
        assert_eq!(s.booking_count, 10);
        assert!(s.is_popular);
        assert_eq!(catalog.popular(None).await?.len(), 1);
        assert_eq!(catalog.reviews(s.id).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn pagination_second_page() -> Result<(), ServiceError> {
        let catalog = ServiceCatalog::new(memory_pair(RoutingConfig::default()).strategy);
        for i in 0..15 {
            catalog.create(draft(&format!("Job {i}"), "cleaning")).await?;
        }
        let page = catalog.list(&ListingQuery { page: Some(2), limit: Some(10), ..Default::default() }).await?;
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.pagination.pages, 2);
        assert_eq!(page.pagination.total, 15);
        Ok(())
    }

    #[tokio::test]
    async fn update_applies_partial_patch() -> Result<(), ServiceError> {
        let catalog = ServiceCatalog::new(memory_pair(RoutingConfig::default()).strategy);
        let s = catalog.create(draft("Fan repair", "electrical")).await?;
        let patch = ServicePatch { category: Some("hvac".into()), price: Some(4000.0), ..Default::default() };
        let updated = catalog.update(s.id, patch).await?;
        assert_eq!(updated.category, Category::Hvac);
        assert_eq!(updated.price, 4000.0);
        assert_eq!(updated.title, "Fan repair");
        Ok(())
    }
}
