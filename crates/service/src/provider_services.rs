use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use models::{
    category::Category,
    provider_service::{ProviderService, ProviderServicePatch, ServiceSource, DEFAULT_DURATION, DEFAULT_PRICE},
    user::{OfferedService, User},
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    dual_write::DualWriteStrategy, errors::ServiceError, pagination::Page, query::ListingQuery,
    repository::Repository,
};

#[derive(Clone)]
pub struct ProviderServiceManager {
    services: Repository<ProviderService>,
}

fn from_offered(provider_id: Uuid, offered: &OfferedService, source: ServiceSource, now: chrono::DateTime<Utc>) -> ProviderService {
    let category = offered
        .category
        .as_deref()
        .and_then(|c| c.parse().ok())
        .unwrap_or_else(|| Category::from_skill(&offered.title));
    let mut ps = ProviderService::new(provider_id, &offered.title, category, source, now);
    ps.description = offered.description.clone().unwrap_or_default();
    ps.price = offered.price.unwrap_or(DEFAULT_PRICE);
    ps.duration = offered.duration.filter(|d| *d > 0).unwrap_or(DEFAULT_DURATION);
    ps
}

/// Candidate listings for a provider: profile services, else onboarding
/// services, else one listing per skill.
fn candidates(user: &User, now: chrono::DateTime<Utc>) -> Vec<ProviderService> {
    let profile = user.provider_profile.as_ref();
    if let Some(services) = profile.map(|p| &p.services).filter(|s| !s.is_empty()) {
        return services.iter().map(|o| from_offered(user.id, o, ServiceSource::Profile, now)).collect();
    }
    if let Some(services) = user.onboarding_data.as_ref().map(|o| &o.services).filter(|s| !s.is_empty()) {
        return services.iter().map(|o| from_offered(user.id, o, ServiceSource::Onboarding, now)).collect();
    }
    profile
        .map(|p| {
            p.skills
                .iter()
                .filter(|s| !s.trim().is_empty())
                .map(|s| ProviderService::new(user.id, s, Category::from_skill(s), ServiceSource::Skill, now))
                .collect()
        })
        .unwrap_or_default()
}

impl ProviderServiceManager {
    pub fn new(strategy: Arc<DualWriteStrategy>) -> Self {
        Self { services: Repository::new(strategy) }
    }

    /// Create listings for an approved provider, skipping (title, category)
    /// pairs that already exist. Returns only the newly created listings.
    #[instrument(skip(self, provider), fields(provider_id = %provider.id))]
    pub async fn materialize(&self, provider: &User) -> Result<Vec<ProviderService>, ServiceError> {
        if !provider.is_approved_provider() {
            return Err(ServiceError::validation("provider services require an approved provider"));
        }
        let mut seen: HashSet<(String, Category)> = self
            .services
            .find_where(|s| s.provider_id == provider.id)
            .await?
            .iter()
            .map(ProviderService::dedup_key)
            .collect();

        let mut created = Vec::new();
        for candidate in candidates(provider, Utc::now()) {
            if !seen.insert(candidate.dedup_key()) {
                debug!(title = %candidate.title, "provider service already exists, skipping");
                continue;
            }
            created.push(self.services.insert(candidate).await?);
        }
        info!(count = created.len(), "provider services materialized");
        Ok(created)
    }

    pub async fn list(&self, query: &ListingQuery) -> Result<Page<ProviderService>, ServiceError> {
        let items = query.filter(self.services.all().await?)?;
        Ok(query.pagination().apply(items))
    }

    pub async fn all(&self) -> Result<Vec<ProviderService>, ServiceError> {
        self.services.all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<ProviderService, ServiceError> {
        self.services.find(id, "provider service").await
    }

    pub async fn update(&self, id: Uuid, patch: ProviderServicePatch) -> Result<ProviderService, ServiceError> {
        if patch.is_empty() {
            return Err(ServiceError::validation("nothing to update"));
        }
        let mut service = self.get(id).await?;
        patch.apply(&mut service);
        self.services.save(service).await
    }
}
