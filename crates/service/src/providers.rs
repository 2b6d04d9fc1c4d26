use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use models::{
    provider_service::ProviderService,
    user::{ProviderProfile, ProviderStatus, User, UserDraft, UserType},
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    dual_write::DualWriteStrategy, errors::ServiceError, pagination::Page,
    provider_services::ProviderServiceManager, query::ProviderQuery, repository::Repository,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatusChange {
    pub provider: User,
    pub previous_status: ProviderStatus,
    pub created_services: Vec<ProviderService>,
}

/// Users, with the provider approval workflow on top.
#[derive(Clone)]
pub struct ProviderDirectory {
    users: Repository<User>,
    provider_services: ProviderServiceManager,
}

impl ProviderDirectory {
    pub fn new(strategy: Arc<DualWriteStrategy>, provider_services: ProviderServiceManager) -> Self {
        Self { users: Repository::new(strategy), provider_services }
    }

    #[instrument(skip(self, draft), fields(user_type = draft.user_type.as_str()))]
    pub async fn register(&self, draft: UserDraft) -> Result<User, ServiceError> {
        let user = draft.into_user(Utc::now())?;
        let taken = !self.users.find_where(|u| u.email == user.email).await?.is_empty();
        if taken {
            return Err(ServiceError::Conflict(format!("email {} is already registered", user.email)));
        }
        let user = self.users.insert(user).await?;
        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        self.users.find(id, "user").await
    }

    async fn provider(&self, id: Uuid) -> Result<User, ServiceError> {
        let user = self.get(id).await?;
        if !user.is_provider() {
            return Err(ServiceError::validation(format!("user {id} is not a provider")));
        }
        Ok(user)
    }

    pub async fn update_provider_profile(&self, id: Uuid, profile: ProviderProfile) -> Result<User, ServiceError> {
        let mut user = self.provider(id).await?;
        user.provider_profile = Some(profile);
        self.users.save(user).await
    }

    pub async fn list_providers(&self, query: &ProviderQuery) -> Result<Page<User>, ServiceError> {
        let items = query.filter(self.users.all().await?)?;
        Ok(query.pagination().apply(items))
    }

    /// Admin review step. Approval materialises the provider's services.
    #[instrument(skip(self))]
    pub async fn update_provider_status(&self, id: Uuid, status: &str) -> Result<ProviderStatusChange, ServiceError> {
        let next: ProviderStatus = status.parse()?;
        let mut user = self.provider(id).await?;
        let previous_status = user.transition_provider_status(next)?;
        let provider = self.users.save(user).await?;
        info!(provider_id = %id, from = %previous_status, to = %next, "provider status changed");

        let created_services = if next == ProviderStatus::Approved {
            self.provider_services.materialize(&provider).await?
        } else {
            Vec::new()
        };
        Ok(ProviderStatusChange { provider, previous_status, created_services })
    }

    /// Manual re-run of service materialisation for an approved provider.
    pub async fn sync_services(&self, id: Uuid) -> Result<Vec<ProviderService>, ServiceError> {
        let provider = self.provider(id).await?;
        self.provider_services.materialize(&provider).await
    }

    pub async fn users_by_type(&self) -> Result<BTreeMap<&'static str, usize>, ServiceError> {
        let mut counts: BTreeMap<&'static str, usize> =
            [UserType::Client, UserType::Provider, UserType::Admin].iter().map(|t| (t.as_str(), 0)).collect();
        for u in self.users.all().await? {
            *counts.entry(u.user_type.as_str()).or_default() += 1;
        }
        Ok(counts)
    }

    pub async fn providers_by_status(&self) -> Result<BTreeMap<&'static str, usize>, ServiceError> {
        let mut counts: BTreeMap<&'static str, usize> = ProviderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for u in self.users.find_where(User::is_provider).await? {
            let status = u.provider_status.unwrap_or(ProviderStatus::Pending);
            *counts.entry(status.as_str()).or_default() += 1;
        }
        Ok(counts)
    }
}
