use std::{collections::BTreeMap, sync::Arc};

use configs::MarketplaceConfig;
use serde::Serialize;

use crate::{
    bookings::BookingManager, catalog::ServiceCatalog, dual_write::DualWriteStrategy, errors::ServiceError,
    payouts::PayoutManager, provider_services::ProviderServiceManager, providers::ProviderDirectory,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub users_by_type: BTreeMap<&'static str, usize>,
    pub providers_by_status: BTreeMap<&'static str, usize>,
    pub bookings_by_status: BTreeMap<&'static str, usize>,
    pub services_total: usize,
    pub payouts_pending_amount: f64,
}

/// Every manager wired to one dual-write strategy. Cheap to clone.
#[derive(Clone)]
pub struct Marketplace {
    pub strategy: Arc<DualWriteStrategy>,
    pub catalog: ServiceCatalog,
    pub bookings: BookingManager,
    pub payouts: PayoutManager,
    pub providers: ProviderDirectory,
    pub provider_services: ProviderServiceManager,
}

impl Marketplace {
    pub fn new(strategy: Arc<DualWriteStrategy>, settings: MarketplaceConfig) -> Self {
        let catalog = ServiceCatalog::new(strategy.clone());
        let payouts = PayoutManager::new(strategy.clone());
        let provider_services = ProviderServiceManager::new(strategy.clone());
        let providers = ProviderDirectory::new(strategy.clone(), provider_services.clone());
        let bookings = BookingManager::new(strategy.clone(), catalog.clone(), payouts.clone(), settings);
        Self { strategy, catalog, bookings, payouts, providers, provider_services }
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, ServiceError> {
        Ok(DashboardSummary {
            users_by_type: self.providers.users_by_type().await?,
            providers_by_status: self.providers.providers_by_status().await?,
            bookings_by_status: self.bookings.stats().await?.by_status,
            services_total: self.catalog.stats().await?.total,
            payouts_pending_amount: self.payouts.pending_amount().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dual_write::RoutingConfig, test_support::memory_pair};

    #[tokio::test]
    async fn empty_dashboard_lists_every_bucket() -> Result<(), ServiceError> {
        let m = Marketplace::new(memory_pair(RoutingConfig::default()).strategy, MarketplaceConfig::default());
        let d = m.dashboard().await?;
        assert_eq!(d.users_by_type.len(), 3);
        assert_eq!(d.providers_by_status.len(), 5);
        assert_eq!(d.bookings_by_status.len(), 5);
        assert_eq!(d.services_total, 0);
        assert_eq!(d.payouts_pending_amount, 0.0);
        Ok(())
    }
}
