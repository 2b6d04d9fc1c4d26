use std::sync::Arc;

use service::{mock_data::MockDataService, Marketplace};

use crate::errors::JsonApiError;

/// Shared handler state. Without a marketplace the server runs on the
/// read-only mock catalogue.
#[derive(Clone)]
pub struct AppState {
    pub marketplace: Option<Arc<Marketplace>>,
    pub mock: MockDataService,
}

impl AppState {
    pub fn live(marketplace: Marketplace) -> Self {
        Self { marketplace: Some(Arc::new(marketplace)), mock: MockDataService::new() }
    }

    pub fn mock() -> Self {
        Self { marketplace: None, mock: MockDataService::new() }
    }

    pub fn is_mock(&self) -> bool {
        self.marketplace.is_none()
    }

    /// The live marketplace, or 503 while running on mock data.
    pub fn marketplace(&self) -> Result<&Marketplace, JsonApiError> {
        self.marketplace
            .as_deref()
            .ok_or_else(|| JsonApiError::unavailable("database not connected; running on mock data"))
    }
}
