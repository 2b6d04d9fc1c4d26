//! Query-string filters for list endpoints.
//!
//! Each query carries its own `page`/`limit` so it deserializes directly
//! from a URL query string.

use models::{
    booking::{Booking, BookingStatus},
    category::Category,
    listing::Listing,
    payout::{Payout, PayoutStatus},
    user::{ProviderStatus, User},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{errors::ServiceError, pagination::Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub provider_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListingQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn filter<T: Listing>(&self, items: Vec<T>) -> Result<Vec<T>, ServiceError> {
        let category: Option<Category> = self
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty() && *c != "all")
            .map(str::parse)
            .transpose()?;
        Ok(items
            .into_iter()
            .filter(|s| category.map_or(true, |c| s.category() == c))
            .filter(|s| self.is_active.map_or(true, |a| s.is_active() == a))
            .filter(|s| self.min_price.map_or(true, |p| s.price() >= p))
            .filter(|s| self.max_price.map_or(true, |p| s.price() <= p))
            .filter(|s| self.provider_id.map_or(true, |p| s.provider_id() == Some(p)))
            .filter(|s| self.search.as_deref().map_or(true, |q| s.matches_search(q)))
            .collect())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl BookingQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn filter(&self, items: Vec<Booking>) -> Result<Vec<Booking>, ServiceError> {
        let status: Option<BookingStatus> = self.status.as_deref().map(str::parse).transpose()?;
        Ok(items
            .into_iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .filter(|b| self.client_id.map_or(true, |c| b.client_id == c))
            .filter(|b| self.provider_id.map_or(true, |p| b.provider_id == Some(p)))
            .filter(|b| self.service_id.map_or(true, |s| b.service_id == s))
            .collect())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutQuery {
    pub status: Option<String>,
    pub provider_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PayoutQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    pub fn filter(&self, items: Vec<Payout>) -> Result<Vec<Payout>, ServiceError> {
        let status: Option<PayoutStatus> = self.status.as_deref().map(str::parse).transpose()?;
        Ok(items
            .into_iter()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .filter(|p| self.provider_id.map_or(true, |id| p.provider_id == id))
            .collect())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProviderQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }

    /// Keeps providers only.
    pub fn filter(&self, items: Vec<User>) -> Result<Vec<User>, ServiceError> {
        let status: Option<ProviderStatus> = self.status.as_deref().map(str::parse).transpose()?;
        let needle = self.search.as_deref().map(str::to_lowercase);
        Ok(items
            .into_iter()
            .filter(User::is_provider)
            .filter(|u| status.map_or(true, |s| u.provider_status == Some(s)))
            .filter(|u| {
                needle
                    .as_deref()
                    .map_or(true, |n| u.name.to_lowercase().contains(n) || u.email.contains(n))
            })
            .collect())
    }
}
