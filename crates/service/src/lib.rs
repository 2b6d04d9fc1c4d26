//! Service layer providing marketplace operations on top of models.
//! - Document stores and the dual-write strategy live under `storage` and `dual_write`.
//! - Managers hold the business rules and reuse validation from the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod metrics;
pub mod pagination;
pub mod query;
pub mod stats;
pub mod storage;
pub mod dual_write;
pub mod repository;
pub mod catalog;
pub mod bookings;
pub mod payouts;
pub mod providers;
pub mod provider_services;
pub mod marketplace;
pub mod mock_data;
pub mod runtime;
#[cfg(test)]
pub mod test_support;

pub use marketplace::Marketplace;
