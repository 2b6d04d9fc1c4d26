//! Marketplace documents and the SeaORM entity that stores them.
//!
//! Every document is a serde struct persisted as a JSON body keyed by
//! `(collection, id)`. Validation and computed fields live on the types so
//! every store sees the same rules.

pub mod errors;
pub mod db;
pub mod document;
pub mod category;
pub mod rating;
pub mod listing;
pub mod user;
pub mod service;
pub mod provider_service;
pub mod booking;
pub mod payout;
pub mod review;
pub mod escrow;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

pub use errors::ModelError;

/// A value stored in a named collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn id(&self) -> Uuid;

    fn created_at(&self) -> DateTime<Utc>;

    fn touch(&mut self, now: DateTime<Utc>);

    /// Validate and recompute derived fields. Called before every write.
    fn before_save(&mut self) -> Result<(), ModelError> {
        Ok(())
    }
}

/// Round a money amount to two decimals.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
