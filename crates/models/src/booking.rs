use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::ModelError, round_money, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Pending, confirmed and in-progress bookings block service deletion.
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::InProgress)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        BookingStatus::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == norm)
            .ok_or_else(|| ModelError::validation(format!("invalid booking status '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub base_price: f64,
    pub platform_fee: f64,
    pub total: f64,
    pub currency: String,
}

impl Pricing {
    /// The client pays the listed price; the platform fee is withheld from
    /// the provider's payout.
    pub fn compute(base_price: f64, fee_percent: f64, currency: &str) -> Self {
        Self {
            base_price,
            platform_fee: round_money(base_price * fee_percent / 100.0),
            total: base_price,
            currency: currency.to_string(),
        }
    }

    pub fn provider_amount(&self) -> f64 {
        round_money((self.total - self.platform_fee).max(0.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub client_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<Uuid>,
    pub service_id: Uuid,
    pub schedule: Schedule,
    pub location: Location,
    pub pricing: Pricing,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Move to `next`, returning the previous status.
    pub fn transition(&mut self, next: BookingStatus, reason: Option<String>) -> Result<BookingStatus, ModelError> {
        if !self.status.can_transition_to(next) {
            return Err(ModelError::transition(self.status, next));
        }
        let prev = self.status;
        self.status = next;
        if next == BookingStatus::Cancelled {
            self.cancellation_reason = reason;
        }
        Ok(prev)
    }
}

impl Document for Booking {
    const COLLECTION: &'static str = "bookings";

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
        if self.schedule.time.trim().is_empty() {
            return Err(ModelError::validation("schedule.time is required"));
        }
        if self.location.address.trim().is_empty() || self.location.city.trim().is_empty() {
            return Err(ModelError::validation("location.address and location.city are required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub client_id: Uuid,
    pub service_id: Uuid,
    #[serde(default)]
    pub provider_id: Option<Uuid>,
    pub schedule: Schedule,
    pub location: Location,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BookingDraft {
    pub fn into_booking(self, pricing: Pricing, provider_id: Option<Uuid>, now: DateTime<Utc>) -> Result<Booking, ModelError> {
        let mut booking = Booking {
            id: Uuid::new_v4(),
            client_id: self.client_id,
            provider_id: self.provider_id.or(provider_id),
            service_id: self.service_id,
            schedule: self.schedule,
            location: self.location,
            pricing,
            status: BookingStatus::Pending,
            notes: self.notes,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };
        booking.before_save()?;
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> Booking {
        let draft = BookingDraft {
            client_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            provider_id: None,
            schedule: Schedule { date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), time: "10:00".into() },
            location: Location { address: "12 Allen Ave".into(), city: "Lagos".into(), state: None, notes: None },
            notes: None,
        };
        draft.into_booking(Pricing::compute(10_000.0, 10.0, "NGN"), None, Utc::now()).unwrap()
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_value(BookingStatus::InProgress).unwrap(), "in-progress");
        assert_eq!("in_progress".parse::<BookingStatus>().unwrap(), BookingStatus::InProgress);
        assert!("done".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn lifecycle_follows_allowed_edges() {
        let mut b = booking();
        assert!(b.transition(BookingStatus::Completed, None).is_err());
        b.transition(BookingStatus::Confirmed, None).unwrap();
        b.transition(BookingStatus::InProgress, None).unwrap();
        assert_eq!(b.transition(BookingStatus::Completed, None).unwrap(), BookingStatus::InProgress);
        assert!(b.transition(BookingStatus::Cancelled, None).is_err());
    }

    #[test]
    fn cancellation_keeps_reason() {
        let mut b = booking();
        b.transition(BookingStatus::Cancelled, Some("client unavailable".into())).unwrap();
        assert_eq!(b.cancellation_reason.as_deref(), Some("client unavailable"));
        assert!(!b.status.is_active());
    }

    #[test]
    fn pricing_withholds_fee_from_provider() {
        let p = Pricing::compute(10_000.0, 10.0, "NGN");
        assert_eq!(p.platform_fee, 1000.0);
        assert_eq!(p.total, 10_000.0);
        assert_eq!(p.provider_amount(), 9000.0);
    }

    #[test]
    fn missing_location_rejected() {
        let mut b = booking();
        b.location.city = String::new();
        assert!(b.before_save().is_err());
    }
}
