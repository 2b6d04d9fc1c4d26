use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{booking::Booking, errors::ModelError, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Held,
    Released,
    Refunded,
}

impl std::fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EscrowStatus::Held => "held",
            EscrowStatus::Released => "released",
            EscrowStatus::Refunded => "refunded",
        })
    }
}

/// Client funds held while a booking is confirmed or in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowPayment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: EscrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EscrowPayment {
    pub fn hold(booking: &Booking, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id: booking.id,
            amount: booking.pricing.total,
            currency: booking.pricing.currency.clone(),
            status: EscrowStatus::Held,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn release(&mut self) -> Result<(), ModelError> {
        self.settle(EscrowStatus::Released)
    }

    pub fn refund(&mut self) -> Result<(), ModelError> {
        self.settle(EscrowStatus::Refunded)
    }

    fn settle(&mut self, next: EscrowStatus) -> Result<(), ModelError> {
        if self.status != EscrowStatus::Held {
            return Err(ModelError::transition(self.status, next));
        }
        self.status = next;
        Ok(())
    }
}

impl Document for EscrowPayment {
    const COLLECTION: &'static str = "escrow_payments";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{BookingDraft, Location, Pricing, Schedule};
    use chrono::NaiveDate;

    #[test]
    fn settles_once() {
        let booking = BookingDraft {
            client_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            provider_id: None,
            schedule: Schedule { date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(), time: "14:00".into() },
            location: Location { address: "1 Marina".into(), city: "Lagos".into(), state: None, notes: None },
            notes: None,
        }
        .into_booking(Pricing::compute(3000.0, 10.0, "NGN"), None, Utc::now())
        .unwrap();
        let mut escrow = EscrowPayment::hold(&booking, Utc::now());
        assert_eq!(escrow.amount, 3000.0);
        escrow.release().unwrap();
        assert!(escrow.refund().is_err());
    }
}
