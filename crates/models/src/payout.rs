use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{booking::Booking, errors::ModelError, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Ready,
    Completed,
    Failed,
    Cancelled,
}

impl PayoutStatus {
    pub const ALL: [PayoutStatus; 5] = [
        PayoutStatus::Pending,
        PayoutStatus::Ready,
        PayoutStatus::Completed,
        PayoutStatus::Failed,
        PayoutStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Ready => "ready",
            PayoutStatus::Completed => "completed",
            PayoutStatus::Failed => "failed",
            PayoutStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(&self, next: PayoutStatus) -> bool {
        use PayoutStatus::*;
        matches!(
            (self, next),
            (Pending, Ready)
                | (Pending, Completed)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Ready, Completed)
                | (Ready, Failed)
                | (Ready, Cancelled)
                | (Failed, Ready)
                | (Failed, Cancelled)
        )
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayoutStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        PayoutStatus::ALL
            .iter()
            .copied()
            .find(|st| st.as_str() == norm)
            .ok_or_else(|| ModelError::validation(format!("invalid payout status '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutActor {
    System,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutActivity {
    pub action: String,
    pub actor: PayoutActor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub booking_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub status: PayoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub activities: Vec<PayoutActivity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payout {
    /// Payout owed for a completed booking. Requires a provider on the booking.
    pub fn for_booking(booking: &Booking, now: DateTime<Utc>) -> Result<Self, ModelError> {
        let provider_id = booking
            .provider_id
            .ok_or_else(|| ModelError::validation("booking has no provider to pay out"))?;
        Ok(Self {
            id: Uuid::new_v4(),
            provider_id,
            booking_id: booking.id,
            amount: booking.pricing.provider_amount(),
            currency: booking.pricing.currency.clone(),
            status: PayoutStatus::Pending,
            reference: None,
            activities: vec![PayoutActivity {
                action: "created".into(),
                actor: PayoutActor::System,
                note: Some(format!("booking {} completed", booking.id)),
                at: now,
            }],
            created_at: now,
            updated_at: now,
        })
    }

    pub fn transition(
        &mut self,
        next: PayoutStatus,
        actor: PayoutActor,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ModelError> {
        if self.status == PayoutStatus::Completed {
            return Err(ModelError::validation(format!("payout {} is completed and cannot change to {next}", self.id)));
        }
        if !self.status.can_transition_to(next) {
            return Err(ModelError::transition(self.status, next));
        }
        self.activities.push(PayoutActivity {
            action: format!("status:{}->{}", self.status, next),
            actor,
            note,
            at: now,
        });
        self.status = next;
        Ok(())
    }

    /// Complete a pending or ready payout with a settlement reference.
    pub fn process(&mut self, reference: String, now: DateTime<Utc>) -> Result<(), ModelError> {
        if !matches!(self.status, PayoutStatus::Pending | PayoutStatus::Ready) {
            return Err(ModelError::validation(format!("payout in status {} cannot be processed", self.status)));
        }
        self.transition(PayoutStatus::Completed, PayoutActor::Admin, Some(format!("reference {reference}")), now)?;
        self.reference = Some(reference);
        Ok(())
    }

    pub fn add_note(&mut self, note: String, actor: PayoutActor, now: DateTime<Utc>) -> Result<(), ModelError> {
        if note.trim().is_empty() {
            return Err(ModelError::validation("note must not be empty"));
        }
        self.activities.push(PayoutActivity { action: "note".into(), actor, note: Some(note), at: now });
        Ok(())
    }
}

impl Document for Payout {
    const COLLECTION: &'static str = "payouts";

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
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ModelError::validation("payout amount must be >= 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{BookingDraft, Location, Pricing, Schedule};
    use chrono::NaiveDate;

    fn payout() -> Payout {
        let booking = BookingDraft {
            client_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            provider_id: Some(Uuid::new_v4()),
            schedule: Schedule { date: NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(), time: "09:30".into() },
            location: Location { address: "3 Broad St".into(), city: "Abuja".into(), state: None, notes: None },
            notes: None,
        }
        .into_booking(Pricing::compute(8000.0, 10.0, "NGN"), None, Utc::now())
        .unwrap();
        Payout::for_booking(&booking, Utc::now()).unwrap()
    }

    #[test]
    fn amount_is_total_minus_fee() {
        let p = payout();
        assert_eq!(p.amount, 7200.0);
        assert_eq!(p.status, PayoutStatus::Pending);
        assert_eq!(p.activities.len(), 1);
    }

    #[test]
    fn completed_payout_is_frozen() {
        let mut p = payout();
        p.process("PO-1".into(), Utc::now()).unwrap();
        assert_eq!(p.status, PayoutStatus::Completed);
        assert_eq!(p.reference.as_deref(), Some("PO-1"));
        let err = p.transition(PayoutStatus::Cancelled, PayoutActor::Admin, None, Utc::now()).unwrap_err();
        assert!(err.to_string().contains("cannot change"));
    }

    #[test]
    fn every_transition_appends_activity() {
        let mut p = payout();
        p.transition(PayoutStatus::Ready, PayoutActor::Admin, None, Utc::now()).unwrap();
        p.transition(PayoutStatus::Failed, PayoutActor::System, Some("bank timeout".into()), Utc::now()).unwrap();
        p.transition(PayoutStatus::Ready, PayoutActor::Admin, None, Utc::now()).unwrap();
        assert_eq!(p.activities.len(), 4);
        assert_eq!(p.activities[2].note.as_deref(), Some("bank timeout"));
    }

    #[test]
    fn failed_cannot_jump_to_completed() {
        let mut p = payout();
        p.transition(PayoutStatus::Failed, PayoutActor::System, None, Utc::now()).unwrap();
        assert!(p.process("PO-2".into(), Utc::now()).is_err());
    }

    #[test]
    fn empty_note_rejected() {
        let mut p = payout();
        assert!(p.add_note("  ".into(), PayoutActor::Admin, Utc::now()).is_err());
        p.add_note("called provider".into(), PayoutActor::Admin, Utc::now()).unwrap();
        assert_eq!(p.activities.last().map(|a| a.action.as_str()), Some("note"));
    }
}
