use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use models::{
    booking::Booking,
    payout::{Payout, PayoutActor, PayoutStatus},
    round_money,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    dual_write::DualWriteStrategy, errors::ServiceError, metrics::PAYOUT_TRANSITIONS_TOTAL, pagination::Page,
    query::PayoutQuery, repository::Repository,
};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct StatusTotals {
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayoutStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, StatusTotals>,
}

#[derive(Clone)]
pub struct PayoutManager {
    payouts: Repository<Payout>,
}

impl PayoutManager {
    pub fn new(strategy: Arc<DualWriteStrategy>) -> Self {
        Self { payouts: Repository::new(strategy) }
    }

    /// One payout per booking; an existing payout is returned unchanged.
    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    pub async fn create_for_booking(&self, booking: &Booking) -> Result<Payout, ServiceError> {
        if let Some(existing) = self.payouts.find_where(|p| p.booking_id == booking.id).await?.into_iter().next() {
            return Ok(existing);
        }
        let payout = self.payouts.insert(Payout::for_booking(booking, Utc::now())?).await?;
        PAYOUT_TRANSITIONS_TOTAL.with_label_values(&[PayoutStatus::Pending.as_str()]).inc();
        info!(payout_id = %payout.id, amount = payout.amount, "payout created");
        Ok(payout)
    }

    pub async fn list(&self, query: &PayoutQuery) -> Result<Page<Payout>, ServiceError> {
        let items = query.filter(self.payouts.all().await?)?;
        Ok(query.pagination().apply(items))
    }

    pub async fn get(&self, id: Uuid) -> Result<Payout, ServiceError> {
        self.payouts.find(id, "payout").await
    }

    pub async fn stats(&self) -> Result<PayoutStats, ServiceError> {
        let all = self.payouts.all().await?;
        let mut by_status: BTreeMap<&'static str, StatusTotals> =
            PayoutStatus::ALL.iter().map(|s| (s.as_str(), StatusTotals::default())).collect();
        for p in &all {
            let t = by_status.entry(p.status.as_str()).or_default();
            t.count += 1;
            t.amount = round_money(t.amount + p.amount);
        }
        Ok(PayoutStats { total: all.len(), by_status })
    }

    /// Amount owed on payouts not yet completed, failed or cancelled.
    pub async fn pending_amount(&self) -> Result<f64, ServiceError> {
        let all = self.payouts.all().await?;
        Ok(round_money(
            all.iter()
                .filter(|p| matches!(p.status, PayoutStatus::Pending | PayoutStatus::Ready))
                .map(|p| p.amount)
                .sum(),
        ))
    }

    #[instrument(skip(self, note))]
    pub async fn update_status(&self, id: Uuid, status: &str, note: Option<String>) -> Result<Payout, ServiceError> {
        let next: PayoutStatus = status.parse()?;
        let mut payout = self.get(id).await?;
        payout.transition(next, PayoutActor::Admin, note, Utc::now())?;
        let payout = self.payouts.save(payout).await?;
        PAYOUT_TRANSITIONS_TOTAL.with_label_values(&[next.as_str()]).inc();
        info!(payout_id = %id, status = %next, "payout status changed");
        Ok(payout)
    }

    /// Complete a pending or ready payout with a generated settlement reference.
    #[instrument(skip(self))]
    pub async fn process(&self, id: Uuid) -> Result<Payout, ServiceError> {
        let mut payout = self.get(id).await?;
        let now = Utc::now();
        let reference = format!("PO-{}-{}", now.format("%Y%m%d"), &Uuid::new_v4().simple().to_string()[..8]);
        payout.process(reference, now)?;
        let payout = self.payouts.save(payout).await?;
        PAYOUT_TRANSITIONS_TOTAL.with_label_values(&[PayoutStatus::Completed.as_str()]).inc();
        info!(payout_id = %id, reference = ?payout.reference, "payout processed");
        Ok(payout)
    }

    pub async fn add_note(&self, id: Uuid, note: String) -> Result<Payout, ServiceError> {
        let mut payout = self.get(id).await?;
        payout.add_note(note, PayoutActor::Admin, Utc::now())?;
        self.payouts.save(payout).await
    }
}
