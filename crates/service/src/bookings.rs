use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use configs::MarketplaceConfig;
use models::{
    booking::{Booking, BookingDraft, BookingStatus, Pricing},
    escrow::{EscrowPayment, EscrowStatus},
    round_money,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    catalog::ServiceCatalog,
    dual_write::DualWriteStrategy,
    errors::ServiceError,
    metrics::BOOKINGS_CREATED_TOTAL,
    pagination::Page,
    payouts::PayoutManager,
    query::BookingQuery,
    repository::Repository,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub completed_revenue: f64,
}

#[derive(Clone)]
pub struct BookingManager {
    bookings: Repository<Booking>,
    escrows: Repository<EscrowPayment>,
    catalog: ServiceCatalog,
    payouts: PayoutManager,
    settings: MarketplaceConfig,
}

impl BookingManager {
    pub fn new(
        strategy: Arc<DualWriteStrategy>,
        catalog: ServiceCatalog,
        payouts: PayoutManager,
        settings: MarketplaceConfig,
    ) -> Self {
        Self {
            bookings: Repository::new(strategy.clone()),
            escrows: Repository::new(strategy),
            catalog,
            payouts,
            settings,
        }
    }

    /// Price the booking from the service and bump the service's booking count.
    #[instrument(skip(self, draft), fields(service_id = %draft.service_id, client_id = %draft.client_id))]
    pub async fn create(&self, draft: BookingDraft) -> Result<Booking, ServiceError> {
        let service = self.catalog.get(draft.service_id).await?;
        if !service.is_active {
            return Err(ServiceError::validation("service is not accepting bookings"));
        }
        let pricing = Pricing::compute(service.price, self.settings.platform_fee_percent, &self.settings.currency);
        let booking = self
            .bookings
            .insert(draft.into_booking(pricing, service.provider_id, Utc::now())?)
            .await?;
        self.catalog.record_booking(service.id).await?;
        BOOKINGS_CREATED_TOTAL.inc();
        info!(booking_id = %booking.id, total = booking.pricing.total, "booking created");
        Ok(booking)
    }

    pub async fn list(&self, query: &BookingQuery) -> Result<Page<Booking>, ServiceError> {
        let items = query.filter(self.bookings.all().await?)?;
        Ok(query.pagination().apply(items))
    }

    pub async fn get(&self, id: Uuid) -> Result<Booking, ServiceError> {
        self.bookings.find(id, "booking").await
    }

    pub async fn stats(&self) -> Result<BookingStats, ServiceError> {
        let all = self.bookings.all().await?;
        let mut by_status: BTreeMap<&'static str, usize> =
            BookingStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for b in &all {
            *by_status.entry(b.status.as_str()).or_default() += 1;
        }
        let completed_revenue = round_money(
            all.iter()
                .filter(|b| b.status == BookingStatus::Completed)
                .map(|b| b.pricing.total)
                .sum(),
        );
        Ok(BookingStats { total: all.len(), by_status, completed_revenue })
    }

    /// Apply a status transition and its money side effects:
    /// confirm holds escrow, completion releases it and creates the payout,
    /// cancelling a confirmed or in-progress booking refunds it.
    ///
    /// Side effects run before the booking is saved and are idempotent, so
    /// a failed call leaves the stored status unchanged and can be retried.
    #[instrument(skip(self, reason))]
    pub async fn update_status(&self, id: Uuid, status: &str, reason: Option<String>) -> Result<Booking, ServiceError> {
        let next: BookingStatus = status.parse()?;
        let mut booking = self.get(id).await?;
        let previous = booking.transition(next, reason)?;

        match next {
            BookingStatus::Confirmed => self.hold_escrow(&booking).await?,
            BookingStatus::Completed => {
                self.settle_escrow(booking.id, EscrowStatus::Released).await?;
                if booking.provider_id.is_some() {
                    self.payouts.create_for_booking(&booking).await?;
                } else {
                    warn!(booking_id = %booking.id, "completed booking has no provider, payout skipped");
                }
            }
            BookingStatus::Cancelled if matches!(previous, BookingStatus::Confirmed | BookingStatus::InProgress) => {
                self.settle_escrow(booking.id, EscrowStatus::Refunded).await?;
            }
            _ => {}
        }

        let booking = self.bookings.save(booking).await?;
        info!(booking_id = %booking.id, from = %previous, to = %next, "booking status changed");
        Ok(booking)
    }

    pub async fn escrow_for(&self, booking_id: Uuid) -> Result<Option<EscrowPayment>, ServiceError> {
        Ok(self.escrows.find_where(|e| e.booking_id == booking_id).await?.into_iter().next())
    }

    async fn hold_escrow(&self, booking: &Booking) -> Result<(), ServiceError> {
        if self.escrow_for(booking.id).await?.is_none() {
            self.escrows.insert(EscrowPayment::hold(booking, Utc::now())).await?;
        }
        Ok(())
    }

    async fn settle_escrow(&self, booking_id: Uuid, target: EscrowStatus) -> Result<(), ServiceError> {
        let Some(mut escrow) = self.escrow_for(booking_id).await? else {
            warn!(%booking_id, "no escrow held for booking");
            return Ok(());
        };
        if escrow.status == target {
            return Ok(());
        }
        if target == EscrowStatus::Refunded { escrow.refund()? } else { escrow.release()? }
        self.escrows.save(escrow).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dual_write::RoutingConfig, query::PayoutQuery, test_support::{memory_pair, MemoryPair}};
    use chrono::NaiveDate;
    use models::{
        booking::{Location, Schedule},
        service::ServiceDraft,
        Document,
    };

    struct Fixture {
        pair: MemoryPair,
        catalog: ServiceCatalog,
        payouts: PayoutManager,
        bookings: BookingManager,
    }

    fn fixture() -> Fixture {
        let pair = memory_pair(RoutingConfig::default());
        let strategy = pair.strategy.clone();
        let catalog = ServiceCatalog::new(strategy.clone());
        let payouts = PayoutManager::new(strategy.clone());
        let bookings = BookingManager::new(strategy, catalog.clone(), payouts.clone(), MarketplaceConfig::default());
        Fixture { pair, catalog, payouts, bookings }
    }

    async fn service(f: &Fixture) -> Uuid {
        f.catalog
            .create(ServiceDraft {
                title: "Gate welding".into(),
                description: String::new(),
                category: "other".into(),
                price: 20_000.0,
                duration: 120,
                images: vec![],
                tags: vec![],
                provider_id: Some(Uuid::new_v4()),
                is_active: None,
            })
            .await
            .unwrap()
            .id
    }

    fn draft(service_id: Uuid) -> BookingDraft {
        BookingDraft {
            client_id: Uuid::new_v4(),
            service_id,
            provider_id: None,
            schedule: Schedule { date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(), time: "08:00".into() },
            location: Location { address: "5 Awolowo Rd".into(), city: "Ikoyi".into(), state: Some("Lagos".into()), notes: None },
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_prices_and_counts() -> Result<(), ServiceError> {
        let f = fixture();
        let sid = service(&f).await;
        let b = f.bookings.create(draft(sid)).await?;
        assert_eq!(b.pricing.platform_fee, 2000.0);
        assert_eq!(b.status, BookingStatus::Pending);
        assert!(b.provider_id.is_some());
        assert_eq!(f.catalog.get(sid).await?.booking_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_blocked_by_active_booking_only() -> Result<(), ServiceError> {
        let f = fixture();
        let sid = service(&f).await;
        let b = f.bookings.create(draft(sid)).await?;
        assert!(matches!(f.catalog.delete(sid).await, Err(ServiceError::Validation(_))));

        f.bookings.update_status(b.id, "cancelled", Some("changed plans".into())).await?;
        f.catalog.delete(sid).await?;
        assert!(matches!(f.catalog.get(sid).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn completion_releases_escrow_and_creates_one_payout() -> Result<(), ServiceError> {
        let f = fixture();
        let sid = service(&f).await;
        let b = f.bookings.create(draft(sid)).await?;
        f.bookings.update_status(b.id, "confirmed", None).await?;
        assert_eq!(f.bookings.escrow_for(b.id).await?.map(|e| e.status), Some(EscrowStatus::Held));
        f.bookings.update_status(b.id, "in-progress", None).await?;
        f.bookings.update_status(b.id, "completed", None).await?;

        assert_eq!(f.bookings.escrow_for(b.id).await?.map(|e| e.status), Some(EscrowStatus::Released));
        let payouts = f.payouts.list(&PayoutQuery::default()).await?;
        assert_eq!(payouts.items.len(), 1);
        assert_eq!(payouts.items[0].amount, 18_000.0);

        let stats = f.bookings.stats().await?;
        assert_eq!(stats.by_status["completed"], 1);
        assert_eq!(stats.completed_revenue, 20_000.0);
        Ok(())
    }

    #[tokio::test]
    async fn cancelling_confirmed_refunds() -> Result<(), ServiceError> {
        let f = fixture();
        let sid = service(&f).await;
        let b = f.bookings.create(draft(sid)).await?;
        f.bookings.update_status(b.id, "confirmed", None).await?;
        f.bookings.update_status(b.id, "cancelled", None).await?;
        assert_eq!(f.bookings.escrow_for(b.id).await?.map(|e| e.status), Some(EscrowStatus::Refunded));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_transition_rejected() -> Result<(), ServiceError> {
        let f = fixture();
        let sid = service(&f).await;
        let b = f.bookings.create(draft(sid)).await?;
        assert!(matches!(f.bookings.update_status(b.id, "completed", None).await, Err(ServiceError::Model(_))));
        assert!(matches!(f.bookings.update_status(b.id, "done", None).await, Err(ServiceError::Model(_))));
        Ok(())
    }

    #[tokio::test]
    async fn failed_completion_keeps_booking_in_progress() -> Result<(), ServiceError> {
        let f = fixture();
        let sid = service(&f).await;
        let b = f.bookings.create(draft(sid)).await?;
        f.bookings.update_status(b.id, "confirmed", None).await?;
        f.bookings.update_status(b.id, "in-progress", None).await?;

        f.pair.postgres.set_unavailable(true);
        let err = f.bookings.update_status(b.id, "completed", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        f.pair.postgres.set_unavailable(false);

        assert_eq!(f.bookings.get(b.id).await?.status, BookingStatus::InProgress);
        assert_eq!(f.bookings.escrow_for(b.id).await?.map(|e| e.status), Some(EscrowStatus::Held));
        assert!(f.payouts.list(&PayoutQuery::default()).await?.items.is_empty());

        let done = f.bookings.update_status(b.id, "completed", None).await?;
        assert_eq!(done.status, BookingStatus::Completed);
        assert_eq!(f.bookings.escrow_for(b.id).await?.map(|e| e.status), Some(EscrowStatus::Released));
        assert_eq!(f.payouts.list(&PayoutQuery::default()).await?.items.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn settling_a_settled_escrow_is_a_no_op() -> Result<(), ServiceError> {
        let f = fixture();
        let sid = service(&f).await;
        let b = f.bookings.create(draft(sid)).await?;
        f.bookings.update_status(b.id, "confirmed", None).await?;
        f.bookings.hold_escrow(&f.bookings.get(b.id).await?).await?;
        assert_eq!(f.pair.postgres.len(EscrowPayment::COLLECTION), 1);

        f.bookings.settle_escrow(b.id, EscrowStatus::Released).await?;
        f.bookings.settle_escrow(b.id, EscrowStatus::Released).await?;
        assert_eq!(f.bookings.escrow_for(b.id).await?.map(|e| e.status), Some(EscrowStatus::Released));
        assert!(matches!(
            f.bookings.settle_escrow(b.id, EscrowStatus::Refunded).await,
            Err(ServiceError::Model(_))
        ));
        Ok(())
    }
}
