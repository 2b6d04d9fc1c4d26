use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

// Prometheus metrics (default registry)
pub static DUAL_WRITES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "solutil_dual_writes_total",
        "Dual writes by operation and outcome",
        &["op", "outcome"]
    )
    .expect("register dual_writes_total")
});

pub static SYNC_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "solutil_sync_errors_total",
        "Failed writes recorded for later replay, by target store",
        &["target"]
    )
    .expect("register sync_errors_total")
});

pub static SYNC_REPLAYS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "solutil_sync_replays_total",
        "Replayed sync errors by outcome",
        &["outcome"]
    )
    .expect("register sync_replays_total")
});

pub static FALLBACK_READS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "solutil_fallback_reads_total",
        "Reads answered by the secondary store"
    )
    .expect("register fallback_reads_total")
});

pub static BOOKINGS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "solutil_bookings_created_total",
        "Bookings created"
    )
    .expect("register bookings_created_total")
});

pub static PAYOUT_TRANSITIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "solutil_payout_transitions_total",
        "Payout status changes by target status",
        &["status"]
    )
    .expect("register payout_transitions_total")
});
