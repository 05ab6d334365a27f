//! Prometheus metrics for ipv6notify

use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec};

//==============================================================================
// Metrics
//==============================================================================

lazy_static! {
    /// Total number of publish cycles started
    pub static ref PUBLISH_CYCLES_TOTAL: Counter = register_counter!(
        "ipv6notify_publish_cycles_total",
        "Total number of publish cycles started"
    )
    .unwrap();

    /// Total number of failed interface enumerations
    pub static ref RESOLVE_FAILURES_TOTAL: Counter = register_counter!(
        "ipv6notify_resolve_failures_total",
        "Total number of failed interface enumerations"
    )
    .unwrap();

    /// Notification delivery attempts by result
    pub static ref NOTIFICATIONS_TOTAL: CounterVec = register_counter_vec!(
        "ipv6notify_notifications_total",
        "Notification delivery attempts by result",
        &["result"]
    )
    .unwrap();

    /// DNS record update attempts by result
    pub static ref DNS_UPDATES_TOTAL: CounterVec = register_counter_vec!(
        "ipv6notify_dns_updates_total",
        "DNS record update attempts by result",
        &["result"]
    )
    .unwrap();
}

//==============================================================================
// Public Functions
//==============================================================================

/// Records the start of a publish cycle
pub fn record_cycle() {
    PUBLISH_CYCLES_TOTAL.inc();
}

/// Records a failed interface enumeration
pub fn record_resolve_failure() {
    RESOLVE_FAILURES_TOTAL.inc();
}

/// Records one notification delivery attempt
pub fn record_notification(ok: bool) {
    NOTIFICATIONS_TOTAL
        .with_label_values(&[result_label(ok)])
        .inc();
}

/// Records one DNS record update attempt
pub fn record_dns_update(ok: bool) {
    DNS_UPDATES_TOTAL
        .with_label_values(&[result_label(ok)])
        .inc();
}

fn result_label(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

/// Collects all metrics in Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics should be valid UTF-8")
}

//==============================================================================
// Tests
//==============================================================================
