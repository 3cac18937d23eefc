use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static STORAGE_WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bailanysta_storage_writes_total",
        "Total successful writes of the data document"
    )
    .expect("register storage_writes_total")
});

pub static STORAGE_WRITE_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bailanysta_storage_write_failures_total",
        "Total failed writes of the data document"
    )
    .expect("register storage_write_failures_total")
});

pub static STORAGE_MIGRATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bailanysta_storage_migrations_total",
        "Total schema upgrades applied on load"
    )
    .expect("register storage_migrations_total")
});

pub static ENTITY_MUTATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bailanysta_entity_mutations_total",
        "Entity mutations by entity and action",
        &["entity", "action"]
    )
    .expect("register entity_mutations_total")
});

pub static ANALYTICS_EVENTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bailanysta_analytics_events_total",
        "Total analytics events accepted"
    )
    .expect("register analytics_events_total")
});

/// Count one mutation, e.g. `record_mutation("post", "create")`.
pub fn record_mutation(entity: &str, action: &str) {
    ENTITY_MUTATIONS_TOTAL.with_label_values(&[entity, action]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_metrics_include_counters() {
        record_mutation("post", "create");
        STORAGE_WRITES_TOTAL.inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("bailanysta_entity_mutations_total"));
        assert!(body.contains("bailanysta_storage_writes_total"));
    }
}
