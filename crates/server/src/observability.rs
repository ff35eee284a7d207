use std::time::Instant;

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "crudtest_requests_total",
        "Record requests handled, by operation and response status",
        &["operation", "status"]
    )
    .expect("register requests_total")
});

pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "crudtest_request_duration_seconds",
        "Record request duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("register request_duration")
});

/// Count one finished request and its latency.
pub fn record(operation: &str, status: StatusCode, started: Instant) {
    REQUESTS_TOTAL
        .with_label_values(&[operation, status.as_str()])
        .inc();
    REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(started.elapsed().as_secs_f64());
}

/// Text exposition of the default registry.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&prometheus::gather(), &mut buf)?;
    String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_requests_show_up_in_exposition() {
        record("list", StatusCode::OK, Instant::now());
        record("list", StatusCode::OK, Instant::now());
        let count = REQUESTS_TOTAL.with_label_values(&["list", "200"]).get();
        assert!(count >= 2);

        let text = encode_metrics().unwrap();
        assert!(text.contains("crudtest_requests_total"));
        assert!(text.contains("crudtest_request_duration_seconds"));
    }
}
