//! Metric instrument factories for workshop-tracker.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("workshop-tracker")
}

/// Counter: incident reports.
/// Labels: `result` ("ok" | "duplicate" | "invalid" | "error").
pub fn incidents_reported() -> Counter<u64> {
    meter()
        .u64_counter("workshop.incidents.reported")
        .with_description("Number of incident reports received")
        .build()
}

/// Counter: usage session transitions.
/// Labels: `operation` ("start" | "end"), `result`.
pub fn usage_transitions() -> Counter<u64> {
    meter()
        .u64_counter("workshop.usage.transitions")
        .with_description("Number of usage start/end requests")
        .build()
}

/// Histogram: HTTP request duration in milliseconds.
/// Labels: `route`, `status`.
pub fn request_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("workshop.request.duration_ms")
        .with_description("HTTP request duration in milliseconds")
        .with_unit("ms")
        .build()
}
