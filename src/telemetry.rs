//! Telemetry metric name constants.
//!
//! Centralised metric names for converter operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `converter_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation`: call shape: "unary", "series" or "stream"
//! - `conversion`: conversion name (e.g. "celsius_to_fahrenheit")
//! - `status`: outcome: "ok" or "error"

/// Total calls handled.
///
/// Labels: `operation`, `conversion`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "converter_requests_total";

/// Call duration in seconds, measured until the last response is written.
///
/// Labels: `operation`, `conversion`.
pub const REQUEST_DURATION_SECONDS: &str = "converter_request_duration_seconds";

/// Total responses emitted by streaming calls.
///
/// Labels: `operation`, `conversion`.
pub const STREAM_ITEMS_TOTAL: &str = "converter_stream_items_total";

/// Total streaming calls ended by cancellation.
///
/// Labels: `operation`.
pub const STREAMS_CANCELLED_TOTAL: &str = "converter_streams_cancelled_total";
