//! Metrics exposition.
//!
//! # Responsibilities
//! - Install the Prometheus exporter with its own scrape listener
//! - Describe the request observation histogram
//!
//! # Metrics
//! - `<observation name>` (histogram, seconds): one sample per exchange,
//!   labelled with the convention's low-cardinality tags
//!
//! # Design Decisions
//! - Exporter failures are logged; the server keeps running without metrics
//! - Metric names keep the convention's dotted form; the exporter sanitizes them

use std::net::SocketAddr;

use metrics::Unit;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> bool {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            tracing::info!(address = %addr, "Prometheus metrics exporter listening");
            true
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
            false
        }
    }
}

/// Register the description of the histogram an observation is recorded under.
pub fn describe_observation(name: &str) {
    metrics::describe_histogram!(
        name.to_string(),
        Unit::Seconds,
        "Duration of server request exchanges"
    );
}
