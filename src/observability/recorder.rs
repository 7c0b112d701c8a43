//! Completed observations and where they are sent.
//!
//! # Design Decisions
//! - The convention runs exactly once per exchange, when it completes
//! - Low-cardinality tags become metric labels
//! - High-cardinality tags only go to log/trace output

use std::time::Duration;

use crate::observability::context::ExchangeContext;
use crate::observability::convention::{ObservationConvention, Tags};
use crate::observability::keys;

/// Everything derived from one finished exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: String,
    pub contextual_name: String,
    pub low_cardinality: Tags,
    pub high_cardinality: Tags,
    pub duration: Duration,
}

impl Observation {
    /// Run `convention` over a completed exchange.
    pub fn observe(
        convention: &dyn ObservationConvention,
        ctx: &ExchangeContext,
        duration: Duration,
    ) -> Self {
        Self {
            name: convention.name().to_string(),
            contextual_name: convention.contextual_name(ctx),
            low_cardinality: convention.low_cardinality_tags(ctx),
            high_cardinality: convention.high_cardinality_tags(ctx),
            duration,
        }
    }
}

/// Sink for completed observations.
pub trait ExchangeRecorder: Send + Sync {
    fn record(&self, observation: &Observation);
}

/// Records observations through the global `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl ExchangeRecorder for MetricsRecorder {
    fn record(&self, observation: &Observation) {
        debug_assert!(
            observation
                .low_cardinality
                .keys()
                .all(keys::is_low_cardinality_key),
            "metric labels outside the low-cardinality vocabulary"
        );
        metrics::histogram!(observation.name.clone(), &observation.low_cardinality)
            .record(observation.duration.as_secs_f64());

        tracing::debug!(
            observation = %observation.name,
            contextual_name = %observation.contextual_name,
            method = observation.low_cardinality.get(keys::METHOD),
            uri = observation.low_cardinality.get(keys::URI),
            status = observation.low_cardinality.get(keys::STATUS),
            outcome = observation.low_cardinality.get(keys::OUTCOME),
            http_url = observation.high_cardinality.get(keys::HTTP_URL),
            duration_ms = u64::try_from(observation.duration.as_millis()).unwrap_or(u64::MAX),
            "Exchange observed"
        );
    }
}
