//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and parseable addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("observability.log_level '{0}' is not one of off, error, warn, info, debug, trace")]
    InvalidLogLevel(String),

    #[error("observability.observation_name must not be blank")]
    BlankObservationName,

    #[error("timeouts.request_ms must be greater than zero")]
    ZeroRequestTimeout,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if !LOG_LEVELS
        .iter()
        .any(|level| level.eq_ignore_ascii_case(observability.log_level.trim()))
    {
        errors.push(ValidationError::InvalidLogLevel(
            observability.log_level.clone(),
        ));
    }

    if observability.observation_name.trim().is_empty() {
        errors.push(ValidationError::BlankObservationName);
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
