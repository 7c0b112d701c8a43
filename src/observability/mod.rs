//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Instrumentation (http::instrumentation)
//!     → context.rs (ExchangeContext filled in as the exchange progresses)
//!     → convention.rs (name + tags, using keys.rs and outcome.rs)
//!     → recorder.rs (Observation handed to a recorder)
//!
//! Consumers:
//!     → metrics.rs (Prometheus histogram, low-cardinality labels)
//!     → logging.rs (structured events, high-cardinality detail)
//! ```
//!
//! # Design Decisions
//! - Conventions are stateless and shared via Arc across requests
//! - Tagging never fails; missing data becomes a sentinel value
//! - High-cardinality values stay out of metric labels

pub mod context;
pub mod convention;
pub mod keys;
pub mod logging;
pub mod metrics;
pub mod outcome;
pub mod recorder;

pub use context::{CapturedError, ExchangeContext, RequestCarrier, ResponseInfo};
pub use convention::{DefaultServerRequestConvention, ObservationConvention, Tag, Tags};
pub use outcome::{Outcome, Series};
pub use recorder::{ExchangeRecorder, MetricsRecorder, Observation};
