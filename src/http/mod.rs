//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routing)
//!     → instrumentation.rs (ExchangeContext per request, recorded at completion)
//!     → handlers / fallback
//!     → Send to client
//! ```

pub mod instrumentation;
pub mod server;

pub use instrumentation::{attach_error, observe_exchange, ObservationState};
pub use server::{build_router, HttpServer, ServiceError};
