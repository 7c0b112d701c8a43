//! Server request observation: bounded-cardinality tags for HTTP exchanges.
//!
//! An [`ObservationConvention`] turns the observable state of one exchange
//! (method, matched route, status, captured error, abort flag) into a fixed set
//! of low-cardinality tags, one high-cardinality tag and a contextual name.
//! The `http` module wires the default convention into an Axum service.

pub mod config;
pub mod http;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use observability::{
    DefaultServerRequestConvention, ExchangeContext, ObservationConvention, Outcome,
};
