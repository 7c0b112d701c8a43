//! Exchange state captured for tagging.
//!
//! # Responsibilities
//! - Hold what the instrumentation learns about one request/response exchange
//! - Expose it read-only to observation conventions
//!
//! # Design Decisions
//! - Every field is optional; conventions treat absence as a normal branch
//! - Single writer (the instrumentation) fills it in, then it is only read
//! - `aborted` is authoritative over any partially recorded response

use axum::http::{Method, StatusCode};

/// The request side of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCarrier {
    pub method: Method,
    /// Raw request path, exactly as received.
    pub path: String,
}

impl RequestCarrier {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

/// The response side of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseInfo {
    /// Set once the response head is finalized.
    pub status: Option<StatusCode>,
}

impl ResponseInfo {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status: Some(status),
        }
    }

    /// A response object whose status was never committed.
    pub fn pending() -> Self {
        Self { status: None }
    }
}

/// An unhandled failure recorded during request handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    /// Fully qualified type name.
    pub type_name: String,
    /// Unqualified type name. May be empty for generated types.
    pub simple_name: String,
    pub message: String,
}

impl CapturedError {
    /// Build from explicit names.
    pub fn new(
        type_name: impl Into<String>,
        simple_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            simple_name: simple_name.into(),
            message: message.into(),
        }
    }

    /// Capture an error value, deriving its names from the Rust type.
    pub fn of<E: std::error::Error + ?Sized>(error: &E) -> Self {
        let type_name = std::any::type_name::<E>();
        Self {
            type_name: type_name.to_string(),
            simple_name: simple_type_name(type_name).to_string(),
            message: error.to_string(),
        }
    }
}

/// Last path segment of a type name, with generic arguments dropped.
///
/// `alloc::boxed::Box<dyn core::error::Error>` becomes `Box`,
/// `my_crate::api::ApiError` becomes `ApiError`. Trait objects keep their
/// principal trait: `dyn core::error::Error + core::marker::Send` becomes `Error`.
pub fn simple_type_name(type_name: &str) -> &str {
    let trimmed = type_name.trim_start_matches('&');
    let trimmed = trimmed.strip_prefix("mut ").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("dyn ").unwrap_or(trimmed);
    let end = [trimmed.find('<'), trimmed.find(" + ")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(trimmed.len());
    let base = &trimmed[..end];
    match base.rfind("::") {
        Some(idx) => &base[idx + 2..],
        None => base,
    }
}

/// Snapshot of one request/response exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeContext {
    carrier: Option<RequestCarrier>,
    response: Option<ResponseInfo>,
    route_pattern: Option<String>,
    aborted: bool,
    error: Option<CapturedError>,
}

impl ExchangeContext {
    /// Context for a request that has just arrived.
    pub fn for_request(carrier: RequestCarrier) -> Self {
        Self {
            carrier: Some(carrier),
            ..Self::default()
        }
    }

    /// Context with nothing known, e.g. tagging outside a real exchange.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn with_route_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.route_pattern = Some(pattern.into());
        self
    }

    pub fn with_response(mut self, response: ResponseInfo) -> Self {
        self.response = Some(response);
        self
    }

    pub fn with_status(self, status: StatusCode) -> Self {
        self.with_response(ResponseInfo::new(status))
    }

    pub fn with_error(mut self, error: CapturedError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn aborted(mut self) -> Self {
        self.aborted = true;
        self
    }

    pub fn set_route_pattern(&mut self, pattern: impl Into<String>) {
        self.route_pattern = Some(pattern.into());
    }

    pub fn set_response(&mut self, response: ResponseInfo) {
        self.response = Some(response);
    }

    pub fn set_error(&mut self, error: CapturedError) {
        self.error = Some(error);
    }

    /// Connection went away before a response was finalized.
    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    pub fn carrier(&self) -> Option<&RequestCarrier> {
        self.carrier.as_ref()
    }

    pub fn response(&self) -> Option<&ResponseInfo> {
        self.response.as_ref()
    }

    pub fn route_pattern(&self) -> Option<&str> {
        self.route_pattern.as_deref()
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn error(&self) -> Option<&CapturedError> {
        self.error.as_ref()
    }

    /// Finalized status code, if a response exists and committed one.
    ///
    /// Ignores the abort flag; status-derived tags check it first.
    pub fn status_code(&self) -> Option<StatusCode> {
        self.response.and_then(|r| r.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct UpstreamTimeout;

    impl fmt::Display for UpstreamTimeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "upstream timed out")
        }
    }

    impl std::error::Error for UpstreamTimeout {}

    #[test]
    fn test_simple_type_name() {
        assert_eq!(simple_type_name("my_crate::api::ApiError"), "ApiError");
        assert_eq!(simple_type_name("ApiError"), "ApiError");
        assert_eq!(
            simple_type_name("alloc::boxed::Box<dyn core::error::Error>"),
            "Box"
        );
        assert_eq!(simple_type_name("weird::"), "");
        assert_eq!(
            simple_type_name("dyn core::error::Error + core::marker::Send + core::marker::Sync"),
            "Error"
        );
        assert_eq!(simple_type_name("&dyn core::error::Error"), "Error");
        assert_eq!(
            simple_type_name("dyn my_crate::Fault<u8> + core::marker::Send"),
            "Fault"
        );
    }

    #[test]
    fn test_captured_error_of_trait_object() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(UpstreamTimeout);
        let captured = CapturedError::of(boxed.as_ref());
        assert_eq!(captured.simple_name, "Error");
        assert!(captured.type_name.starts_with("dyn "));
        assert_eq!(captured.message, "upstream timed out");
    }

    #[test]
    fn test_captured_error_of() {
        let captured = CapturedError::of(&UpstreamTimeout);
        assert_eq!(captured.simple_name, "UpstreamTimeout");
        assert!(captured.type_name.ends_with("::UpstreamTimeout"));
        assert_eq!(captured.message, "upstream timed out");
    }

    #[test]
    fn test_builder_and_setters() {
        let mut ctx = ExchangeContext::for_request(RequestCarrier::new(Method::GET, "/users/7"))
            .with_route_pattern("/users/{id}");
        assert_eq!(ctx.status_code(), None);

        ctx.set_response(ResponseInfo::pending());
        assert!(ctx.response().is_some());
        assert_eq!(ctx.status_code(), None);

        ctx.set_response(ResponseInfo::new(StatusCode::OK));
        assert_eq!(ctx.status_code(), Some(StatusCode::OK));
        assert!(!ctx.is_aborted());

        ctx.mark_aborted();
        assert!(ctx.is_aborted());
        assert_eq!(ctx.route_pattern(), Some("/users/{id}"));
    }

    #[test]
    fn test_detached_has_nothing() {
        let ctx = ExchangeContext::detached();
        assert!(ctx.carrier().is_none());
        assert!(ctx.response().is_none());
        assert!(ctx.route_pattern().is_none());
        assert!(ctx.error().is_none());
    }
}
