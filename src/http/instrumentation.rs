//! Request observation middleware.
//!
//! # Responsibilities
//! - Build an `ExchangeContext` per request (method, raw path, matched route)
//! - Fill in the response status and any captured error once the handler finishes
//! - Record the exchange exactly once, including when it never finishes
//!
//! # Design Decisions
//! - Applied with `Router::layer`, so it runs after routing and sees `MatchedPath`
//! - Handlers report failures by attaching a `CapturedError` to the response
//! - A drop guard records cancelled exchanges (client gone, timeout) as aborted

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::config::ObservabilityConfig;
use crate::observability::{
    CapturedError, DefaultServerRequestConvention, ExchangeContext, ExchangeRecorder,
    MetricsRecorder, Observation, ObservationConvention, RequestCarrier, ResponseInfo,
};

/// Shared state for `observe_exchange`: the policy and the sink.
#[derive(Clone)]
pub struct ObservationState {
    convention: Arc<dyn ObservationConvention>,
    recorder: Arc<dyn ExchangeRecorder>,
}

impl ObservationState {
    pub fn new(
        convention: Arc<dyn ObservationConvention>,
        recorder: Arc<dyn ExchangeRecorder>,
    ) -> Self {
        Self {
            convention,
            recorder,
        }
    }

    /// Default convention named per config, recorded through `metrics`.
    pub fn from_config(config: &ObservabilityConfig) -> Self {
        Self::new(
            Arc::new(DefaultServerRequestConvention::with_name(
                config.observation_name.clone(),
            )),
            Arc::new(MetricsRecorder),
        )
    }

    fn record(&self, ctx: &ExchangeContext, duration: Duration) {
        let observation = Observation::observe(self.convention.as_ref(), ctx, duration);
        self.recorder.record(&observation);
    }
}

impl std::fmt::Debug for ObservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservationState")
            .field("name", &self.convention.name())
            .finish_non_exhaustive()
    }
}

/// Attach a handler failure to its response so the exchange is tagged with it.
pub fn attach_error<E: std::error::Error>(response: &mut Response, error: &E) {
    response.extensions_mut().insert(CapturedError::of(error));
}

/// Middleware: observe one request/response exchange.
pub async fn observe_exchange(
    State(state): State<ObservationState>,
    request: Request,
    next: Next,
) -> Response {
    let mut ctx = ExchangeContext::for_request(RequestCarrier::new(
        request.method().clone(),
        request.uri().path(),
    ));
    if let Some(matched) = request.extensions().get::<MatchedPath>() {
        ctx.set_route_pattern(matched.as_str());
    }

    let guard = ExchangeGuard::start(state, ctx);
    let response = next.run(request).await;
    guard.complete(&response);
    response
}

/// Holds the in-flight context; records it on completion or on drop.
struct ExchangeGuard {
    state: ObservationState,
    ctx: Option<ExchangeContext>,
    started: Instant,
}

impl ExchangeGuard {
    fn start(state: ObservationState, ctx: ExchangeContext) -> Self {
        Self {
            state,
            ctx: Some(ctx),
            started: Instant::now(),
        }
    }

    fn complete(mut self, response: &Response) {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.set_response(ResponseInfo::new(response.status()));
            if let Some(error) = response.extensions().get::<CapturedError>() {
                ctx.set_error(error.clone());
            }
            self.state.record(&ctx, self.started.elapsed());
        }
    }
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.mark_aborted();
            tracing::debug!(
                contextual_name = %self.state.convention.contextual_name(&ctx),
                "Exchange aborted before response"
            );
            self.state.record(&ctx, self.started.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture(Mutex<Vec<Observation>>);

    impl ExchangeRecorder for Capture {
        fn record(&self, observation: &Observation) {
            self.0.lock().unwrap().push(observation.clone());
        }
    }

    fn state(capture: &Arc<Capture>) -> ObservationState {
        ObservationState::new(Arc::new(DefaultServerRequestConvention::new()), capture.clone())
    }

    fn carrier_ctx() -> ExchangeContext {
        ExchangeContext::for_request(RequestCarrier::new(
            axum::http::Method::PUT,
            "/items/3",
        ))
        .with_route_pattern("/items/{id}")
    }

    #[test]
    fn test_guard_completion_records_once() {
        let capture = Arc::new(Capture::default());
        let guard = ExchangeGuard::start(state(&capture), carrier_ctx());

        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = axum::http::StatusCode::CREATED;
        guard.complete(&response);

        let observations = capture.0.lock().unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].low_cardinality.get("status"), Some("201"));
        assert_eq!(observations[0].low_cardinality.get("outcome"), Some("SUCCESS"));
    }

    #[test]
    fn test_guard_drop_records_aborted() {
        let capture = Arc::new(Capture::default());
        drop(ExchangeGuard::start(state(&capture), carrier_ctx()));

        let observations = capture.0.lock().unwrap();
        assert_eq!(observations.len(), 1);
        let tags = &observations[0].low_cardinality;
        assert_eq!(tags.get("status"), Some("UNKNOWN"));
        assert_eq!(tags.get("outcome"), Some("UNKNOWN"));
        assert_eq!(tags.get("uri"), Some("/items/{id}"));
        assert_eq!(observations[0].contextual_name, "http put /items/{id}");
    }

    #[test]
    fn test_attach_error() {
        let mut response = Response::new(axum::body::Body::empty());
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        attach_error(&mut response, &err);

        let captured = response.extensions().get::<CapturedError>().unwrap();
        assert_eq!(captured.simple_name, "Error");
        assert!(captured.type_name.ends_with("::Error"));
        assert_eq!(captured.message, "disk gone");
    }
}
