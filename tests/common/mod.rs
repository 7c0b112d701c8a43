//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use http_observation::http::{build_router, ObservationState};
use http_observation::observability::{
    DefaultServerRequestConvention, ExchangeRecorder, Observation,
};
use http_observation::ServerConfig;

/// Recorder that keeps every observation in memory.
#[derive(Default)]
pub struct CapturingRecorder {
    observations: Mutex<Vec<Observation>>,
}

impl CapturingRecorder {
    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().unwrap().clone()
    }

    /// The only observation recorded so far.
    pub fn single(&self) -> Observation {
        let observations = self.observations();
        assert_eq!(observations.len(), 1, "expected exactly one observation");
        observations.into_iter().next().unwrap()
    }
}

impl ExchangeRecorder for CapturingRecorder {
    fn record(&self, observation: &Observation) {
        self.observations.lock().unwrap().push(observation.clone());
    }
}

/// Observation state using the default convention and a capturing recorder.
pub fn capturing_state() -> (ObservationState, Arc<CapturingRecorder>) {
    let recorder = Arc::new(CapturingRecorder::default());
    let state = ObservationState::new(
        Arc::new(DefaultServerRequestConvention::new()),
        recorder.clone(),
    );
    (state, recorder)
}

/// The service router wired to a capturing recorder.
pub fn service_router() -> (Router, Arc<CapturingRecorder>) {
    let (state, recorder) = capturing_state();
    (build_router(&ServerConfig::default(), state), recorder)
}

/// Send one request through `router` and return the response status.
pub async fn send(router: Router, method: &str, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    router.oneshot(request).await.unwrap().status()
}
