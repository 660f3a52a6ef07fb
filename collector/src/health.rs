//! # Health Monitor
//!
//! Serves one endpoint that probes the metrics database and then the backup
//! server. A failed probe answers 500 and is also handed to the collection
//! loop, which stops instead of waiting for its next cycle to notice.

use crate::error::{
    CollectError,
    Component,
    HealthFailure,
    Result,
};
use async_trait::async_trait;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json,
    Router,
};
use serde::Serialize;
use std::{
    net::SocketAddr,
    sync::Arc,
    time::Instant,
};
use tokio::{
    net::TcpListener,
    sync::mpsc::{
        self,
        error::TrySendError,
    },
};

/// A lightweight connectivity check against one collaborator.
#[async_trait]
pub trait Probe: Send + Sync {
    fn component(&self) -> Component;

    async fn probe(&self) -> Result<()>;
}

pub type FailureSender = mpsc::Sender<HealthFailure>;
pub type FailureReceiver = mpsc::Receiver<HealthFailure>;

/// A single pending failure is enough to stop the collection loop.
pub fn failure_channel() -> (FailureSender, FailureReceiver) {
    mpsc::channel(1)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    fn ok() -> Self {
        Self {
            status: "ok",
            component: None,
            error: None,
        }
    }

    fn failed(failure: &HealthFailure) -> Self {
        Self {
            status: "error",
            component: Some(failure.component),
            error: Some(failure.message.clone()),
        }
    }
}

#[derive(Clone)]
pub struct HealthState {
    sink: Arc<dyn Probe>,
    source: Arc<dyn Probe>,
    failures: FailureSender,
}

impl HealthState {
    pub fn new(sink: Arc<dyn Probe>, source: Arc<dyn Probe>, failures: FailureSender) -> Self {
        Self {
            sink,
            source,
            failures,
        }
    }

    fn report(&self, failure: HealthFailure) {
        match self.failures.try_send(failure) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("A health check failure is already pending"),
            Err(TrySendError::Closed(_)) => debug!("Collection loop is no longer listening for health failures"),
        }
    }
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthStatus>) {
    let start = Instant::now();
    info!("Running health check probe");

    for probe in [&state.sink, &state.source] {
        if let Err(err) = probe.probe().await {
            let failure = HealthFailure {
                component: probe.component(),
                message: err.to_string(),
            };
            error!(component = %failure.component, error = %failure.message, "Health check failed");

            let body = HealthStatus::failed(&failure);
            state.report(failure);
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body));
        }
    }

    info!(duration_ms = start.elapsed().as_millis() as u64, "Health check endpoint done");
    (StatusCode::OK, Json(HealthStatus::ok()))
}

pub fn create_router(endpoint: &str, state: HealthState) -> Router {
    Router::new().route(endpoint, get(health)).with_state(state)
}

/// The health endpoint with its listener already bound.
pub struct HealthMonitor {
    listener: TcpListener,
    router: Router,
}

impl HealthMonitor {
    pub async fn bind(address: SocketAddr, endpoint: &str, state: HealthState) -> Result<Self> {
        let listener = TcpListener::bind(address).await.map_err(|source| CollectError::Bind {
            address: address.to_string(),
            source,
        })?;

        Ok(Self {
            listener,
            router: create_router(endpoint, state),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn serve(self) -> std::io::Result<()> {
        if let Ok(address) = self.listener.local_addr() {
            info!(%address, "Health check endpoint started");
        }
        axum::serve(self.listener, self.router.into_make_service()).await
    }
}
