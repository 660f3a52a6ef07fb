use serde::Serialize;
use strum::Display;

/// The two collaborators a collection cycle depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Component {
    Influxdb,
    Veeam,
}

/// A failed health probe, as reported by the health endpoint and forwarded
/// to the collection loop.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("health check of {component} failed: {message}")]
pub struct HealthFailure {
    pub component: Component,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum CollectError {
    #[error("{component} is unreachable while {context}: {source}")]
    Connectivity {
        component: Component,
        context: String,
        #[source]
        source: eyre::Report,
    },
    #[error("{component} answered {status} while {context}")]
    Status {
        component: Component,
        context: String,
        status: u16,
    },
    #[error("could not parse {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not authenticate against veeam: {0}")]
    Authentication(String),
    #[error("could not write {measurement}: {message}")]
    Write { measurement: String, message: String },
    #[error(transparent)]
    Unhealthy(#[from] HealthFailure),
    #[error("could not bind health check listener on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl CollectError {
    pub fn connectivity(component: Component, context: impl Into<String>, source: impl Into<eyre::Report>) -> Self {
        Self::Connectivity {
            component,
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// The collaborator that caused the error, if one can be named.
    pub fn component(&self) -> Option<Component> {
        match self {
            Self::Connectivity { component, .. } | Self::Status { component, .. } => Some(*component),
            Self::Decode { .. } | Self::Authentication(_) => Some(Component::Veeam),
            Self::Write { .. } => Some(Component::Influxdb),
            Self::Unhealthy(failure) => Some(failure.component),
            Self::Bind { .. } => None,
        }
    }
}

pub type Result<T, E = CollectError> = std::result::Result<T, E>;
