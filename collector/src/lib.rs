//! # VBR Metrics Collector
//!
//! Periodically reads the state of a Veeam Backup & Replication server through
//! its REST API and stores it as time-series points in InfluxDB v2.
//!
//! ## Architecture
//!
//! - **`veeam`**: REST client and the records it returns
//! - **`mapping`**: turns records into points
//! - **`sink`**: buffers points and writes them to InfluxDB
//! - **`orchestrator`**: the collection loop
//! - **`health`**: HTTP health endpoint that can stop the loop
//! - **`shutdown`**: turns OS signals into a cancellation token

#[macro_use]
extern crate tracing;

pub mod error;
pub mod health;
pub mod mapping;
pub mod orchestrator;
pub mod point;
pub mod shutdown;
pub mod sink;
pub mod veeam;

#[cfg(test)]
mod testing;

pub use error::{
    CollectError,
    Component,
};
pub use health::{
    HealthMonitor,
    HealthState,
};
pub use mapping::PointMapper;
pub use orchestrator::Orchestrator;
pub use point::Point;
pub use sink::{
    InfluxSink,
    MetricsSink,
};
pub use veeam::{
    BackupSource,
    VeeamClient,
};
