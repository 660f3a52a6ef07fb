//! # Veeam Backup & Replication source
//!
//! - **`models`**: the records returned by the REST API
//! - **`client`**: the authenticated HTTP client
//! - **`BackupSource`**: what a collection cycle needs from the backup server

pub mod client;
pub mod models;

use crate::error::Result;
use async_trait::async_trait;
pub use client::VeeamClient;
use models::{
    BackupObject,
    ManagedServer,
    Proxy,
    Repositories,
    ServerInfo,
    Session,
};

/// The records collected from the backup server in one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub sessions: Vec<Session>,
    pub managed_servers: Vec<ManagedServer>,
    pub repositories: Repositories,
    pub proxies: Vec<Proxy>,
    pub backup_objects: Vec<BackupObject>,
}

/// Read access to the backup server. Every call either returns the complete
/// collection or fails.
#[async_trait]
pub trait BackupSource: Send + Sync {
    async fn server_info(&self) -> Result<ServerInfo>;

    async fn sessions(&self) -> Result<Vec<Session>>;

    async fn managed_servers(&self) -> Result<Vec<ManagedServer>>;

    /// Both repository views. The capacity view is requested once per
    /// configured repository.
    async fn repositories(&self) -> Result<Repositories>;

    async fn proxies(&self) -> Result<Vec<Proxy>>;

    async fn backup_objects(&self) -> Result<Vec<BackupObject>>;
}
