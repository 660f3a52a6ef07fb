//! Records returned by the Veeam Backup & Replication REST API.
//!
//! Only the attributes that end up in points, plus the repository id used to
//! join the two repository views, are modelled. Everything else in the
//! responses is ignored. Absent optional attributes decode to their empty
//! value, malformed documents fail the whole collection.

use chrono::{
    DateTime,
    Utc,
};
use serde::Deserialize;

/// Envelope of every list endpoint: `{ "data": [...], "pagination": {...} }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerInfo {
    pub vbr_id: String,
    pub name: String,
    pub build_version: String,
    pub database_vendor: String,
}

/// Outcome of a job session. Anything the API adds later decodes to `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum SessionResult {
    Success,
    Warning,
    Failed,
    /// The session has not finished yet.
    #[default]
    None,
    #[serde(other)]
    Unknown,
}

impl SessionResult {
    pub fn code(self) -> Option<i64> {
        match self {
            SessionResult::Success => Some(1),
            SessionResult::Warning => Some(2),
            SessionResult::Failed => Some(3),
            SessionResult::None | SessionResult::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOutcome {
    pub result: SessionResult,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub name: String,
    pub session_type: String,
    pub state: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub result: SessionOutcome,
}

impl Session {
    pub fn duration_seconds(&self) -> Option<f64> {
        self.end_time
            .map(|end| (end - self.creation_time).num_milliseconds() as f64 / 1000.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManagedServer {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvancedSettings {
    pub per_vm_backup: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositorySettings {
    pub max_task_count: i64,
    pub advanced_settings: AdvancedSettings,
}

/// Configuration view of a repository
/// (`/api/v1/backupInfrastructure/repositories`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryConfig {
    pub id: String,
    pub name: String,
    pub repository: RepositorySettings,
}

/// Capacity and usage view of a repository
/// (`/api/v1/backupInfrastructure/repositories/states`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoryState {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub path: String,
    #[serde(rename = "capacityGB")]
    pub capacity_gb: f64,
    #[serde(rename = "freeGB")]
    pub free_gb: f64,
    #[serde(rename = "usedSpaceGB")]
    pub used_space_gb: f64,
}

/// Both views of every repository, as fetched in one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repositories {
    pub configs: Vec<RepositoryConfig>,
    pub states: Vec<RepositoryState>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProxyServer {
    pub transport_mode: String,
    pub max_task_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Proxy {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: Option<String>,
    pub server: ProxyServer,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackupObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub platform_name: String,
    pub vi_type: String,
    pub object_id: String,
    pub path: String,
    pub restore_points_count: i64,
}
