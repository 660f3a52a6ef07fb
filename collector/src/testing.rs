//! In-memory collaborators shared by the unit tests.

use crate::{
    error::{
        CollectError,
        Component,
        Result,
    },
    health::Probe,
    point::Point,
    sink::MetricsSink,
    veeam::{
        models::{
            AdvancedSettings,
            BackupObject,
            ManagedServer,
            Proxy,
            ProxyServer,
            Repositories,
            RepositoryConfig,
            RepositorySettings,
            RepositoryState,
            ServerInfo,
            Session,
            SessionOutcome,
            SessionResult,
        },
        BackupSource,
        Inventory,
    },
};
use async_trait::async_trait;
use chrono::{
    TimeZone,
    Utc,
};
use std::sync::{
    atomic::{
        AtomicUsize,
        Ordering,
    },
    Arc,
    Mutex,
};

pub fn server_info() -> ServerInfo {
    ServerInfo {
        vbr_id: "9a2e".to_string(),
        name: "vbr01".to_string(),
        build_version: "12.1.2.172".to_string(),
        database_vendor: "PostgreSql".to_string(),
    }
}

/// One record of every kind, each of which maps to exactly one point.
pub fn inventory() -> Inventory {
    Inventory {
        sessions: vec![Session {
            name: "Nightly".to_string(),
            session_type: "BackupJob".to_string(),
            state: "Stopped".to_string(),
            creation_time: Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 20, 15, 30).unwrap()),
            result: SessionOutcome {
                result: SessionResult::Success,
                message: None,
            },
        }],
        managed_servers: vec![ManagedServer {
            name: "esx01.lab".to_string(),
            kind: "ViHost".to_string(),
            description: None,
        }],
        repositories: Repositories {
            configs: vec![RepositoryConfig {
                id: "r1".to_string(),
                name: "Default Backup Repository".to_string(),
                repository: RepositorySettings {
                    max_task_count: 4,
                    advanced_settings: AdvancedSettings { per_vm_backup: true },
                },
            }],
            states: vec![RepositoryState {
                id: "r1".to_string(),
                name: "Default Backup Repository".to_string(),
                kind: "WinLocal".to_string(),
                description: None,
                path: "C:\\Backup\\".to_string(),
                capacity_gb: 100.0,
                free_gb: 40.0,
                used_space_gb: 60.0,
            }],
        },
        proxies: vec![Proxy {
            name: "VMware Backup Proxy".to_string(),
            kind: "ViProxy".to_string(),
            description: None,
            server: ProxyServer {
                transport_mode: "Auto".to_string(),
                max_task_count: 2,
            },
        }],
        backup_objects: vec![BackupObject {
            name: "web01".to_string(),
            kind: "VM".to_string(),
            platform_name: "VMware".to_string(),
            vi_type: "VirtualMachine".to_string(),
            object_id: "vm-101".to_string(),
            path: "vcenter/dc/web01".to_string(),
            restore_points_count: 7,
        }],
    }
}

/// Serves [`inventory`] and records which operations were called. The
/// operation named by `fail_on` answers 503 instead.
#[derive(Default)]
pub struct FakeSource {
    pub inventory: Inventory,
    pub fail_on: Option<&'static str>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            inventory: inventory(),
            ..Default::default()
        }
    }

    pub fn failing_on(operation: &'static str) -> Self {
        Self {
            fail_on: Some(operation),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn call<T: Clone>(&self, operation: &'static str, value: &T) -> Result<T> {
        self.calls.lock().unwrap().push(operation);
        if self.fail_on == Some(operation) {
            return Err(CollectError::Status {
                component: Component::Veeam,
                context: format!("listing {operation}"),
                status: 503,
            });
        }
        Ok(value.clone())
    }
}

#[async_trait]
impl BackupSource for FakeSource {
    async fn server_info(&self) -> Result<ServerInfo> {
        self.call("server_info", &server_info())
    }

    async fn sessions(&self) -> Result<Vec<Session>> {
        self.call("sessions", &self.inventory.sessions)
    }

    async fn managed_servers(&self) -> Result<Vec<ManagedServer>> {
        self.call("managed_servers", &self.inventory.managed_servers)
    }

    async fn repositories(&self) -> Result<Repositories> {
        self.call("repositories", &self.inventory.repositories)
    }

    async fn proxies(&self) -> Result<Vec<Proxy>> {
        self.call("proxies", &self.inventory.proxies)
    }

    async fn backup_objects(&self) -> Result<Vec<BackupObject>> {
        self.call("backup_objects", &self.inventory.backup_objects)
    }
}

#[derive(Debug, Default)]
pub struct SinkLog {
    pub written: Vec<Point>,
    pub flushes: usize,
}

/// Keeps every written point. Clones share the same log, so a test can
/// inspect it after handing the sink to the orchestrator.
#[derive(Clone, Default)]
pub struct RecordingSink {
    log: Arc<Mutex<SinkLog>>,
    fail_flush: bool,
}

impl RecordingSink {
    pub fn failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Default::default()
        }
    }

    pub fn measurements(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().written.iter().map(|p| p.measurement).collect()
    }

    pub fn written(&self) -> usize {
        self.log.lock().unwrap().written.len()
    }

    pub fn flushes(&self) -> usize {
        self.log.lock().unwrap().flushes
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn write_point(&mut self, point: Point) -> Result<()> {
        self.log.lock().unwrap().written.push(point);
        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.log.lock().unwrap().flushes += 1;
        if self.fail_flush {
            return Err(CollectError::connectivity(
                Component::Influxdb,
                "writing points",
                eyre::eyre!("connection refused"),
            ));
        }
        Ok(())
    }
}

pub struct FakeProbe {
    component: Component,
    healthy: bool,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn new(component: Component, healthy: bool) -> Self {
        Self {
            component,
            healthy,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for FakeProbe {
    fn component(&self) -> Component {
        self.component
    }

    async fn probe(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.healthy {
            Ok(())
        } else {
            Err(CollectError::connectivity(self.component, "pinging", eyre::eyre!("connection refused")))
        }
    }
}
