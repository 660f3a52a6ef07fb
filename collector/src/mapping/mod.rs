//! # Point Mapping
//!
//! Turns the records of one collection cycle into time-series points. The
//! mapper holds no state besides its settings and performs no I/O.
//!
//! Every point carries the `veeamVBR` tag with the configured backup server
//! address, so several collectors can share one bucket.
//!
//! - **`sessions`**: finished job sessions, stamped with their end time
//! - **`repositories`**: the join of the configuration and capacity views
//! - **`infrastructure`**: server info, managed servers, proxies, backup objects

mod infrastructure;
mod repositories;
mod sessions;

use std::collections::BTreeSet;
use vbr_metrics_config::Config;

pub const INFO_MEASUREMENT: &str = "veeam_vbr_info";
pub const SESSIONS_MEASUREMENT: &str = "veeam_vbr_sessions";
pub const MANAGED_SERVERS_MEASUREMENT: &str = "veeam_vbr_managedservers";
pub const REPOSITORIES_MEASUREMENT: &str = "veeam_vbr_repositories";
pub const PROXIES_MEASUREMENT: &str = "veeam_vbr_proxies";
pub const BACKUP_OBJECTS_MEASUREMENT: &str = "veeam_vbr_backupobjects";

const HOST_TAG: &str = "veeamVBR";

#[derive(Debug, Clone)]
pub struct PointMapper {
    host: String,
    excluded_job_types: BTreeSet<String>,
}

impl PointMapper {
    pub fn new(host: impl Into<String>, excluded_job_types: BTreeSet<String>) -> Self {
        Self {
            host: host.into(),
            excluded_job_types,
        }
    }

    /// The host tag carries the address as configured, without the slash
    /// that URL parsing appends to a bare origin.
    pub fn from_config(config: &Config) -> Self {
        let host = config.veeam.host.as_str().trim_end_matches('/');
        Self::new(host, config.veeam.excluded_job_types.clone())
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub const HOST: &str = "https://vbr.example.com:9419";

    pub fn mapper() -> PointMapper {
        PointMapper::new(HOST, BTreeSet::from(["MalwareDetection".to_string()]))
    }

    #[test]
    fn host_tag_keeps_the_configured_address() {
        let mut config = Config::default();
        config.veeam.host = url::Url::parse("https://veeam.server:9419").unwrap();
        assert_eq!(config.veeam.host.as_str(), "https://veeam.server:9419/");

        let mapper = PointMapper::from_config(&config);
        assert_eq!(mapper.host(), "https://veeam.server:9419");

        let point = mapper.server_info(&crate::testing::server_info());
        assert_eq!(point.tag_value("veeamVBR"), Some("https://veeam.server:9419"));
    }
}
