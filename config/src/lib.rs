#[macro_use]
extern crate tracing;

mod args;

pub use args::Args;
use color_eyre::Result;
use eyre::{
    bail,
    Context as _,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeSet,
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};
use url::Url;

pub const VEEAM_USERNAME_ENV: &str = "VEEAM_ADMIN_USERNAME";
pub const VEEAM_PASSWORD_ENV: &str = "VEEAM_ADMIN_PASSWORD";
pub const INFLUX_TOKEN_ENV: &str = "INFLUXDB_TOKEN";
pub const INFLUX_ORG_ENV: &str = "INFLUXDB_ORG_NAME";

pub const EXPORT_FILE_NAME: &str = "config.yaml";

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VeeamConfig {
    pub host: Url,
    pub x_api_version: String,
    #[serde(default)]
    pub trust_self_signed_cert: bool,
    pub username: String,
    pub password: String,
    /// Session types that are never written, e.g. `MalwareDetection`.
    #[serde(default)]
    pub excluded_job_types: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfluxConfig {
    pub host: Url,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    pub port: u16,
    pub endpoint: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub veeam: VeeamConfig,
    pub influx: InfluxConfig,
    pub health_check: HealthCheckConfig,
    pub log_level: String,
    pub interval_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    /// Loads the config file at `path` on top of the built-in defaults and
    /// applies the credential overrides from the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let file = config::File::from(path.to_path_buf())
            .format(config::FileFormat::Yaml)
            .required(true);

        Self::from_source(file, |key| std::env::var(key).ok().filter(|value| !value.is_empty()))
            .wrap_err_with(|| format!("Failed to load config from {:?}", path))
    }

    pub fn from_source<S, E>(source: S, env: E) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
        E: Fn(&str) -> Option<String>,
    {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(source)
            .set_override_option("veeam.username", env(VEEAM_USERNAME_ENV))?
            .set_override_option("veeam.password", env(VEEAM_PASSWORD_ENV))?
            .set_override_option("influx.token", env(INFLUX_TOKEN_ENV))?
            .set_override_option("influx.org", env(INFLUX_ORG_ENV))?
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_seconds == 0 {
            bail!("interval_seconds must be greater than zero");
        }
        if !self.health_check.endpoint.starts_with('/') {
            bail!(
                "health_check.endpoint must start with '/', got {:?}",
                self.health_check.endpoint
            );
        }
        if self.influx.org.trim().is_empty() {
            bail!("influx.org must not be empty");
        }
        if self.influx.bucket.trim().is_empty() {
            bail!("influx.bucket must not be empty");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Writes the default configuration as `config.yaml` into `dir`.
    pub fn export(dir: &Path) -> Result<PathBuf> {
        let path = dir.join(EXPORT_FILE_NAME);
        let content = serde_yml::to_string(&Self::default()).context("Failed to serialize config")?;
        std::fs::write(&path, content).wrap_err_with(|| format!("Failed to write config to {:?}", path))?;
        info!(file = ?path, "Config file example created");
        Ok(path)
    }
}
