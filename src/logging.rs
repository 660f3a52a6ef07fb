use color_eyre::Result;
use eyre::Context as _;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

/// `RUST_LOG` wins over the configured level when set.
fn filter(log_level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(log_level).wrap_err_with(|| format!("Invalid log level {log_level:?}")),
    }
}

pub fn init_logging(log_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter(log_level)?))
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .wrap_err("Failed to initialize tracing subscriber")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn configured_level_is_accepted() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert_eq!(filter("debug").unwrap().to_string(), "debug");
        }
    }

    #[test]
    fn malformed_level_is_rejected() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(filter("vbr_metrics=loud").is_err());
        }
    }
}
