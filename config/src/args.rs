use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the collector config file (yaml)
    #[arg(long, env = "VBR_METRICS_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Write an example config.yaml with the default values and exit
    #[arg(long, action, env = "VBR_METRICS_EXPORT")]
    pub export: bool,
}
