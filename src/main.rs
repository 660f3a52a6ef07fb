use clap::Parser;
use color_eyre::Result;
use vbr_metrics::{
    init_errors,
    init_logging,
    run,
};
use vbr_metrics_config::{
    Args,
    Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();

    if args.export {
        let path = Config::export(&std::env::current_dir()?)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let config = Config::load(&args.config)?;
    init_logging(&config.log_level)?;
    run(config).await
}
