use color_eyre::Result;
use eyre::Context as _;
use std::{
    net::{
        Ipv4Addr,
        SocketAddr,
    },
    sync::Arc,
};
use tokio_util::sync::CancellationToken;
use vbr_metrics_collector::{
    health::{
        failure_channel,
        Probe as _,
    },
    shutdown::spawn_signal_listener,
    BackupSource as _,
    HealthMonitor,
    HealthState,
    InfluxSink,
    Orchestrator,
    PointMapper,
    VeeamClient,
};
use vbr_metrics_config::Config;

/// Connects to both servers, starts the health endpoint and runs the
/// collection loop until it stops.
pub async fn run(config: Config) -> Result<()> {
    let client = VeeamClient::new(&config.veeam)?;
    let server_info = client
        .server_info()
        .await
        .wrap_err_with(|| format!("Failed to reach VBR server at {}", config.veeam.host))?;
    info!(
        name = %server_info.name,
        version = %server_info.build_version,
        "Connected to Veeam Backup & Replication"
    );

    let sink = InfluxSink::new(&config.influx);
    let influx_probe = sink.probe();
    influx_probe
        .probe()
        .await
        .wrap_err_with(|| format!("Failed to reach InfluxDB at {}", config.influx.host))?;

    let (failures_tx, failures_rx) = failure_channel();
    let shutdown = CancellationToken::new();

    let state = HealthState::new(Arc::new(influx_probe), Arc::new(client.clone()), failures_tx);
    let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.health_check.port));
    let monitor = HealthMonitor::bind(address, &config.health_check.endpoint, state).await?;
    tokio::spawn(async move {
        if let Err(err) = monitor.serve().await {
            error!("Health check endpoint failed: {err}");
            std::process::exit(1);
        }
    });

    spawn_signal_listener(shutdown.clone());

    let mut orchestrator = Orchestrator::new(
        client,
        sink,
        PointMapper::from_config(&config),
        server_info,
        config.interval(),
        failures_rx,
        shutdown,
    );
    orchestrator.run().await.wrap_err("Collection stopped")?;

    info!("Collector stopped");
    Ok(())
}
