use crate::{
    error::{
        CollectError,
        HealthFailure,
        Result,
    },
    health::FailureReceiver,
    mapping::PointMapper,
    point::Point,
    sink::MetricsSink,
    veeam::{
        models::ServerInfo,
        BackupSource,
        Inventory,
    },
};
use std::time::Duration;
use tokio::time::{
    self,
    Instant,
    MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

enum Wake {
    Tick,
    Shutdown,
    Unhealthy(HealthFailure),
}

/// Drives the collection cycles: fetch everything, write everything, flush,
/// then wait for the next tick, a shutdown or a health failure.
pub struct Orchestrator<S, K> {
    source: S,
    sink: K,
    mapper: PointMapper,
    server_info: ServerInfo,
    interval: Duration,
    failures: FailureReceiver,
    shutdown: CancellationToken,
}

impl<S, K> Orchestrator<S, K>
where
    S: BackupSource,
    K: MetricsSink,
{
    pub fn new(
        source: S,
        sink: K,
        mapper: PointMapper,
        server_info: ServerInfo,
        interval: Duration,
        failures: FailureReceiver,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source,
            sink,
            mapper,
            server_info,
            interval,
            failures,
            shutdown,
        }
    }

    /// Runs cycles until shut down. The first cycle starts immediately.
    ///
    /// Any fetch, write or flush error ends the run with that error, as does
    /// a failure reported by the health endpoint. Shutdown is only observed
    /// between cycles and ends the run with `Ok` after a last flush.
    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "Starting collection loop");

        loop {
            let start = Instant::now();
            self.cycle().await?;
            info!(duration_ms = start.elapsed().as_millis() as u64, "Collection cycle done");

            let wake = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => Wake::Shutdown,
                Some(failure) = self.failures.recv() => Wake::Unhealthy(failure),
                _ = ticker.tick() => Wake::Tick,
            };

            match wake {
                Wake::Tick => continue,
                Wake::Shutdown => {
                    info!("Shutdown requested, flushing pending points");
                    if let Err(err) = self.sink.flush().await {
                        warn!("Final flush failed: {err}");
                    }
                    return Ok(());
                }
                Wake::Unhealthy(failure) => {
                    error!(component = %failure.component, "Stopping collection after failed health check");
                    return Err(CollectError::Unhealthy(failure));
                }
            }
        }
    }

    async fn cycle(&mut self) -> Result<()> {
        let inventory = self.fetch().await?;
        self.store(&inventory).await?;
        self.sink.flush().await
    }

    async fn fetch(&self) -> Result<Inventory> {
        let sessions = self.source.sessions().await?;
        debug!(count = sessions.len(), "Fetched sessions");

        let managed_servers = self.source.managed_servers().await?;
        debug!(count = managed_servers.len(), "Fetched managed servers");

        let repositories = self.source.repositories().await?;
        debug!(count = repositories.configs.len(), "Fetched repositories");

        let proxies = self.source.proxies().await?;
        debug!(count = proxies.len(), "Fetched proxies");

        let backup_objects = self.source.backup_objects().await?;
        debug!(count = backup_objects.len(), "Fetched backup objects");

        Ok(Inventory {
            sessions,
            managed_servers,
            repositories,
            proxies,
            backup_objects,
        })
    }

    async fn store(&mut self, inventory: &Inventory) -> Result<()> {
        let info = self.mapper.server_info(&self.server_info);
        self.sink.write_point(info).await?;

        let batches = [
            ("sessions", self.mapper.sessions(&inventory.sessions)),
            ("managed servers", self.mapper.managed_servers(&inventory.managed_servers)),
            ("repositories", self.mapper.repositories(&inventory.repositories)),
            ("proxies", self.mapper.proxies(&inventory.proxies)),
            ("backup objects", self.mapper.backup_objects(&inventory.backup_objects)),
        ];

        for (name, points) in batches {
            info!(count = points.len(), "Storing {name}");
            self.write_all(points).await?;
        }

        Ok(())
    }

    async fn write_all(&mut self, points: Vec<Point>) -> Result<()> {
        for point in points {
            self.sink.write_point(point).await?;
        }
        Ok(())
    }
}
