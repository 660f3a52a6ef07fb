use super::MetricsSink;
use crate::{
    error::{
        CollectError,
        Component,
        Result,
    },
    health::Probe,
    point::{
        FieldValue,
        Point,
    },
};
use async_trait::async_trait;
use influxdb2::{
    models::{
        DataPoint,
        Status,
    },
    Client,
};
use vbr_metrics_config::InfluxConfig;

fn client(config: &InfluxConfig) -> Client {
    let host = config.host.as_str().trim_end_matches('/');
    Client::new(host, config.org.as_str(), config.token.as_str())
}

fn to_data_point(point: Point) -> Result<DataPoint> {
    let measurement = point.measurement;
    let mut builder = DataPoint::builder(measurement);

    for (key, value) in point.tags {
        builder = builder.tag(key, value);
    }

    for (key, value) in point.fields {
        builder = match value {
            FieldValue::Integer(value) => builder.field(key, value),
            FieldValue::Float(value) => builder.field(key, value),
            FieldValue::Boolean(value) => builder.field(key, value),
            FieldValue::Text(value) => builder.field(key, value),
        };
    }

    if let Some(nanos) = point.timestamp.and_then(|ts| ts.timestamp_nanos_opt()) {
        builder = builder.timestamp(nanos);
    }

    builder.build().map_err(|e| CollectError::Write {
        measurement: measurement.to_string(),
        message: e.to_string(),
    })
}

/// Buffers points and writes them to one InfluxDB v2 bucket on flush.
pub struct InfluxSink {
    client: Client,
    bucket: String,
    pending: Vec<DataPoint>,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Self {
        Self {
            client: client(config),
            bucket: config.bucket.clone(),
            pending: Vec::new(),
        }
    }

    pub fn probe(&self) -> InfluxProbe {
        InfluxProbe {
            client: self.client.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl MetricsSink for InfluxSink {
    async fn write_point(&mut self, point: Point) -> Result<()> {
        self.pending.push(to_data_point(point)?);
        Ok(())
    }

    /// Sends everything buffered in one request. The buffer is emptied even
    /// if the request fails.
    async fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let points = std::mem::take(&mut self.pending);
        let count = points.len();
        self.client
            .write(&self.bucket, futures::stream::iter(points))
            .await
            .map_err(|e| CollectError::connectivity(Component::Influxdb, format!("writing {count} points"), e))?;

        debug!(count, bucket = %self.bucket, "Flushed points");
        Ok(())
    }
}

/// Health probe sharing the sink's connection.
#[derive(Clone)]
pub struct InfluxProbe {
    client: Client,
}

#[async_trait]
impl Probe for InfluxProbe {
    fn component(&self) -> Component {
        Component::Influxdb
    }

    async fn probe(&self) -> Result<()> {
        let health = self
            .client
            .health()
            .await
            .map_err(|e| CollectError::connectivity(Component::Influxdb, "checking health", e))?;

        if !matches!(health.status, Status::Pass) {
            return Err(CollectError::connectivity(
                Component::Influxdb,
                "checking health",
                eyre::eyre!(
                    "influx db server not healthy: {}",
                    health.message.unwrap_or_default()
                ),
            ));
        }

        debug!(
            name = %health.name,
            version = health.version.as_deref().unwrap_or_default(),
            "InfluxDB server info"
        );
        Ok(())
    }
}
