pub mod influx;

use crate::{
    error::Result,
    point::Point,
};
use async_trait::async_trait;
pub use influx::{
    InfluxProbe,
    InfluxSink,
};

/// Where the points of a cycle are written. `write_point` may buffer; nothing
/// is guaranteed to be stored before `flush` returns.
#[async_trait]
pub trait MetricsSink: Send {
    async fn write_point(&mut self, point: Point) -> Result<()>;

    async fn flush(&mut self) -> Result<()>;
}
