use async_trait::async_trait;

use super::MetricError;

/// Port for discrete GPU temperature
#[async_trait]
pub trait GpuSource: Send + Sync {
    /// `Ok(None)` when no discrete GPU (or its query tool) is present
    async fn gpu_temperature(&self) -> Result<Option<f64>, MetricError>;
}
