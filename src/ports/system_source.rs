use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Why a single reading could not be acquired
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not available: {0}")]
    Unavailable(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Cumulative network counters since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkTotals {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Port for fetching host-level readings. Each call is independent and may
/// fail on its own.
#[async_trait]
pub trait SystemSource: Send + Sync {
    async fn hostname(&self) -> Result<String, MetricError>;

    /// CPU utilisation over a short measuring window, 0-100
    async fn cpu_percent(&self) -> Result<f64, MetricError>;

    async fn memory_percent(&self) -> Result<f64, MetricError>;

    /// Usage of the monitored filesystem, 0-100
    async fn disk_percent(&self) -> Result<f64, MetricError>;

    async fn uptime_hours(&self) -> Result<f64, MetricError>;

    async fn network_totals(&self) -> Result<NetworkTotals, MetricError>;

    /// Named temperature sensors in °C. Empty when the host exposes none.
    async fn temperatures(&self) -> Result<BTreeMap<String, f64>, MetricError>;
}
