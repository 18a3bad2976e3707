use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::MetricSnapshot;
use crate::ports::{GpuSource, MetricError, MetricProvider, SystemSource};

/// Builds a snapshot from independent readings.
///
/// All readings are requested concurrently, each under its own timeout.
/// A failed or timed out reading is logged and left absent; it never
/// prevents the others from being collected.
pub struct Sampler {
    system_source: Arc<dyn SystemSource>,
    gpu_source: Arc<dyn GpuSource>,
    timeout: Duration,
}

impl Sampler {
    pub fn new(
        system_source: Arc<dyn SystemSource>,
        gpu_source: Arc<dyn GpuSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            system_source,
            gpu_source,
            timeout,
        }
    }

    async fn acquire<T, F>(&self, metric: &'static str, reading: F) -> Option<T>
    where
        F: Future<Output = Result<T, MetricError>>,
    {
        let result = match tokio::time::timeout(self.timeout, reading).await {
            Ok(result) => result,
            Err(_) => Err(MetricError::Timeout(self.timeout)),
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Metric {} unavailable: {}", metric, e);
                None
            }
        }
    }
}

#[async_trait]
impl MetricProvider for Sampler {
    async fn sample(&self) -> MetricSnapshot {
        let (hostname, cpu, memory, disk, uptime, network, temperatures, gpu) = tokio::join!(
            self.acquire("hostname", self.system_source.hostname()),
            self.acquire("cpu", self.system_source.cpu_percent()),
            self.acquire("memory", self.system_source.memory_percent()),
            self.acquire("disk", self.system_source.disk_percent()),
            self.acquire("uptime", self.system_source.uptime_hours()),
            self.acquire("network", self.system_source.network_totals()),
            self.acquire("temperatures", self.system_source.temperatures()),
            self.acquire("gpu_temperature", self.gpu_source.gpu_temperature()),
        );

        let gpu_temperature = gpu.flatten();
        if gpu_temperature.is_none() {
            debug!("No discrete GPU temperature reported");
        }

        MetricSnapshot {
            hostname: hostname.unwrap_or_else(|| "unknown".to_string()),
            cpu_percent: cpu,
            memory_percent: memory,
            disk_percent: disk,
            uptime_hours: uptime,
            network_bytes_sent: network.map(|n| n.bytes_sent),
            network_bytes_received: network.map(|n| n.bytes_received),
            temperatures: temperatures.unwrap_or_default(),
            gpu_temperature,
            ..MetricSnapshot::new("unknown")
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ports::NetworkTotals;

    /// Scripted system source; `None` fields fail with an IO error
    #[derive(Default, Clone)]
    pub(crate) struct StubSystem {
        pub cpu: Option<f64>,
        pub memory: Option<f64>,
        pub disk: Option<f64>,
        pub uptime: Option<f64>,
        pub network: Option<NetworkTotals>,
        pub temperatures: BTreeMap<String, f64>,
        pub stall_cpu: bool,
    }

    fn missing(what: &str) -> MetricError {
        MetricError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, what.to_string()))
    }

    #[async_trait]
    impl SystemSource for StubSystem {
        async fn hostname(&self) -> Result<String, MetricError> {
            Ok("stub-host".to_string())
        }

        async fn cpu_percent(&self) -> Result<f64, MetricError> {
            if self.stall_cpu {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.cpu.ok_or_else(|| missing("cpu"))
        }

        async fn memory_percent(&self) -> Result<f64, MetricError> {
            self.memory.ok_or_else(|| missing("memory"))
        }

        async fn disk_percent(&self) -> Result<f64, MetricError> {
            self.disk.ok_or_else(|| missing("disk"))
        }

        async fn uptime_hours(&self) -> Result<f64, MetricError> {
            self.uptime.ok_or_else(|| missing("uptime"))
        }

        async fn network_totals(&self) -> Result<NetworkTotals, MetricError> {
            self.network.ok_or_else(|| missing("network"))
        }

        async fn temperatures(&self) -> Result<BTreeMap<String, f64>, MetricError> {
            Ok(self.temperatures.clone())
        }
    }

    pub(crate) struct StubGpu(pub Option<f64>);

    #[async_trait]
    impl GpuSource for StubGpu {
        async fn gpu_temperature(&self) -> Result<Option<f64>, MetricError> {
            Ok(self.0)
        }
    }

    struct BrokenGpu;

    #[async_trait]
    impl GpuSource for BrokenGpu {
        async fn gpu_temperature(&self) -> Result<Option<f64>, MetricError> {
            Err(MetricError::Command("nvidia-smi exited with 9".to_string()))
        }
    }

    pub(crate) fn healthy_system() -> StubSystem {
        StubSystem {
            cpu: Some(12.0),
            memory: Some(40.0),
            disk: Some(55.0),
            uptime: Some(3.5),
            network: Some(NetworkTotals {
                bytes_sent: 1_000,
                bytes_received: 2_000,
            }),
            temperatures: BTreeMap::from([("Core 0".to_string(), 45.0)]),
            stall_cpu: false,
        }
    }

    fn sampler(system: StubSystem, gpu: Arc<dyn GpuSource>) -> Sampler {
        Sampler::new(Arc::new(system), gpu, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_sample_collects_every_reading() {
        let before = chrono::Utc::now();
        let snapshot = sampler(healthy_system(), Arc::new(StubGpu(Some(61.0))))
            .sample()
            .await;

        assert_eq!(snapshot.hostname, "stub-host");
        assert_eq!(snapshot.cpu_percent, Some(12.0));
        assert_eq!(snapshot.memory_percent, Some(40.0));
        assert_eq!(snapshot.disk_percent, Some(55.0));
        assert_eq!(snapshot.uptime_hours, Some(3.5));
        assert_eq!(snapshot.network_bytes_sent, Some(1_000));
        assert_eq!(snapshot.network_bytes_received, Some(2_000));
        assert_eq!(snapshot.temperatures.get("Core 0"), Some(&45.0));
        assert_eq!(snapshot.gpu_temperature, Some(61.0));
        assert!(snapshot.timestamp >= before);
    }

    #[tokio::test]
    async fn test_failed_disk_reading_is_absent_others_kept() {
        let system = StubSystem {
            disk: None,
            ..healthy_system()
        };

        let snapshot = sampler(system, Arc::new(StubGpu(None))).sample().await;

        assert!(snapshot.disk_percent.is_none());
        assert_eq!(snapshot.cpu_percent, Some(12.0));
        assert_eq!(snapshot.memory_percent, Some(40.0));
        assert_eq!(snapshot.uptime_hours, Some(3.5));
    }

    #[tokio::test]
    async fn test_stalled_reading_times_out() {
        let system = StubSystem {
            stall_cpu: true,
            ..healthy_system()
        };

        let snapshot = sampler(system, Arc::new(StubGpu(None))).sample().await;

        assert!(snapshot.cpu_percent.is_none());
        assert_eq!(snapshot.memory_percent, Some(40.0));
    }

    #[tokio::test]
    async fn test_gpu_failure_is_absent() {
        let snapshot = sampler(healthy_system(), Arc::new(BrokenGpu)).sample().await;
        assert!(snapshot.gpu_temperature.is_none());
        assert_eq!(snapshot.cpu_percent, Some(12.0));
    }
}
