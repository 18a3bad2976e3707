use std::collections::BTreeMap;
use std::fs;

use async_trait::async_trait;
use tracing::warn;

use crate::ports::{MetricError, NetworkTotals, SystemSource};

use super::parser;
use super::sensors;
use super::ProcfsConfig;

/// System source implementation using procfs and sysfs.
///
/// Every reading runs on tokio's blocking pool, so a stalled file (hung
/// NFS mount, wedged sysfs attribute) can be abandoned by the caller's
/// timeout instead of freezing the sampling task.
pub struct ProcfsSystemSource {
    config: ProcfsConfig,
}

impl ProcfsSystemSource {
    pub fn new(config: ProcfsConfig) -> Self {
        Self { config }
    }

    async fn blocking<T, F>(&self, read: F) -> Result<T, MetricError>
    where
        T: Send + 'static,
        F: FnOnce(&ProcfsConfig) -> Result<T, MetricError> + Send + 'static,
    {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || read(&config))
            .await
            .map_err(|e| MetricError::Unavailable(format!("reader task failed: {}", e)))?
    }
}

fn read_proc(config: &ProcfsConfig, name: &str) -> Result<String, MetricError> {
    Ok(fs::read_to_string(config.proc_path.join(name))?)
}

fn read_cpu_stat(config: &ProcfsConfig) -> Result<parser::CpuStat, MetricError> {
    let content = read_proc(config, "stat")?;
    Ok(parser::parse_cpu_stat(&content)?)
}

fn read_hostname(config: &ProcfsConfig) -> Result<String, MetricError> {
    let content = match read_proc(config, "sys/kernel/hostname") {
        Ok(content) => content,
        Err(_) => fs::read_to_string("/etc/hostname")?,
    };

    let hostname = content.trim();
    if hostname.is_empty() {
        return Err(MetricError::Unavailable("empty hostname".to_string()));
    }
    Ok(hostname.to_string())
}

fn read_memory_percent(config: &ProcfsConfig) -> Result<f64, MetricError> {
    let content = read_proc(config, "meminfo")?;
    let meminfo = parser::parse_meminfo(&content)?;
    Ok(parser::memory_usage_percent(&meminfo)?)
}

fn read_disk_percent(config: &ProcfsConfig) -> Result<f64, MetricError> {
    let stat = nix::sys::statvfs::statvfs(config.disk_path.as_path())
        .map_err(|e| MetricError::Io(e.into()))?;

    let block_size = stat.fragment_size() as u64;
    let total = stat.blocks() as u64 * block_size;
    let free = stat.blocks_free() as u64 * block_size;
    let available = stat.blocks_available() as u64 * block_size;
    let used = total.saturating_sub(free);

    // Reserved blocks are excluded, like df
    let usable = used + available;
    if usable == 0 {
        return Err(MetricError::Unavailable(format!(
            "{} reports no capacity",
            config.disk_path.display()
        )));
    }

    Ok((used as f64 / usable as f64) * 100.0)
}

fn read_uptime_hours(config: &ProcfsConfig) -> Result<f64, MetricError> {
    let content = read_proc(config, "uptime")?;
    let seconds = parser::parse_uptime(&content)?;
    Ok(seconds / 3600.0)
}

fn read_network_totals(config: &ProcfsConfig) -> Result<NetworkTotals, MetricError> {
    let net_class_path = config.sys_path.join("class/net");
    let mut totals = NetworkTotals {
        bytes_sent: 0,
        bytes_received: 0,
    };

    for entry in fs::read_dir(&net_class_path)? {
        let entry = entry?;
        let interface_name = entry.file_name().to_string_lossy().to_string();

        // Skip loopback
        if interface_name == "lo" {
            continue;
        }

        match parser::parse_net_stats(&entry.path().join("statistics")) {
            Ok((rx_bytes, tx_bytes)) => {
                totals.bytes_received = totals.bytes_received.saturating_add(rx_bytes);
                totals.bytes_sent = totals.bytes_sent.saturating_add(tx_bytes);
            }
            Err(e) => warn!("Skipping interface {} in network totals: {}", interface_name, e),
        }
    }

    Ok(totals)
}

#[async_trait]
impl SystemSource for ProcfsSystemSource {
    async fn hostname(&self) -> Result<String, MetricError> {
        self.blocking(read_hostname).await
    }

    async fn cpu_percent(&self) -> Result<f64, MetricError> {
        let before = self.blocking(read_cpu_stat).await?;
        tokio::time::sleep(self.config.cpu_sample_interval).await;
        let after = self.blocking(read_cpu_stat).await?;

        parser::cpu_usage_percent(&before, &after).ok_or_else(|| {
            MetricError::Unavailable("no CPU time elapsed between samples".to_string())
        })
    }

    async fn memory_percent(&self) -> Result<f64, MetricError> {
        self.blocking(read_memory_percent).await
    }

    async fn disk_percent(&self) -> Result<f64, MetricError> {
        self.blocking(read_disk_percent).await
    }

    async fn uptime_hours(&self) -> Result<f64, MetricError> {
        self.blocking(read_uptime_hours).await
    }

    async fn network_totals(&self) -> Result<NetworkTotals, MetricError> {
        self.blocking(read_network_totals).await
    }

    async fn temperatures(&self) -> Result<BTreeMap<String, f64>, MetricError> {
        self.blocking(|config| Ok(sensors::read_temperatures(&config.sys_path)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::application::sampler::tests::StubGpu;
    use crate::application::Sampler;
    use crate::ports::MetricProvider;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn source(proc: &Path, sys: &Path) -> ProcfsSystemSource {
        let config = ProcfsConfig::new(proc, sys)
            .with_disk_path(proc)
            .with_cpu_sample_interval(Duration::from_millis(1));
        ProcfsSystemSource::new(config)
    }

    #[tokio::test]
    async fn test_reads_fake_proc_tree() {
        let proc = tempfile::tempdir().unwrap();
        let sys = tempfile::tempdir().unwrap();
        write(proc.path(), "sys/kernel/hostname", "nas-01\n");
        write(proc.path(), "uptime", "720000.00 1000.00\n");
        write(
            proc.path(),
            "meminfo",
            "MemTotal:       2000 kB\nMemFree:         100 kB\nMemAvailable:   1000 kB\n",
        );
        write(sys.path(), "class/net/lo/statistics/rx_bytes", "999999999999\n");
        write(sys.path(), "class/net/lo/statistics/tx_bytes", "999999999999\n");
        write(sys.path(), "class/net/eth0/statistics/rx_bytes", "1500\n");
        write(sys.path(), "class/net/eth0/statistics/tx_bytes", "700\n");
        write(sys.path(), "class/net/wlan0/statistics/rx_bytes", "500\n");
        write(sys.path(), "class/net/wlan0/statistics/tx_bytes", "300\n");

        let source = source(proc.path(), sys.path());

        assert_eq!(source.hostname().await.unwrap(), "nas-01");
        assert_eq!(source.uptime_hours().await.unwrap(), 200.0);
        assert_eq!(source.memory_percent().await.unwrap(), 50.0);
        assert_eq!(
            source.network_totals().await.unwrap(),
            NetworkTotals {
                bytes_sent: 1000,
                bytes_received: 2000,
            }
        );
        assert!(source.temperatures().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disk_usage_of_real_filesystem() {
        let proc = tempfile::tempdir().unwrap();
        let source = source(proc.path(), proc.path());

        let percent = source.disk_percent().await.unwrap();
        assert!((0.0..=100.0).contains(&percent));
    }

    #[tokio::test]
    async fn test_missing_files_are_errors_not_zero() {
        let proc = tempfile::tempdir().unwrap();
        let source = source(proc.path(), proc.path());

        assert!(matches!(source.memory_percent().await, Err(MetricError::Io(_))));
        assert!(source.uptime_hours().await.is_err());
        assert!(source.network_totals().await.is_err());
    }

    #[tokio::test]
    async fn test_static_cpu_counters_are_unavailable() {
        let proc = tempfile::tempdir().unwrap();
        write(proc.path(), "stat", "cpu  100 0 50 1000 0 0 0 0\n");
        let source = source(proc.path(), proc.path());

        assert!(matches!(
            source.cpu_percent().await,
            Err(MetricError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unparseable_interface_is_skipped() {
        let sys = tempfile::tempdir().unwrap();
        write(sys.path(), "class/net/eth0/statistics/rx_bytes", "100\n");
        write(sys.path(), "class/net/eth0/statistics/tx_bytes", "50\n");
        write(sys.path(), "class/net/eth1/statistics/rx_bytes", "n/a\n");
        write(sys.path(), "class/net/eth1/statistics/tx_bytes", "7\n");
        let source = source(sys.path(), sys.path());

        assert_eq!(
            source.network_totals().await.unwrap(),
            NetworkTotals {
                bytes_sent: 50,
                bytes_received: 100,
            }
        );
    }

    #[tokio::test]
    async fn test_counters_saturate_instead_of_overflowing() {
        let sys = tempfile::tempdir().unwrap();
        let max = u64::MAX.to_string();
        write(sys.path(), "class/net/eth0/statistics/rx_bytes", &max);
        write(sys.path(), "class/net/eth0/statistics/tx_bytes", "1\n");
        write(sys.path(), "class/net/eth1/statistics/rx_bytes", "10\n");
        write(sys.path(), "class/net/eth1/statistics/tx_bytes", "1\n");
        let source = source(sys.path(), sys.path());

        let totals = source.network_totals().await.unwrap();
        assert_eq!(totals.bytes_received, u64::MAX);
        assert_eq!(totals.bytes_sent, 2);
    }

    #[tokio::test]
    async fn test_stalled_proc_file_is_abandoned_by_timeout() {
        let proc = tempfile::tempdir().unwrap();
        let sys = tempfile::tempdir().unwrap();
        write(proc.path(), "uptime", "3600.00 10.00\n");
        let fifo = proc.path().join("meminfo");
        nix::unistd::mkfifo(fifo.as_path(), nix::sys::stat::Mode::S_IRWXU).unwrap();

        let sampler = Sampler::new(
            Arc::new(source(proc.path(), sys.path())),
            Arc::new(StubGpu(None)),
            Duration::from_millis(300),
        );

        let started = Instant::now();
        let snapshot = sampler.sample().await;
        let elapsed = started.elapsed();

        // release the reader still blocked opening the FIFO
        let writer = std::thread::spawn(move || {
            let _ = fs::write(&fifo, "MemTotal: 1000 kB\nMemAvailable: 500 kB\n");
        });

        assert!(elapsed < Duration::from_secs(3), "sampling took {:?}", elapsed);
        assert!(snapshot.memory_percent.is_none());
        assert_eq!(snapshot.uptime_hours, Some(1.0));
        writer.join().unwrap();
    }
}
