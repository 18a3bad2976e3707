mod parser;
mod sensors;
mod system;

use std::path::PathBuf;
use std::time::Duration;

pub use system::ProcfsSystemSource;

/// Configuration for procfs paths (useful for container mounts)
#[derive(Debug, Clone)]
pub struct ProcfsConfig {
    pub proc_path: PathBuf,
    pub sys_path: PathBuf,
    /// Mount point whose filesystem usage is reported
    pub disk_path: PathBuf,
    /// Window between the two /proc/stat samples used for CPU usage
    pub cpu_sample_interval: Duration,
}

impl ProcfsConfig {
    pub fn new(proc_path: impl Into<PathBuf>, sys_path: impl Into<PathBuf>) -> Self {
        Self {
            proc_path: proc_path.into(),
            sys_path: sys_path.into(),
            ..Self::host()
        }
    }

    pub fn host() -> Self {
        Self {
            proc_path: PathBuf::from("/proc"),
            sys_path: PathBuf::from("/sys"),
            disk_path: PathBuf::from("/"),
            cpu_sample_interval: Duration::from_secs(1),
        }
    }

    pub fn with_disk_path(mut self, disk_path: impl Into<PathBuf>) -> Self {
        self.disk_path = disk_path.into();
        self
    }

    #[cfg(test)]
    pub fn with_cpu_sample_interval(mut self, interval: Duration) -> Self {
        self.cpu_sample_interval = interval;
        self
    }
}

impl Default for ProcfsConfig {
    fn default() -> Self {
        Self::host()
    }
}
