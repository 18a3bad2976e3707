use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// One sampling of the host, taken once per evaluation cycle.
///
/// Every optional field may be missing because the sensor, driver or tool
/// is not present. A missing reading is never the same thing as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    pub hostname: String,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_percent: Option<f64>,
    pub uptime_hours: Option<f64>,
    pub network_bytes_sent: Option<u64>,
    pub network_bytes_received: Option<u64>,
    /// Sensor name to °C, ordered by name. Empty means no sensors were found.
    pub temperatures: BTreeMap<String, f64>,
    pub gpu_temperature: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl MetricSnapshot {
    /// A snapshot where nothing could be read.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            cpu_percent: None,
            memory_percent: None,
            disk_percent: None,
            uptime_hours: None,
            network_bytes_sent: None,
            network_bytes_received: None,
            temperatures: BTreeMap::new(),
            gpu_temperature: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
impl MetricSnapshot {
    pub fn with_cpu_percent(mut self, percent: f64) -> Self {
        self.cpu_percent = Some(percent);
        self
    }

    pub fn with_memory_percent(mut self, percent: f64) -> Self {
        self.memory_percent = Some(percent);
        self
    }

    pub fn with_disk_percent(mut self, percent: f64) -> Self {
        self.disk_percent = Some(percent);
        self
    }

    pub fn with_uptime_hours(mut self, hours: f64) -> Self {
        self.uptime_hours = Some(hours);
        self
    }

    pub fn with_network(mut self, bytes_sent: u64, bytes_received: u64) -> Self {
        self.network_bytes_sent = Some(bytes_sent);
        self.network_bytes_received = Some(bytes_received);
        self
    }

    pub fn with_temperature(mut self, sensor: impl Into<String>, celsius: f64) -> Self {
        self.temperatures.insert(sensor.into(), celsius);
        self
    }

    pub fn with_gpu_temperature(mut self, celsius: f64) -> Self {
        self.gpu_temperature = Some(celsius);
        self
    }
}
