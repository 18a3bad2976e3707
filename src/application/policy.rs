use crate::domain::{Decision, DecisionKind, MetricSnapshot, ThresholdConfig};

/// Uptime above this many hours (7 days) raises a reboot reminder
pub const UPTIME_LIMIT_HOURS: f64 = 168.0;

/// Cumulative traffic in either direction above this many bytes (1 GB)
pub const NETWORK_LIMIT_BYTES: u64 = 1_000_000_000;

/// Turns a snapshot into the ordered list of breached conditions.
///
/// Evaluation is pure: no I/O, no hidden state. Every check always runs;
/// an overheating sensor does not suppress the remaining checks. Absent
/// readings are skipped. Configured limits are inclusive (a reading equal
/// to its limit is a breach), the fixed uptime and network limits must be
/// exceeded.
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    config: ThresholdConfig,
}

impl ThresholdPolicy {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, snapshot: &MetricSnapshot) -> Vec<Decision> {
        let mut decisions = Vec::new();
        let limits = &self.config;

        // BTreeMap iteration is ordered by sensor name
        for (sensor, &celsius) in &snapshot.temperatures {
            if celsius >= limits.temp_threshold_c {
                decisions.push(Decision::critical(
                    DecisionKind::TemperatureHigh,
                    format!("System Shutdown Alert: {} temperature too high", sensor),
                    format!(
                        "Your system is shutting down because: temperature too high! \
                         Sensor {}: {:.1}°C (threshold {:.1}°C)",
                        sensor, celsius, limits.temp_threshold_c
                    ),
                ));
            }
        }

        if let Some(celsius) = snapshot.gpu_temperature {
            if celsius >= limits.temp_threshold_c {
                decisions.push(Decision::warn(
                    DecisionKind::GpuTemperatureHigh,
                    "High GPU Temperature Alert",
                    format!(
                        "GPU temperature is too high! Current temperature: {:.1}°C (threshold {:.1}°C)",
                        celsius, limits.temp_threshold_c
                    ),
                ));
            }
        }

        if let Some(percent) = snapshot.cpu_percent {
            if percent >= limits.cpu_threshold_pct {
                decisions.push(usage_alert(
                    DecisionKind::CpuHigh,
                    "CPU",
                    percent,
                    limits.cpu_threshold_pct,
                ));
            }
        }

        if let Some(percent) = snapshot.memory_percent {
            if percent >= limits.memory_threshold_pct {
                decisions.push(usage_alert(
                    DecisionKind::MemoryHigh,
                    "Memory",
                    percent,
                    limits.memory_threshold_pct,
                ));
            }
        }

        if let Some(percent) = snapshot.disk_percent {
            if percent >= limits.disk_threshold_pct {
                decisions.push(usage_alert(
                    DecisionKind::DiskHigh,
                    "Disk",
                    percent,
                    limits.disk_threshold_pct,
                ));
            }
        }

        if let Some(hours) = snapshot.uptime_hours {
            if hours > UPTIME_LIMIT_HOURS {
                decisions.push(Decision::warn(
                    DecisionKind::UptimeHigh,
                    "High Uptime Alert",
                    format!(
                        "System has been up for {:.1} hours (limit {} hours). Consider rebooting.",
                        hours, UPTIME_LIMIT_HOURS
                    ),
                ));
            }
        }

        let over_limit = |bytes: Option<u64>| bytes.is_some_and(|b| b > NETWORK_LIMIT_BYTES);
        if over_limit(snapshot.network_bytes_sent) || over_limit(snapshot.network_bytes_received) {
            decisions.push(Decision::warn(
                DecisionKind::NetworkHigh,
                "High Network Usage Alert",
                format!(
                    "Network traffic is too high! Sent: {} bytes, received: {} bytes (limit {} bytes)",
                    display_bytes(snapshot.network_bytes_sent),
                    display_bytes(snapshot.network_bytes_received),
                    NETWORK_LIMIT_BYTES
                ),
            ));
        }

        decisions
    }
}

fn usage_alert(kind: DecisionKind, resource: &str, percent: f64, limit: f64) -> Decision {
    Decision::warn(
        kind,
        format!("High {} Usage Alert", resource),
        format!(
            "{} usage is too high! Current usage: {:.1}% (threshold {:.1}%)",
            resource, percent, limit
        ),
    )
}

fn display_bytes(bytes: Option<u64>) -> String {
    bytes.map_or_else(|| "unavailable".to_string(), |b| b.to_string())
}
