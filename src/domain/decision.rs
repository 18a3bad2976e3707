use std::fmt;

/// What kind of condition a decision reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionKind {
    TemperatureHigh,
    GpuTemperatureHigh,
    CpuHigh,
    MemoryHigh,
    DiskHigh,
    UptimeHigh,
    NetworkHigh,
    /// Reserved for a kill-switch policy; the per-sensor policy reports
    /// overheating sensors as `TemperatureHigh`.
    #[allow(dead_code)]
    SensorCritical,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemperatureHigh => "temperature_high",
            Self::GpuTemperatureHigh => "gpu_temperature_high",
            Self::CpuHigh => "cpu_high",
            Self::MemoryHigh => "memory_high",
            Self::DiskHigh => "disk_high",
            Self::UptimeHigh => "uptime_high",
            Self::NetworkHigh => "network_high",
            Self::SensorCritical => "sensor_critical",
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Critical` means the host must be shut down after alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Critical,
}

/// One breached condition, ready to be dispatched
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub kind: DecisionKind,
    pub severity: Severity,
    pub subject: String,
    pub body: String,
}

impl Decision {
    pub fn warn(kind: DecisionKind, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warn,
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn critical(kind: DecisionKind, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Critical,
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}
