use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::{Decision, MetricSnapshot};
use crate::ports::{AlertSink, MetricProvider, ShutdownAction};

use super::ThresholdPolicy;

/// What happened to the shutdown action during a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownOutcome {
    NotRequired,
    Requested,
    Failed(String),
}

/// Summary of one evaluation cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub hostname: String,
    pub decisions: Vec<Decision>,
    pub alerts_delivered: usize,
    pub alerts_failed: usize,
    pub shutdown: ShutdownOutcome,
}

/// Runs one sample → evaluate → dispatch → shutdown cycle.
///
/// Holds no state between cycles. Alert failures are logged and never stop
/// the remaining alerts or the shutdown. The shutdown action runs at most
/// once, after every alert of the cycle has been dispatched.
pub struct Evaluator {
    provider: Arc<dyn MetricProvider>,
    policy: ThresholdPolicy,
    sink: Arc<dyn AlertSink>,
    shutdown: Arc<dyn ShutdownAction>,
}

impl Evaluator {
    pub fn new(
        provider: Arc<dyn MetricProvider>,
        policy: ThresholdPolicy,
        sink: Arc<dyn AlertSink>,
        shutdown: Arc<dyn ShutdownAction>,
    ) -> Self {
        Self {
            provider,
            policy,
            sink,
            shutdown,
        }
    }

    pub async fn run_cycle(&self) -> CycleReport {
        debug!("Sampling metrics");
        let snapshot = self.provider.sample().await;
        log_snapshot(&snapshot);

        let decisions = self.policy.evaluate(&snapshot);
        if decisions.is_empty() {
            info!("All metrics within thresholds on {}", snapshot.hostname);
        }

        let mut alerts_delivered = 0;
        let mut alerts_failed = 0;
        let mut shutdown_reason: Option<&str> = None;

        for decision in &decisions {
            match self.sink.notify(&decision.subject, &decision.body).await {
                Ok(()) => {
                    debug!("Dispatched {} alert via {}", decision.kind, self.sink.name());
                    alerts_delivered += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to deliver {} alert \"{}\" via {}: {}",
                        decision.kind,
                        decision.subject,
                        self.sink.name(),
                        e
                    );
                    alerts_failed += 1;
                }
            }

            if decision.is_critical() && shutdown_reason.is_none() {
                shutdown_reason = Some(decision.body.as_str());
            }
        }

        let shutdown = match shutdown_reason {
            None => ShutdownOutcome::NotRequired,
            Some(reason) => {
                error!("Shutting down due to: {}", reason);
                match self.shutdown.shutdown(reason).await {
                    Ok(()) => ShutdownOutcome::Requested,
                    Err(e) => {
                        error!("CRITICAL: shutdown action failed, host is still running: {}", e);
                        ShutdownOutcome::Failed(e.to_string())
                    }
                }
            }
        };

        CycleReport {
            hostname: snapshot.hostname,
            decisions,
            alerts_delivered,
            alerts_failed,
            shutdown,
        }
    }
}

fn log_snapshot(snapshot: &MetricSnapshot) {
    info!("Host: {} (sampled {})", snapshot.hostname, snapshot.timestamp.to_rfc3339());

    if snapshot.temperatures.is_empty() {
        info!("Temperature: no sensors found");
    }
    for (sensor, celsius) in &snapshot.temperatures {
        info!("Temperature {}: {:.1}°C", sensor, celsius);
    }

    info!("GPU Temperature: {}", reading(snapshot.gpu_temperature, "°C"));
    info!("CPU Usage: {}", reading(snapshot.cpu_percent, "%"));
    info!("Memory Usage: {}", reading(snapshot.memory_percent, "%"));
    info!("Disk Usage: {}", reading(snapshot.disk_percent, "%"));
    info!("Uptime: {}", reading(snapshot.uptime_hours, " hours"));
    info!(
        "Network: sent {}, received {}",
        bytes(snapshot.network_bytes_sent),
        bytes(snapshot.network_bytes_received)
    );
}

fn reading(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.1}{}", v, unit),
        None => "unavailable".to_string(),
    }
}

fn bytes(value: Option<u64>) -> String {
    match value {
        Some(v) => format!("{} bytes", v),
        None => "unavailable".to_string(),
    }
}
