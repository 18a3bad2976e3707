mod adapters;
mod application;
mod config;
mod domain;
mod ports;

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use adapters::{build_alert_sink, CommandShutdown, DryRunShutdown, NvidiaSmi, ProcfsConfig, ProcfsSystemSource};
use application::{CycleReport, Evaluator, Sampler, ShutdownOutcome, ThresholdPolicy};
use config::Config;
use ports::ShutdownAction;

const EXIT_CONFIG: u8 = 1;
const EXIT_SHUTDOWN_FAILED: u8 = 2;
const EXIT_CYCLE_ABORTED: u8 = 3;

/// Grace period for blocking readers abandoned by their timeout
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Runs exactly one evaluation cycle and exits
fn main() -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::from(EXIT_CYCLE_ABORTED);
        }
    };

    let code = runtime.block_on(run());
    // A reader stuck on a hung mount must not keep the process alive
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    code
}

async fn run() -> ExitCode {
    let config = Config::load();

    let (directive, log_file) = match &config {
        Ok(config) => (config.log_directive(), config.log_file.clone()),
        Err(_) => (Config::default_log_directive(), None),
    };
    init_logging(directive, log_file.as_deref());

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error, no metrics sampled: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    info!("Starting hostguard v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {:?}", config);

    let evaluator = match build_evaluator(&config) {
        Ok(evaluator) => evaluator,
        Err(e) => {
            error!("Configuration error, no metrics sampled: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    if config.email.is_none() {
        info!("SENDER_EMAIL not set, alerts will only be logged");
    }
    if config.dry_run {
        warn!("Dry run: shutdown will only be logged");
    }

    // A panic inside the cycle surfaces here as a JoinError
    let outcome = tokio::spawn(async move { evaluator.run_cycle().await }).await;
    if let Err(e) = &outcome {
        error!("Evaluation cycle aborted: {}", e);
    }
    if let Ok(report) = &outcome {
        info!(
            "Cycle on {} complete: {} decision(s), {} alert(s) delivered, {} failed",
            report.hostname,
            report.decisions.len(),
            report.alerts_delivered,
            report.alerts_failed
        );
    }

    ExitCode::from(exit_status(outcome.as_ref().ok()))
}

/// Process exit status for a finished cycle; `None` means the cycle panicked
fn exit_status(report: Option<&CycleReport>) -> u8 {
    match report {
        None => EXIT_CYCLE_ABORTED,
        Some(report) => match report.shutdown {
            ShutdownOutcome::Failed(_) => EXIT_SHUTDOWN_FAILED,
            ShutdownOutcome::Requested | ShutdownOutcome::NotRequired => 0,
        },
    }
}

fn init_logging(directive: String, log_file: Option<&Path>) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| directive.into());

    let mut open_error = None;
    let output = match log_file.map(|path| OpenOptions::new().create(true).append(true).open(path)) {
        Some(Ok(file)) => tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .boxed(),
        Some(Err(e)) => {
            open_error = Some(e);
            tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
        }
        None => tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed(),
    };

    tracing_subscriber::registry().with(output).with(filter).init();

    if let Some(e) = open_error {
        warn!("Cannot open log file, logging to stderr instead: {}", e);
    }
}

fn build_evaluator(config: &Config) -> Result<Evaluator, Box<dyn std::error::Error + Send + Sync>> {
    let procfs_config = ProcfsConfig::new(config.proc_path.clone(), config.sys_path.clone())
        .with_disk_path(config.disk_path.clone());

    let sampler = Sampler::new(
        Arc::new(ProcfsSystemSource::new(procfs_config)),
        Arc::new(NvidiaSmi::new(config.command_timeout)),
        config.command_timeout,
    );

    let sink = build_alert_sink(
        config.email.as_ref(),
        config.webhook_url.as_deref(),
        config.command_timeout,
    )?;

    let shutdown: Arc<dyn ShutdownAction> = if config.dry_run {
        Arc::new(DryRunShutdown::new())
    } else {
        Arc::new(CommandShutdown::from_command_line(
            &config.shutdown_command,
            config.command_timeout,
        )?)
    };

    Ok(Evaluator::new(
        Arc::new(sampler),
        ThresholdPolicy::new(config.thresholds),
        sink,
        shutdown,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(shutdown: ShutdownOutcome) -> CycleReport {
        CycleReport {
            hostname: "box".to_string(),
            decisions: Vec::new(),
            alerts_delivered: 0,
            alerts_failed: 1,
            shutdown,
        }
    }

    #[test]
    fn test_completed_cycles_exit_cleanly() {
        assert_eq!(exit_status(Some(&report(ShutdownOutcome::NotRequired))), 0);
        assert_eq!(exit_status(Some(&report(ShutdownOutcome::Requested))), 0);
    }

    #[test]
    fn test_failed_shutdown_exit_status() {
        let report = report(ShutdownOutcome::Failed("exit status: 1".to_string()));
        assert_eq!(exit_status(Some(&report)), EXIT_SHUTDOWN_FAILED);
    }

    #[test]
    fn test_panicked_cycle_exit_status() {
        assert_eq!(exit_status(None), EXIT_CYCLE_ABORTED);
    }

    #[test]
    fn test_exit_statuses_are_distinct() {
        assert_eq!(EXIT_CONFIG, 1);
        assert_eq!(EXIT_SHUTDOWN_FAILED, 2);
        assert_eq!(EXIT_CYCLE_ABORTED, 3);
    }

}
