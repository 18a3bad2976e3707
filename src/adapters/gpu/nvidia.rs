use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::ports::{GpuSource, MetricError};

const QUERY_ARGS: [&str; 2] = [
    "--query-gpu=temperature.gpu",
    "--format=csv,noheader,nounits",
];

/// GPU temperature via `nvidia-smi`.
///
/// A missing binary means no discrete GPU. With several GPUs the hottest
/// one is reported.
pub struct NvidiaSmi {
    program: String,
    timeout: Duration,
}

impl NvidiaSmi {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("nvidia-smi", timeout)
    }

    pub fn with_program(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl GpuSource for NvidiaSmi {
    async fn gpu_temperature(&self) -> Result<Option<f64>, MetricError> {
        let child = Command::new(&self.program)
            .args(QUERY_ARGS)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Err(_) => return Err(MetricError::Timeout(self.timeout)),
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Ok(Err(e)) => return Err(MetricError::Io(e)),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(MetricError::Command(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_temperatures(&String::from_utf8_lossy(&output.stdout))
    }
}

/// One temperature per line, one line per GPU
fn parse_temperatures(stdout: &str) -> Result<Option<f64>, MetricError> {
    let mut hottest: Option<f64> = None;

    for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let celsius = line
            .parse::<f64>()
            .map_err(|e| MetricError::Parse(format!("GPU temperature {:?}: {}", line, e)))?;
        hottest = Some(hottest.map_or(celsius, |h| h.max(celsius)));
    }

    Ok(hottest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_gpu() {
        assert_eq!(parse_temperatures("67\n").unwrap(), Some(67.0));
    }

    #[test]
    fn test_parse_reports_hottest_gpu() {
        assert_eq!(parse_temperatures("54\n 81 \n60\n").unwrap(), Some(81.0));
    }

    #[test]
    fn test_parse_empty_output() {
        assert_eq!(parse_temperatures("\n").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_temperatures("[N/A]\n"),
            Err(MetricError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_tool_means_no_gpu() {
        let smi = NvidiaSmi::with_program("hostguard-no-such-tool", Duration::from_secs(2));
        assert_eq!(smi.gpu_temperature().await.unwrap(), None);
    }
}
