use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::notify::SmtpConfig;
use crate::domain::ThresholdConfig;

const DEFAULT_TEMP_THRESHOLD: f64 = 80.0;
const DEFAULT_CPU_THRESHOLD: f64 = 90.0;
const DEFAULT_MEMORY_THRESHOLD: f64 = 90.0;
const DEFAULT_DISK_THRESHOLD: f64 = 90.0;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SHUTDOWN_COMMAND: &str = "sudo shutdown now";
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "INFO";

const LOG_LEVELS: [&str; 8] = [
    "trace", "debug", "info", "warn", "warning", "error", "critical", "off",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Cannot read config file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Format {
        path: String,
        source: toml::de::Error,
    },

    #[error("Cannot load .env: {0}")]
    DotEnv(dotenvy::Error),
}

/// Optional TOML overrides, e.g.
///
/// ```toml
/// [thresholds]
/// temperature = 75.0
/// disk = 85.0
/// ```
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    thresholds: FileThresholds,
}

#[derive(Debug, Default, Deserialize)]
struct FileThresholds {
    temperature: Option<f64>,
    cpu: Option<f64>,
    memory: Option<f64>,
    disk: Option<f64>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.display().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Format {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Application configuration, loaded once per run
#[derive(Debug, Clone)]
pub struct Config {
    pub thresholds: ThresholdConfig,
    /// `None` when `SENDER_EMAIL` is unset: alerts are only logged
    pub email: Option<SmtpConfig>,
    pub webhook_url: Option<String>,
    pub shutdown_command: String,
    pub dry_run: bool,
    pub proc_path: PathBuf,
    pub sys_path: PathBuf,
    pub disk_path: PathBuf,
    /// Bounds every metric reading, external tool and SMTP session
    pub command_timeout: Duration,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load `.env` (if present) and read the process environment
    pub fn load() -> Result<Self, ConfigError> {
        apply_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let file = match get("HOSTGUARD_CONFIG") {
            Some(path) => FileConfig::read(Path::new(&path))?,
            None => FileConfig::default(),
        };
        let file_limits = file.thresholds;

        let thresholds = ThresholdConfig::new(
            finite(
                "TEMP_THRESHOLD",
                parse_or(&get, "TEMP_THRESHOLD", file_limits.temperature.unwrap_or(DEFAULT_TEMP_THRESHOLD))?,
            )?,
            percentage(
                "CPU_THRESHOLD",
                parse_or(&get, "CPU_THRESHOLD", file_limits.cpu.unwrap_or(DEFAULT_CPU_THRESHOLD))?,
            )?,
            percentage(
                "MEMORY_THRESHOLD",
                parse_or(&get, "MEMORY_THRESHOLD", file_limits.memory.unwrap_or(DEFAULT_MEMORY_THRESHOLD))?,
            )?,
            percentage(
                "DISK_THRESHOLD",
                parse_or(&get, "DISK_THRESHOLD", file_limits.disk.unwrap_or(DEFAULT_DISK_THRESHOLD))?,
            )?,
        );

        let timeout_secs = parse_or(&get, "HOSTGUARD_COMMAND_TIMEOUT_SECS", DEFAULT_COMMAND_TIMEOUT_SECS)?;
        if timeout_secs < 2 {
            return Err(ConfigError::Invalid {
                key: "HOSTGUARD_COMMAND_TIMEOUT_SECS",
                value: timeout_secs.to_string(),
                reason: "must be at least 2 seconds".to_string(),
            });
        }
        let command_timeout = Duration::from_secs(timeout_secs);

        let email = match get("SENDER_EMAIL") {
            None => None,
            Some(sender) => Some(SmtpConfig {
                server: get("SMTP_SERVER").ok_or(ConfigError::Missing("SMTP_SERVER"))?,
                port: parse_or(&get, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
                sender,
                password: get("SENDER_PASSWORD"),
                receiver: get("RECEIVER_EMAIL").ok_or(ConfigError::Missing("RECEIVER_EMAIL"))?,
                timeout: command_timeout,
            }),
        };

        let log_level = get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        if !LOG_LEVELS.contains(&log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                key: "LOG_LEVEL",
                value: log_level,
                reason: format!("expected one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(Self {
            thresholds,
            email,
            webhook_url: get("ALERT_WEBHOOK_URL"),
            shutdown_command: get("SHUTDOWN_COMMAND").unwrap_or_else(|| DEFAULT_SHUTDOWN_COMMAND.to_string()),
            dry_run: parse_flag(&get, "HOSTGUARD_DRY_RUN")?,
            proc_path: get("HOSTGUARD_PROC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/proc")),
            sys_path: get("HOSTGUARD_SYS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/sys")),
            disk_path: get("HOSTGUARD_DISK_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/")),
            command_timeout,
            log_level,
            log_file: get("HOSTGUARD_LOG_FILE").map(PathBuf::from),
        })
    }

    /// `tracing` filter directive for this crate. Python-style level names
    /// are accepted.
    pub fn log_directive(&self) -> String {
        log_directive(&self.log_level)
    }

    pub fn default_log_directive() -> String {
        log_directive(DEFAULT_LOG_LEVEL)
    }
}

fn log_directive(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    let level = match level.as_str() {
        "warning" => "warn",
        "critical" => "error",
        other => other,
    };
    format!("{}={}", env!("CARGO_PKG_NAME"), level)
}

/// A missing `.env` is fine; a malformed one is not
fn apply_dotenv<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_flag<G>(get: &G, key: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::Invalid {
            key,
            value: other.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

fn finite(key: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be a finite number".to_string(),
        })
    }
}

fn percentage(key: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be between 0 and 100".to_string(),
        })
    }
}
