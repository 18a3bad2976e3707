use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::ports::MetricError;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field: {0}")]
    MissingField(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

impl From<ParseError> for MetricError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Io(e) => MetricError::Io(e),
            ParseError::Parse(msg) => MetricError::Parse(msg),
            ParseError::MissingField(field) => MetricError::Parse(format!("missing field {}", field)),
        }
    }
}

/// Parse /proc/uptime into seconds
pub fn parse_uptime(content: &str) -> ParseResult<f64> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::Parse("Empty uptime file".to_string()))?;

    first
        .parse::<f64>()
        .map_err(|e| ParseError::Parse(format!("Invalid uptime value: {}", e)))
}

/// CPU stats from /proc/stat
#[derive(Debug, Clone, Default)]
pub struct CpuStat {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuStat {
    pub fn total(&self) -> u64 {
        self.user + self.nice + self.system + self.idle + self.iowait + self.irq + self.softirq + self.steal
    }

    pub fn busy(&self) -> u64 {
        self.total() - self.idle - self.iowait
    }
}

/// Parse /proc/stat (first line only for aggregate CPU)
pub fn parse_cpu_stat(content: &str) -> ParseResult<CpuStat> {
    let first_line = content
        .lines()
        .next()
        .ok_or_else(|| ParseError::Parse("Empty stat file".to_string()))?;

    if !first_line.starts_with("cpu ") {
        return Err(ParseError::MissingField("cpu".to_string()));
    }

    let parts: Vec<&str> = first_line.split_whitespace().skip(1).collect();
    if parts.len() < 8 {
        return Err(ParseError::Parse("Incomplete cpu stat".to_string()));
    }

    let field = |idx: usize, name: &str| -> ParseResult<u64> {
        parts[idx]
            .parse()
            .map_err(|e| ParseError::Parse(format!("{}: {}", name, e)))
    };

    Ok(CpuStat {
        user: field(0, "user")?,
        nice: field(1, "nice")?,
        system: field(2, "system")?,
        idle: field(3, "idle")?,
        iowait: field(4, "iowait")?,
        irq: field(5, "irq")?,
        softirq: field(6, "softirq")?,
        steal: field(7, "steal")?,
    })
}

/// Busy share of the CPU time elapsed between two samples, or `None` when
/// no ticks elapsed
pub fn cpu_usage_percent(previous: &CpuStat, current: &CpuStat) -> Option<f64> {
    let total_delta = current.total().saturating_sub(previous.total());
    if total_delta == 0 {
        return None;
    }

    let busy_delta = current.busy().saturating_sub(previous.busy());
    Some((busy_delta as f64 / total_delta as f64) * 100.0)
}

/// Parse /proc/meminfo into a map
pub fn parse_meminfo(content: &str) -> ParseResult<HashMap<String, u64>> {
    let mut map = HashMap::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() != 2 {
            continue;
        }

        let key = parts[0].trim().to_string();
        let value_str = parts[1].trim().trim_end_matches(" kB");

        if let Ok(value) = value_str.parse::<u64>() {
            map.insert(key, value * 1024); // Convert kB to bytes
        }
    }

    Ok(map)
}

/// Used memory as a percentage of total, counting available memory as free
pub fn memory_usage_percent(meminfo: &HashMap<String, u64>) -> ParseResult<f64> {
    let total = *meminfo
        .get("MemTotal")
        .ok_or_else(|| ParseError::MissingField("MemTotal".to_string()))?;
    let available = *meminfo
        .get("MemAvailable")
        .ok_or_else(|| ParseError::MissingField("MemAvailable".to_string()))?;

    if total == 0 {
        return Err(ParseError::Parse("MemTotal is zero".to_string()));
    }

    let used = total.saturating_sub(available);
    Ok((used as f64 / total as f64) * 100.0)
}

/// Parse network counters from /sys/class/net/{interface}/statistics
pub fn parse_net_stats(stats_dir: &Path) -> ParseResult<(u64, u64)> {
    let rx_bytes = read_u64(&stats_dir.join("rx_bytes"))?;
    let tx_bytes = read_u64(&stats_dir.join("tx_bytes"))?;

    Ok((rx_bytes, tx_bytes))
}

/// Parse a sysfs temperature file (millidegrees Celsius)
pub fn parse_millidegrees(content: &str) -> ParseResult<f64> {
    let raw = content
        .trim()
        .parse::<f64>()
        .map_err(|e| ParseError::Parse(format!("temperature: {}", e)))?;

    Ok(raw / 1000.0)
}

fn read_u64(path: &Path) -> ParseResult<u64> {
    fs::read_to_string(path)?
        .trim()
        .parse::<u64>()
        .map_err(|e| ParseError::Parse(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uptime() {
        let content = "12345.67 98765.43\n";
        let uptime = parse_uptime(content).unwrap();
        assert_eq!(uptime, 12345.67);
    }

    #[test]
    fn test_parse_uptime_empty() {
        assert!(parse_uptime("").is_err());
    }

    #[test]
    fn test_parse_cpu_stat() {
        let content = "cpu  1000 100 500 10000 200 50 30 0\ncpu0 1 2 3 4 5 6 7 8\n";
        let stat = parse_cpu_stat(content).unwrap();
        assert_eq!(stat.user, 1000);
        assert_eq!(stat.system, 500);
        assert_eq!(stat.idle, 10000);
        assert_eq!(stat.iowait, 200);
    }

    #[test]
    fn test_parse_cpu_stat_rejects_missing_aggregate() {
        assert!(parse_cpu_stat("intr 1 2 3\n").is_err());
    }

    #[test]
    fn test_cpu_usage_percent() {
        let previous = CpuStat {
            user: 100,
            idle: 100,
            ..CpuStat::default()
        };
        let current = CpuStat {
            user: 175,
            idle: 125,
            ..CpuStat::default()
        };

        assert_eq!(cpu_usage_percent(&previous, &current), Some(75.0));
        assert_eq!(cpu_usage_percent(&current, &current), None);
    }

    #[test]
    fn test_memory_usage_percent() {
        let content = "MemTotal:       1000 kB\nMemFree:         100 kB\nMemAvailable:    250 kB\n";
        let meminfo = parse_meminfo(content).unwrap();
        assert_eq!(memory_usage_percent(&meminfo).unwrap(), 75.0);
    }

    #[test]
    fn test_memory_usage_requires_available() {
        let meminfo = parse_meminfo("MemTotal: 1000 kB\n").unwrap();
        assert!(matches!(
            memory_usage_percent(&meminfo),
            Err(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn test_parse_millidegrees() {
        assert_eq!(parse_millidegrees("48500\n").unwrap(), 48.5);
        assert!(parse_millidegrees("N/A").is_err());
    }
}
