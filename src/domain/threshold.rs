/// Configured alert limits. Defaults are applied by configuration loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    pub temp_threshold_c: f64,
    pub cpu_threshold_pct: f64,
    pub memory_threshold_pct: f64,
    pub disk_threshold_pct: f64,
}

impl ThresholdConfig {
    pub fn new(
        temp_threshold_c: f64,
        cpu_threshold_pct: f64,
        memory_threshold_pct: f64,
        disk_threshold_pct: f64,
    ) -> Self {
        Self {
            temp_threshold_c,
            cpu_threshold_pct,
            memory_threshold_pct,
            disk_threshold_pct,
        }
    }
}
