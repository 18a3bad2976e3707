pub mod alert_sink;
pub mod gpu_source;
pub mod metric_provider;
pub mod shutdown;
pub mod system_source;

pub use alert_sink::{AlertError, AlertSink};
pub use gpu_source::GpuSource;
pub use metric_provider::MetricProvider;
pub use shutdown::{ShutdownAction, ShutdownError};
pub use system_source::{MetricError, NetworkTotals, SystemSource};
