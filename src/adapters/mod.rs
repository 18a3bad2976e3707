pub mod gpu;
pub mod notify;
pub mod power;
pub mod procfs;

pub use gpu::NvidiaSmi;
pub use notify::build_alert_sink;
pub use power::{CommandShutdown, DryRunShutdown};
pub use procfs::{ProcfsConfig, ProcfsSystemSource};
