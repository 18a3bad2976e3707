pub mod decision;
pub mod snapshot;
pub mod threshold;

pub use decision::{Decision, DecisionKind};
pub use snapshot::MetricSnapshot;
pub use threshold::ThresholdConfig;
