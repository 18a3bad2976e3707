pub mod evaluator;
pub mod policy;
pub mod sampler;

pub use evaluator::{CycleReport, Evaluator, ShutdownOutcome};
pub use policy::ThresholdPolicy;
pub use sampler::Sampler;
