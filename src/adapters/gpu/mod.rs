mod nvidia;

pub use nvidia::NvidiaSmi;
