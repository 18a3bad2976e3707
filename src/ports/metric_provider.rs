use async_trait::async_trait;

use crate::domain::MetricSnapshot;

/// Port producing one complete snapshot per cycle. Implementations absorb
/// individual reading failures and report them as absent fields.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    async fn sample(&self) -> MetricSnapshot;
}
