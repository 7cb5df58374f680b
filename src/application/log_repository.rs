// Repository trait for access to the experiment log store
use async_trait::async_trait;

use crate::domain::run::Run;
use crate::domain::snapshot::Snapshot;

#[async_trait]
pub trait LogRepository: Send + Sync {
    /// List all runs present in the log store, sorted by name.
    async fn list_runs(&self) -> anyhow::Result<Vec<Run>>;

    /// Gather everything in the log store into a fresh snapshot.
    async fn load_snapshot(&self) -> anyhow::Result<Snapshot>;
}
