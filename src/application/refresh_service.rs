// Refresh service - Keeps the snapshot current and notifies clients of changes
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};

use crate::application::log_repository::LogRepository;
use crate::domain::snapshot::Snapshot;

#[derive(Clone)]
pub struct RefreshService {
    repository: Arc<dyn LogRepository>,
    current: Arc<RwLock<Arc<Snapshot>>>,
    updates: broadcast::Sender<Arc<Snapshot>>,
}

impl RefreshService {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        let (updates, _) = broadcast::channel(16);
        Self {
            repository,
            current: Arc::new(RwLock::new(Arc::new(Snapshot::new()))),
            updates,
        }
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.updates.subscribe()
    }

    /// Loads the snapshot once, before the server starts accepting requests.
    pub async fn load_initial(&self) -> anyhow::Result<()> {
        let snapshot = self.repository.load_snapshot().await?;
        *self.current.write().await = Arc::new(snapshot);
        Ok(())
    }

    /// Spawns the polling loop: rescan the log directory and broadcast the
    /// fresh snapshot whenever something changed on disk.
    pub fn spawn_polling(&self, interval: Duration) {
        let service = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                match service.repository.load_snapshot().await {
                    Ok(snapshot) => service.publish_if_changed(snapshot).await,
                    Err(e) => {
                        tracing::warn!("rescanning the log directory failed: {e:#}");
                    }
                }
            }
        });
    }

    async fn publish_if_changed(&self, snapshot: Snapshot) {
        let mut current = self.current.write().await;
        if **current == snapshot {
            return;
        }
        let snapshot = Arc::new(snapshot);
        *current = snapshot.clone();
        // No subscribers is fine, a client connecting later starts from the
        // current snapshot anyway.
        let _ = self.updates.send(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::run::Run;
    use crate::domain::snapshot::{Item, Kind, ScalarEntry, StepKey};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeRepository {
        snapshots: Mutex<Vec<Snapshot>>,
    }

    #[async_trait]
    impl LogRepository for FakeRepository {
        async fn list_runs(&self) -> anyhow::Result<Vec<Run>> {
            Ok(Vec::new())
        }

        async fn load_snapshot(&self) -> anyhow::Result<Snapshot> {
            Ok(self.snapshots.lock().unwrap().remove(0))
        }
    }

    fn snapshot_with(value: f64) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.set(
            Kind::Scalars,
            "run",
            StepKey::Step(0),
            "loss",
            Item::Scalar(ScalarEntry { value: Some(value) }),
            false,
        );
        snapshot
    }

    #[tokio::test]
    async fn test_broadcasts_only_on_change() {
        let repository = Arc::new(FakeRepository {
            snapshots: Mutex::new(vec![snapshot_with(1.0), snapshot_with(2.0)]),
        });
        let service = RefreshService::new(repository.clone());
        service.load_initial().await.unwrap();
        let mut updates = service.subscribe();

        // Identical rescan: nothing published.
        service.publish_if_changed(snapshot_with(1.0)).await;
        assert!(updates.try_recv().is_err());

        // Changed rescan: published and swapped in.
        service.publish_if_changed(snapshot_with(2.0)).await;
        let published = updates.try_recv().unwrap();
        assert_eq!(*published, *service.snapshot().await);
        assert_eq!(
            published.get(Kind::Scalars, "run", StepKey::Step(0), "loss"),
            Some(&Item::Scalar(ScalarEntry { value: Some(2.0) }))
        );
    }
}
