// Run service - Use case for listing runs
use std::sync::Arc;

use crate::application::log_repository::LogRepository;
use crate::domain::run::Run;

#[derive(Clone)]
pub struct RunService {
    repository: Arc<dyn LogRepository>,
}

impl RunService {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_runs(&self) -> anyhow::Result<Vec<Run>> {
        self.repository.list_runs().await
    }
}
