//! In-memory job table for single-process deployment.

use crate::domain::jobs::{JobState, RenderJob, TransitionOutcome};
use crate::ports::repository::{RenderJobRepository, RepositoryError};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Jobs live for the lifetime of the process and are never evicted.
#[derive(Debug, Default, Clone)]
pub struct InMemoryJobRepository {
    jobs: Arc<DashMap<Uuid, RenderJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl RenderJobRepository for InMemoryJobRepository {
    async fn insert(&self, job: RenderJob) -> Result<(), RepositoryError> {
        match self.jobs.entry(job.id()) {
            Entry::Vacant(vacant) => {
                vacant.insert(job);
                Ok(())
            }
            Entry::Occupied(occupied) => Err(RepositoryError::Duplicate(*occupied.key())),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<RenderJob>, RepositoryError> {
        Ok(self.jobs.get(&id).map(|job| job.value().clone()))
    }

    async fn transition(
        &self,
        id: Uuid,
        next: JobState,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let mut job = self.jobs.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
        Ok(job.apply(next)?)
    }
}
