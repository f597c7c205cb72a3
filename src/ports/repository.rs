use crate::domain::jobs::{JobState, RenderJob, TransitionError, TransitionOutcome};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("job {0} not found")]
    NotFound(Uuid),
    #[error("job {0} already exists")]
    Duplicate(Uuid),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Authoritative store of render jobs.
///
/// Each call is atomic per job id: a transition and its payload become
/// visible together, and concurrent writers to one id are serialized.
#[async_trait]
pub trait RenderJobRepository: Send + Sync {
    /// Store a new job. Fails if the id is taken.
    async fn insert(&self, job: RenderJob) -> Result<(), RepositoryError>;

    /// Snapshot of a job.
    async fn get(&self, id: Uuid) -> Result<Option<RenderJob>, RepositoryError>;

    /// Apply a state transition under the job's lock.
    async fn transition(
        &self,
        id: Uuid,
        next: JobState,
    ) -> Result<TransitionOutcome, RepositoryError>;
}
