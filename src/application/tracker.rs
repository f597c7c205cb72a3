use crate::domain::jobs::{JobState, JobStatus, JobView, RenderJob, TransitionOutcome};
use crate::domain::plan::{PlanError, RenderPlan, RenderPlanPayload};
use crate::ports::repository::{RenderJobRepository, RepositoryError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),
    #[error("job {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for TrackerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => TrackerError::NotFound(id),
            other => TrackerError::Repository(other),
        }
    }
}

/// Owns the lifecycle of every submitted render job.
pub struct JobTracker {
    repo: Arc<dyn RenderJobRepository>,
}

impl JobTracker {
    pub fn new(repo: Arc<dyn RenderJobRepository>) -> Self {
        Self { repo }
    }

    /// Validate the plan and record a new `queued` job.
    ///
    /// Returns as soon as the job is stored; nothing is rendered here.
    pub async fn submit(&self, payload: RenderPlanPayload) -> Result<RenderJob, TrackerError> {
        let plan = RenderPlan::try_from(payload)?;
        let job = RenderJob::new(Uuid::new_v4(), plan);
        self.repo.insert(job.clone()).await?;
        info!(job_id = %job.id(), video_url = job.plan().video_url(), "render job queued");
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> Result<JobView, TrackerError> {
        self.repo
            .get(id)
            .await?
            .map(|job| job.view())
            .ok_or(TrackerError::NotFound(id))
    }

    pub async fn mark_rendering(&self, id: Uuid) -> Result<TransitionOutcome, TrackerError> {
        self.transition(id, JobState::Rendering).await
    }

    pub async fn mark_completed(
        &self,
        id: Uuid,
        output_path: PathBuf,
        url: String,
    ) -> Result<TransitionOutcome, TrackerError> {
        self.transition(id, JobState::Completed { output_path, url })
            .await
    }

    pub async fn mark_failed(
        &self,
        id: Uuid,
        error: String,
    ) -> Result<TransitionOutcome, TrackerError> {
        self.transition(id, JobState::Failed { error }).await
    }

    async fn transition(
        &self,
        id: Uuid,
        next: JobState,
    ) -> Result<TransitionOutcome, TrackerError> {
        let to = next.status();
        let outcome = self.repo.transition(id, next).await?;
        match outcome {
            TransitionOutcome::Applied => match to {
                JobStatus::Failed => warn!(job_id = %id, status = %to, "render job finished"),
                _ => info!(job_id = %id, status = %to, "render job updated"),
            },
            TransitionOutcome::AlreadyTerminal(current) => {
                warn!(job_id = %id, current = %current, ignored = %to, "ignoring update to finished job")
            }
        }
        Ok(outcome)
    }
}
