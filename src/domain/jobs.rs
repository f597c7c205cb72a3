use super::plan::RenderPlan;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Rendering,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStatus::Queued => "queued",
            JobStatus::Rendering => "rendering",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Lifecycle state. Terminal payloads travel with their status so a reader
/// never sees `completed` without an output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Rendering,
    Completed { output_path: PathBuf, url: String },
    Failed { error: String },
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Rendering => JobStatus::Rendering,
            JobState::Completed { .. } => JobStatus::Completed,
            JobState::Failed { .. } => JobStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// The job had already finished; the update was dropped.
    AlreadyTerminal(JobStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    id: Uuid,
    plan: RenderPlan,
    state: JobState,
}

impl RenderJob {
    pub fn new(id: Uuid, plan: RenderPlan) -> Self {
        Self {
            id,
            plan,
            state: JobState::Queued,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    /// Moves the job along `queued -> rendering -> completed | failed`.
    ///
    /// Updates aimed at a finished job are ignored rather than rejected, so
    /// a late or duplicated completion never overwrites the first result.
    pub fn apply(&mut self, next: JobState) -> Result<TransitionOutcome, TransitionError> {
        let from = self.status();
        let to = next.status();

        if from.is_terminal() {
            return Ok(TransitionOutcome::AlreadyTerminal(from));
        }

        let allowed = matches!(
            (from, to),
            (JobStatus::Queued, JobStatus::Rendering)
                | (JobStatus::Rendering, JobStatus::Completed)
                | (JobStatus::Rendering, JobStatus::Failed)
        );
        if !allowed {
            return Err(TransitionError { from, to });
        }

        self.state = next;
        Ok(TransitionOutcome::Applied)
    }

    pub fn view(&self) -> JobView {
        let (url, error) = match &self.state {
            JobState::Completed { url, .. } => (Some(url.clone()), None),
            JobState::Failed { error } => (None, Some(error.clone())),
            JobState::Queued | JobState::Rendering => (None, None),
        };
        JobView {
            id: self.id,
            status: self.status(),
            plan: self.plan.clone(),
            url,
            error,
        }
    }
}

/// Snapshot returned to pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub status: JobStatus,
    pub plan: RenderPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
