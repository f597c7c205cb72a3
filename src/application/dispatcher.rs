use super::tracker::JobTracker;
use crate::domain::plan::RenderPlan;
use crate::ports::renderer::{RenderError, RenderExecutor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::task::TaskTracker;
use tracing::{error, info};
use uuid::Uuid;

/// Where finished renders land and how they are addressed over HTTP.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    pub dir: PathBuf,
    pub url_prefix: String,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.mp4", id))
    }

    pub fn url_for(&self, id: Uuid) -> String {
        format!("{}/{}.mp4", self.url_prefix.trim_end_matches('/'), id)
    }
}

#[derive(Clone, Debug)]
pub struct DispatcherSettings {
    pub max_concurrent_renders: usize,
    pub render_timeout: Option<Duration>,
    pub output: OutputLayout,
}

/// Runs one background render per submitted job.
///
/// Jobs wait in `queued` until a render slot frees up. Every task is
/// registered with a [`TaskTracker`] so shutdown can wait for in-flight
/// renders.
pub struct RenderDispatcher {
    tracker: Arc<JobTracker>,
    executor: Arc<dyn RenderExecutor>,
    tasks: TaskTracker,
    permits: Arc<Semaphore>,
    settings: DispatcherSettings,
}

impl RenderDispatcher {
    pub fn new(
        tracker: Arc<JobTracker>,
        executor: Arc<dyn RenderExecutor>,
        settings: DispatcherSettings,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrent_renders.max(1)));
        Self {
            tracker,
            executor,
            tasks: TaskTracker::new(),
            permits,
            settings,
        }
    }

    /// Schedule the render for `id` and return immediately.
    pub fn dispatch(&self, id: Uuid, plan: RenderPlan) {
        let job = JobRun {
            id,
            plan,
            tracker: self.tracker.clone(),
            executor: self.executor.clone(),
            permits: self.permits.clone(),
            settings: self.settings.clone(),
        };
        self.tasks.spawn(job.run());
    }

    /// Number of renders scheduled or running.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Stop accepting work and wait for every scheduled render to finish.
    pub async fn shutdown(&self) {
        self.tasks.close();
        info!(in_flight = self.tasks.len(), "waiting for renders to finish");
        self.tasks.wait().await;
    }
}

struct JobRun {
    id: Uuid,
    plan: RenderPlan,
    tracker: Arc<JobTracker>,
    executor: Arc<dyn RenderExecutor>,
    permits: Arc<Semaphore>,
    settings: DispatcherSettings,
}

impl JobRun {
    async fn run(self) {
        let id = self.id;
        let permit = self.permits.clone().acquire_owned().await;

        if let Err(e) = self.tracker.mark_rendering(id).await {
            error!(job_id = %id, error = %e, "could not start render");
            return;
        }

        let result = match permit {
            Ok(_permit) => self.execute().await,
            Err(_) => Err(RenderError::Cancelled),
        };

        let recorded = match result {
            Ok(path) => {
                let url = self.settings.output.url_for(id);
                self.tracker.mark_completed(id, path, url).await
            }
            Err(e) => {
                error!(job_id = %id, error = %e, "render failed");
                self.tracker.mark_failed(id, e.to_string()).await
            }
        };
        if let Err(e) = recorded {
            error!(job_id = %id, error = %e, "could not record render result");
        }
    }

    /// Runs the executor on its own task so that a panic inside the render
    /// surfaces as a `JoinError` instead of unwinding through this one.
    async fn execute(&self) -> Result<PathBuf, RenderError> {
        let executor = self.executor.clone();
        let plan = self.plan.clone();
        let output = self.settings.output.path_for(self.id);

        let handle = tokio::spawn(async move { executor.render(&plan, &output).await });
        let abort = handle.abort_handle();

        let joined = match self.settings.render_timeout {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort.abort();
                    return Err(RenderError::TimedOut(limit));
                }
            },
            None => handle.await,
        };

        joined.map_err(join_error)?
    }
}

fn join_error(err: JoinError) -> RenderError {
    if err.is_cancelled() {
        return RenderError::Cancelled;
    }
    let panic = err.into_panic();
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    RenderError::Panicked(message)
}
