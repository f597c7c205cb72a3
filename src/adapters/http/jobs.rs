use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::domain::jobs::{JobStatus, JobView};
use crate::domain::plan::RenderPlanPayload;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: Uuid,
    pub status: JobStatus,
}

/// `POST /api/render`: record the job, schedule the render, answer at once.
pub async fn submit_render(
    State(state): State<AppState>,
    payload: Result<Json<RenderPlanPayload>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let job = state.tracker.submit(payload).await?;
    state.dispatcher.dispatch(job.id(), job.plan().clone());

    Ok(Json(SubmitResponse {
        id: job.id(),
        status: JobStatus::Queued,
    }))
}

/// `GET /api/clips/:id`
pub async fn get_clip(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobView>> {
    // Ids we never issued are simply unknown.
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound("not found".to_string()))?;
    Ok(Json(state.tracker.get(id).await?))
}
