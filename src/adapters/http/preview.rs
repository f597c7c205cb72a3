use super::error::{ApiError, ApiResult};
use crate::domain::plan::{RenderPlan, RenderPlanPayload};
use crate::domain::preview;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(flatten)]
    pub plan: RenderPlanPayload,
    #[serde(default)]
    pub frame: u64,
}

/// `POST /api/preview`: what the player shows at one frame of a plan.
pub async fn preview_frame(
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let plan = RenderPlan::try_from(request.plan).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let frame = preview::evaluate(&plan, request.frame).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "frame {} is outside the clip ({} frames)",
            request.frame,
            plan.duration_in_frames()
        ))
    })?;
    let body = serde_json::to_value(frame).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(body))
}
