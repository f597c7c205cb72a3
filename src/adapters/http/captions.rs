use super::error::{ApiError, ApiResult};
use crate::domain::plan::Caption;
use crate::domain::srt;
use axum::extract::Multipart;
use axum::Json;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub captions: Vec<Caption>,
    /// SubRip timestamps are on the source clock.
    pub captions_are_absolute: bool,
}

/// `POST /api/captions/srt`: multipart upload of one `.srt` file.
pub async fn parse_srt_upload(mut multipart: Multipart) -> ApiResult<Json<CaptionTrack>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        let captions = srt::parse(&text).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        debug!(file_name = %file_name, count = captions.len(), "parsed subtitle upload");

        return Ok(Json(CaptionTrack {
            captions,
            captions_are_absolute: true,
        }));
    }

    Err(ApiError::BadRequest("no subtitle file in upload".to_string()))
}
