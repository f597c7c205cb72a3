//! HTTP inbound adapter.
//!
//! - `POST /api/render` submit a render plan
//! - `GET /api/clips/:id` poll a job
//! - `POST /api/preview` evaluate one preview frame
//! - `POST /api/captions/srt` turn an uploaded .srt into captions
//! - `/media/*` rendered files, `/public/*` static assets

mod captions;
pub mod error;
mod jobs;
mod preview;

use crate::application::dispatcher::RenderDispatcher;
use crate::application::tracker::JobTracker;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use jobs::SubmitResponse;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<JobTracker>,
    pub dispatcher: Arc<RenderDispatcher>,
}

pub fn router(state: AppState, media_dir: &Path, public_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/render", post(jobs::submit_render))
        .route("/api/clips/:id", get(jobs::get_clip))
        .route("/api/preview", post(preview::preview_frame))
        .route("/api/captions/srt", post(captions::parse_srt_upload))
        .nest_service("/media", ServeDir::new(media_dir))
        .nest_service("/public", ServeDir::new(public_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryJobRepository;
    use crate::application::dispatcher::{DispatcherSettings, OutputLayout};
    use crate::domain::plan::RenderPlan;
    use crate::ports::renderer::{MockRenderExecutor, RenderError, RenderExecutor};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use bytes::Bytes;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        dispatcher: Arc<RenderDispatcher>,
        dir: TempDir,
    }

    fn app(executor: impl RenderExecutor + 'static) -> TestApp {
        let dir = tempdir().unwrap();
        let media = dir.path().join("out");
        let public = dir.path().join("public");
        std::fs::create_dir_all(&media).unwrap();
        std::fs::create_dir_all(&public).unwrap();

        let tracker = Arc::new(JobTracker::new(Arc::new(InMemoryJobRepository::new())));
        let dispatcher = Arc::new(RenderDispatcher::new(
            tracker.clone(),
            Arc::new(executor),
            DispatcherSettings {
                max_concurrent_renders: 2,
                render_timeout: Some(Duration::from_secs(5)),
                output: OutputLayout::new(&media, "/media"),
            },
        ));
        let state = AppState {
            tracker,
            dispatcher: dispatcher.clone(),
        };
        TestApp {
            router: router(state, &media, &public),
            dispatcher,
            dir,
        }
    }

    /// Writes a stand-in file instead of encoding.
    fn writing_executor() -> MockRenderExecutor {
        let mut executor = MockRenderExecutor::new();
        executor.expect_render().returning(|_, output| {
            std::fs::write(output, b"fake mp4")?;
            Ok(output.to_path_buf())
        });
        executor
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn scenario_plan() -> Value {
        json!({
            "videoUrl": "http://x/video.mp4",
            "startMs": 0,
            "durationMs": 5000,
            "captions": [{"text": "Hi", "startMs": 0, "endMs": 2000}],
            "fps": 30
        })
    }

    #[tokio::test]
    async fn test_submit_then_poll_until_completed() {
        let app = app(writing_executor());

        let (status, body) = send(&app.router, post_json("/api/render", scenario_plan())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "queued");
        let id = body["id"].as_str().unwrap().to_string();

        app.dispatcher.shutdown().await;

        let (status, view) = send(&app.router, get(&format!("/api/clips/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["status"], "completed");
        let url = view["url"].as_str().unwrap();
        assert_eq!(url, format!("/media/{}.mp4", id));
        assert_eq!(view["plan"]["captions"][0]["text"], "Hi");

        let response = app.router.clone().oneshot(get(url)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"fake mp4");
        assert!(app.dir.path().join("out").join(format!("{}.mp4", id)).exists());
    }

    #[tokio::test]
    async fn test_polling_completed_job_is_stable() {
        let app = app(writing_executor());
        let (_, body) = send(&app.router, post_json("/api/render", scenario_plan())).await;
        let uri = format!("/api/clips/{}", body["id"].as_str().unwrap());
        app.dispatcher.shutdown().await;

        let (_, first) = send(&app.router, get(&uri)).await;
        for _ in 0..5 {
            let (_, again) = send(&app.router, get(&uri)).await;
            assert_eq!(again, first);
        }
    }

    #[tokio::test]
    async fn test_zero_duration_is_rejected_without_a_job() {
        let mut executor = MockRenderExecutor::new();
        executor.expect_render().times(0);
        let app = app(executor);

        let mut plan = scenario_plan();
        plan["durationMs"] = json!(0);
        let (status, body) = send(&app.router, post_json("/api/render", plan)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("id").is_none());
        assert!(body["error"].as_str().unwrap().contains("durationMs"));
        assert_eq!(app.dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_client_error() {
        let app = app(MockRenderExecutor::new());
        let request = Request::post("/api/render")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let app = app(MockRenderExecutor::new());
        let (status, body) = send(
            &app.router,
            get(&format!("/api/clips/{}", uuid::Uuid::new_v4())),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not found");

        let (status, _) = send(&app.router, get("/api/clips/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_render_is_visible_to_pollers() {
        let mut executor = MockRenderExecutor::new();
        executor
            .expect_render()
            .returning(|_, _| Err(RenderError::Ffmpeg("unsupported codec".to_string())));
        let app = app(executor);

        let (_, body) = send(&app.router, post_json("/api/render", scenario_plan())).await;
        app.dispatcher.shutdown().await;

        let (status, view) = send(
            &app.router,
            get(&format!("/api/clips/{}", body["id"].as_str().unwrap())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["status"], "failed");
        assert!(view["error"].as_str().unwrap().contains("unsupported codec"));
        assert!(view.get("url").is_none());
    }

    #[tokio::test]
    async fn test_thirty_second_plan_renders_nine_hundred_frames() {
        let mut executor = MockRenderExecutor::new();
        executor
            .expect_render()
            .withf(|plan: &RenderPlan, _| plan.duration_in_frames() == 900)
            .times(1)
            .returning(|_, output| Ok(PathBuf::from(output)));
        let app = app(executor);

        let mut plan = scenario_plan();
        plan["durationMs"] = json!(30000);
        let (status, _) = send(&app.router, post_json("/api/render", plan)).await;
        assert_eq!(status, StatusCode::OK);
        app.dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_preview_frame() {
        let app = app(MockRenderExecutor::new());
        let mut request = json!({
            "videoUrl": "http://x/video.mp4",
            "startMs": 25000,
            "durationMs": 30000,
            "captions": [
                {"text": "A", "startMs": 0, "endMs": 3000},
                {"text": "B", "startMs": 1000, "endMs": 4000}
            ],
        });
        request["frame"] = json!(60);

        let (status, body) = send(&app.router, post_json("/api/preview", request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["caption"], "A");
        assert_eq!(body["durationInFrames"], 900);
        assert_eq!(body["sourceFrame"], 810);
        assert_eq!(body["timeMs"], 2000.0);

        request["frame"] = json!(900);
        let (status, _) = send(&app.router, post_json("/api/preview", request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_srt_upload() {
        let app = app(MockRenderExecutor::new());
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"clip.srt\"\r\nContent-Type: application/x-subrip\r\n\r\n1\r\n00:00:25,000 --> 00:00:27,500\r\nHello\r\n\r\n--{b}--\r\n",
            b = boundary
        );
        let request = Request::post("/api/captions/srt")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(Bytes::from(body)))
            .unwrap();

        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["captionsAreAbsolute"], true);
        assert_eq!(
            body["captions"],
            json!([{"text": "Hello", "startMs": 25000, "endMs": 27500}])
        );
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(MockRenderExecutor::new());
        let response = app.router.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
