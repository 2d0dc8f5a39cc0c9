use super::*;
use async_trait::async_trait;
use axum::{body, body::Body, http::Request};
use generation::{GenerationBackend, GenerationRequest};
use server_api::credential::StaticCredential;
use shared::{
    domain::{Action, HapticFeedback},
    error::GenerationError,
};
use std::{
    env, fs,
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

struct CannedBackend {
    text: String,
    calls: AtomicUsize,
}

#[async_trait]
impl GenerationBackend for CannedBackend {
    async fn generate(
        &self,
        _api_key: &str,
        _request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

fn test_app_with(
    text: &str,
    api_key: Option<&str>,
    static_dir: Option<&Path>,
) -> (Router, Arc<CannedBackend>) {
    let backend = Arc::new(CannedBackend {
        text: text.to_string(),
        calls: AtomicUsize::new(0),
    });
    let workflow = WorkflowContext::new(
        backend.clone(),
        Arc::new(StaticCredential::new(
            "GEMINI_API_KEY",
            api_key.map(str::to_string),
        )),
        "instruction",
    );
    let app = build_router(Arc::new(AppState { workflow }), static_dir);
    (app, backend)
}

fn test_app(text: &str, api_key: Option<&str>) -> (Router, Arc<CannedBackend>) {
    test_app_with(text, api_key, None)
}

fn workflow_request(body: serde_json::Value) -> Request<Body> {
    let body = body.to_string();
    Request::post("/api/workflow")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("request")
}

fn gesture_body() -> serde_json::Value {
    serde_json::json!({
        "gesture": "thumb_press",
        "selected_text": "export default function Vitals() {}",
        "command": "health_dashboard",
    })
}

fn model_result() -> serde_json::Value {
    serde_json::json!({
        "action": "code_insert",
        "content": "const [vitals, setVitals] = useState([]);",
        "haptic_feedback": "long_pulse",
        "next_gesture": "Console dial to adjust chart range",
    })
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _backend) = test_app("{}", Some("key"));
    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn workflow_relays_model_result() {
    let (app, backend) = test_app(&model_result().to_string(), Some("key"));
    let response = app
        .oneshot(workflow_request(gesture_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, model_result());
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_credential_is_a_500_with_error_body() {
    let (app, backend) = test_app(&model_result().to_string(), None);
    let response = app
        .oneshot(workflow_request(gesture_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        serde_json::json!({ "error": "GEMINI_API_KEY is not set" })
    );
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fenced_model_output_is_accepted() {
    let text = format!("```json\n{}\n```", model_result());
    let (app, _backend) = test_app(&text, Some("key"));
    let response = app
        .oneshot(workflow_request(gesture_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, model_result());
}

#[tokio::test]
async fn unusable_model_output_returns_fallback_with_200() {
    for text in ["", "not json at all"] {
        let (app, _backend) = test_app(text, Some("key"));
        let response = app
            .oneshot(workflow_request(gesture_body()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let result: WorkflowResult =
            serde_json::from_value(json_body(response).await).expect("result shape");
        assert_eq!(result, WorkflowResult::fallback());
        assert_eq!(result.action, Action::Notification);
        assert_eq!(result.haptic_feedback, HapticFeedback::None);
    }
}

#[tokio::test]
async fn invalid_gesture_body_is_rejected_with_error_body() {
    let (app, backend) = test_app("{}", Some("key"));
    let response = app
        .oneshot(workflow_request(serde_json::json!({
            "gesture": "double_tap",
            "command": "health_dashboard",
        })))
        .await
        .expect("response");
    assert!(response.status().is_client_error());
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (app, backend) = test_app("{}", Some("key"));
    let response = app
        .oneshot(workflow_request(serde_json::json!({
            "gesture": "thumb_press",
            "selected_text": "x".repeat(MAX_BODY_BYTES + 1),
            "command": "patient_api",
        })))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn static_dir_serves_ui_assets() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("workflow_server_static_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    fs::write(temp_root.join("index.html"), "<h1>Gesture Simulator</h1>").expect("write");

    let (app, _backend) = test_app_with("{}", Some("key"), Some(temp_root.as_path()));
    let request = Request::get("/").body(Body::empty()).expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"<h1>Gesture Simulator</h1>");

    let request = Request::get("/healthz").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    fs::remove_dir_all(temp_root).expect("cleanup");
}
