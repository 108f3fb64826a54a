//! End-to-end pipeline tests against stub generation and render services
//! served over real HTTP on ephemeral ports.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::{Value, json};

use flowchart::config::HttpTimeouts;
use flowchart::export::{HttpImageFetcher, RasterExporter};
use flowchart::generation::HttpGenerator;
use flowchart::reference::ReferenceBuilder;
use flowchart::{Phase, PipelineController, encoder};

const LOGIN_FLOW: &str = "@startuml\nA->B\n@enduml";

// =========================================================================
// Stub services
// =========================================================================

#[derive(Default)]
struct Stub {
    /// Status and body the generation endpoint answers with.
    reply: Mutex<Option<(StatusCode, String)>>,
    prompts: Mutex<Vec<String>>,
    /// Sources the render endpoint decoded from tokens.
    rendered: Mutex<Vec<String>>,
}

async fn generate(State(stub): State<Arc<Stub>>, axum::Json(body): axum::Json<Value>) -> impl IntoResponse {
    let prompt = body.get("prompt").and_then(Value::as_str).unwrap_or_default().to_string();
    stub.prompts.lock().unwrap().push(prompt);
    stub.reply
        .lock()
        .unwrap()
        .clone()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, String::new()))
}

/// Simulates the render service: decode the token, draw one row per line.
async fn render(State(stub): State<Arc<Stub>>, Path(token): Path<String>) -> impl IntoResponse {
    let Ok(source) = encoder::decode(&token) else {
        return (StatusCode::BAD_REQUEST, [(header::CONTENT_TYPE, "text/plain")], String::from("bad token"));
    };
    let rows = source.lines().count();
    stub.rendered.lock().unwrap().push(source);
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="{h}"><rect width="100" height="{h}" fill="black"/></svg>"#,
        h = rows * 10
    );
    (StatusCode::OK, [(header::CONTENT_TYPE, "image/svg+xml")], svg)
}

async fn spawn_stub() -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub::default());
    let app = Router::new()
        .route("/generate-flowchart", post(generate))
        .route("/plantuml/svg/{token}", get(render))
        .with_state(Arc::clone(&stub));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

fn controller_for(base: &str, out_dir: &std::path::Path) -> PipelineController {
    let timeouts = HttpTimeouts::default();
    let generator = HttpGenerator::new(format!("{base}/generate-flowchart"), timeouts).unwrap();
    let fetcher = HttpImageFetcher::new(timeouts).unwrap();
    PipelineController::new(
        Box::new(generator),
        RasterExporter::new(Box::new(fetcher), out_dir),
        ReferenceBuilder::new(format!("{base}/plantuml/svg")),
    )
}

fn set_reply(stub: &Stub, status: StatusCode, body: Value) {
    *stub.reply.lock().unwrap() = Some((status, body.to_string()));
}

// =========================================================================
// Generation
// =========================================================================

#[tokio::test]
async fn fenced_response_becomes_ready_document() {
    let (base, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    set_reply(&stub, StatusCode::OK, json!({ "result": "```plantuml\n@startuml\nA->B\n@enduml\n```" }));
    let mut controller = controller_for(&base, dir.path());

    controller.set_prompt("draw a login flow");
    controller.submit().await.unwrap();

    assert_eq!(*stub.prompts.lock().unwrap(), vec!["draw a login flow".to_string()]);
    let state = controller.state();
    assert_eq!(state.phase(), Phase::Ready);
    assert_eq!(state.document(), LOGIN_FLOW);
    assert!(state.image_reference().starts_with(&format!("{base}/plantuml/svg/")));
}

#[tokio::test]
async fn service_unavailable_status() {
    let (base, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    set_reply(&stub, StatusCode::SERVICE_UNAVAILABLE, json!({ "detail": "overloaded" }));
    let mut controller = controller_for(&base, dir.path());

    controller.set_prompt("draw a login flow");
    let err = controller.submit().await.unwrap_err();

    assert_eq!(err.to_string(), "Server is temporarily unavailable. Please try again later.");
    assert_eq!(controller.state().phase(), Phase::Failed);
    assert_eq!(controller.state().document(), "");
}

#[tokio::test]
async fn empty_result_field() {
    let (base, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    set_reply(&stub, StatusCode::OK, json!({ "result": "" }));
    let mut controller = controller_for(&base, dir.path());

    controller.set_prompt("draw a login flow");
    let err = controller.submit().await.unwrap_err();

    assert_eq!(err.to_string(), "No result returned from the backend.");
    assert_eq!(controller.state().phase(), Phase::Failed);
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let dir = tempfile::tempdir().unwrap();
    let mut controller = controller_for(&base, dir.path());

    controller.set_prompt("draw a login flow");
    let err = controller.submit().await.unwrap_err();

    assert_eq!(err.to_string(), "Server is temporarily unavailable. Please try again later.");
    assert_eq!(controller.state().phase(), Phase::Failed);
}

// =========================================================================
// Rendering and export
// =========================================================================

#[tokio::test]
async fn render_service_sees_the_edited_source() {
    let (base, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    set_reply(&stub, StatusCode::OK, json!({ "result": LOGIN_FLOW }));
    let mut controller = controller_for(&base, dir.path());
    controller.set_prompt("draw a login flow");
    controller.submit().await.unwrap();

    let edited = "@startuml\nA->B\nB->C\n@enduml";
    controller.edit_document(edited);
    let path = controller.export().await.unwrap().unwrap();

    assert_eq!(*stub.rendered.lock().unwrap(), vec![edited.to_string()]);
    let img = image::load_from_memory(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!((img.width(), img.height()), (100, 40));
    assert_eq!(path, dir.path().join("flowchart.png"));
}

#[tokio::test]
async fn render_error_status_is_export_error() {
    let (base, _stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let timeouts = HttpTimeouts::default();
    let mut controller = PipelineController::new(
        Box::new(HttpGenerator::new(format!("{base}/generate-flowchart"), timeouts).unwrap()),
        RasterExporter::new(Box::new(HttpImageFetcher::new(timeouts).unwrap()), dir.path()),
        ReferenceBuilder::new(format!("{base}/missing")),
    );
    controller.edit_document(LOGIN_FLOW);
    let before = controller.state().clone();

    let err = controller.export().await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to download flowchart: render service returned status 404");
    assert_eq!(controller.state().document(), before.document());
    assert_eq!(controller.state().image_reference(), before.image_reference());
    assert!(!dir.path().join("flowchart.png").exists());
}
