use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use core_pipeline::prompts::CLASSIFY_PROMPT;
use core_pipeline::ResultStore;
use docscan_server::{build_router, AppState};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use llm_bridge::mock::ScriptedGateway;
use llm_bridge::Extractor;
use serde_json::{json, Value};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "docscan-test-boundary";

fn app_with(gateway: ScriptedGateway, static_dir: PathBuf) -> (Router, Arc<ScriptedGateway>) {
    let gateway = Arc::new(gateway);
    let store = Arc::new(ResultStore::default());
    let extractor = Extractor::new(gateway.clone(), store);
    let router = build_router(AppState {
        extractor: Arc::new(extractor),
        static_dir,
        max_upload_bytes: 5 * 1024 * 1024,
    });
    (router, gateway)
}

fn app(gateway: ScriptedGateway) -> (Router, Arc<ScriptedGateway>) {
    app_with(gateway, PathBuf::from("does-not-exist"))
}

fn png() -> Vec<u8> {
    let img = ImageBuffer::from_pixel(64, 32, Rgb([240u8, 240u8, 240u8]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("png encoding should not fail");
    buf
}

enum Part<'a> {
    File { name: &'a str, filename: &'a str, data: Vec<u8> },
    Text { name: &'a str, value: &'a str },
}

fn multipart(parts: Vec<Part<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File { name, filename, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(&data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/extract")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("request builder should not fail")
}

fn image_part(filename: &str) -> Part<'_> {
    Part::File {
        name: "image",
        filename,
        data: png(),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body must be readable")
        .to_bytes();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    let value = serde_json::from_slice(&bytes).expect("response must be valid JSON");
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builder should not fail")
}

#[tokio::test]
async fn extract_without_image_field_is_rejected() {
    let (app, gateway) = app(ScriptedGateway::new());

    let request = multipart(vec![Part::Text {
        name: "prompt",
        value: "read it",
    }]);
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No image provided" }));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn extract_with_non_multipart_body_is_rejected() {
    let (app, _) = app(ScriptedGateway::new());

    let request = Request::builder()
        .method("POST")
        .uri("/extract")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No image provided" }));
}

#[tokio::test]
async fn extract_with_image_field_without_filename_is_rejected() {
    let (app, gateway) = app(ScriptedGateway::new());

    let request = multipart(vec![Part::Text {
        name: "image",
        value: "not a file upload",
    }]);
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No image provided" }));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn extract_with_empty_filename_is_rejected() {
    let (app, gateway) = app(ScriptedGateway::new());

    let (status, body) = send_json(&app, multipart(vec![image_part("")])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No image selected" }));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn extract_with_prompt_calls_model_once() {
    let (app, gateway) = app(ScriptedGateway::new().reply("Total amount due"));

    let request = multipart(vec![
        image_part("receipt.png"),
        Part::Text {
            name: "prompt",
            value: "What is the total?",
        },
    ]);
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["result"]
        .as_str()
        .unwrap()
        .contains("<p>Total amount due</p>"));
    assert!(body["request_id"].is_string());

    let calls = gateway.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "What is the total?");
}

#[tokio::test]
async fn extract_without_prompt_classifies_before_extracting() {
    let (app, gateway) = app(
        ScriptedGateway::new()
            .reply("ID FRONT")
            .reply("1. Name: John Doe\n2. ID Number: 12345"),
    );

    let (status, body) = send_json(&app, multipart(vec![image_part("id.png")])).await;
    assert_eq!(status, StatusCode::OK);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].prompt, CLASSIFY_PROMPT);

    let (status, record) = send_json(&app, get("/download_json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        record["structured_data"],
        json!({ "Name": "John Doe", "ID Number": "12345" })
    );
    assert_eq!(record["full_text"], "1. Name: John Doe\n2. ID Number: 12345");
    assert_eq!(record["document_type"], "tabular_data");
    assert_eq!(record["document_category"], "id_front");
    assert_eq!(record["prompt_used"], calls[1].prompt.as_str());

    let id = body["request_id"].as_str().unwrap();
    let (status, by_id) = send_json(&app, get(&format!("/download_json?id={}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_id, record);
}

#[tokio::test]
async fn failed_generation_returns_500_and_records_prompt() {
    let (app, gateway) = app(ScriptedGateway::new().fail("CUDA out of memory"));

    let request = multipart(vec![
        image_part("big.png"),
        Part::Text {
            name: "prompt",
            value: "Extract everything",
        },
    ]);
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "CUDA out of memory" }));
    assert_eq!(gateway.cache_clears(), 1);

    let (_, record) = send_json(&app, get("/download_json")).await;
    assert_eq!(record, json!({ "prompt_used": "Extract everything" }));
}

#[tokio::test]
async fn undecodable_image_is_a_processing_error() {
    let (app, gateway) = app(ScriptedGateway::new());

    let request = multipart(vec![Part::File {
        name: "image",
        filename: "notes.txt",
        data: b"plain text, not pixels".to_vec(),
    }]);
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("cannot identify image"));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn download_json_before_any_extraction_is_empty_object() {
    let (app, _) = app(ScriptedGateway::new());

    let (status, body) = send_json(&app, get("/download_json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn download_json_rejects_bad_and_unknown_ids() {
    let (app, _) = app(ScriptedGateway::new());

    let (status, body) = send_json(&app, get("/download_json?id=nope")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid result id" }));

    let (status, body) = send_json(
        &app,
        get("/download_json?id=00000000-0000-4000-8000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Result not found" }));
}

#[tokio::test]
async fn clear_cache_releases_model_memory() {
    let (app, gateway) = app(ScriptedGateway::new());

    let request = Request::builder()
        .method("POST")
        .uri("/clear_cache")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Cache cleared successfully" }));
    assert_eq!(gateway.cache_clears(), 1);
}

#[tokio::test]
async fn index_serves_placeholder_without_built_frontend() {
    let (app, _) = app(ScriptedGateway::new());

    let (status, body) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("The web UI has not been built"));
}

#[tokio::test]
async fn index_and_assets_come_from_static_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>built ui</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();
    let (app, _) = app_with(ScriptedGateway::new(), dir.path().to_path_buf());

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<html>built ui</html>");

    let (status, body) = send(&app, get("/app.js")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"console.log('hi');");
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = app(ScriptedGateway::new());

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}
