//! HTTP API integration tests
//!
//! Drives the router in-process with a stub classifier.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tower::ServiceExt;

use cifar10_classifier::inference::{Classifier, NormalizedTensor, PredictionVector};
use cifar10_classifier::server::{build_router, AppState, ServerConfig};
use cifar10_classifier::Result;

const BOUNDARY: &str = "cifar10-test-boundary";

/// Fixed scores with a three-way tie at 0.1
struct FixedClassifier;

impl Classifier for FixedClassifier {
    fn classify(&self, _input: &NormalizedTensor) -> Result<PredictionVector> {
        PredictionVector::new(vec![0.1, 0.05, 0.6, 0.0, 0.0, 0.0, 0.0, 0.1, 0.05, 0.1])
    }
}

struct TestApp {
    router: Router,
    upload_dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        upload_dir: upload_dir.path().join("uploads"),
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::new(config, Arc::new(FixedClassifier)).unwrap());
    TestApp {
        router: build_router(state).unwrap(),
        upload_dir,
    }
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(48, 48, |x, y| {
        Rgb([(x * 5) as u8, (y * 5) as u8, 128])
    }));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, file_name, content)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"message": "API is up and running!"})
    );
}

#[tokio::test]
async fn test_upload_returns_top3() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(upload_request("file", "cat.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let predictions = body["top_predictions"].as_array().unwrap();
    assert_eq!(predictions.len(), 3);

    let labels: Vec<&str> = predictions
        .iter()
        .map(|p| p["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["bird", "airplane", "horse"]);
    assert!((predictions[0]["confidence"].as_f64().unwrap() - 0.6).abs() < 1e-6);

    assert!(dir_is_empty(&app.upload_dir.path().join("uploads")));
}

#[tokio::test]
async fn test_repeated_uploads_are_identical() {
    let app = test_app();
    let bytes = png_bytes();

    let first = app
        .router
        .clone()
        .oneshot(upload_request("file", "same.png", &bytes))
        .await
        .unwrap();
    let second = app
        .router
        .clone()
        .oneshot(upload_request("file", "same.png", &bytes))
        .await
        .unwrap();

    assert_eq!(json_body(first).await, json_body(second).await);
}

#[tokio::test]
async fn test_non_image_upload_is_server_error() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(upload_request("file", "notes.txt", b"just some text, not pixels"))
        .await
        .unwrap();

    assert!(response.status().is_server_error());
    let body = json_body(response).await;
    assert!(body.get("top_predictions").is_none());
    assert!(body["detail"].as_str().unwrap().contains("decode"));

    assert!(dir_is_empty(&app.upload_dir.path().join("uploads")));
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = test_app();
    let response = app
        .router
        .oneshot(upload_request("image", "cat.png", &png_bytes()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_cors_preflight_allowed_origin() {
    let app = test_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/upload")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let app = test_app();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
