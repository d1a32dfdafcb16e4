use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tower::ServiceExt;

use medi::config::ServerConfig;
use medi::imaging::{ImageAnalyzer, MockClassifier, DEFAULT_CLASS_LABELS};
use medi::server::{build_router, AppState};
use medi::symptoms::{ConditionCatalog, SymptomAnalyzer};

const BOUNDARY: &str = "medi-test-boundary";

fn server_config(max_upload_bytes: usize) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 5001,
        frontend_url: "http://localhost:3000".to_string(),
        max_upload_bytes,
    }
}

fn app() -> Router {
    app_with_upload_limit(5 * 1024 * 1024)
}

fn app_with_upload_limit(max_upload_bytes: usize) -> Router {
    let labels: Vec<String> = DEFAULT_CLASS_LABELS.iter().map(|l| l.to_string()).collect();
    let images = ImageAnalyzer::new(Arc::new(MockClassifier::new(labels.len(), Some(42))), labels, 32);
    let symptoms = SymptomAnalyzer::new(
        ConditionCatalog::default(),
        None,
        40.0,
        "This patient has {}".to_string(),
    );
    build_router(Arc::new(AppState::new(images, symptoms)), &server_config(max_upload_bytes)).unwrap()
}

fn png() -> Vec<u8> {
    let mut buffer = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 48, Rgb([120, 120, 120])))
        .write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

fn multipart_body(field: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"scan.png\"\r\nContent-Type: image/png\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(field, bytes)))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_index_and_health() {
    let app = app();

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to the Medical Image Analysis API");

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_symptoms_keyword_analysis() {
    let app = app();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/symptoms", json!({ "symptoms": "I have a headache and sensitivity to light" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnosis"], "Migraine");
    assert_eq!(body["confidence"], 40.0);
    assert_eq!(body["model_used"], "keyword matching");
    assert!(body["recommendation"].as_str().unwrap().contains("dark room"));
    assert!(body.get("differential_diagnosis").is_none());
    assert!(body.get("model_error").is_none());
}

#[tokio::test]
async fn test_symptoms_inconclusive() {
    let app = app();
    let (status, body) = send(&app, json_request("POST", "/api/symptoms", json!({ "symptoms": "my knee clicks" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["diagnosis"], "Inconclusive based on provided symptoms");
    assert_eq!(body["confidence"], 20.0);
    assert_eq!(body["recommendation"], "Please consult with a doctor for a professional diagnosis.");
}

#[tokio::test]
async fn test_symptoms_missing_or_blank() {
    let app = app();

    let (status, body) = send(&app, json_request("POST", "/api/symptoms", json!({ "text": "cough" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No symptoms provided");

    let (status, body) = send(&app, json_request("POST", "/api/symptoms", json!({ "symptoms": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No symptoms provided");

    let request = Request::builder()
        .method("POST")
        .uri("/api/symptoms")
        .body(Body::from("cough"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No symptoms provided");
}

#[tokio::test]
async fn test_predict_returns_probabilities() {
    let app = app();
    let (status, body) = send(&app, multipart_request("image", &png())).await;

    assert_eq!(status, StatusCode::OK);
    let probabilities = body["all_probabilities"].as_object().unwrap();
    assert_eq!(probabilities.len(), 5);
    for label in DEFAULT_CLASS_LABELS {
        assert!(probabilities.contains_key(label));
    }
    let total: f64 = probabilities.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 100.0).abs() < 0.01);

    let diagnosis = body["diagnosis"].as_str().unwrap();
    assert_eq!(body["confidence"], probabilities[diagnosis]);
    let max = probabilities.values().map(|v| v.as_f64().unwrap()).fold(f64::MIN, f64::max);
    assert_eq!(body["confidence"].as_f64().unwrap(), max);
}

#[tokio::test]
async fn test_predict_without_image_field() {
    let app = app();
    let (status, body) = send(&app, multipart_request("document", &png())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn test_predict_without_multipart() {
    let app = app();
    let (status, body) = send(&app, json_request("POST", "/api/predict", json!({ "image": "base64" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image file provided");
}

#[tokio::test]
async fn test_predict_rejects_undecodable_image() {
    let app = app();
    let (status, body) = send(&app, multipart_request("image", b"this is not a picture")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid image"));
}

#[tokio::test]
async fn test_predict_rejects_oversized_upload() {
    let app = app_with_upload_limit(1024);
    let (status, body) = send(&app, multipart_request("image", &vec![0u8; 4096])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().starts_with("Malformed upload"));

    // Small uploads still go through under the same limit
    let (status, _) = send(&app, multipart_request("image", &png())).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_record_lifecycle() {
    let app = app();

    let (status, body) = send(&app, get("/api/diagnoses")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], json!([]));

    let new_record = json!({
        "kind": "symptoms",
        "patient_name": "John Doe",
        "description": "cough, fever and sore throat",
        "result": {
            "diagnosis": "Respiratory infection",
            "confidence": 60.0,
            "model_used": "keyword matching"
        }
    });
    let (status, body) = send(&app, json_request("POST", "/api/diagnoses", new_record)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let record = &body["data"];
    assert_eq!(record["status"], "pending");
    assert_eq!(record["kind"], "symptoms");
    assert_eq!(record["result"]["diagnosis"], "Respiratory infection");
    let id = record["id"].as_str().unwrap().to_string();
    assert!(record["created_at"].is_string());

    let (status, body) = send(&app, get(&format!("/api/diagnoses/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());
    assert_eq!(body["data"]["patient_name"], "John Doe");

    let (status, body) = send(&app, get("/api/diagnoses")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_record_not_found() {
    let app = app();
    let (status, body) = send(&app, get("/api/diagnoses/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert!(body["data"].is_null());
    assert!(body["message"].as_str().unwrap().contains("does-not-exist"));
}

#[tokio::test]
async fn test_record_validation() {
    let app = app();

    let invalid = json!({
        "kind": "image",
        "description": "chest x-ray",
        "result": { "diagnosis": "Normal", "confidence": 250.0 }
    });
    let (status, body) = send(&app, json_request("POST", "/api/diagnoses", invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("confidence"));

    let unknown_kind = json!({
        "kind": "blood-test",
        "description": "cbc",
        "result": { "diagnosis": "Normal", "confidence": 50.0 }
    });
    let (status, body) = send(&app, json_request("POST", "/api/diagnoses", unknown_kind)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid record"));
}

#[tokio::test]
async fn test_cors_allows_frontend_origin() {
    let app = app();
    let request = Request::builder()
        .uri("/api/health")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}
