//! HTTP surface tests over in-memory adapters.

mod helpers;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use bytes::Bytes;
use filedrop_core::FileStatus;
use filedrop_db::MetadataStore;
use filedrop_storage::Storage;
use helpers::{setup_test_app, setup_test_app_with};
use serde_json::Value;

async fn issue_upload(app: &helpers::TestApp, name: &str, content_type: &str) -> Value {
    let response = app
        .server
        .get("/upload-url")
        .add_query_param("fileName", name)
        .add_query_param("contentType", content_type)
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

#[tokio::test]
async fn test_upload_url_returns_id_and_creates_pending_record() {
    let app = setup_test_app();

    let body = issue_upload(&app, "report.pdf", "application/pdf").await;
    let file_id = body["fileId"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(file_id).is_ok());
    assert!(body["uploadUrl"].as_str().unwrap().contains("method=PUT"));

    let record = app.metadata.get(file_id).await.unwrap().unwrap();
    assert_eq!(record.status, FileStatus::Pending);
    assert_eq!(record.file_name, "report.pdf");
}

#[tokio::test]
async fn test_upload_url_validation() {
    let app = setup_test_app();

    let response = app
        .server
        .get("/upload-url")
        .add_query_param("contentType", "image/png")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "fileName is required");

    let response = app
        .server
        .get("/upload-url")
        .add_query_param("fileName", "../../etc/passwd")
        .add_query_param("contentType", "text/plain")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/upload-url")
        .add_query_param("fileName", "a.html")
        .add_query_param("contentType", "text/html\r\nX-Evil: 1")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/upload-url")
        .add_query_param("fileName", "x".repeat(256))
        .add_query_param("contentType", "text/plain")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert!(app.metadata.is_empty().await);
}

#[tokio::test]
async fn test_malformed_query_is_json_400() {
    let app = setup_test_app();

    let response = app
        .server
        .get("/upload-url?fileName=a.txt&fileName=b.txt&contentType=text/plain")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let content_type = response.header(axum::http::header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("application/json"));
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().starts_with("Invalid query string"));
    assert!(app.metadata.is_empty().await);
}

#[tokio::test]
async fn test_undecodable_path_is_json_400() {
    let app = setup_test_app();

    let response = app.server.get("/files/%FF%FE").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().starts_with("Invalid path parameter"));
}

#[tokio::test]
async fn test_list_files_omits_unset_fields() {
    let app = setup_test_app();
    issue_upload(&app, "a.txt", "text/plain").await;
    issue_upload(&app, "b.txt", "text/plain").await;

    let response = app.server.get("/files").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    for item in items {
        assert_eq!(item["status"], "pending");
        assert!(item.get("fileSize").is_none());
        assert!(item.get("uploadedAt").is_none());
        assert!(item.get("createdAt").is_some());
    }
}

#[tokio::test]
async fn test_download_url_is_404_until_uploaded() {
    let app = setup_test_app();
    let body = issue_upload(&app, "report.pdf", "application/pdf").await;
    let file_id = body["fileId"].as_str().unwrap().to_string();

    let response = app.server.get(&format!("/files/{}", file_id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["code"], "NOT_FOUND");

    app.storage
        .put(&file_id, Bytes::from_static(b"%PDF-1.7"), "application/pdf")
        .await
        .unwrap();

    let response = app.server.get(&format!("/files/{}", file_id)).await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["downloadUrl"]
        .as_str()
        .unwrap()
        .contains("method=GET"));
}

#[tokio::test]
async fn test_thumbnail_url() {
    let app = setup_test_app();

    let response = app.server.get("/files/abc/thumbnail").await;
    response.assert_status(StatusCode::NOT_FOUND);

    app.storage
        .put("thumbnails/abc.jpg", Bytes::from_static(b"\xff\xd8\xff"), "image/jpeg")
        .await
        .unwrap();

    let response = app.server.get("/files/abc/thumbnail").await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["thumbnailUrl"].is_string());
}

#[tokio::test]
async fn test_delete_unknown_file_succeeds() {
    let app = setup_test_app();

    let response = app.server.delete("/files/does-not-exist").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "File deleted successfully"
    );
}

#[tokio::test]
async fn test_delete_with_thumbnail_cleanup_enabled() {
    let app = setup_test_app_with(&[("DELETE_THUMBNAILS", "true")]);
    app.storage
        .put("abc", Bytes::from_static(b"x"), "image/png")
        .await
        .unwrap();
    app.storage
        .put("thumbnails/abc.jpg", Bytes::from_static(b"x"), "image/jpeg")
        .await
        .unwrap();

    app.server.delete("/files/abc").await.assert_status_ok();
    assert!(app.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = setup_test_app();

    let response = app.server.get("/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        response.json::<Value>(),
        serde_json::json!({"error": "Not found", "code": "NOT_FOUND"})
    );
}

#[tokio::test]
async fn test_options_returns_empty_200_with_cors() {
    let app = setup_test_app();

    for path in ["/files", "/files/abc", "/upload-url", "/anything/else"] {
        let response = app
            .server
            .method(Method::OPTIONS, path)
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("https://app.example.com"),
            )
            .await;
        response.assert_status_ok();
        assert!(response.text().is_empty(), "{path}");
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*",
            "{path}"
        );
    }
}

#[tokio::test]
async fn test_cors_headers_on_regular_responses() {
    let app = setup_test_app();

    let response = app
        .server
        .get("/files")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://app.example.com"),
        )
        .await;
    response.assert_status_ok();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = setup_test_app();

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");

    let response = app.server.get("/openapi.json").await;
    response.assert_status_ok();
    let spec = response.json::<Value>();
    assert!(spec["paths"]["/upload-url"]["get"].is_object());
    assert!(spec["paths"]["/files/{fileId}"]["delete"].is_object());
}
