//! Route-level tests against an empty, tempdir-backed service.
//!
//! Dispatch paths that would invoke the rasterizer are covered in
//! labelpress-core; here we exercise the adapter's request validation and
//! history plumbing.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use labelpress_core::{Config, PrintService};
use labelpress_server::{AppState, routes};

fn test_app(dir: &std::path::Path) -> Router {
    let config = Config {
        sku_pdf_dir: dir.join("sku"),
        aux_pdf_dir: dir.join("aux"),
        printer_list_file: dir.join("print_set.txt"),
        separator_name: "separator.pdf".to_string(),
        history_file: dir.join("print_log.csv"),
        ghostscript_path: None,
    };
    routes::build_app(AppState::new(PrintService::new(&config)))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(uri: &str, method: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("healthy"));
    assert!(body.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn print_without_configured_printer_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(json_request(
            "/print",
            "POST",
            serde_json::json!({"identifier": "ABC123", "quantity": 1}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("no printer configured"));
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(json_request(
            "/print",
            "POST",
            serde_json::json!({"identifier": "ABC123", "quantity": 0, "printer": "P1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("quantity"));
}

#[tokio::test]
async fn empty_history_lists_as_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/history")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "[]");
}

#[tokio::test]
async fn reprint_of_unknown_record_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(json_request(
            "/history/12345/reprint",
            "POST",
            serde_json::json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_of_unknown_record_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/history/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("false"));
}

#[tokio::test]
async fn printers_lists_the_configured_names() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("print_set.txt"), "LabelPrinter1\n").unwrap();
    let app = test_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/printers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("LabelPrinter1"));
}
