use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use finboard_import::Loader;
use finboard_server::{app, config::Config, open_database, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "finboard-test-boundary";

struct TestApp {
    dir: tempfile::TempDir,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("data/finance.db"),
            uploads_dir: dir.path().join("uploads"),
            ..Config::default()
        };
        let pool = open_database(&config.database_path).await.unwrap();
        let router = app(AppState::new(pool, Loader::default(), config)).unwrap();
        Self { dir, router }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn upload(&self, source: Option<&str>, csv: Option<&str>) -> (StatusCode, Value) {
        let mut body = String::new();
        if let Some(source) = source {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"source_type\"\r\n\r\n{source}\r\n"
            ));
        }
        if let Some(csv) = csv {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"statement.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let request = Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    fn saved_uploads(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("uploads"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

const BOA_CSV: &str = "Posted Date,Payee,Amount\n\
01/05/2024,SHELL OIL,-42.10\n\
01/09/2024,STARBUCKS STORE #88,-4.75\n\
02/01/2024,PAYMENT - THANK YOU,500.00\n";

#[tokio::test]
async fn health_check() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "message": "Finance Dashboard API is running"})
    );
}

#[tokio::test]
async fn sources_lists_builtin_adapters() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"sources": ["apple_card", "boa_credit"]}));
}

#[tokio::test]
async fn upload_then_query() {
    let app = TestApp::new().await;

    let (status, body) = app.upload(Some("boa_credit"), Some(BOA_CSV)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(3));
    assert_eq!(body["message"], json!("Imported 3 transactions from boa_credit."));
    assert_eq!(app.saved_uploads(), 1);

    let (status, body) = app.get("/api/transactions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(3));
    let newest = &body["transactions"][0];
    assert_eq!(newest["transaction_date"], json!("2024-02-01"));
    assert_eq!(newest["amount"], json!(500.0));
    assert!(newest.get("raw_data").is_none());

    let (_, body) = app
        .get("/api/transactions?category=Transportation&start_date=2024-01-01&end_date=2024-01-31")
        .await;
    assert_eq!(body["count"], json!(1));
    let shell = &body["transactions"][0];
    assert_eq!(shell["merchant"], json!("SHELL OIL"));
    assert_eq!(shell["amount"], json!(-42.1));
    assert_eq!(shell["source"], json!("boa_credit"));

    let (_, body) = app.get("/api/transactions?limit=1").await;
    assert_eq!(body["count"], json!(1));
}

#[tokio::test]
async fn summary_after_upload() {
    let app = TestApp::new().await;
    app.upload(Some("boa_credit"), Some(BOA_CSV)).await;

    let (status, body) = app.get("/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_spending"], json!(46.85));
    assert_eq!(body["total_income"], json!(500.0));
    assert_eq!(body["net"], json!(453.15));
    assert_eq!(body["category_breakdown"][0]["category"], json!("Transportation"));
    assert_eq!(
        body["monthly_spending"],
        json!([{"month": "2024-01", "amount": 46.85}])
    );
}

#[tokio::test]
async fn unknown_source_is_rejected_before_saving() {
    let app = TestApp::new().await;
    let (status, body) = app.upload(Some("chase_debit"), Some(BOA_CSV)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid or missing source_type"));
    assert_eq!(app.saved_uploads(), 0);
}

#[tokio::test]
async fn missing_parts_are_bad_requests() {
    let app = TestApp::new().await;

    let (status, body) = app.upload(Some("boa_credit"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("No file provided"));

    let (status, _) = app.upload(None, Some(BOA_CSV)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_upload_persists_nothing() {
    let app = TestApp::new().await;
    let (status, body) = app
        .upload(
            Some("boa_credit"),
            Some("Date,Payee,Amount\n01/05/2024,SHELL OIL,-42.10\n"),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Posted Date"));

    let (_, body) = app.get("/api/transactions").await;
    assert_eq!(body["count"], json!(0));
}

#[tokio::test]
async fn invalid_filter_is_bad_request() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/transactions?start_date=yesterday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("start_date"));
}

const CVS_CSV: &str = "Posted Date,Payee,Amount\n01/10/2024,CVS PHARMACY,-12.00\n";

#[tokio::test]
async fn repeated_uploads_keep_separate_files() {
    let app = TestApp::new().await;
    let (first, _) = app.upload(Some("boa_credit"), Some(BOA_CSV)).await;
    let (second, _) = app.upload(Some("boa_credit"), Some(CVS_CSV)).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(app.saved_uploads(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_uploads_of_one_source_store_both_files() {
    let app = TestApp::new().await;
    let ((status_a, body_a), (status_b, body_b)) = tokio::join!(
        app.upload(Some("boa_credit"), Some(BOA_CSV)),
        app.upload(Some("boa_credit"), Some(CVS_CSV)),
    );
    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);
    assert_eq!(body_a["count"], json!(3));
    assert_eq!(body_b["count"], json!(1));
    assert_eq!(app.saved_uploads(), 2);

    let (_, all) = app.get("/api/transactions").await;
    assert_eq!(all["count"], json!(4));

    let (_, shell) = app.get("/api/transactions?category=Transportation").await;
    assert_eq!(shell["count"], json!(1));
    assert_eq!(shell["transactions"][0]["merchant"], json!("SHELL OIL"));

    let (_, health) = app.get("/api/transactions?category=Health%20%26%20Wellness").await;
    assert_eq!(health["count"], json!(1));
    assert_eq!(health["transactions"][0]["merchant"], json!("CVS PHARMACY"));
}
