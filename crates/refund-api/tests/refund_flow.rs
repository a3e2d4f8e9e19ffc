//! 가입부터 환급 요청 조회까지의 전체 흐름 통합 테스트
//!
//! 메모리 저장소와 임시 디렉토리로 전체 라우터(레이어 포함)를 구동합니다.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::{header, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use refund_api::{create_router, AppState};
use refund_core::AppConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "----refund-flow-boundary";

fn config_toml(dir: &TempDir, secret: &str, request_timeout_secs: u64) -> String {
    let tmp = dir.path().join("tmp");
    let uploads = tmp.join("uploads");
    format!(
        r#"
[server]
request_timeout_secs = {request_timeout_secs}

[auth]
jwt_secret = '{secret}'
jwt_expires_in = "15m"
hash_cost = 1

[upload]
tmp_folder = '{}'
uploads_folder = '{}'
"#,
        tmp.display(),
        uploads.display()
    )
}

fn build_app(secret: &str, request_timeout_secs: u64) -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let config =
        AppConfig::from_toml_str(&config_toml(&dir, secret, request_timeout_secs)).unwrap();
    let state = Arc::new(AppState::in_memory(config).unwrap());
    (dir, create_router(state, None))
}

fn app_with_secret(secret: &str) -> (TempDir, Router) {
    build_app(secret, 30)
}

fn tmp_file_count(dir: &TempDir) -> usize {
    let Ok(entries) = std::fs::read_dir(dir.path().join("tmp")) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .count()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn upload_request(token: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

async fn signup_and_login(app: &Router, name: &str, email: &str, role: &str) -> String {
    let (status, _) = call(
        app,
        json_request(
            "POST",
            "/users",
            None,
            json!({"name": name, "email": email, "password": "123456", "role": role}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = call(
        app,
        json_request(
            "POST",
            "/sessions",
            None,
            json!({"email": email, "password": "123456"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_employee_submits_and_manager_reviews() {
    let (_dir, app) = app_with_secret("integration-secret");

    let employee = signup_and_login(&app, "Ana Souza", "ana@email.com", "employee").await;
    let manager = signup_and_login(&app, "Gestor", "gestor@email.com", "manager").await;

    // 영수증 업로드
    let (status, json) = call(
        &app,
        upload_request(&employee, "recibo.jpg", "image/jpeg", b"\xff\xd8\xff\xe0jpeg"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let filename = json["filename"].as_str().unwrap().to_string();

    // 환급 요청 생성
    let (status, created) = call(
        &app,
        json_request(
            "POST",
            "/refunds",
            Some(&employee),
            json!({"name": "Jantar com cliente", "category": "food", "amount": 89.9, "filename": filename}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let refund_id = created["id"].as_str().unwrap().to_string();

    // 관리자 목록 조회
    let (status, list) = call(&app, get_request("/refunds?name=souza", &manager)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["refunds"][0]["id"], refund_id);
    assert_eq!(list["refunds"][0]["user"]["name"], "Ana Souza");
    assert_eq!(list["pagination"]["totalRecords"], 1);

    // employee는 목록 조회 불가
    let (status, json) = call(&app, get_request("/refunds", &employee)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"message": "Não autorizado"}));

    // 본인 요청 단건 조회
    let (status, json) = call(&app, get_request(&format!("/refunds/{refund_id}"), &employee)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["amount"], 89.9);
    assert_eq!(json["filename"], filename);
}

#[tokio::test]
async fn test_token_failures() {
    let (_dir, app) = app_with_secret("integration-secret");

    let (status, json) = call(
        &app,
        json_request("POST", "/refunds", None, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"message": "JWT token nao encontrado"}));

    let (status, json) = call(
        &app,
        json_request("POST", "/refunds", Some("not.a.token"), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"message": "JWT token inválido"}));

    // 다른 키로 서명된 토큰
    let (_other_dir, other_app) = app_with_secret("another-secret");
    let foreign = signup_and_login(&other_app, "Ana", "ana@email.com", "employee").await;
    let (status, json) = call(&app, get_request("/refunds/00000000-0000-0000-0000-000000000000", &foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"message": "JWT token inválido"}));
}

#[tokio::test]
async fn test_missing_secret_fails_closed() {
    let (_dir, app) = app_with_secret("");

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/users",
            None,
            json!({"name": "Ana", "email": "ana@email.com", "password": "123456"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &app,
        json_request(
            "POST",
            "/sessions",
            None,
            json!({"email": "ana@email.com", "password": "123456"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // 서명 키 없이 만든 토큰이 통과하면 안 됨
    let (status, json) = call(&app, get_request("/refunds", "eyJhbGciOiJub25lIn0.e30.")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"message": "JWT token inválido"}));
}

#[tokio::test]
async fn test_stalled_upload_times_out_without_leaving_tmp_file() {
    let (dir, app) = build_app("integration-secret", 1);
    let token = signup_and_login(&app, "Ana", "ana@email.com", "employee").await;

    // 파일 데이터 일부만 보내고 본문을 끝내지 않음
    let head = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"recibo.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         partialdata"
    );
    let body = futures::stream::iter([Ok::<_, std::io::Error>(Bytes::from(head))])
        .chain(futures::stream::pending());

    let request = Request::builder()
        .method("POST")
        .uri("/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from_stream(body))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(tmp_file_count(&dir), 0);
}

#[tokio::test]
async fn test_health_and_unknown_route() {
    let (_dir, app) = app_with_secret("integration-secret");

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, json) = call(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["database"], "memory");

    let request = Request::builder().uri("/nowhere").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
