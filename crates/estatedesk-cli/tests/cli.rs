//! CLI integration tests against a mock API.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{Sandbox, run_cli, run_cli_success};

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_credential() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "asha@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t1",
            "user": { "id": "u1", "name": "Asha", "role": "manager" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(
        &[
            "login",
            "--email",
            "asha@example.com",
            "--password",
            "secret123",
        ],
        &sandbox,
        &server,
    )
    .await;

    assert!(stdout.contains("Logged in successfully"));
    assert!(stdout.contains("u1"));
    assert_eq!(sandbox.token().as_deref(), Some("t1"));

    let whoami = run_cli_success(&["whoami"], &sandbox, &server).await;
    assert!(whoami.contains("u1"));
    assert!(whoami.contains("Asha"));
    assert!(whoami.contains("manager"));
    assert!(whoami.contains("credential.json"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_whoami_without_session_fails() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();

    let output = run_cli(&["whoami"], &sandbox, &server).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No active session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_renews_expired_credential() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.seed("t1");

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(header("authorization", "Bearer t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "t-100", "name": "Unit 4B" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t2" })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(&["get", "/tenants"], &sandbox, &server).await;

    assert!(stdout.contains("Unit 4B"));
    assert_eq!(sandbox.token().as_deref(), Some("t2"));
    assert_eq!(sandbox.user_id().as_deref(), Some("u1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_renewal_logs_out() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.seed("t1");

    Mock::given(method("GET"))
        .and(path("/rent-roll"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_cli(&["get", "/rent-roll"], &sandbox, &server).await;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Session expired"));
    assert_eq!(sandbox.token(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_public_route_does_not_renew() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.seed("t1");

    Mock::given(method("GET"))
        .and(path("/plans"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t2" })))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_cli(&["--route", "/signup", "get", "/plans"], &sandbox, &server).await;

    assert!(!output.status.success());
    assert_eq!(sandbox.token().as_deref(), Some("t1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.seed("t1");

    Mock::given(method("POST"))
        .and(path("/leases"))
        .and(header("authorization", "Bearer t1"))
        .and(body_json(json!({ "unit": "4B", "rent": 1200 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "l-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(
        &["post", "/leases", "--data", r#"{"unit":"4B","rent":1200}"#],
        &sandbox,
        &server,
    )
    .await;

    assert!(stdout.contains("l-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_removes_credential() {
    let server = MockServer::start().await;
    let sandbox = Sandbox::new();
    sandbox.seed("t1");

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_millis(10)))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_success(&["logout"], &sandbox, &server).await;

    assert!(stdout.contains("Logged out"));
    assert_eq!(sandbox.token(), None);
}
