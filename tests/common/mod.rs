//! Shared integration test harness
//!
//! Each test gets its own temp SQLite database and upload directory,
//! seeded with the demo departments (dept1, dept2) and accounts
//! user1 / manager1 / admin1 (dept1) and user2 (dept2).

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

use docvault::api::services::{AppStartTime, LoginLimiterConfig, login_limiter_config};
use docvault::config::StaticConfig;
use docvault::runtime::lifetime::startup::{StartupContext, build_context};

pub const PASSWORD: &str = "password";
pub const BOUNDARY: &str = "----docvault-test-boundary";

pub struct TestEnv {
    pub ctx: StartupContext,
    pub start: AppStartTime,
    pub limiter: LoginLimiterConfig,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

pub async fn setup() -> TestEnv {
    setup_with(|_| {}).await
}

pub async fn setup_with(customize: impl FnOnce(&mut StaticConfig)) -> TestEnv {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let upload_dir = dir.path().join("uploads");

    let mut config = StaticConfig::default();
    config.database.database_url =
        format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    config.database.pool_size = 4;
    config.uploads.dir = upload_dir.to_string_lossy().into_owned();
    config.auth.secret_key = "integration-test-secret".to_string();
    config.auth.login_burst = 1000;
    customize(&mut config);

    let ctx = build_context(&config)
        .await
        .expect("Failed to build startup context");
    let limiter = login_limiter_config(&config.auth);

    TestEnv {
        ctx,
        start: AppStartTime::default(),
        limiter,
        upload_dir,
        _dir: dir,
    }
}

/// 与服务器相同的装配方式初始化测试 App
macro_rules! init_app {
    ($env:expr) => {
        actix_web::test::init_service(actix_web::App::new().configure(|cfg| {
            docvault::runtime::modes::server::configure_app(
                cfg,
                &$env.ctx,
                &$env.start,
                &$env.limiter,
            )
        }))
        .await
    };
}

/// 登录并返回 access token
macro_rules! login {
    ($app:expr, $username:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr("127.0.0.1:12345".parse().unwrap())
            .set_form([("username", $username), ("password", common::PASSWORD)])
            .to_request();
        let resp = actix_web::test::call_service(&$app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::OK,
            "login failed for {}",
            $username
        );
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        body["access_token"].as_str().unwrap().to_string()
    }};
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// 构造 multipart 请求体，返回 (Content-Type, body)
pub fn multipart(filename: &str, content: &[u8], visibility: Option<&str>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    if let Some(v) = visibility {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"visibility\"\r\n\r\n{}\r\n",
                BOUNDARY, v
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// 只含普通字段、没有文件的 multipart 请求体
pub fn multipart_without_file() -> (String, Vec<u8>) {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body.into_bytes(),
    )
}
