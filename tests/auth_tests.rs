//! Authentication API tests
//!
//! Login, bearer token resolution, /auth/me and login rate limiting.

#[macro_use]
mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use serde_json::Value;

use common::{PASSWORD, bearer, setup, setup_with};

#[actix_web::test]
async fn test_login_returns_bearer_token() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::post()
        .uri("/auth/login")
        .peer_addr("127.0.0.1:12345".parse().unwrap())
        .set_form([("username", "user1"), ("password", PASSWORD)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn test_login_wrong_password_is_rejected() {
    let env = setup().await;
    let app = init_app!(env);

    for (username, password) in [("user1", "wrong"), ("nobody", PASSWORD)] {
        let req = TestRequest::post()
            .uri("/auth/login")
            .peer_addr("127.0.0.1:12345".parse().unwrap())
            .set_form([("username", username), ("password", password)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Incorrect username or password");
    }
}

#[actix_web::test]
async fn test_login_with_missing_fields_is_bad_request() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::post()
        .uri("/auth/login")
        .peer_addr("127.0.0.1:12345".parse().unwrap())
        .set_form([("username", "user1")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_me_returns_current_user() {
    let env = setup().await;
    let app = init_app!(env);
    let token = login!(app, "manager1");

    let req = TestRequest::get()
        .uri("/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["username"], "manager1");
    assert_eq!(body["role"], "MANAGER");
    assert_eq!(body["department_id"], 1);
    assert!(body.get("password_hash").is_none());
}

#[actix_web::test]
async fn test_me_without_token_is_unauthorized() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::get().uri("/auth/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Not authenticated");
}

#[actix_web::test]
async fn test_invalid_token_is_unauthorized() {
    let env = setup().await;
    let app = init_app!(env);

    let req = TestRequest::get()
        .uri("/files")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Could not validate credentials");
}

#[actix_web::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let env = setup().await;
    let app = init_app!(env);

    let foreign = docvault::api::jwt::JwtService::new(
        "some-other-secret",
        docvault::config::JwtAlgorithm::HS256,
        30,
    );
    let token = foreign.generate_access_token("admin1").unwrap();

    let req = TestRequest::get()
        .uri("/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_is_rate_limited_per_ip() {
    let env = setup_with(|config| {
        config.auth.login_burst = 2;
        config.auth.login_replenish_seconds = 60;
    })
    .await;
    let app = init_app!(env);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let req = TestRequest::post()
            .uri("/auth/login")
            .peer_addr("10.0.0.7:40000".parse().unwrap())
            .set_form([("username", "user1"), ("password", "wrong")])
            .to_request();
        statuses.push(test::call_service(&app, req).await.status());
    }
    assert_eq!(
        statuses,
        vec![
            StatusCode::UNAUTHORIZED,
            StatusCode::UNAUTHORIZED,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );

    // 其他 IP 不受影响
    let req = TestRequest::post()
        .uri("/auth/login")
        .peer_addr("10.0.0.8:40000".parse().unwrap())
        .set_form([("username", "user1"), ("password", PASSWORD)])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
