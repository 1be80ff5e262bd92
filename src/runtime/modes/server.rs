//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{
    AppStartTime, LoginLimiterConfig, configure_api, form_config, health_routes, json_config,
    login_limiter_config, path_config, query_config,
};
use crate::config::CorsConfig;
use crate::runtime::lifetime::{self, startup::StartupContext};

/// CORS configuration loaded from the static config
#[derive(Clone, Debug)]
struct CorsSettings {
    enabled: bool,
    allowed_origins: Vec<String>,
    allowed_headers: Vec<String>,
    max_age: u64,
    allow_credentials: bool,
}

impl From<&CorsConfig> for CorsSettings {
    fn from(cors: &CorsConfig) -> Self {
        Self {
            enabled: cors.enabled,
            allowed_origins: cors.allowed_origins.clone(),
            allowed_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
                "Accept".to_string(),
                "X-Request-ID".to_string(),
            ],
            max_age: cors.max_age,
            allow_credentials: cors.allow_credentials,
        }
    }
}

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsSettings) {
    if !cors_config.enabled {
        return;
    }

    if cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");
    if is_any_origin && cors_config.allow_credentials {
        warn!(
            "CORS allows any origin together with credentials; \
            credentials are disabled for wildcard origins."
        );
    }
}

/// Build CORS middleware from configuration
fn build_cors_middleware(cors_config: &CorsSettings) -> Cors {
    // 未启用时使用浏览器默认同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let is_any_origin = cors_config.allowed_origins.iter().any(|o| o == "*");

    let mut cors = Cors::default().allow_any_method();
    if is_any_origin {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    for header in &cors_config.allowed_headers {
        cors = cors.allowed_header(header.as_str());
    }
    cors = cors
        .expose_headers(["Content-Disposition", "X-Request-ID"])
        .max_age(cors_config.max_age as usize);

    // 通配 origin 时 actix-cors 会回显 Origin，不能同时允许凭证
    if cors_config.allow_credentials && !is_any_origin {
        cors = cors.supports_credentials();
    }

    cors
}

/// 注册共享状态、提取器配置与全部路由
///
/// 服务器和集成测试共用同一套装配。
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    ctx: &StartupContext,
    app_start_time: &AppStartTime,
    login_limit: &LoginLimiterConfig,
) {
    cfg.app_data(web::Data::new(ctx.storage.clone()))
        .app_data(web::Data::new(ctx.auth_service.clone()))
        .app_data(web::Data::new(ctx.user_service.clone()))
        .app_data(web::Data::new(ctx.file_service.clone()))
        .app_data(web::Data::new(app_start_time.clone()))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(form_config())
        .app_data(path_config())
        .service(health_routes())
        .configure(|cfg| configure_api(cfg, login_limit));
}

/// Run the HTTP server
///
/// This function:
/// 1. Records startup time
/// 2. Prepares storage, upload directory and services
/// 3. Configures and starts the HTTP server
/// 4. Listens for graceful shutdown signals
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::default();

    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let config = crate::config::get_config();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let cors_config = CorsSettings::from(&config.cors);
    validate_cors_config(&cors_config);

    // 所有 worker 共享同一个限流状态
    let login_limit = login_limiter_config(&config.auth);

    let db_for_shutdown = startup.storage.get_db().clone();

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .configure(|cfg| configure_app(cfg, &startup, &app_start_time, &login_limit))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{HttpResponse, http::header, test};

    fn settings(origins: &[&str], credentials: bool) -> CorsSettings {
        let mut config = CorsConfig::default();
        config.allowed_origins = origins.iter().map(|s| s.to_string()).collect();
        config.allow_credentials = credentials;
        CorsSettings::from(&config)
    }

    #[actix_web::test]
    async fn test_cors_wildcard_does_not_allow_credentials() {
        let cors = build_cors_middleware(&settings(&["*"], true));
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert!(
            !resp
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        );
    }

    #[actix_web::test]
    async fn test_cors_explicit_origin_with_credentials() {
        let cors = build_cors_middleware(&settings(&["https://docs.example.com"], true));
        let app = test::init_service(
            App::new()
                .wrap(cors)
                .route("/", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://docs.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }
}
