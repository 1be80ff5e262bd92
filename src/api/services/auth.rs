//! 认证相关端点

use actix_governor::{GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::{HttpResponse, Responder, web};
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::middleware::CurrentUser;
use crate::config::AuthConfig;
use crate::services::AuthService;

use super::helpers::{error_from_vault, success_response};
use super::types::{LoginForm, TokenResponse, UserResponse};

/// 基于连接 IP 的限流 key 提取器
///
/// 只信任 TCP peer address，不读取 X-Forwarded-For。
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        req.peer_addr()
            .map(|addr| addr.ip().to_string())
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract peer IP"))
    }
}

pub type LoginLimiterConfig = GovernorConfig<LoginKeyExtractor, NoOpMiddleware>;

/// 创建登录限流配置
///
/// 在所有 worker 间共享同一份配置，超限返回 HTTP 429。
pub fn login_limiter_config(auth: &AuthConfig) -> LoginLimiterConfig {
    let burst = auth.login_burst.max(1);
    let period = auth.login_replenish_seconds.max(1);

    debug!(
        "Login rate limiter created: 1 req / {}s, burst {}",
        period, burst
    );
    GovernorConfigBuilder::default()
        .seconds_per_request(period)
        .burst_size(burst)
        .key_extractor(LoginKeyExtractor)
        .finish()
        .expect("rate limit values are clamped to >= 1")
}

/// 用户名密码登录，返回 bearer token
pub async fn login(
    auth: web::Data<Arc<AuthService>>,
    form: web::Form<LoginForm>,
) -> impl Responder {
    let form = form.into_inner();
    match auth.login(&form.username, &form.password).await {
        Ok(issued) => success_response(TokenResponse {
            access_token: issued.access_token,
            token_type: "bearer".to_string(),
        }),
        Err(e) => {
            info!("Login failed for '{}': {}", form.username, e.message());
            error_from_vault(&e)
        }
    }
}

/// 当前登录用户信息
pub async fn me(user: CurrentUser) -> HttpResponse {
    success_response(UserResponse::from(user.0))
}
