//! HTTP 端点
//!
//! - 认证（登录、当前用户）
//! - 文件上传下载与管理
//! - 用户管理
//! - 健康检查与服务信息

pub mod auth;
pub mod error_code;
mod files;
pub mod health;
mod helpers;
mod root;
pub mod routes;
mod types;
mod users;

pub use types::*;

pub use helpers::{
    api_result, error_from_vault, error_response, form_config, json_config, json_response,
    path_config, query_config, success_response,
};

pub use error_code::ErrorCode;

pub use auth::{LoginLimiterConfig, login_limiter_config};
pub use health::{AppStartTime, HealthService, health_routes};
pub use routes::configure_api;
