//! 路由配置

use actix_governor::Governor;
use actix_web::web;

use crate::api::middleware::RequireAuth;

use super::auth::{LoginLimiterConfig, login, me};
use super::files::{delete_file, download_file, get_file, list_files, upload_file};
use super::root::root_info;
use super::users::{create_user, get_user, list_users, update_user_role};

/// 认证路由 `/auth`
///
/// - POST /auth/login - 登录（带限流）
/// - GET /auth/me - 当前用户
pub fn auth_routes(login_limit: &LoginLimiterConfig) -> actix_web::Scope {
    web::scope("/auth")
        .route(
            "/login",
            web::post().to(login).wrap(Governor::new(login_limit)),
        )
        .route("/me", web::get().to(me).wrap(RequireAuth))
}

/// 文件路由 `/files`（注册时需包裹 `RequireAuth`）
///
/// - POST /files/upload
/// - GET /files, /files/
/// - GET /files/{id}
/// - GET /files/{id}/download
/// - DELETE /files/{id}
pub fn files_routes() -> actix_web::Scope {
    web::scope("/files")
        .route("", web::get().to(list_files))
        .route("/", web::get().to(list_files))
        .route("/upload", web::post().to(upload_file))
        .route("/{id}/download", web::get().to(download_file))
        .route("/{id}", web::get().to(get_file))
        .route("/{id}", web::delete().to(delete_file))
}

/// 用户管理路由 `/users`（注册时需包裹 `RequireAuth`，MANAGER 及以上）
pub fn users_routes() -> actix_web::Scope {
    web::scope("/users")
        .route("", web::get().to(list_users))
        .route("/", web::get().to(list_users))
        .route("", web::post().to(create_user))
        .route("/", web::post().to(create_user))
        .route("/{id}/role", web::put().to(update_user_role))
        .route("/{id}", web::get().to(get_user))
}

/// 注册全部 API 路由（health 除外）
pub fn configure_api(cfg: &mut web::ServiceConfig, login_limit: &LoginLimiterConfig) {
    cfg.route("/", web::get().to(root_info))
        .service(auth_routes(login_limit))
        .service(files_routes().wrap(RequireAuth))
        .service(users_routes().wrap(RequireAuth));
}
