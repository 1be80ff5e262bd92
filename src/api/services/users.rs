//! 用户管理端点（MANAGER 及以上）

use std::sync::Arc;

use actix_web::{HttpResponse, web};

use crate::api::middleware::CurrentUser;
use crate::services::{CreateUserRequest, UserService};

use super::helpers::api_result;
use super::types::{RoleUpdateQuery, UserResponse};

pub async fn create_user(
    user: CurrentUser,
    users: web::Data<Arc<UserService>>,
    body: web::Json<CreateUserRequest>,
) -> HttpResponse {
    api_result(
        users
            .create_user(&user, body.into_inner())
            .await
            .map(UserResponse::from),
    )
}

pub async fn get_user(
    user: CurrentUser,
    users: web::Data<Arc<UserService>>,
    path: web::Path<i32>,
) -> HttpResponse {
    api_result(
        users
            .get_user(&user, path.into_inner())
            .await
            .map(UserResponse::from),
    )
}

pub async fn update_user_role(
    user: CurrentUser,
    users: web::Data<Arc<UserService>>,
    path: web::Path<i32>,
    query: web::Query<RoleUpdateQuery>,
) -> HttpResponse {
    api_result(
        users
            .update_role(&user, path.into_inner(), query.into_inner().new_role)
            .await
            .map(UserResponse::from),
    )
}

pub async fn list_users(user: CurrentUser, users: web::Data<Arc<UserService>>) -> HttpResponse {
    api_result(users.list_users(&user).await.map(|list| {
        list.into_iter()
            .map(UserResponse::from)
            .collect::<Vec<_>>()
    }))
}
