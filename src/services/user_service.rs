//! User management service
//!
//! MANAGER 只能管理本部门的 USER；ADMIN 不受限制。

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::access::require_role_or_higher;
use crate::errors::{Result, VaultError};
use crate::storage::{NewUser, Role, SeaOrmStorage, User};
use crate::utils::password::hash_password;

/// Request to create a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub department_id: i32,
}

pub struct UserService {
    storage: Arc<SeaOrmStorage>,
}

impl UserService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn create_user(&self, actor: &User, req: CreateUserRequest) -> Result<User> {
        require_role_or_higher(actor, Role::Manager)?;

        let username = req.username.trim().to_string();
        if username.is_empty() {
            return Err(VaultError::validation("Username must not be empty"));
        }
        if req.password.is_empty() {
            return Err(VaultError::validation("Password must not be empty"));
        }

        if self.storage.get_user_by_username(&username).await?.is_some() {
            return Err(VaultError::conflict("Username already exists"));
        }

        if actor.role == Role::Manager && req.role != Role::User {
            return Err(VaultError::forbidden(
                "MANAGER role can only create USER role users",
            ));
        }

        if self
            .storage
            .get_department_by_id(req.department_id)
            .await?
            .is_none()
        {
            return Err(VaultError::validation(format!(
                "Department {} does not exist",
                req.department_id
            )));
        }

        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await??;

        let user = self
            .storage
            .create_user(NewUser {
                username,
                password_hash,
                role: req.role,
                department_id: req.department_id,
            })
            .await?;

        info!(
            "User '{}' created by '{}' with role {}",
            user.username, actor.username, user.role
        );
        Ok(user)
    }

    pub async fn get_user(&self, actor: &User, id: i32) -> Result<User> {
        require_role_or_higher(actor, Role::Manager)?;

        let user = self
            .storage
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| VaultError::not_found("User not found"))?;

        if actor.role == Role::Manager && user.department_id != actor.department_id {
            return Err(VaultError::forbidden(
                "Can only view users from your department",
            ));
        }
        Ok(user)
    }

    pub async fn update_role(&self, actor: &User, id: i32, new_role: Role) -> Result<User> {
        require_role_or_higher(actor, Role::Manager)?;

        let user = self
            .storage
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| VaultError::not_found("User not found"))?;

        if actor.role == Role::Manager {
            if user.department_id != actor.department_id {
                return Err(VaultError::forbidden(
                    "Can only update users from your department",
                ));
            }
            if new_role != Role::User {
                return Err(VaultError::forbidden(
                    "MANAGER role can only change users to USER role",
                ));
            }
        }

        let updated = self.storage.update_user_role(id, new_role).await?;
        info!(
            "User '{}' role set to {} by '{}'",
            updated.username, updated.role, actor.username
        );
        Ok(updated)
    }

    /// ADMIN 返回全部用户，MANAGER 返回本部门用户
    pub async fn list_users(&self, actor: &User) -> Result<Vec<User>> {
        require_role_or_higher(actor, Role::Manager)?;

        if actor.role == Role::Admin {
            self.storage.list_users().await
        } else {
            self.storage
                .list_users_by_department(actor.department_id)
                .await
        }
    }
}
