//! 用户表读写

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, SqlErr,
};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{model_to_user, new_user_to_active_model};
use crate::errors::{Result, VaultError};
use crate::storage::models::{NewUser, Role, User};

use migration::entities::user;

impl SeaOrmStorage {
    /// 创建用户，用户名重复时返回 Conflict
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let db = &self.db;
        let active = new_user_to_active_model(&new_user);

        let model = self
            .retry
            .run(&format!("create_user({})", new_user.username), || {
                let active = active.clone();
                async move { active.insert(db).await }
            })
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    VaultError::conflict("Username already exists")
                }
                _ => VaultError::database_operation(format!("创建用户失败: {}", e)),
            })?;

        info!(
            "User created: {} ({}, department {})",
            model.username, model.role, model.department_id
        );
        Ok(model_to_user(model))
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("get_user_by_id({})", id), || async {
                user::Entity::find_by_id(id).one(db).await
            })
            .await?;
        Ok(model.map(model_to_user))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let db = &self.db;
        let model = self
            .retry
            .run("get_user_by_username", || async {
                user::Entity::find()
                    .filter(user::Column::Username.eq(username))
                    .one(db)
                    .await
            })
            .await?;
        Ok(model.map(model_to_user))
    }

    /// 全部用户，按 id 升序
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let db = &self.db;
        let models = self
            .retry
            .run("list_users", || async {
                user::Entity::find()
                    .order_by_asc(user::Column::Id)
                    .all(db)
                    .await
            })
            .await?;
        Ok(models.into_iter().map(model_to_user).collect())
    }

    pub async fn list_users_by_department(&self, department_id: i32) -> Result<Vec<User>> {
        let db = &self.db;
        let models = self
            .retry
            .run(&format!("list_users_by_department({})", department_id), || async {
                user::Entity::find()
                    .filter(user::Column::DepartmentId.eq(department_id))
                    .order_by_asc(user::Column::Id)
                    .all(db)
                    .await
            })
            .await?;
        Ok(models.into_iter().map(model_to_user).collect())
    }

    /// 修改角色，返回更新后的用户
    pub async fn update_user_role(&self, id: i32, role: Role) -> Result<User> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("update_user_role({})", id), || async {
                user::ActiveModel {
                    id: Set(id),
                    role: Set(role.as_ref().to_string()),
                    ..Default::default()
                }
                .update(db)
                .await
            })
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated | sea_orm::DbErr::RecordNotFound(_) => {
                    VaultError::not_found("User not found")
                }
                other => VaultError::database_operation(format!("更新用户角色失败: {}", other)),
            })?;

        info!("User {} role changed to {}", model.username, model.role);
        Ok(model_to_user(model))
    }

    pub async fn count_users(&self) -> Result<u64> {
        let db = &self.db;
        let count = self
            .retry
            .run("count_users", || async { user::Entity::find().count(db).await })
            .await?;
        Ok(count)
    }
}
