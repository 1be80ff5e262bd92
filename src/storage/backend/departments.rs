use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, SqlErr};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::model_to_department;
use crate::errors::{Result, VaultError};
use crate::storage::models::Department;

use migration::entities::department;

impl SeaOrmStorage {
    pub async fn create_department(&self, name: &str) -> Result<Department> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("create_department({})", name), || async {
                department::ActiveModel {
                    name: Set(name.to_string()),
                    ..Default::default()
                }
                .insert(db)
                .await
            })
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    VaultError::conflict(format!("Department '{}' already exists", name))
                }
                _ => VaultError::database_operation(format!("创建部门失败: {}", e)),
            })?;

        info!("Department created: {} (id {})", model.name, model.id);
        Ok(model_to_department(model))
    }

    pub async fn get_department_by_id(&self, id: i32) -> Result<Option<Department>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("get_department_by_id({})", id), || async {
                department::Entity::find_by_id(id).one(db).await
            })
            .await?;
        Ok(model.map(model_to_department))
    }

    pub async fn get_department_by_name(&self, name: &str) -> Result<Option<Department>> {
        let db = &self.db;
        let model = self
            .retry
            .run("get_department_by_name", || async {
                department::Entity::find()
                    .filter(department::Column::Name.eq(name))
                    .one(db)
                    .await
            })
            .await?;
        Ok(model.map(model_to_department))
    }

    /// 按名称查找，不存在则创建
    pub async fn get_or_create_department(&self, name: &str) -> Result<Department> {
        if let Some(existing) = self.get_department_by_name(name).await? {
            return Ok(existing);
        }
        match self.create_department(name).await {
            Ok(created) => Ok(created),
            // 并发创建时回读
            Err(VaultError::Conflict(_)) => self
                .get_department_by_name(name)
                .await?
                .ok_or_else(|| VaultError::not_found(format!("Department '{}' not found", name))),
            Err(e) => Err(e),
        }
    }
}
