//! 文件元数据读写

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{model_to_file, new_file_to_active_model};
use crate::errors::{Result, VaultError};
use crate::storage::models::{NewFile, Role, StoredFile, User, Visibility};

use migration::entities::stored_file;

impl SeaOrmStorage {
    pub async fn create_file(&self, new_file: NewFile) -> Result<StoredFile> {
        let db = &self.db;
        let active = new_file_to_active_model(&new_file, Utc::now());

        let model = self
            .retry
            .run("create_file", || {
                let active = active.clone();
                async move { active.insert(db).await }
            })
            .await
            .map_err(|e| VaultError::database_operation(format!("保存文件记录失败: {}", e)))?;

        info!(
            "File record created: id={} owner={} visibility={}",
            model.id, model.owner_id, model.visibility
        );
        Ok(model_to_file(model))
    }

    pub async fn get_file(&self, id: i32) -> Result<Option<StoredFile>> {
        let db = &self.db;
        let model = self
            .retry
            .run(&format!("get_file({})", id), || async {
                stored_file::Entity::find_by_id(id).one(db).await
            })
            .await?;
        Ok(model.map(model_to_file))
    }

    /// 全部文件，按 id 升序
    pub async fn list_files(&self) -> Result<Vec<StoredFile>> {
        let db = &self.db;
        let models = self
            .retry
            .run("list_files", || async {
                stored_file::Entity::find()
                    .order_by_asc(stored_file::Column::Id)
                    .all(db)
                    .await
            })
            .await?;
        Ok(models.into_iter().map(model_to_file).collect())
    }

    /// 按角色与可见性过滤后的文件列表
    ///
    /// MANAGER 与 ADMIN 可见全部；USER 可见 PUBLIC、本部门 DEPARTMENT 以及自己的 PRIVATE。
    pub async fn list_files_visible_to(&self, user: &User) -> Result<Vec<StoredFile>> {
        if user.role.is_at_least(Role::Manager) {
            return self.list_files().await;
        }

        let condition = Condition::any()
            .add(stored_file::Column::Visibility.eq(Visibility::Public.as_ref()))
            .add(
                Condition::all()
                    .add(stored_file::Column::Visibility.eq(Visibility::Department.as_ref()))
                    .add(stored_file::Column::DepartmentId.eq(user.department_id)),
            )
            .add(
                Condition::all()
                    .add(stored_file::Column::Visibility.eq(Visibility::Private.as_ref()))
                    .add(stored_file::Column::OwnerId.eq(user.id)),
            );

        let db = &self.db;
        let models = self
            .retry
            .run(&format!("list_files_visible_to({})", user.id), || async {
                stored_file::Entity::find()
                    .filter(condition.clone())
                    .order_by_asc(stored_file::Column::Id)
                    .all(db)
                    .await
            })
            .await?;

        debug!(
            "User {} can see {} files",
            user.username,
            models.len()
        );
        Ok(models.into_iter().map(model_to_file).collect())
    }

    /// 删除文件记录，返回是否确实删除了一行
    pub async fn delete_file(&self, id: i32) -> Result<bool> {
        let db = &self.db;
        let result = self
            .retry
            .run(&format!("delete_file({})", id), || async {
                stored_file::Entity::delete_by_id(id).exec(db).await
            })
            .await
            .map_err(|e| VaultError::database_operation(format!("删除文件记录失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!("File record deleted: {}", id);
        }
        Ok(result.rows_affected > 0)
    }

    /// 下载计数 +1（单条 UPDATE，避免读改写竞争）
    pub async fn increment_download_count(&self, id: i32) -> Result<bool> {
        let db = &self.db;
        let result = self
            .retry
            .run(&format!("increment_download_count({})", id), || async {
                stored_file::Entity::update_many()
                    .col_expr(
                        stored_file::Column::DownloadsCount,
                        Expr::col(stored_file::Column::DownloadsCount).add(1),
                    )
                    .filter(stored_file::Column::Id.eq(id))
                    .exec(db)
                    .await
            })
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_files(&self) -> Result<u64> {
        let db = &self.db;
        let count = self
            .retry
            .run("count_files", || async {
                stored_file::Entity::find().count(db).await
            })
            .await?;
        Ok(count)
    }
}
