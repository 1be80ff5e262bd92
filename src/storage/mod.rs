use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{Department, NewFile, NewUser, Role, StoredFile, User, Visibility};

pub struct StorageFactory;

impl StorageFactory {
    /// 按全局配置创建存储（自动推断数据库类型并执行迁移）
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let storage = SeaOrmStorage::new(&config.database).await?;
        Ok(Arc::new(storage))
    }
}
