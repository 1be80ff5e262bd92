use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::api::jwt::JwtService;
use crate::config::StaticConfig;
use crate::services::{AuthService, FileService, UserService, seed_demo_data};
use crate::storage::SeaOrmStorage;

/// 服务运行所需的共享组件
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub jwt: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub file_service: Arc<FileService>,
}

/// 创建上传目录，Unix 下权限设为 0755
pub async fn ensure_upload_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755))
            .await
            .with_context(|| format!("Failed to set permissions on {}", dir.display()))?;
    }

    debug!("Upload directory ready: {}", dir.display());
    Ok(())
}

/// 删除上次异常退出留下的暂存文件
pub async fn cleanup_stale_uploads(dir: &Path) -> usize {
    let mut removed = 0;
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot scan upload directory {}: {}", dir.display(), e);
            return 0;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(".upload-") && name.ends_with(".part") {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove stale upload {}: {}", name, e),
            }
        }
    }

    if removed > 0 {
        info!("Removed {} stale staged uploads", removed);
    }
    removed
}

/// 按给定配置组装存储与服务（不读取全局配置，便于测试）
pub async fn build_context(config: &StaticConfig) -> Result<StartupContext> {
    let storage = Arc::new(
        SeaOrmStorage::new(&config.database)
            .await
            .context("Failed to create storage backend")?,
    );
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().await.storage_type
    );

    let upload_dir = Path::new(&config.uploads.dir);
    ensure_upload_dir(upload_dir).await?;
    cleanup_stale_uploads(upload_dir).await;

    if let Err(e) = seed_demo_data(&storage, &config.seed).await {
        error!("Error creating demo data: {}", e);
    }

    let jwt = Arc::new(JwtService::from_config(&config.auth));
    let auth_service = Arc::new(AuthService::new(storage.clone(), jwt.clone()));
    let user_service = Arc::new(UserService::new(storage.clone()));
    let file_service = Arc::new(FileService::new(storage.clone(), &config.uploads));

    Ok(StartupContext {
        storage,
        jwt,
        auth_service,
        user_service,
        file_service,
    })
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = crate::config::get_config();
    let context = build_context(&config).await?;

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_upload_dir_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("uploads");
        ensure_upload_dir(&dir).await.unwrap();
        assert!(dir.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[tokio::test]
    async fn test_cleanup_stale_uploads_only_touches_staging_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".upload-abc.part"), b"x").unwrap();
        std::fs::write(tmp.path().join("kept.pdf"), b"x").unwrap();

        assert_eq!(cleanup_stale_uploads(tmp.path()).await, 1);
        assert!(tmp.path().join("kept.pdf").exists());
        assert!(!tmp.path().join(".upload-abc.part").exists());
    }
}
