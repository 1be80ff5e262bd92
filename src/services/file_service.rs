//! File storage service
//!
//! 上传内容先写入上传目录中的暂存文件，所有检查通过并写入数据库后才改名为
//! `<uuid><扩展名>`；任何一步失败都不会在磁盘上留下文件。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use super::access::{UploadPolicy, can_delete, ensure_can_view, file_extension};
use crate::config::UploadsConfig;
use crate::errors::{Result, VaultError};
use crate::storage::{NewFile, SeaOrmStorage, StoredFile, User, Visibility};

const STAGING_PREFIX: &str = ".upload-";

/// 正在接收的上传
///
/// 未调用 [`FileService::finalize_upload`] 就被丢弃时，暂存文件会被删除。
pub struct UploadSink {
    file: Option<fs::File>,
    path: PathBuf,
    written: u64,
    limit: u64,
    committed: bool,
}

impl UploadSink {
    /// 追加一块数据；超过角色上限时立即返回 413
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        let next = self.written + chunk.len() as u64;
        if next > self.limit {
            return Err(VaultError::payload_too_large(
                "File size exceeds maximum allowed size for your role",
            ));
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| VaultError::file_operation("upload sink already closed"))?;
        file.write_all(chunk)
            .await
            .map_err(|e| VaultError::file_operation(format!("Failed to save file: {}", e)))?;
        self.written = next;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn staging_path(&self) -> &Path {
        &self.path
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .await
                .map_err(|e| VaultError::file_operation(format!("Failed to save file: {}", e)))?;
        }
        Ok(())
    }
}

impl Drop for UploadSink {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Discarded staged upload {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staged upload {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

pub struct FileService {
    storage: Arc<SeaOrmStorage>,
    policy: UploadPolicy,
    upload_dir: PathBuf,
}

impl FileService {
    pub fn new(storage: Arc<SeaOrmStorage>, uploads: &UploadsConfig) -> Self {
        Self {
            storage,
            policy: UploadPolicy::from(uploads),
            upload_dir: PathBuf::from(&uploads.dir),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// 在上传目录中创建暂存文件
    pub async fn begin_upload(&self, actor: &User) -> Result<UploadSink> {
        let path = self
            .upload_dir
            .join(format!("{}{}.part", STAGING_PREFIX, uuid::Uuid::new_v4()));
        let file = fs::File::create(&path).await.map_err(|e| {
            error!("Cannot create staging file {}: {}", path.display(), e);
            VaultError::file_operation(format!("Failed to save file: {}", e))
        })?;

        Ok(UploadSink {
            file: Some(file),
            path,
            written: 0,
            limit: self.policy.max_size_for(actor.role),
            committed: false,
        })
    }

    /// 检查类型与可见性，落盘并写入元数据
    pub async fn finalize_upload(
        &self,
        actor: &User,
        mut sink: UploadSink,
        original_filename: &str,
        visibility: Visibility,
    ) -> Result<StoredFile> {
        sink.close().await?;

        let filename = Path::new(original_filename)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| VaultError::invalid_multipart("Uploaded file has no filename"))?;

        self.policy.check_size(actor.role, sink.written())?;
        self.policy.check_extension(actor.role, &filename)?;
        self.policy.check_visibility(actor.role, visibility)?;

        let stored_name = format!("{}{}", uuid::Uuid::new_v4(), file_extension(&filename));
        let final_path = self.upload_dir.join(&stored_name);
        fs::rename(sink.staging_path(), &final_path)
            .await
            .map_err(|e| VaultError::file_operation(format!("Failed to save file: {}", e)))?;
        // 暂存文件已不存在，之后由本函数负责清理
        sink.committed = true;

        let record = NewFile {
            owner_id: actor.id,
            department_id: actor.department_id,
            visibility,
            file_path: final_path.to_string_lossy().into_owned(),
            filename,
            size: sink.written() as i64,
        };

        match self.storage.create_file(record).await {
            Ok(stored) => {
                info!(
                    "User '{}' uploaded '{}' ({} bytes, {})",
                    actor.username, stored.filename, stored.size, stored.visibility
                );
                Ok(stored)
            }
            Err(e) => {
                if let Err(rm) = fs::remove_file(&final_path).await {
                    warn!(
                        "Failed to remove orphaned upload {}: {}",
                        final_path.display(),
                        rm
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn list_files(&self, actor: &User) -> Result<Vec<StoredFile>> {
        self.storage.list_files_visible_to(actor).await
    }

    /// 读取文件元数据（404 / 403 检查）
    pub async fn get_file(&self, actor: &User, id: i32) -> Result<StoredFile> {
        let file = self
            .storage
            .get_file(id)
            .await?
            .ok_or_else(|| VaultError::not_found("File not found"))?;
        ensure_can_view(actor, &file)?;
        Ok(file)
    }

    /// 打开文件内容用于下载，成功打开后下载计数 +1
    pub async fn open_for_download(&self, actor: &User, id: i32) -> Result<(StoredFile, fs::File)> {
        let file = self.get_file(actor, id).await?;

        let handle = match fs::File::open(&file.file_path).await {
            Ok(handle) => handle,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!(
                    "File {} is recorded but missing on disk: {}",
                    file.id, file.file_path
                );
                return Err(VaultError::not_found("File not found"));
            }
            Err(e) => return Err(e.into()),
        };

        self.storage.increment_download_count(file.id).await?;
        debug!("User '{}' downloading file {}", actor.username, file.id);
        Ok((file, handle))
    }

    /// 删除磁盘文件（若存在）与数据库记录
    pub async fn delete_file(&self, actor: &User, id: i32) -> Result<()> {
        let file = self
            .storage
            .get_file(id)
            .await?
            .ok_or_else(|| VaultError::not_found("File not found"))?;
        can_delete(actor, &file)?;

        match fs::remove_file(&file.file_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("File {} already missing on disk: {}", file.id, file.file_path);
            }
            Err(e) => {
                return Err(VaultError::file_operation(format!(
                    "Failed to delete file from disk: {}",
                    e
                )));
            }
        }

        if !self.storage.delete_file(file.id).await? {
            return Err(VaultError::database_operation(
                "Failed to delete file record",
            ));
        }

        info!("User '{}' deleted file {}", actor.username, file.id);
        Ok(())
    }
}
