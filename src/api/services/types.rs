//! HTTP 请求 / 响应类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{Role, StoredFile, User, Visibility};

/// 错误响应体
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorBody {
    pub code: i32,
    pub detail: String,
}

/// OAuth2 password 表单（grant_type / scope 等字段忽略）
#[derive(Deserialize, Clone, Debug)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub department_id: i32,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            department_id: user.department_id,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileResponse {
    pub id: i32,
    pub owner_id: i32,
    pub department_id: i32,
    pub visibility: Visibility,
    pub file_path: String,
    pub filename: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub downloads_count: i64,
}

impl From<StoredFile> for FileResponse {
    fn from(file: StoredFile) -> Self {
        Self {
            id: file.id,
            owner_id: file.owner_id,
            department_id: file.department_id,
            visibility: file.visibility,
            file_path: file.file_path,
            filename: file.filename,
            size: file.size,
            created_at: file.created_at,
            downloads_count: file.downloads_count,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileListResponse {
    pub files: Vec<FileResponse>,
    pub total: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct UploadQuery {
    pub visibility: Option<Visibility>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct RoleUpdateQuery {
    pub new_role: Role,
}

/// 健康检查响应
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub checks: HealthChecks,
    pub response_time_ms: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthChecks {
    pub storage: HealthStorageCheck,
    pub uploads: HealthUploadsCheck,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthStorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthUploadsCheck {
    pub status: String,
    pub dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
