//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::VaultError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证与权限
/// - 3000-3099: 文件存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 通用错误 1000-1099
    BadRequest = 1000,
    NotFound = 1004,
    InternalServerError = 1005,
    DatabaseError = 1006,
    Conflict = 1009,

    // 认证与权限 2000-2099
    Unauthorized = 2000,
    TokenInvalid = 2002,
    Forbidden = 2003,

    // 文件存储 3000-3099
    FileTooLarge = 3001,
    FileTypeNotAllowed = 3002,
    InvalidMultipartData = 3003,
    FileStorageError = 3004,
}

impl From<&VaultError> for ErrorCode {
    fn from(err: &VaultError) -> Self {
        match err {
            VaultError::Validation(_) => ErrorCode::BadRequest,
            VaultError::InvalidMultipart(_) => ErrorCode::InvalidMultipartData,
            VaultError::NotFound(_) => ErrorCode::NotFound,
            VaultError::Conflict(_) => ErrorCode::Conflict,
            VaultError::Unauthorized(_) => ErrorCode::Unauthorized,
            VaultError::Forbidden(_) => ErrorCode::Forbidden,
            VaultError::PayloadTooLarge(_) => ErrorCode::FileTooLarge,
            VaultError::FileTypeNotAllowed(_) => ErrorCode::FileTypeNotAllowed,
            VaultError::FileOperation(_) => ErrorCode::FileStorageError,
            VaultError::DatabaseConfig(_)
            | VaultError::DatabaseConnection(_)
            | VaultError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            VaultError::Token(_) => ErrorCode::TokenInvalid,
            VaultError::Serialization(_) | VaultError::Internal(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}
