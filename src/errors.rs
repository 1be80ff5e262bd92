use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum VaultError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    InvalidMultipart(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Forbidden(String),
    PayloadTooLarge(String),
    FileTypeNotAllowed(String),
    Serialization(String),
    Token(String),
    Internal(String),
}

impl VaultError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            VaultError::DatabaseConfig(_) => "E001",
            VaultError::DatabaseConnection(_) => "E002",
            VaultError::DatabaseOperation(_) => "E003",
            VaultError::FileOperation(_) => "E004",
            VaultError::Validation(_) => "E005",
            VaultError::InvalidMultipart(_) => "E006",
            VaultError::NotFound(_) => "E007",
            VaultError::Conflict(_) => "E008",
            VaultError::Unauthorized(_) => "E009",
            VaultError::Forbidden(_) => "E010",
            VaultError::PayloadTooLarge(_) => "E011",
            VaultError::FileTypeNotAllowed(_) => "E012",
            VaultError::Serialization(_) => "E013",
            VaultError::Token(_) => "E014",
            VaultError::Internal(_) => "E015",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            VaultError::DatabaseConfig(_) => "Database Configuration Error",
            VaultError::DatabaseConnection(_) => "Database Connection Error",
            VaultError::DatabaseOperation(_) => "Database Operation Error",
            VaultError::FileOperation(_) => "File Operation Error",
            VaultError::Validation(_) => "Validation Error",
            VaultError::InvalidMultipart(_) => "Invalid Multipart Data",
            VaultError::NotFound(_) => "Resource Not Found",
            VaultError::Conflict(_) => "Resource Conflict",
            VaultError::Unauthorized(_) => "Unauthorized",
            VaultError::Forbidden(_) => "Forbidden",
            VaultError::PayloadTooLarge(_) => "Payload Too Large",
            VaultError::FileTypeNotAllowed(_) => "File Type Not Allowed",
            VaultError::Serialization(_) => "Serialization Error",
            VaultError::Token(_) => "Token Error",
            VaultError::Internal(_) => "Internal Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            VaultError::DatabaseConfig(msg)
            | VaultError::DatabaseConnection(msg)
            | VaultError::DatabaseOperation(msg)
            | VaultError::FileOperation(msg)
            | VaultError::Validation(msg)
            | VaultError::InvalidMultipart(msg)
            | VaultError::NotFound(msg)
            | VaultError::Conflict(msg)
            | VaultError::Unauthorized(msg)
            | VaultError::Forbidden(msg)
            | VaultError::PayloadTooLarge(msg)
            | VaultError::FileTypeNotAllowed(msg)
            | VaultError::Serialization(msg)
            | VaultError::Token(msg)
            | VaultError::Internal(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            VaultError::Validation(_)
            | VaultError::InvalidMultipart(_)
            | VaultError::Conflict(_)
            | VaultError::FileTypeNotAllowed(_) => StatusCode::BAD_REQUEST,
            VaultError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            VaultError::Forbidden(_) => StatusCode::FORBIDDEN,
            VaultError::NotFound(_) => StatusCode::NOT_FOUND,
            VaultError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            VaultError::DatabaseConfig(_)
            | VaultError::DatabaseConnection(_)
            | VaultError::DatabaseOperation(_)
            | VaultError::FileOperation(_)
            | VaultError::Serialization(_)
            | VaultError::Token(_)
            | VaultError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for VaultError {}

// 便捷的构造函数
impl VaultError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        VaultError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        VaultError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        VaultError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        VaultError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        VaultError::Validation(msg.into())
    }

    pub fn invalid_multipart<T: Into<String>>(msg: T) -> Self {
        VaultError::InvalidMultipart(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        VaultError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        VaultError::Conflict(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        VaultError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        VaultError::Forbidden(msg.into())
    }

    pub fn payload_too_large<T: Into<String>>(msg: T) -> Self {
        VaultError::PayloadTooLarge(msg.into())
    }

    pub fn file_type_not_allowed<T: Into<String>>(msg: T) -> Self {
        VaultError::FileTypeNotAllowed(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        VaultError::Serialization(msg.into())
    }

    pub fn token<T: Into<String>>(msg: T) -> Self {
        VaultError::Token(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        VaultError::Internal(msg.into())
    }
}

impl From<sea_orm::DbErr> for VaultError {
    fn from(err: sea_orm::DbErr) -> Self {
        VaultError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Serialization(err.to_string())
    }
}

impl From<tokio::task::JoinError> for VaultError {
    fn from(err: tokio::task::JoinError) -> Self {
        VaultError::Internal(format!("background task failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for VaultError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        VaultError::Token(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
