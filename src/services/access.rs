//! Access policy
//!
//! 角色与可见性规则的纯函数实现，HTTP 层与服务层共用。

use std::path::Path;

use crate::config::UploadsConfig;
use crate::errors::{Result, VaultError};
use crate::storage::{Role, StoredFile, User, Visibility};

/// 用户是否可以查看 / 下载文件
pub fn can_view(user: &User, file: &StoredFile) -> bool {
    match user.role {
        Role::Admin | Role::Manager => true,
        Role::User => match file.visibility {
            Visibility::Public => true,
            Visibility::Department => file.department_id == user.department_id,
            Visibility::Private => file.owner_id == user.id,
        },
    }
}

/// 查看权限检查，拒绝时返回 403
pub fn ensure_can_view(user: &User, file: &StoredFile) -> Result<()> {
    if can_view(user, file) {
        Ok(())
    } else {
        Err(VaultError::forbidden("Access denied to this file"))
    }
}

/// 删除权限检查
///
/// ADMIN 任意文件；MANAGER 仅本部门文件；USER 仅自己的文件。
pub fn can_delete(user: &User, file: &StoredFile) -> Result<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Manager if file.department_id == user.department_id => Ok(()),
        Role::Manager => Err(VaultError::forbidden(
            "Can only delete files from your department",
        )),
        Role::User if file.owner_id == user.id => Ok(()),
        Role::User => Err(VaultError::forbidden("Can only delete your own files")),
    }
}

pub fn require_role_or_higher(user: &User, required: Role) -> Result<()> {
    if user.role.is_at_least(required) {
        Ok(())
    } else {
        Err(VaultError::forbidden(format!(
            "Role {} or higher required",
            required
        )))
    }
}

/// 文件扩展名（含点），无扩展名时为空串
///
/// 以点开头且无其他点的文件名（如 `.bashrc`）视为没有扩展名。
pub fn file_extension(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let trimmed = base.trim_start_matches('.');
    match trimmed.rfind('.') {
        Some(idx) => trimmed[idx..].to_string(),
        None => String::new(),
    }
}

/// 上传限制（大小、类型、可见性），按角色区分
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_size_user: u64,
    max_size_manager: u64,
    max_size_admin: u64,
    allowed_user: Vec<String>,
    allowed_manager: Vec<String>,
    allowed_admin: Vec<String>,
}

impl From<&UploadsConfig> for UploadPolicy {
    fn from(config: &UploadsConfig) -> Self {
        let normalize =
            |items: &[String]| -> Vec<String> { items.iter().map(|s| s.to_lowercase()).collect() };
        Self {
            max_size_user: config.max_size_user,
            max_size_manager: config.max_size_manager,
            max_size_admin: config.max_size_admin,
            allowed_user: normalize(&config.allowed_types_user),
            allowed_manager: normalize(&config.allowed_types_manager),
            allowed_admin: normalize(&config.allowed_types_admin),
        }
    }
}

impl UploadPolicy {
    pub fn max_size_for(&self, role: Role) -> u64 {
        match role {
            Role::User => self.max_size_user,
            Role::Manager => self.max_size_manager,
            Role::Admin => self.max_size_admin,
        }
    }

    pub fn check_size(&self, role: Role, size: u64) -> Result<()> {
        if size > self.max_size_for(role) {
            Err(VaultError::payload_too_large(
                "File size exceeds maximum allowed size for your role",
            ))
        } else {
            Ok(())
        }
    }

    /// 扩展名检查，比较时忽略大小写；允许列表为空表示不限制
    pub fn check_extension(&self, role: Role, filename: &str) -> Result<()> {
        let allowed = match role {
            Role::User => &self.allowed_user,
            Role::Manager => &self.allowed_manager,
            Role::Admin => &self.allowed_admin,
        };
        if allowed.is_empty() {
            return Ok(());
        }

        let ext = file_extension(filename).to_lowercase();
        if allowed.iter().any(|a| *a == ext) {
            Ok(())
        } else {
            Err(VaultError::file_type_not_allowed(format!(
                "File type {} not allowed for {} role",
                ext, role
            )))
        }
    }

    pub fn check_visibility(&self, role: Role, visibility: Visibility) -> Result<()> {
        if role == Role::User && visibility != Visibility::Private {
            Err(VaultError::forbidden(
                "USER role can only create PRIVATE files",
            ))
        } else {
            Ok(())
        }
    }
}
