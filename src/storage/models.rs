use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// 用户角色，按权限从低到高排列
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Manager,
    Admin,
}

impl Role {
    /// 角色等级：USER=1, MANAGER=2, ADMIN=3
    pub fn rank(self) -> u8 {
        match self {
            Role::User => 1,
            Role::Manager => 2,
            Role::Admin => 3,
        }
    }

    pub fn is_at_least(self, other: Role) -> bool {
        self.rank() >= other.rank()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// 文件可见性
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Visibility {
    #[default]
    Private,
    Department,
    Public,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub department_id: i32,
}

/// 新建用户（密码已哈希）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub department_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
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

/// 新建文件记录
#[derive(Debug, Clone)]
pub struct NewFile {
    pub owner_id: i32,
    pub department_id: i32,
    pub visibility: Visibility,
    pub file_path: String,
    pub filename: String,
    pub size: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}
