use std::str::FromStr;

use tracing::warn;

use crate::storage::models::{Department, NewFile, NewUser, Role, StoredFile, User, Visibility};
use migration::entities::{department, stored_file, user};

/// 解析角色列，未知值按最低权限处理
fn parse_role(raw: &str, user_id: i32) -> Role {
    Role::from_str(raw).unwrap_or_else(|_| {
        warn!("User {} has unknown role '{}', treating as USER", user_id, raw);
        Role::User
    })
}

/// 解析可见性列，未知值按 PRIVATE 处理
fn parse_visibility(raw: &str, file_id: i32) -> Visibility {
    Visibility::from_str(raw).unwrap_or_else(|_| {
        warn!(
            "File {} has unknown visibility '{}', treating as PRIVATE",
            file_id, raw
        );
        Visibility::Private
    })
}

pub fn model_to_department(model: department::Model) -> Department {
    Department {
        id: model.id,
        name: model.name,
    }
}

pub fn model_to_user(model: user::Model) -> User {
    let role = parse_role(&model.role, model.id);
    User {
        id: model.id,
        username: model.username,
        password_hash: model.password_hash,
        role,
        department_id: model.department_id,
    }
}

pub fn new_user_to_active_model(new_user: &NewUser) -> user::ActiveModel {
    use sea_orm::ActiveValue::*;

    user::ActiveModel {
        id: NotSet,
        username: Set(new_user.username.clone()),
        password_hash: Set(new_user.password_hash.clone()),
        role: Set(new_user.role.as_ref().to_string()),
        department_id: Set(new_user.department_id),
    }
}

pub fn model_to_file(model: stored_file::Model) -> StoredFile {
    let visibility = parse_visibility(&model.visibility, model.id);
    StoredFile {
        id: model.id,
        owner_id: model.owner_id,
        department_id: model.department_id,
        visibility,
        file_path: model.file_path,
        filename: model.filename,
        size: model.size,
        created_at: model.created_at,
        downloads_count: model.downloads_count.max(0),
    }
}

pub fn new_file_to_active_model(
    new_file: &NewFile,
    created_at: chrono::DateTime<chrono::Utc>,
) -> stored_file::ActiveModel {
    use sea_orm::ActiveValue::*;

    stored_file::ActiveModel {
        id: NotSet,
        owner_id: Set(new_file.owner_id),
        department_id: Set(new_file.department_id),
        visibility: Set(new_file.visibility.as_ref().to_string()),
        file_path: Set(new_file.file_path.clone()),
        filename: Set(new_file.filename.clone()),
        size: Set(new_file.size),
        created_at: Set(created_at),
        downloads_count: Set(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    #[test]
    fn test_model_to_user_parses_role() {
        let user = model_to_user(user::Model {
            id: 7,
            username: "manager1".to_string(),
            password_hash: "$argon2id$x".to_string(),
            role: "MANAGER".to_string(),
            department_id: 1,
        });
        assert_eq!(user.role, Role::Manager);
        assert_eq!(user.username, "manager1");
    }

    #[test]
    fn test_unknown_role_degrades_to_user() {
        let user = model_to_user(user::Model {
            id: 1,
            username: "x".to_string(),
            password_hash: String::new(),
            role: "SUPERUSER".to_string(),
            department_id: 1,
        });
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_unknown_visibility_degrades_to_private() {
        let file = model_to_file(stored_file::Model {
            id: 3,
            owner_id: 1,
            department_id: 1,
            visibility: "EVERYONE".to_string(),
            file_path: "/tmp/a.pdf".to_string(),
            filename: "a.pdf".to_string(),
            size: 10,
            created_at: Utc::now(),
            downloads_count: -4,
        });
        assert_eq!(file.visibility, Visibility::Private);
        assert_eq!(file.downloads_count, 0);
    }

    #[test]
    fn test_new_file_active_model_starts_with_zero_downloads() {
        let now = Utc::now();
        let am = new_file_to_active_model(
            &NewFile {
                owner_id: 2,
                department_id: 1,
                visibility: Visibility::Public,
                file_path: "/app/uploads/x.pdf".to_string(),
                filename: "report.pdf".to_string(),
                size: 1024,
            },
            now,
        );
        assert!(matches!(am.id, ActiveValue::NotSet));
        assert!(matches!(&am.visibility, ActiveValue::Set(v) if v == "PUBLIC"));
        assert!(matches!(am.downloads_count, ActiveValue::Set(0)));
        assert!(matches!(am.created_at, ActiveValue::Set(t) if t == now));
    }
}
