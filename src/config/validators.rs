//! 配置值验证模块
//!
//! 启动时对静态配置做一次检查，返回所有问题而不是遇到第一个就停止。

use super::StaticConfig;

/// 验证扩展名列表：每项必须以 '.' 开头且不含路径分隔符
fn validate_extensions(field: &str, items: &[String]) -> Vec<String> {
    items
        .iter()
        .filter(|ext| !ext.starts_with('.') || ext.len() < 2 || ext.contains(['/', '\\']))
        .map(|ext| {
            format!(
                "{}: invalid extension '{}', expected a value like \".pdf\"",
                field, ext
            )
        })
        .collect()
}

/// 验证整份静态配置
///
/// 返回 `Err(问题列表)` 时调用方应拒绝启动。
pub fn validate_static_config(config: &StaticConfig) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if config.server.port == 0 {
        problems.push("server.port must not be 0".to_string());
    }

    if config.database.database_url.trim().is_empty() {
        problems.push("database.database_url must not be empty".to_string());
    }

    if config.auth.access_token_minutes == 0 {
        problems.push("auth.access_token_minutes must be greater than 0".to_string());
    }

    if config.auth.login_burst == 0 {
        problems.push("auth.login_burst must be greater than 0".to_string());
    }

    if config.uploads.dir.trim().is_empty() {
        problems.push("uploads.dir must not be empty".to_string());
    }

    for (field, size) in [
        ("uploads.max_size_user", config.uploads.max_size_user),
        ("uploads.max_size_manager", config.uploads.max_size_manager),
        ("uploads.max_size_admin", config.uploads.max_size_admin),
    ] {
        if size == 0 {
            problems.push(format!("{} must be greater than 0", field));
        }
    }

    problems.extend(validate_extensions(
        "uploads.allowed_types_user",
        &config.uploads.allowed_types_user,
    ));
    problems.extend(validate_extensions(
        "uploads.allowed_types_manager",
        &config.uploads.allowed_types_manager,
    ));
    problems.extend(validate_extensions(
        "uploads.allowed_types_admin",
        &config.uploads.allowed_types_admin,
    ));

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_static_config(&StaticConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_problems() {
        let mut config = StaticConfig::default();
        config.server.port = 0;
        config.uploads.max_size_admin = 0;
        config.uploads.allowed_types_user = vec!["pdf".to_string(), ".".to_string()];

        let problems = validate_static_config(&config).unwrap_err();
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("server.port")));
        assert!(problems.iter().any(|p| p.contains("max_size_admin")));
        assert!(problems.iter().any(|p| p.contains("'pdf'")));
    }

    #[test]
    fn test_extension_with_separator_rejected() {
        let problems = validate_extensions("f", &[".p/df".to_string()]);
        assert_eq!(problems.len(), 1);
    }
}
