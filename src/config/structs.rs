use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// JWT 签名算法（HMAC 系列）
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Default,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum JwtAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl std::fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// 静态配置（启动时加载）
///
/// 优先级：旧版扁平环境变量 > DV__* 环境变量 > config.toml > 默认值
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 旧部署使用的扁平环境变量 → 配置 key
const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SECRET_KEY", "auth.secret_key"),
    ("ALGORITHM", "auth.algorithm"),
    ("ACCESS_TOKEN_EXPIRE_MINUTES", "auth.access_token_minutes"),
    ("DATABASE_URL", "database.database_url"),
    ("UPLOAD_DIR", "uploads.dir"),
];

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// ENV 前缀：DV，分隔符：__
    /// 示例：DV__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let mut builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("DV")
                    .separator("__")
                    .try_parsing(true),
            );

        for (env_key, config_key) in LEGACY_ENV_OVERRIDES {
            let value = std::env::var(env_key).ok().filter(|v| !v.is_empty());
            builder = match builder.set_override_option(*config_key, value) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("[ERROR] Invalid override for {}: {}", env_key, e);
                    return Self::default();
                }
            };
        }

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT 签名密钥；为空时启动时随机生成（重启后旧 token 失效）
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub algorithm: JwtAlgorithm,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: u64,
    /// 登录限流：突发请求数
    #[serde(default = "default_login_burst")]
    pub login_burst: u32,
    /// 登录限流：每个令牌的补充间隔（秒）
    #[serde(default = "default_login_replenish_seconds")]
    pub login_replenish_seconds: u64,
}

/// 上传配置
///
/// `allowed_types_*` 为空表示不限制扩展名。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    #[serde(default = "default_max_size_user")]
    pub max_size_user: u64,
    #[serde(default = "default_max_size_manager")]
    pub max_size_manager: u64,
    #[serde(default = "default_max_size_admin")]
    pub max_size_admin: u64,
    #[serde(default = "default_allowed_types_user")]
    pub allowed_types_user: Vec<String>,
    #[serde(default)]
    pub allowed_types_manager: Vec<String>,
    #[serde(default)]
    pub allowed_types_admin: Vec<String>,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// 演示数据配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub demo_data: bool,
    #[serde(default = "default_demo_password")]
    pub demo_password: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite::memory:".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_access_token_minutes() -> u64 {
    30
}

fn default_login_burst() -> u32 {
    5
}

fn default_login_replenish_seconds() -> u64 {
    1
}

fn default_upload_dir() -> String {
    "/app/uploads".to_string()
}

fn default_max_size_user() -> u64 {
    10 * 1024 * 1024
}

fn default_max_size_manager() -> u64 {
    50 * 1024 * 1024
}

fn default_max_size_admin() -> u64 {
    100 * 1024 * 1024
}

fn default_allowed_types_user() -> Vec<String> {
    vec![".pdf".to_string()]
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_demo_password() -> String {
    "password".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            algorithm: JwtAlgorithm::default(),
            access_token_minutes: default_access_token_minutes(),
            login_burst: default_login_burst(),
            login_replenish_seconds: default_login_replenish_seconds(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_size_user: default_max_size_user(),
            max_size_manager: default_max_size_manager(),
            max_size_admin: default_max_size_admin(),
            allowed_types_user: default_allowed_types_user(),
            allowed_types_manager: Vec::new(),
            allowed_types_admin: Vec::new(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: default_allowed_origins(),
            allow_credentials: true,
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            demo_data: true,
            demo_password: default_demo_password(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_match_container_contract() {
        let config = StaticConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.uploads.dir, "/app/uploads");
        assert_eq!(config.auth.access_token_minutes, 30);
        assert_eq!(config.auth.algorithm, JwtAlgorithm::HS256);
    }

    #[test]
    fn test_default_upload_limits() {
        let uploads = UploadsConfig::default();
        assert_eq!(uploads.max_size_user, 10 * 1024 * 1024);
        assert_eq!(uploads.max_size_manager, 50 * 1024 * 1024);
        assert_eq!(uploads.max_size_admin, 100 * 1024 * 1024);
        assert_eq!(uploads.allowed_types_user, vec![".pdf".to_string()]);
        assert!(uploads.allowed_types_manager.is_empty());
    }

    #[test]
    fn test_jwt_algorithm_parse() {
        assert_eq!(JwtAlgorithm::from_str("hs512").unwrap(), JwtAlgorithm::HS512);
        assert_eq!(JwtAlgorithm::from_str("HS384").unwrap(), JwtAlgorithm::HS384);
        assert!(JwtAlgorithm::from_str("RS256").is_err());
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = StaticConfig::generate_sample_config();
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample must parse");
        assert_eq!(parsed.server.port, 8000);
        assert_eq!(parsed.seed.demo_password, "password");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: StaticConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [uploads]
            dir = "/tmp/up"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.server.port, 9000);
        assert_eq!(parsed.server.host, "0.0.0.0");
        assert_eq!(parsed.uploads.dir, "/tmp/up");
        assert_eq!(parsed.uploads.max_size_user, 10 * 1024 * 1024);
    }
}
