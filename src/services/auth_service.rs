//! Authentication service
//!
//! 密码登录与 bearer token 解析，HTTP 登录接口与鉴权中间件共用。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::jwt::JwtService;
use crate::errors::{Result, VaultError};
use crate::storage::{SeaOrmStorage, User};
use crate::utils::password::{verify_against_dummy, verify_password};

const BAD_LOGIN: &str = "Incorrect username or password";
const BAD_TOKEN: &str = "Could not validate credentials";

/// 登录成功后签发的 token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub user: User,
}

pub struct AuthService {
    storage: Arc<SeaOrmStorage>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(storage: Arc<SeaOrmStorage>, jwt: Arc<JwtService>) -> Self {
        Self { storage, jwt }
    }

    /// 校验用户名和密码
    ///
    /// 用户不存在时也会做一次哈希校验，避免通过耗时区分用户名是否存在。
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let user = self.storage.get_user_by_username(username).await?;
        let password = password.to_string();

        let Some(user) = user else {
            tokio::task::spawn_blocking(move || verify_against_dummy(&password))
                .await?;
            debug!("Login attempt for unknown user '{}'", username);
            return Err(VaultError::unauthorized(BAD_LOGIN));
        };

        let hash = user.password_hash.clone();
        let matched = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await?;

        match matched {
            Ok(true) => Ok(user),
            Ok(false) => Err(VaultError::unauthorized(BAD_LOGIN)),
            Err(e) => {
                warn!("Stored password hash for '{}' is unusable: {}", user.username, e);
                Err(VaultError::unauthorized(BAD_LOGIN))
            }
        }
    }

    /// 登录并签发 access token
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken> {
        let user = self.authenticate(username, password).await?;
        let access_token = self.jwt.generate_access_token(&user.username)?;
        info!("User '{}' logged in", user.username);
        Ok(IssuedToken { access_token, user })
    }

    /// 解析 bearer token 并加载对应用户
    pub async fn resolve_token(&self, token: &str) -> Result<User> {
        let claims = self.jwt.validate_access_token(token).map_err(|e| {
            debug!("Rejected access token: {}", e);
            VaultError::unauthorized(BAD_TOKEN)
        })?;

        self.storage
            .get_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| VaultError::unauthorized(BAD_TOKEN))
    }
}
