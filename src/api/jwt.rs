use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{AuthConfig, JwtAlgorithm};

const ACCESS_TOKEN_TYPE: &str = "access";

/// Access Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// 用户名
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub token_type: String,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// JWT Service for generating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_minutes: u64,
}

impl JwtService {
    pub fn new(secret: &str, algorithm: JwtAlgorithm, access_token_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: algorithm.into(),
            access_token_minutes,
        }
    }

    /// Create JwtService from config
    ///
    /// 密钥为空时生成随机值，重启后已签发的 token 全部失效。
    pub fn from_config(auth: &AuthConfig) -> Self {
        let secret = if auth.secret_key.trim().is_empty() {
            warn!("JWT secret not configured or empty, generating secure random token");
            crate::utils::generate_secure_token(32)
        } else {
            auth.secret_key.clone()
        };

        Self::new(&secret, auth.algorithm, auth.access_token_minutes)
    }

    pub fn access_token_minutes(&self) -> u64 {
        self.access_token_minutes
    }

    /// Generate Access Token for `username`
    pub fn generate_access_token(
        &self,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_token_minutes as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
    }

    /// Validate Access Token
    pub fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &Validation::new(self.algorithm))?;

        if token_data.claims.token_type != ACCESS_TOKEN_TYPE || token_data.claims.sub.is_empty() {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_32_bytes_long!!";

    fn create_test_service() -> JwtService {
        JwtService::new(SECRET, JwtAlgorithm::HS256, 30)
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = create_test_service();
        let token = service.generate_access_token("manager1").unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "manager1");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate_access_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_test_service()
            .generate_access_token("user1")
            .unwrap();
        let other = JwtService::new("different_secret_key_32_bytes!!", JwtAlgorithm::HS256, 30);
        assert!(other.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let token = JwtService::new(SECRET, JwtAlgorithm::HS512, 30)
            .generate_access_token("user1")
            .unwrap();
        assert!(create_test_service().validate_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        // 过期时间超过默认 leeway
        let now = chrono::Utc::now();
        let claims = AccessClaims {
            sub: "user1".to_string(),
            iat: (now - chrono::Duration::hours(2)).timestamp(),
            exp: (now - chrono::Duration::hours(1)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let now = chrono::Utc::now();
        let claims = AccessClaims {
            sub: "user1".to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::minutes(5)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "refresh".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(create_test_service().validate_access_token(&token).is_err());
    }

    #[test]
    fn test_from_config_generates_secret_when_empty() {
        let auth = AuthConfig::default();
        let service = JwtService::from_config(&auth);
        let token = service.generate_access_token("admin1").unwrap();
        assert_eq!(service.validate_access_token(&token).unwrap().sub, "admin1");
    }
}
