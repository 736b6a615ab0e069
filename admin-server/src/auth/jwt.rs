//! JWT 令牌服务
//!
//! 处理访问/刷新令牌对的生成、验证和解析。
//! 访问令牌携带权限码快照; 刷新令牌只携带身份,
//! 刷新时重新从数据库解析权限。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 访问令牌类型标记
pub const TOKEN_TYPE_ACCESS: &str = "access";
/// 刷新令牌类型标记
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// JWT 配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | JWT_SECRET | (开发环境随机) | 签名密钥, 至少 32 字节 |
/// | JWT_ACCESS_MINUTES | 30 | 访问令牌有效期 (分钟) |
/// | JWT_REFRESH_DAYS | 2 | 刷新令牌有效期 (天) |
/// | JWT_ISSUER | admin-server | iss |
/// | JWT_AUDIENCE | admin-clients | aud |
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_minutes: i64,
    pub refresh_days: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: load_jwt_secret(),
            access_minutes: std::env::var("JWT_ACCESS_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            refresh_days: std::env::var("JWT_REFRESH_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "admin-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "admin-clients".to_string()),
        }
    }
}

/// 加载签名密钥
///
/// 生产构建必须设置 JWT_SECRET 且不短于 32 字节;
/// 开发构建缺省时生成一次性随机密钥 (重启后旧令牌全部失效)。
fn load_jwt_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET shorter than 32 bytes, using a temporary random key");
                generate_dev_secret()
            }
            #[cfg(not(debug_assertions))]
            panic!("JWT_SECRET must be at least 32 bytes long")
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set! Generating temporary key for development");
                generate_dev_secret()
            }
            #[cfg(not(debug_assertions))]
            panic!("JWT_SECRET environment variable must be set in production")
        }
    }
}

#[cfg(debug_assertions)]
fn generate_dev_secret() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..48)
        .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
        .collect()
}

/// 令牌中承载的 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户名
    pub username: String,
    /// 权限码列表, 逗号拼接
    pub permissions: String,
    /// 令牌类型: access | refresh
    pub token_type: String,
    /// 过期时间 (Unix 秒)
    pub exp: i64,
    /// 签发时间 (Unix 秒)
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// 登录/刷新返回的令牌对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 访问令牌有效秒数
    pub expires_in: i64,
}

/// JWT 错误
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// 为用户签发访问/刷新令牌对
    ///
    /// 刷新令牌不携带权限码, 刷新时重新解析。
    pub fn generate_token_pair(
        &self,
        user_id: i64,
        username: &str,
        permissions: &[String],
    ) -> Result<TokenPair, JwtError> {
        let access = self.generate(
            user_id,
            username,
            permissions,
            TOKEN_TYPE_ACCESS,
            Duration::minutes(self.config.access_minutes),
        )?;
        let refresh = self.generate(
            user_id,
            username,
            &[],
            TOKEN_TYPE_REFRESH,
            Duration::days(self.config.refresh_days),
        )?;
        Ok(TokenPair {
            access_token: access,
            refresh_token: refresh,
            expires_in: self.config.access_minutes * 60,
        })
    }

    fn generate(
        &self,
        user_id: i64,
        username: &str,
        permissions: &[String],
        token_type: &str,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            permissions: permissions.join(","),
            token_type: token_type.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证令牌并返回 Claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// 验证令牌并要求指定类型
    pub fn validate_typed(&self, token: &str, expected_type: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected_type {
            return Err(JwtError::InvalidToken(format!(
                "expected {expected_type} token, got {}",
                claims.token_type
            )));
        }
        Ok(claims)
    }

    /// 从 Authorization 头提取 Bearer 令牌
    pub fn extract_from_header<'a>(&self, header: &'a str) -> Option<&'a str> {
        header.strip_prefix("Bearer ").map(str::trim)
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

/// 当前用户上下文, 从验证过的 Claims 解析
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    /// 有效权限码
    pub permissions: Vec<String>,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidToken("malformed subject claim".to_string()))?;
        let permissions = if claims.permissions.is_empty() {
            Vec::new()
        } else {
            claims.permissions.split(',').map(String::from).collect()
        };
        Ok(Self {
            id,
            username: claims.username,
            permissions,
        })
    }
}

impl CurrentUser {
    /// 检查是否拥有指定权限
    ///
    /// 支持通配符:
    /// - `"*"` 拥有所有权限
    /// - `"user:*"` 匹配 `"user:create"`, `"user:delete"` 等
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|held| {
            if held == "*" || held == permission {
                return true;
            }
            if let Some(prefix) = held.strip_suffix(":*") {
                return permission.starts_with(prefix)
                    && permission[prefix.len()..].starts_with(':');
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            access_minutes: 30,
            refresh_days: 2,
            issuer: "admin-server".to_string(),
            audience: "admin-clients".to_string(),
        })
    }

    #[test]
    fn token_pair_round_trips() {
        let svc = test_service();
        let perms = vec!["user:create".to_string(), "role:grant".to_string()];
        let pair = svc.generate_token_pair(42, "alice", &perms).unwrap();
        assert_eq!(pair.expires_in, 30 * 60);

        let claims = svc.validate_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
        assert_eq!(claims.permissions, "user:create,role:grant");

        let refresh = svc.validate_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.token_type, TOKEN_TYPE_REFRESH);
        assert!(refresh.permissions.is_empty());
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = test_service();
        // 验证器默认有 60s leeway, 过期点要推得更远
        let token = svc
            .generate(7, "bob", &[], TOKEN_TYPE_ACCESS, Duration::minutes(-10))
            .unwrap();
        match svc.validate_token(&token) {
            Err(JwtError::ExpiredToken) => {}
            other => panic!("expected ExpiredToken, got {other:?}"),
        }
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let svc = test_service();
        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret-key-of-enough-length!".to_string(),
            ..svc.config().clone()
        });
        let pair = svc.generate_token_pair(1, "x", &[]).unwrap();
        assert!(other.validate_token(&pair.access_token).is_err());
    }

    #[test]
    fn validate_typed_enforces_token_type() {
        let svc = test_service();
        let pair = svc.generate_token_pair(1, "x", &[]).unwrap();
        assert!(svc.validate_typed(&pair.refresh_token, TOKEN_TYPE_REFRESH).is_ok());
        assert!(svc.validate_typed(&pair.access_token, TOKEN_TYPE_REFRESH).is_err());
    }

    #[test]
    fn garbage_token_is_invalid() {
        let svc = test_service();
        assert!(svc.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn extract_from_header_strips_bearer() {
        let svc = test_service();
        assert_eq!(svc.extract_from_header("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(svc.extract_from_header("Basic abc"), None);
    }

    #[test]
    fn current_user_parses_claims() {
        let svc = test_service();
        let pair = svc
            .generate_token_pair(9, "carol", &["user:create".to_string()])
            .unwrap();
        let claims = svc.validate_token(&pair.access_token).unwrap();
        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 9);
        assert_eq!(user.username, "carol");
        assert_eq!(user.permissions, vec!["user:create"]);
    }

    #[test]
    fn wildcard_permissions() {
        let user = CurrentUser {
            id: 1,
            username: "a".into(),
            permissions: vec!["user:*".into(), "role:grant".into()],
        };
        assert!(user.has_permission("user:create"));
        assert!(user.has_permission("user:delete"));
        assert!(user.has_permission("role:grant"));
        assert!(!user.has_permission("role:delete"));
        assert!(!user.has_permission("userx:create"));

        let root = CurrentUser {
            id: 2,
            username: "b".into(),
            permissions: vec!["*".into()],
        };
        assert!(root.has_permission("anything:at:all"));
    }
}
