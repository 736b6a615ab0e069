//! 认证与授权
//!
//! - [`jwt`] - JWT 令牌服务与当前用户上下文
//! - [`password`] - Argon2 密码哈希
//! - [`middleware`] - 认证/权限中间件
//! - [`extractor`] - handler 参数里的 CurrentUser 提取

mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{
    Claims, CurrentUser, JwtConfig, JwtError, JwtService, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH,
    TokenPair,
};
pub use middleware::{require_auth, require_permission};
