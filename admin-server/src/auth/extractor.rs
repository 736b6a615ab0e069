//! CurrentUser 提取器
//!
//! handler 直接写 `user: CurrentUser` 参数即可拿到当前用户。
//! 正常路径下 [`require_auth`](super::middleware::require_auth)
//! 已把用户放进请求扩展, 这里只是取出来; 扩展缺失时回退为
//! 自行解析 Authorization 头 (测试里单独调 handler 的场景)。

use axum::extract::FromRequestParts;
use http::header;
use http::request::Parts;

use super::jwt::{CurrentUser, JwtError, TOKEN_TYPE_ACCESS};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::unauthorized)?;

        let jwt_service = state.get_jwt_service();
        let token = jwt_service
            .extract_from_header(header_value)
            .ok_or_else(|| AppError::invalid_token("Malformed Authorization header"))?;

        let claims = jwt_service.validate_token(token).map_err(|e| match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        })?;
        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::invalid_token("Not an access token"));
        }

        let user = CurrentUser::try_from(claims)
            .map_err(|e| AppError::invalid_token(format!("Malformed claims: {e}")))?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
