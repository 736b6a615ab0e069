//! 认证与权限中间件
//!
//! [`require_auth`] 挂在整个应用上, 内部放行公共路由;
//! [`require_permission`] 按权限码生成中间件, 挂在具体的写路由组上。

use std::pin::Pin;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::{Method, header};

use super::jwt::{CurrentUser, JwtError, TOKEN_TYPE_ACCESS};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// 无需令牌的路由
const PUBLIC_ROUTES: &[&str] = &[
    "/api/v1/auth/login",
    "/api/v1/auth/refresh",
    "/api/v1/health",
];

/// JWT 认证中间件
///
/// 验证通过后把 [`CurrentUser`] 放进请求扩展, 下游 handler
/// 和权限中间件直接取用。
pub async fn require_auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path();

    // CORS 预检不携带凭证
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }
    // 非 API 路径 (静态资源等) 不归这里管
    if !path.starts_with("/api/") {
        return Ok(next.run(request).await);
    }
    if PUBLIC_ROUTES.contains(&path) {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(header_value) = auth_header else {
        security_log!("WARN", "missing_auth_header", path = path.to_string());
        return Err(AppError::unauthorized());
    };

    let jwt_service = state.get_jwt_service();
    let Some(token) = jwt_service.extract_from_header(header_value) else {
        security_log!("WARN", "malformed_auth_header", path = path.to_string());
        return Err(AppError::invalid_token("Malformed Authorization header"));
    };

    match jwt_service.validate_token(token) {
        Ok(claims) => {
            // 刷新令牌不能当访问令牌用
            if claims.token_type != TOKEN_TYPE_ACCESS {
                security_log!("WARN", "wrong_token_type", path = path.to_string());
                return Err(AppError::invalid_token("Not an access token"));
            }
            let user = CurrentUser::try_from(claims)
                .map_err(|e| AppError::invalid_token(format!("Malformed claims: {e}")))?;
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        Err(JwtError::ExpiredToken) => {
            security_log!("INFO", "token_expired", path = path.to_string());
            Err(AppError::token_expired())
        }
        Err(e) => {
            security_log!("WARN", "token_invalid", path = path.to_string(), reason = e.to_string());
            Err(AppError::invalid_token("Invalid token"))
        }
    }
}

/// 按权限码生成校验中间件
///
/// 必须挂在 [`require_auth`] 内侧, 依赖它放进扩展的 CurrentUser。
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AppError>> + Send>> + Clone
{
    move |request: Request, next: Next| {
        Box::pin(async move {
            let Some(user) = request.extensions().get::<CurrentUser>() else {
                return Err(AppError::unauthorized());
            };

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    username = user.username.clone(),
                    required = permission
                );
                return Err(AppError::forbidden(format!(
                    "Permission '{permission}' required"
                )));
            }

            Ok(next.run(request).await)
        })
    }
}
