//! 认证接口处理函数

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use validator::Validate;

use crate::auth::{JwtError, TOKEN_TYPE_REFRESH, TokenPair, password};
use crate::core::ServerState;
use crate::db::models::Status;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// 刷新请求
#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

/// POST /api/v1/auth/login - 用户名密码换令牌对
///
/// 用户不存在和密码错误返回同一错误, 避免用户名枚举。
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<AppResponse<TokenPair>>> {
    payload.validate()?;

    let Some(user) = user::find_by_username(&state.pool, &payload.username).await? else {
        security_log!("WARN", "login_unknown_user", username = payload.username.clone());
        return Err(AppError::invalid_credentials());
    };

    if !password::verify_password(&payload.password, &user.password)? {
        security_log!("WARN", "login_wrong_password", username = payload.username.clone());
        return Err(AppError::invalid_credentials());
    }

    if user.status != Status::Enabled {
        security_log!("WARN", "login_disabled_account", username = payload.username.clone());
        return Err(AppError::forbidden("Account is disabled"));
    }

    let permissions = user::permission_codes(&state.pool, user.id).await?;
    let pair = state
        .jwt_service
        .generate_token_pair(user.id, &user.username, &permissions)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(ok(pair))
}

/// POST /api/v1/auth/refresh - 刷新令牌换新令牌对
///
/// 重新加载用户和权限码, 角色/授权的变更在刷新时生效。
pub async fn refresh(
    State(state): State<ServerState>,
    Json(payload): Json<RefreshPayload>,
) -> AppResult<Json<AppResponse<TokenPair>>> {
    let claims = state
        .jwt_service
        .validate_typed(&payload.refresh_token, TOKEN_TYPE_REFRESH)
        .map_err(|e| match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid refresh token"),
        })?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::invalid_token("Malformed subject claim"))?;

    let user = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    if user.status != Status::Enabled {
        return Err(AppError::forbidden("Account is disabled"));
    }

    let permissions = user::permission_codes(&state.pool, user.id).await?;
    let pair = state
        .jwt_service
        .generate_token_pair(user.id, &user.username, &permissions)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    Ok(ok(pair))
}
