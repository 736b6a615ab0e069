//! 用户接口处理函数

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::{IntoResponse, Response};
use http::Method;
use validator::Validate;

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::models::{PasswordUpdate, User, UserCreate, UserUpdate};
use crate::db::repository::user;
use crate::query::{self, ListParams, ListQuery};
use crate::security_log;
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// GET /api/v1/users/info - 当前登录用户及其角色
pub async fn info(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<AppResponse<User>>> {
    let mut user = user::find_by_id(&state.pool, current_user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", current_user.id)))?;
    user.roles = Some(user::roles_of(&state.pool, user.id).await?);
    Ok(ok(user))
}

/// GET /api/v1/users - 分页/过滤/精简列表
pub async fn list(
    State(state): State<ServerState>,
    method: Method,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let list_query = ListQuery::parse::<User>(&method, &params)?;

    if list_query.simple {
        let page = query::fetch_simple::<User>(&state.pool, &list_query).await?;
        return Ok(ok(page).into_response());
    }

    let mut page = query::fetch_page::<User>(&state.pool, &list_query).await?;
    for user in &mut page.list {
        user.roles = Some(user::roles_of(&state.pool, user.id).await?);
    }
    Ok(ok(page).into_response())
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<User>>> {
    let mut user = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
    user.roles = Some(user::roles_of(&state.pool, user.id).await?);
    Ok(ok(user))
}

/// POST /api/v1/users - 创建用户, 角色分配同一事务
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AppResponse<User>>> {
    payload.validate()?;
    tracing::info!(
        operator = %current_user.username,
        username = %payload.username,
        "Creating user"
    );

    let hash = password::hash_password(&payload.password)?;
    let mut created = user::create(&state.pool, payload, hash).await?;
    created.roles = Some(user::roles_of(&state.pool, created.id).await?);
    Ok(ok(created))
}

/// PATCH /api/v1/users/{id} - 部分更新; role_ids 整组替换
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<AppResponse<User>>> {
    payload.validate()?;
    tracing::info!(operator = %current_user.username, user_id = id, "Updating user");

    let mut updated = user::update(&state.pool, id, payload).await?;
    updated.roles = Some(user::roles_of(&state.pool, updated.id).await?);
    Ok(ok(updated))
}

/// PATCH /api/v1/users/{id}/password - 修改自己的密码
pub async fn update_password(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PasswordUpdate>,
) -> AppResult<Json<AppResponse<bool>>> {
    payload.validate()?;

    if current_user.id != id {
        return Err(AppError::forbidden("Can only change your own password"));
    }
    if payload.new_password != payload.confirm_password {
        return Err(AppError::validation(
            "New password and confirmation do not match",
        ));
    }

    let user_row = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
    if !password::verify_password(&payload.old_password, &user_row.password)? {
        security_log!("WARN", "password_change_wrong_old", user_id = id);
        return Err(AppError::business_rule("Old password is incorrect"));
    }

    let hash = password::hash_password(&payload.new_password)?;
    user::update_password(&state.pool, id, &hash).await?;
    tracing::info!(user_id = id, "Password updated");
    Ok(ok(true))
}

/// DELETE /api/v1/users/{id} - 软删用户, 物理清空角色分配
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    if current_user.id == id {
        return Err(AppError::business_rule("Cannot delete your own account"));
    }
    tracing::info!(operator = %current_user.username, user_id = id, "Deleting user");

    let deleted = user::delete(&state.pool, id).await?;
    Ok(ok(deleted))
}
