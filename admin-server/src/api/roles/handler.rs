//! 角色接口处理函数

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::{IntoResponse, Response};
use http::Method;
use serde::Deserialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Role, RoleCreate, RoleUpdate};
use crate::db::repository::role;
use crate::query::{self, ListParams, ListQuery};
use crate::utils::{AppError, AppResponse, AppResult, ok};

/// 授权替换请求
#[derive(Debug, Deserialize)]
pub struct GrantPayload {
    pub permission_ids: Vec<i64>,
}

/// GET /api/v1/roles - 分页/过滤/精简列表
pub async fn list(
    State(state): State<ServerState>,
    method: Method,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let list_query = ListQuery::parse::<Role>(&method, &params)?;

    if list_query.simple {
        let page = query::fetch_simple::<Role>(&state.pool, &list_query).await?;
        return Ok(ok(page).into_response());
    }

    let page = query::fetch_page::<Role>(&state.pool, &list_query).await?;
    Ok(ok(page).into_response())
}

/// GET /api/v1/roles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Role>>> {
    let role = role::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
    Ok(ok(role))
}

/// POST /api/v1/roles
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<RoleCreate>,
) -> AppResult<Json<AppResponse<Role>>> {
    payload.validate()?;
    tracing::info!(operator = %current_user.username, code = %payload.code, "Creating role");

    let created = role::create(&state.pool, payload).await?;
    Ok(ok(created))
}

/// PATCH /api/v1/roles/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<AppResponse<Role>>> {
    payload.validate()?;
    tracing::info!(operator = %current_user.username, role_id = id, "Updating role");

    let updated = role::update(&state.pool, id, payload).await?;
    Ok(ok(updated))
}

/// GET /api/v1/roles/{id}/permissions - 角色当前授权的权限 id
pub async fn get_permissions(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<i64>>>> {
    if role::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found(format!("Role {id} not found")));
    }
    Ok(ok(role::permission_ids(&state.pool, id).await?))
}

/// PATCH /api/v1/roles/{id}/permissions - 整组替换授权
///
/// 空列表表示清空全部授权。
pub async fn update_permissions(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<GrantPayload>,
) -> AppResult<Json<AppResponse<Vec<i64>>>> {
    tracing::info!(
        operator = %current_user.username,
        role_id = id,
        count = payload.permission_ids.len(),
        "Replacing role permissions"
    );

    role::replace_permissions(&state.pool, id, &payload.permission_ids).await?;
    Ok(ok(role::permission_ids(&state.pool, id).await?))
}

/// DELETE /api/v1/roles/{id} - 软删角色, 物理清空授权
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<bool>>> {
    tracing::info!(operator = %current_user.username, role_id = id, "Deleting role");

    let deleted = role::delete(&state.pool, id).await?;
    Ok(ok(deleted))
}
