//! 权限接口处理函数

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::response::{IntoResponse, Response};
use http::Method;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Permission, PermissionCreate, PermissionUpdate};
use crate::db::repository::permission;
use crate::query::{self, ListParams, ListQuery, PageResponse};
use crate::rbac::tree;
use crate::utils::{AppResponse, AppResult, ok};

/// GET /api/v1/permissions - 权限树, 根层分页
///
/// 树必须基于全量过滤结果构建, 行级分页会把父子切开,
/// 所以先全量取行、装配森林, 再对根层分页。
pub async fn list(
    State(state): State<ServerState>,
    method: Method,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let list_query = ListQuery::parse::<Permission>(&method, &params)?;

    if list_query.simple {
        let page = query::fetch_simple::<Permission>(&state.pool, &list_query).await?;
        return Ok(ok(page).into_response());
    }

    let mut full = list_query.clone();
    full.complete = true;
    let rows = query::fetch_page::<Permission>(&state.pool, &full).await?.list;
    let forest = tree::build_tree(rows, tree::ROOT_PARENT);

    let page = if list_query.complete {
        PageResponse::complete(forest, list_query.page, list_query.size)
    } else {
        let (roots, total) = tree::paginate_roots(forest, list_query.page, list_query.size);
        PageResponse::paged(roots, total, list_query.page, list_query.size)
    };
    Ok(ok(page).into_response())
}

/// POST /api/v1/permissions - 创建权限节点
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<PermissionCreate>,
) -> AppResult<Json<AppResponse<Permission>>> {
    payload.validate()?;
    tracing::info!(operator = %current_user.username, code = %payload.code, "Creating permission");

    let created = permission::create(&state.pool, payload).await?;
    Ok(ok(created))
}

/// PATCH /api/v1/permissions/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<PermissionUpdate>,
) -> AppResult<Json<AppResponse<Permission>>> {
    payload.validate()?;
    tracing::info!(operator = %current_user.username, permission_id = id, "Updating permission");

    let updated = permission::update(&state.pool, id, payload).await?;
    Ok(ok(updated))
}

/// DELETE /api/v1/permissions/{id} - 级联删除子树
///
/// 返回实际删除的 id 集合 (目标及全部后代)。
pub async fn remove(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<i64>>>> {
    tracing::info!(
        operator = %current_user.username,
        permission_id = id,
        "Deleting permission subtree"
    );

    let deleted = permission::delete_tree(&state.pool, id).await?;
    Ok(ok(deleted))
}
