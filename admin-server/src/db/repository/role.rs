//! 角色仓储

use sqlx::SqlitePool;

use crate::db::models::{Role, RoleCreate, RoleUpdate, Status};
use crate::rbac::sync::{self, ROLE_PERMISSIONS};
use crate::utils::id::next_id;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

/// 按 id 查询存活角色
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(
        "SELECT id, name, code, remark, status, created_at, updated_at, deleted_at \
         FROM roles WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

/// 创建角色
///
/// name/code 的唯一冲突由部分唯一索引兜底, 转为 Conflict。
pub async fn create(pool: &SqlitePool, data: RoleCreate) -> AppResult<Role> {
    let id = next_id();
    let now = now_millis();
    let status = data.status.unwrap_or(Status::Enabled);

    sqlx::query(
        "INSERT INTO roles (id, name, code, remark, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.code)
    .bind(&data.remark)
    .bind(status)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::database("Failed to read back created role"))
}

/// 部分更新角色, None 的字段保持原值
pub async fn update(pool: &SqlitePool, id: i64, data: RoleUpdate) -> AppResult<Role> {
    let now = now_millis();
    let result = sqlx::query(
        "UPDATE roles SET \
            name = COALESCE(?1, name), \
            code = COALESCE(?2, code), \
            remark = COALESCE(?3, remark), \
            status = COALESCE(?4, status), \
            updated_at = ?5 \
         WHERE id = ?6 AND deleted_at IS NULL",
    )
    .bind(&data.name)
    .bind(&data.code)
    .bind(&data.remark)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Role {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
}

/// 删除角色: 同一事务内先物理清空授权行, 再软删角色行
///
/// 指向该角色的 user_roles 行保留; 权限解析处处过滤已删角色,
/// 残留关联不会产生授权。
pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(AppError::not_found(format!("Role {id} not found")));
    }

    let now = now_millis();
    let mut tx = pool.begin().await?;
    sync::replace_links(&mut tx, &ROLE_PERMISSIONS, id, &[]).await?;
    sqlx::query("UPDATE roles SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}

/// 整组替换角色的权限授权
pub async fn replace_permissions(
    pool: &SqlitePool,
    id: i64,
    permission_ids: &[i64],
) -> AppResult<()> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(AppError::not_found(format!("Role {id} not found")));
    }

    let mut tx = pool.begin().await?;
    sync::replace_links(&mut tx, &ROLE_PERMISSIONS, id, permission_ids).await?;
    tx.commit().await?;
    Ok(())
}

/// 角色当前授权的权限 id 集合
pub async fn permission_ids(pool: &SqlitePool, id: i64) -> AppResult<Vec<i64>> {
    sync::related_ids(pool, &ROLE_PERMISSIONS, id).await
}
