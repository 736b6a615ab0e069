//! 权限仓储

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::models::{Permission, PermissionCreate, PermissionUpdate, Status};
use crate::rbac::tree::{self, ROOT_PARENT};
use crate::utils::id::next_id;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

const COLUMNS: &str = "id, name, kind, path, code, component, icon, sort, parent_id, \
                       remark, status, created_at, updated_at, deleted_at";

/// 全部存活权限, sort 序 (树构建的输入)
pub async fn find_all(pool: &SqlitePool) -> AppResult<Vec<Permission>> {
    let rows = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {COLUMNS} FROM permissions WHERE deleted_at IS NULL ORDER BY sort ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// 按 id 查询存活权限
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Permission>> {
    let row = sqlx::query_as::<_, Permission>(&format!(
        "SELECT {COLUMNS} FROM permissions WHERE id = ? AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// 父引用校验: parent 必须存在、未删除且为 menu 类型
///
/// 与写入同一事务执行, 校验和插入之间不会混进并发删除。
async fn validate_parent(
    tx: &mut Transaction<'_, Sqlite>,
    parent_id: i64,
    child_id: Option<i64>,
) -> AppResult<()> {
    if parent_id == ROOT_PARENT {
        return Ok(());
    }
    if Some(parent_id) == child_id {
        return Err(AppError::validation("Permission cannot be its own parent"));
    }

    let kind = sqlx::query_scalar::<_, String>(
        "SELECT kind FROM permissions WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(parent_id)
    .fetch_optional(&mut **tx)
    .await?;

    match kind.as_deref() {
        None => Err(AppError::referential(format!(
            "Parent permission {parent_id} not found"
        ))),
        Some("menu") => Ok(()),
        Some(_) => Err(AppError::business_rule(
            "Parent permission must be a menu node",
        )),
    }
}

/// 创建权限, 父引用校验与插入同一事务
pub async fn create(pool: &SqlitePool, data: PermissionCreate) -> AppResult<Permission> {
    let id = next_id();
    let now = now_millis();
    let status = data.status.unwrap_or(Status::Enabled);
    let sort = data.sort.unwrap_or(0);

    let mut tx = pool.begin().await?;
    validate_parent(&mut tx, data.parent_id, None).await?;
    sqlx::query(
        "INSERT INTO permissions \
            (id, name, kind, path, code, component, icon, sort, parent_id, remark, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.kind)
    .bind(&data.path)
    .bind(&data.code)
    .bind(&data.component)
    .bind(&data.icon)
    .bind(sort)
    .bind(data.parent_id)
    .bind(&data.remark)
    .bind(status)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::database("Failed to read back created permission"))
}

/// 部分更新权限; parent_id 为 Some 时重新校验父引用
pub async fn update(pool: &SqlitePool, id: i64, data: PermissionUpdate) -> AppResult<Permission> {
    let now = now_millis();

    let mut tx = pool.begin().await?;
    if let Some(parent_id) = data.parent_id {
        validate_parent(&mut tx, parent_id, Some(id)).await?;
    }

    let result = sqlx::query(
        "UPDATE permissions SET \
            name = COALESCE(?1, name), \
            kind = COALESCE(?2, kind), \
            path = COALESCE(?3, path), \
            code = COALESCE(?4, code), \
            component = COALESCE(?5, component), \
            icon = COALESCE(?6, icon), \
            sort = COALESCE(?7, sort), \
            parent_id = COALESCE(?8, parent_id), \
            remark = COALESCE(?9, remark), \
            status = COALESCE(?10, status), \
            updated_at = ?11 \
         WHERE id = ?12 AND deleted_at IS NULL",
    )
    .bind(&data.name)
    .bind(data.kind)
    .bind(&data.path)
    .bind(&data.code)
    .bind(&data.component)
    .bind(&data.icon)
    .bind(data.sort)
    .bind(data.parent_id)
    .bind(&data.remark)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Permission {id} not found")));
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))
}

/// 级联删除: 目标及其全部后代
///
/// 同一事务内先物理删除子树的授权行, 再软删权限行,
/// 不会出现指向已删权限的残留授权。返回删除的 id 集合。
pub async fn delete_tree(pool: &SqlitePool, id: i64) -> AppResult<Vec<i64>> {
    let all = find_all(pool).await?;
    if !all.iter().any(|p| p.id == id) {
        return Err(AppError::not_found(format!("Permission {id} not found")));
    }
    let ids = tree::collect_subtree_ids(&all, id);

    let marks = vec!["?"; ids.len()].join(", ");
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let grant_sql = format!("DELETE FROM role_permissions WHERE permission_id IN ({marks})");
    let mut grants = sqlx::query(&grant_sql);
    for pid in &ids {
        grants = grants.bind(*pid);
    }
    grants.execute(&mut *tx).await?;

    let perm_sql = format!(
        "UPDATE permissions SET deleted_at = ?, updated_at = ? \
         WHERE id IN ({marks}) AND deleted_at IS NULL"
    );
    let mut perms = sqlx::query(&perm_sql).bind(now).bind(now);
    for pid in &ids {
        perms = perms.bind(*pid);
    }
    perms.execute(&mut *tx).await?;
    tx.commit().await?;

    Ok(ids)
}
