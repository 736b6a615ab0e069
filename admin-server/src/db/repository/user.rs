//! 用户仓储

use sqlx::SqlitePool;

use crate::db::models::{Role, Status, User, UserCreate, UserUpdate};
use crate::rbac::sync::{self, USER_ROLES};
use crate::utils::id::next_id;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

/// 按 id 查询存活用户
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password, nickname, email, phone, status, \
                created_at, updated_at, deleted_at \
         FROM users WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// 按用户名查询存活用户 (登录入口)
pub async fn find_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password, nickname, email, phone, status, \
                created_at, updated_at, deleted_at \
         FROM users WHERE username = ? AND deleted_at IS NULL",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// 创建用户, 角色分配与用户行同一事务落库
///
/// 任一角色 id 不合法则整体失败, 不会留下没有角色校验的半成品。
pub async fn create(pool: &SqlitePool, data: UserCreate, password_hash: String) -> AppResult<User> {
    let id = next_id();
    let now = now_millis();
    let status = data.status.unwrap_or(Status::Enabled);

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO users (id, username, password, nickname, email, phone, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.username)
    .bind(&password_hash)
    .bind(&data.nickname)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(status)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sync::replace_links(&mut tx, &USER_ROLES, id, &data.role_ids).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::database("Failed to read back created user"))
}

/// 部分更新用户; role_ids 为 Some 时同一事务内整组替换角色
pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> AppResult<User> {
    let now = now_millis();

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "UPDATE users SET \
            nickname = COALESCE(?1, nickname), \
            email = COALESCE(?2, email), \
            phone = COALESCE(?3, phone), \
            status = COALESCE(?4, status), \
            updated_at = ?5 \
         WHERE id = ?6 AND deleted_at IS NULL",
    )
    .bind(&data.nickname)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(data.status)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("User {id} not found")));
    }

    if let Some(role_ids) = &data.role_ids {
        sync::replace_links(&mut tx, &USER_ROLES, id, role_ids).await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
}

/// 删除用户: 同一事务内物理清空角色分配, 再软删用户行
pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<bool> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(AppError::not_found(format!("User {id} not found")));
    }

    let now = now_millis();
    let mut tx = pool.begin().await?;
    sync::replace_links(&mut tx, &USER_ROLES, id, &[]).await?;
    sqlx::query("UPDATE users SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL")
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}

/// 更新密码哈希
pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE users SET password = ?1, updated_at = ?2 WHERE id = ?3 AND deleted_at IS NULL",
    )
    .bind(password_hash)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("User {id} not found")));
    }
    Ok(())
}

/// 用户持有的存活角色
pub async fn roles_of(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT r.id, r.name, r.code, r.remark, r.status, r.created_at, r.updated_at, r.deleted_at \
         FROM roles r \
         JOIN user_roles ur ON ur.role_id = r.id \
         WHERE ur.user_id = ? AND r.deleted_at IS NULL \
         ORDER BY r.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

/// 用户当前分配的角色 id 集合
pub async fn role_ids_of(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<i64>> {
    sync::related_ids(pool, &USER_ROLES, user_id).await
}

/// 用户的有效权限码: 用户 -> 启用角色 -> 授权 -> 启用权限
///
/// 角色或权限任何一端被禁用/软删, 对应权限码即失效。
pub async fn permission_codes(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<String>> {
    let codes = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT p.code \
         FROM permissions p \
         JOIN role_permissions rp ON rp.permission_id = p.id \
         JOIN user_roles ur ON ur.role_id = rp.role_id \
         JOIN roles r ON r.id = ur.role_id \
         WHERE ur.user_id = ? \
           AND p.status = 1 AND p.deleted_at IS NULL \
           AND r.status = 1 AND r.deleted_at IS NULL \
         ORDER BY p.code",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(codes)
}
