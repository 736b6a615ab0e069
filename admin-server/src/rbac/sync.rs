//! 关联集合同步
//!
//! 以"整组替换"语义维护多对多关联: 先校验待关联 id 全部存在
//! 且启用, 再在同一事务里删除旧行、批量插入新行。任一 id 不
//! 合法则整体失败, 已有关联保持原样。
//!
//! 并发替换同一 owner 不做乐观锁, 最后提交者胜出; 写冲突的
//! 串行化交给 SQLite (WAL + busy_timeout)。

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::models::Status;
use crate::utils::{AppError, AppResult};

/// 关联表的静态描述
#[derive(Debug, Clone, Copy)]
pub struct LinkTable {
    pub table: &'static str,
    pub owner_col: &'static str,
    pub related_col: &'static str,
    /// 被关联实体的表, 校验存在性与状态用
    pub related_table: &'static str,
}

/// 角色 -> 权限 授权
pub const ROLE_PERMISSIONS: LinkTable = LinkTable {
    table: "role_permissions",
    owner_col: "role_id",
    related_col: "permission_id",
    related_table: "permissions",
};

/// 用户 -> 角色 分配
pub const USER_ROLES: LinkTable = LinkTable {
    table: "user_roles",
    owner_col: "user_id",
    related_col: "role_id",
    related_table: "roles",
};

/// 整组替换 owner 的关联集合
///
/// - `related_ids` 为空: 清空全部关联
/// - 非空: 计数校验全部 id 存在、启用、未软删, 通过后删旧插新;
///   重复 id 会让计数对不上, 一并拒绝
///
/// 事务边界由调用方持有, 本函数只在传入的事务上操作,
/// 提交或回滚由外层统一决定。
pub async fn replace_links(
    tx: &mut Transaction<'_, Sqlite>,
    link: &LinkTable,
    owner_id: i64,
    related_ids: &[i64],
) -> AppResult<()> {
    if related_ids.is_empty() {
        let sql = format!("DELETE FROM {} WHERE {} = ?", link.table, link.owner_col);
        sqlx::query(&sql).bind(owner_id).execute(&mut **tx).await?;
        return Ok(());
    }

    let marks = vec!["?"; related_ids.len()].join(", ");
    let count_sql = format!(
        "SELECT COUNT(*) FROM {} WHERE status = ? AND deleted_at IS NULL AND id IN ({marks})",
        link.related_table
    );
    let mut count = sqlx::query_scalar::<_, i64>(&count_sql).bind(Status::Enabled);
    for id in related_ids {
        count = count.bind(*id);
    }
    let count = count.fetch_one(&mut **tx).await?;
    if count as usize != related_ids.len() {
        return Err(AppError::referential(format!(
            "{} list contains missing, disabled or duplicate ids",
            link.related_table
        )));
    }

    let delete_sql = format!("DELETE FROM {} WHERE {} = ?", link.table, link.owner_col);
    sqlx::query(&delete_sql)
        .bind(owner_id)
        .execute(&mut **tx)
        .await?;

    let rows = vec!["(?, ?)"; related_ids.len()].join(", ");
    let insert_sql = format!(
        "INSERT INTO {} ({}, {}) VALUES {rows}",
        link.table, link.owner_col, link.related_col
    );
    let mut insert = sqlx::query(&insert_sql);
    for id in related_ids {
        insert = insert.bind(owner_id).bind(*id);
    }
    insert.execute(&mut **tx).await?;

    Ok(())
}

/// 读取 owner 当前关联的全部 related id
pub async fn related_ids(
    pool: &SqlitePool,
    link: &LinkTable,
    owner_id: i64,
) -> AppResult<Vec<i64>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ? ORDER BY {}",
        link.related_col, link.table, link.owner_col, link.related_col
    );
    let ids = sqlx::query_scalar::<_, i64>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}
