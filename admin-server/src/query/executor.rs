//! 查询执行器
//!
//! 把解析好的谓词、投影开关和分页参数组合成一次查询:
//! 先对过滤结果计数, 再取当前页的行。complete 模式跳过
//! 计数和分页, 返回全量过滤结果。
//!
//! 所有查询无条件追加 `deleted_at IS NULL`, 软删除的行在
//! 任何列表接口都不可见。

use http::Method;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteRow;

use super::Queryable;
use super::filter::{self, Operator, SearchPredicate, SqlValue};
use super::pagination::{self, ListParams, PageResponse};
use crate::utils::AppResult;

/// 规范化后的列表查询
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: i64,
    pub size: i64,
    pub simple: bool,
    pub complete: bool,
    pub predicates: Vec<SearchPredicate>,
}

impl ListQuery {
    /// 解析并校验请求参数, 谓词字段对照实体白名单
    pub fn parse<T: Queryable>(method: &Method, params: &ListParams) -> AppResult<Self> {
        let predicates =
            filter::parse_predicates(method, params.params.as_deref(), T::FILTERABLE)?;
        let (page, size) = pagination::normalize(params.page, params.size);
        Ok(Self {
            page,
            size,
            simple: params.simple,
            complete: params.complete,
            predicates,
        })
    }
}

/// 完整行查询
pub async fn fetch_page<T: Queryable>(
    pool: &SqlitePool,
    query: &ListQuery,
) -> AppResult<PageResponse<T>> {
    fetch_rows::<T>(pool, query, T::TABLE, T::COLUMNS, T::DEFAULT_ORDER).await
}

/// 精简投影查询 (simple=true)
pub async fn fetch_simple<T: Queryable>(
    pool: &SqlitePool,
    query: &ListQuery,
) -> AppResult<PageResponse<T::Simple>> {
    fetch_rows::<T::Simple>(pool, query, T::TABLE, T::SIMPLE_COLUMNS, T::DEFAULT_ORDER).await
}

async fn fetch_rows<R>(
    pool: &SqlitePool,
    query: &ListQuery,
    table: &str,
    columns: &[&str],
    order: &str,
) -> AppResult<PageResponse<R>>
where
    R: for<'r> sqlx::FromRow<'r, SqliteRow> + Send + Unpin,
{
    let (where_sql, binds) = build_where(&query.predicates);

    let total = if query.complete {
        None
    } else {
        let count_sql = format!("SELECT COUNT(*) FROM {table}{where_sql}");
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        for value in &binds {
            count = match value {
                SqlValue::Int(v) => count.bind(*v),
                SqlValue::Real(v) => count.bind(*v),
                SqlValue::Text(v) => count.bind(v.clone()),
                SqlValue::Bool(v) => count.bind(*v),
                SqlValue::Null => count.bind(Option::<String>::None),
            };
        }
        Some(count.fetch_one(pool).await?)
    };

    let mut sql = format!(
        "SELECT {} FROM {table}{where_sql} ORDER BY {order}",
        columns.join(", ")
    );
    if !query.complete {
        sql.push_str(" LIMIT ? OFFSET ?");
    }

    let mut rows = sqlx::query_as::<_, R>(&sql);
    for value in &binds {
        rows = match value {
            SqlValue::Int(v) => rows.bind(*v),
            SqlValue::Real(v) => rows.bind(*v),
            SqlValue::Text(v) => rows.bind(v.clone()),
            SqlValue::Bool(v) => rows.bind(*v),
            SqlValue::Null => rows.bind(Option::<String>::None),
        };
    }
    if !query.complete {
        rows = rows
            .bind(query.size)
            .bind(pagination::offset(query.page, query.size));
    }
    let list = rows.fetch_all(pool).await?;

    Ok(match total {
        Some(total) => PageResponse::paged(list, total, query.page, query.size),
        None => PageResponse::complete(list, query.page, query.size),
    })
}

/// WHERE 子句: 软删除过滤与谓词合取, 值全部走占位符
fn build_where(predicates: &[SearchPredicate]) -> (String, Vec<SqlValue>) {
    let mut clauses = vec!["deleted_at IS NULL".to_string()];
    let mut binds = Vec::new();
    for p in predicates {
        match p.op {
            Operator::In => {
                let marks = vec!["?"; p.values.len()].join(", ");
                clauses.push(format!("{} IN ({})", p.column, marks));
            }
            _ => clauses.push(format!("{} {} ?", p.column, p.op.as_sql())),
        }
        binds.extend(p.values.iter().cloned());
    }
    (format!(" WHERE {}", clauses.join(" AND ")), binds)
}
