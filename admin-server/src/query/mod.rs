//! 通用动态查询引擎
//!
//! 把不可信的声明式过滤参数翻译为安全的查询谓词, 组合可选的
//! 字段投影与分页, 对数据源执行一次 查询 + 计数。
//!
//! # 结构
//!
//! - [`filter`] - `params` 参数解析为谓词序列 (白名单校验)
//! - [`pagination`] - page/size 规范化与分页响应信封
//! - [`executor`] - 谓词 + 投影 + 分页 组合执行

pub mod executor;
pub mod filter;
pub mod pagination;

pub use executor::{ListQuery, fetch_page, fetch_simple};
pub use filter::{Operator, SearchPredicate};
pub use pagination::{ListParams, PageResponse};

/// 实体接入查询引擎的静态描述
///
/// 每个可列表查询的实体声明自己的表名、列集合、精简投影列
/// 和过滤白名单。过滤字段永远对照白名单取静态列名,
/// 客户端原始字符串不会进入 SQL 文本。
pub trait Queryable: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> + Send + Unpin {
    /// simple=true 时返回的精简行类型 (下拉框场景)
    type Simple: for<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow>
        + serde::Serialize
        + Send
        + Unpin;

    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// simple=true 时的列子集, 默认 {id, name}
    const SIMPLE_COLUMNS: &'static [&'static str] = &["id", "name"];
    /// 允许出现在过滤参数里的列 (白名单)
    const FILTERABLE: &'static [&'static str];
    const DEFAULT_ORDER: &'static str = "id ASC";
}
