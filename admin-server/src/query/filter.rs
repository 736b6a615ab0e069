//! 声明式过滤参数解析
//!
//! 请求的 `params` 参数携带 URL 编码的 JSON 数组, 每项是
//! `{"param": "username", "sign": "lk", "val": "adm"}` 形式的三元组。
//! sign 大小写不敏感; 未知 sign 或不在白名单内的字段直接拒绝,
//! 不做静默忽略。

use http::Method;
use serde::Deserialize;

use crate::utils::{AppError, AppResult};

/// 过滤操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Like,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Operator {
    /// 对应的 SQL 比较符 (IN 由执行器展开占位符)
    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "<>",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
        }
    }

    fn parse(sign: &str) -> Option<Self> {
        match sign.to_ascii_lowercase().as_str() {
            "eq" => Some(Operator::Eq),
            "neq" => Some(Operator::Neq),
            "lk" => Some(Operator::Like),
            "in" => Some(Operator::In),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            _ => None,
        }
    }
}

/// SQL 绑定值, 全部走参数绑定而不拼进 SQL 文本
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Real(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl SqlValue {
    fn from_json(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => SqlValue::Null,
            serde_json::Value::Bool(b) => SqlValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    SqlValue::Real(f)
                } else {
                    SqlValue::Text(n.to_string())
                }
            }
            serde_json::Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Text(other.to_string()),
        }
    }

    /// LIKE 模糊匹配的 `%值%` 形式
    fn into_like_pattern(self) -> String {
        let raw = match self {
            SqlValue::Text(s) => s,
            SqlValue::Int(i) => i.to_string(),
            SqlValue::Real(f) => f.to_string(),
            SqlValue::Bool(b) => b.to_string(),
            SqlValue::Null => String::new(),
        };
        format!("%{raw}%")
    }
}

/// 单个过滤谓词
///
/// column 取自白名单中的静态列名, 客户端原始字符串不会进入 SQL。
#[derive(Debug, Clone)]
pub struct SearchPredicate {
    pub column: &'static str,
    pub op: Operator,
    /// IN 为多值, 其余恰好单值
    pub values: Vec<SqlValue>,
}

/// 原始三元组, JSON 形状与请求一致
#[derive(Debug, Deserialize)]
struct RawParam {
    param: String,
    sign: String,
    val: serde_json::Value,
}

/// 解析 `params` 参数为谓词序列
///
/// - 过滤只在 GET 请求上有意义, 其他方法携带过滤参数直接拒绝
/// - raw 缺省或空串时返回空谓词
pub fn parse_predicates(
    method: &Method,
    raw: Option<&str>,
    allowed: &[&'static str],
) -> AppResult<Vec<SearchPredicate>> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    if method != Method::GET {
        return Err(AppError::validation(format!(
            "Filter params are only supported on GET requests, got {method}"
        )));
    }

    // 兼容二次编码的客户端: 框架解一层后再显式解一层
    let decoded = urlencoding::decode(raw)
        .map_err(|e| AppError::validation(format!("Malformed filter encoding: {e}")))?;

    let raw_params: Vec<RawParam> = serde_json::from_str(&decoded)
        .map_err(|e| AppError::validation(format!("Malformed filter JSON: {e}")))?;

    let mut predicates = Vec::with_capacity(raw_params.len());
    for rp in raw_params {
        let Some(op) = Operator::parse(&rp.sign) else {
            return Err(AppError::validation(format!(
                "Unknown filter operator: {}",
                rp.sign
            )));
        };
        let Some(column) = allowed.iter().copied().find(|c| *c == rp.param) else {
            return Err(AppError::validation(format!(
                "Field is not filterable: {}",
                rp.param
            )));
        };

        let values = match op {
            Operator::Like => vec![SqlValue::Text(
                SqlValue::from_json(&rp.val).into_like_pattern(),
            )],
            Operator::In => explode_in_values(&rp.val),
            _ => vec![SqlValue::from_json(&rp.val)],
        };
        if values.is_empty() {
            return Err(AppError::validation(format!(
                "Empty value list for field: {}",
                rp.param
            )));
        }

        predicates.push(SearchPredicate { column, op, values });
    }
    Ok(predicates)
}

/// IN 的取值集合: JSON 数组逐项取, 字符串按逗号拆
fn explode_in_values(val: &serde_json::Value) -> Vec<SqlValue> {
    match val {
        serde_json::Value::Array(items) => items.iter().map(SqlValue::from_json).collect(),
        serde_json::Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<i64>()
                    .map(SqlValue::Int)
                    .unwrap_or_else(|_| SqlValue::Text(p.to_string()))
            })
            .collect(),
        other => vec![SqlValue::from_json(other)],
    }
}
