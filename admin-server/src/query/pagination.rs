//! 分页参数与分页响应

use serde::{Deserialize, Serialize};

/// 默认页码
pub const DEFAULT_PAGE: i64 = 1;
/// 默认每页条数
pub const DEFAULT_SIZE: i64 = 10;

/// 列表查询的原始请求参数
///
/// page/size 容错解析: 非数字或空串回退默认值而不是报错,
/// 老客户端会把数字以字符串形式传上来。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "lenient::int_or_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int_or_none")]
    pub size: Option<i64>,
    /// 精简投影开关
    #[serde(default, deserialize_with = "lenient::bool_flag")]
    pub simple: bool,
    /// 全量模式: 不分页、不计数
    #[serde(default, deserialize_with = "lenient::bool_flag")]
    pub complete: bool,
    /// URL 编码的 JSON 过滤数组
    pub params: Option<String>,
}

/// 规范化 page/size: 缺省或小于 1 时取默认值
pub fn normalize(page: Option<i64>, size: Option<i64>) -> (i64, i64) {
    let page = match page {
        Some(p) if p >= 1 => p,
        _ => DEFAULT_PAGE,
    };
    let size = match size {
        Some(s) if s >= 1 => s,
        _ => DEFAULT_SIZE,
    };
    (page, size)
}

/// 页码换算为行偏移
pub fn offset(page: i64, size: i64) -> i64 {
    (page - 1) * size
}

/// 分页响应信封
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    pub list: Vec<T>,
    /// complete 模式下不计算总数, 序列化时整个字段省略
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    pub page: i64,
    pub size: i64,
}

impl<T> PageResponse<T> {
    pub fn paged(list: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        Self {
            list,
            total: Some(total),
            page,
            size,
        }
    }

    pub fn complete(list: Vec<T>, page: i64, size: i64) -> Self {
        Self {
            list,
            total: None,
            page,
            size,
        }
    }

    /// 变换行类型, 保留分页元数据
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            list: self.list.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            size: self.size,
        }
    }
}

mod lenient {
    use std::fmt;

    use serde::Deserializer;
    use serde::de::Visitor;

    /// 接受数字或数字字符串, 解析失败回退 None
    pub(super) fn int_or_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IntVisitor;

        impl<'de> Visitor<'de> for IntVisitor {
            type Value = Option<i64>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an integer or a string containing an integer")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Some(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(i64::try_from(v).ok())
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(v.trim().parse().ok())
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D2>(self, d: D2) -> Result<Self::Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                d.deserialize_any(IntVisitor)
            }
        }

        deserializer.deserialize_any(IntVisitor)
    }

    /// 布尔开关: 接受 true/"true"/"1", 其余一律 false
    pub(super) fn bool_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = bool;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a boolean or boolean-like string")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(v)
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(v == 1)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(v == 1)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(matches!(v.trim(), "true" | "1"))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(false)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(false)
            }

            fn visit_some<D2>(self, d: D2) -> Result<Self::Value, D2::Error>
            where
                D2: Deserializer<'de>,
            {
                d.deserialize_any(FlagVisitor)
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_applies_defaults() {
        assert_eq!(normalize(None, None), (1, 10));
        assert_eq!(normalize(Some(3), Some(25)), (3, 25));
    }

    #[test]
    fn normalize_floors_bad_values() {
        assert_eq!(normalize(Some(0), Some(0)), (1, 10));
        assert_eq!(normalize(Some(-5), Some(-1)), (1, 10));
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(offset(1, 10), 0);
        assert_eq!(offset(2, 10), 10);
        assert_eq!(offset(4, 7), 21);
    }

    #[test]
    fn lenient_params_accept_strings_and_numbers() {
        let p: ListParams = serde_urlencoded::from_str("page=2&size=50").unwrap();
        assert_eq!(p.page, Some(2));
        assert_eq!(p.size, Some(50));

        let p: ListParams = serde_urlencoded::from_str("page=abc&size=").unwrap();
        assert_eq!(p.page, None);
        assert_eq!(p.size, None);
        let (page, size) = normalize(p.page, p.size);
        assert_eq!((page, size), (1, 10));
    }

    #[test]
    fn lenient_flags() {
        let p: ListParams = serde_urlencoded::from_str("simple=true&complete=1").unwrap();
        assert!(p.simple);
        assert!(p.complete);

        let p: ListParams = serde_urlencoded::from_str("simple=yes&complete=0").unwrap();
        assert!(!p.simple);
        assert!(!p.complete);
    }

    #[test]
    fn complete_response_omits_total() {
        let resp = PageResponse::complete(vec![1, 2, 3], 1, 10);
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("total").is_none());

        let resp = PageResponse::paged(vec![1, 2, 3], 3, 1, 10);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["total"], 3);
    }
}
