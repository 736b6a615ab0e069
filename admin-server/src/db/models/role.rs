//! 角色模型

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::types::Status;
use crate::query::Queryable;

/// 角色实体 (roles 表)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    /// 显示名, 如 "系统管理员"
    pub name: String,
    /// 稳定标识, 如 "ADMIN"
    pub code: String,
    pub remark: Option<String>,
    pub status: Status,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing)]
    pub deleted_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RoleOption {
    pub id: i64,
    pub name: String,
}

impl Queryable for Role {
    type Simple = RoleOption;

    const TABLE: &'static str = "roles";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "code",
        "remark",
        "status",
        "created_at",
        "updated_at",
        "deleted_at",
    ];
    const FILTERABLE: &'static [&'static str] = &["name", "code", "status"];
}

/// 创建角色请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleCreate {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    #[validate(length(min = 2, max = 50))]
    pub code: String,
    #[validate(length(max = 255))]
    pub remark: Option<String>,
    pub status: Option<Status>,
}

/// 更新角色请求, None 的字段保持原值
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoleUpdate {
    #[validate(length(min = 2, max = 50))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 50))]
    pub code: Option<String>,
    #[validate(length(max = 255))]
    pub remark: Option<String>,
    pub status: Option<Status>,
}
