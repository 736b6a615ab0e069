//! 权限模型
//!
//! 权限是一棵树: menu 节点构成骨架 (目录/页面),
//! button 节点是挂在 menu 下的动作点。parent_id = 0 表示根。

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::types::{PermissionKind, Status};
use crate::query::Queryable;

/// 权限实体 (permissions 表)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub kind: PermissionKind,
    /// 前端路由路径 (menu)
    pub path: Option<String>,
    /// 权限码, 如 "user:create"
    pub code: String,
    /// 前端组件 (menu)
    pub component: Option<String>,
    pub icon: Option<String>,
    /// 同层排序值, 小的在前
    pub sort: i64,
    /// 父节点 id, 0 为根
    pub parent_id: i64,
    pub remark: Option<String>,
    pub status: Status,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_serializing)]
    pub deleted_at: Option<i64>,
    /// 子节点, 树构建时填充, 不落库
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Permission>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PermissionOption {
    pub id: i64,
    pub name: String,
}

impl Queryable for Permission {
    type Simple = PermissionOption;

    const TABLE: &'static str = "permissions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "kind",
        "path",
        "code",
        "component",
        "icon",
        "sort",
        "parent_id",
        "remark",
        "status",
        "created_at",
        "updated_at",
        "deleted_at",
    ];
    const FILTERABLE: &'static [&'static str] = &["name", "code", "kind", "status"];
    const DEFAULT_ORDER: &'static str = "sort ASC, id ASC";
}

/// 创建权限请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionCreate {
    #[validate(length(min = 2, max = 50))]
    pub name: String,
    pub kind: PermissionKind,
    #[validate(length(max = 255))]
    pub path: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub code: String,
    #[validate(length(max = 255))]
    pub component: Option<String>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    pub sort: Option<i64>,
    /// 缺省挂在根下
    #[serde(default)]
    pub parent_id: i64,
    #[validate(length(max = 255))]
    pub remark: Option<String>,
    pub status: Option<Status>,
}

/// 更新权限请求, None 的字段保持原值
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PermissionUpdate {
    #[validate(length(min = 2, max = 50))]
    pub name: Option<String>,
    pub kind: Option<PermissionKind>,
    #[validate(length(max = 255))]
    pub path: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub code: Option<String>,
    #[validate(length(max = 255))]
    pub component: Option<String>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
    pub sort: Option<i64>,
    pub parent_id: Option<i64>,
    #[validate(length(max = 255))]
    pub remark: Option<String>,
    pub status: Option<Status>,
}
