//! 用户模型

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::role::Role;
use super::types::Status;
use crate::query::Queryable;

/// 用户实体 (users 表)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// argon2 PHC 哈希串, 永不序列化
    #[serde(skip_serializing)]
    pub password: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Status,
    /// 创建时间 (毫秒时间戳)
    pub created_at: i64,
    /// 更新时间 (毫秒时间戳)
    pub updated_at: i64,
    #[serde(skip_serializing)]
    pub deleted_at: Option<i64>,
    /// 持有的角色, 查询时填充, 不落库
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

/// 下拉框场景的精简行
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserOption {
    pub id: i64,
    pub username: String,
}

impl Queryable for User {
    type Simple = UserOption;

    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "username",
        "password",
        "nickname",
        "email",
        "phone",
        "status",
        "created_at",
        "updated_at",
        "deleted_at",
    ];
    const SIMPLE_COLUMNS: &'static [&'static str] = &["id", "username"];
    const FILTERABLE: &'static [&'static str] =
        &["username", "nickname", "email", "phone", "status"];
}

/// 创建用户请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(max = 50))]
    pub nickname: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    /// 缺省为启用
    pub status: Option<Status>,
    /// 创建时一并分配的角色
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// 更新用户请求, None 的字段保持原值
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserUpdate {
    #[validate(length(max = 50))]
    pub nickname: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub status: Option<Status>,
    /// Some 时整组替换用户的角色分配
    pub role_ids: Option<Vec<i64>>,
}

/// 修改密码请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PasswordUpdate {
    #[validate(length(min = 1, max = 128))]
    pub old_password: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
    pub confirm_password: String,
}
