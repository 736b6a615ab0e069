//! 关联表行
//!
//! 多对多关联的裸行, 存在即生效, 没有独立状态。
//! 关联行始终物理删除, 软删除会让联合主键在重建时冲突。

use serde::Serialize;

/// 角色-权限授权行 (role_permissions 表)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RolePermissionLink {
    pub role_id: i64,
    pub permission_id: i64,
}

/// 用户-角色分配行 (user_roles 表)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserRoleLink {
    pub user_id: i64,
    pub role_id: i64,
}
