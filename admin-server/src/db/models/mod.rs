//! 数据模型
//!
//! 实体结构与请求/响应载荷。实体用 `sqlx::FromRow` 直接从行解码,
//! 载荷用 `validator` 声明字段约束。

mod link;
mod permission;
mod role;
mod types;
mod user;

pub use link::{RolePermissionLink, UserRoleLink};
pub use permission::{Permission, PermissionCreate, PermissionOption, PermissionUpdate};
pub use role::{Role, RoleCreate, RoleOption, RoleUpdate};
pub use types::{PermissionKind, Status};
pub use user::{PasswordUpdate, User, UserCreate, UserOption, UserUpdate};
