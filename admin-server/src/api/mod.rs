//! API 路由
//!
//! 每个实体一个子模块, `mod.rs` 装配路由 (读写分组,
//! 写路由挂权限码中间件), `handler.rs` 放处理函数。
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录 / 刷新令牌
//! - [`users`] - 用户管理
//! - [`roles`] - 角色管理与授权
//! - [`permissions`] - 权限树管理

pub mod auth;
pub mod health;
pub mod permissions;
pub mod roles;
pub mod users;
