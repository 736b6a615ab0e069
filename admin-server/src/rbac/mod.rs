//! RBAC 层级与关联
//!
//! - [`tree`] - 权限树构建与子树收集
//! - [`sync`] - 多对多关联的整组替换

pub mod sync;
pub mod tree;
