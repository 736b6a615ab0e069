//! 仓储层
//!
//! sqlx 自由函数仓储: 读操作接 `&SqlitePool`; 跨表的写操作在
//! 内部 `pool.begin()` 开启事务并显式提交, 中途出错让事务随
//! drop 回滚。
//!
//! 软删除约定: 实体行 UPDATE deleted_at, 关联行物理 DELETE。

pub mod permission;
pub mod role;
pub mod user;
