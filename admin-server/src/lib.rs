//! Admin Server - RBAC 后台管理服务
//!
//! 用户/角色/权限三实体的管理后端: JWT 认证、权限码授权、
//! 声明式列表查询、权限树和整组替换式的关联维护。
//!
//! # 模块结构
//!
//! ```text
//! admin-server/src/
//! ├── core/          # 配置、状态、服务器装配
//! ├── auth/          # JWT、密码哈希、认证中间件
//! ├── api/           # HTTP 路由和处理函数
//! ├── query/         # 动态查询引擎 (过滤/分页/投影)
//! ├── rbac/          # 权限树与关联同步
//! ├── db/            # 连接池、模型、仓储
//! └── utils/         # 错误、日志、id、时间
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod query;
pub mod rbac;
pub mod utils;

// 常用类型直接从根导出
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app, setup_environment};
pub use db::DbService;
pub use utils::logger::{init_logger, init_logger_with_file};
pub use utils::{AppError, AppResponse, AppResult};

/// 安全事件日志, 固定 target 便于单独过滤/落盘
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 启动横幅
pub fn print_banner() {
    println!(
        r#"
    ___       __          _
   /   | ____/ /___ ___  (_)___
  / /| |/ __  / __ `__ \/ / __ \
 / ___ / /_/ / / / / / / / / / /
/_/  |_\__,_/_/ /_/ /_/_/_/ /_/
         admin-server v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
