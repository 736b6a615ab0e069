//! 核心模块: 配置、状态、服务器

mod config;
mod server;
mod state;

pub use config::Config;
pub use server::{Server, build_app, build_router};
pub use state::ServerState;

/// 进程启动准备: dotenv、工作目录、日志
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let work_dir =
        std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/admin-server".to_string());
    std::fs::create_dir_all(&work_dir)?;

    let log_dir = std::env::var("LOG_DIR").ok();
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }

    crate::utils::logger::init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.as_deref(),
    );
    Ok(())
}
