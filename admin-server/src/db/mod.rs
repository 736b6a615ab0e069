//! 数据库层
//!
//! SQLite 连接池、迁移和仓储。
//!
//! - [`DbService`] - 连接池句柄 (WAL 模式)
//! - [`models`] - 实体与载荷
//! - [`repository`] - 按实体划分的仓储函数

pub mod models;
pub mod repository;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};

use crate::auth::password;
use crate::utils::{AppError, AppResult, id, time};

/// 数据库服务, 持有 SQLite 连接池
///
/// 句柄显式传入仓储函数, 不走全局单例。
#[derive(Debug, Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// 打开 (或创建) 数据库文件并应用迁移
    pub async fn new(db_path: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .optimize_on_close(true, None);

        Self::connect(options, 5).await
    }

    /// 内存数据库 (测试用)
    ///
    /// 连接数固定为 1: 每个 `:memory:` 连接都是独立的库,
    /// 多连接会各自看到一张空表。
    pub async fn in_memory() -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid connect options: {e}")))?
            .pragma("foreign_keys", "ON");

        Self::connect(options, 1).await
    }

    async fn connect(options: SqliteConnectOptions, max_connections: u32) -> AppResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        // 写冲突时等待 5s 而不是立即返回 SQLITE_BUSY
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set busy_timeout: {e}")))?;

        sqlx::migrate!("./migrations")
            .set_ignore_missing(true)
            .run(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;

        tracing::info!("Database ready (SQLite, busy_timeout=5000ms)");

        Ok(Self { pool })
    }
}

/// 确保默认管理员账号存在 (首次启动引导)
///
/// 迁移只负责角色/权限种子; admin 用户的密码哈希需要随机盐,
/// 所以在这里创建。密码取 ADMIN_INITIAL_PASSWORD, 未设置时
/// 用 admin123 并打警告。
pub async fn ensure_default_admin(pool: &SqlitePool) -> AppResult<()> {
    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM users WHERE username = 'admin' AND deleted_at IS NULL",
    )
    .fetch_one(pool)
    .await?;
    if existing > 0 {
        return Ok(());
    }

    let initial_password = std::env::var("ADMIN_INITIAL_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!(
            "ADMIN_INITIAL_PASSWORD not set, default admin password is 'admin123', change it immediately"
        );
        "admin123".to_string()
    });
    let hash = password::hash_password(&initial_password)?;

    let admin_role = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM roles WHERE code = 'ADMIN' AND deleted_at IS NULL",
    )
    .fetch_optional(pool)
    .await?;

    let now = time::now_millis();
    let user_id = id::next_id();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO users (id, username, password, nickname, status, created_at, updated_at) \
         VALUES (?1, 'admin', ?2, 'Administrator', 1, ?3, ?3)",
    )
    .bind(user_id)
    .bind(&hash)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if let Some(role_id) = admin_role {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!(user_id, "Default admin account created");
    Ok(())
}
