//! 服务器共享状态

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::{self, DbService};
use crate::utils::AppResult;

/// 服务器状态, 持有各服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置 (不可变) |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 令牌服务 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 初始化: 打开数据库、应用迁移、引导默认管理员
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        db::ensure_default_admin(&db.pool).await?;

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
        })
    }

    /// 基于现成连接池构造状态 (测试场景)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
        }
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
