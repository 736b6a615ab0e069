use admin_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境准备: dotenv、工作目录、日志
    setup_environment()?;

    print_banner();
    tracing::info!("Admin server starting...");

    // 2. 加载配置
    let config = Config::from_env();
    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        database = %config.database_path,
        "Configuration loaded"
    );

    // 3. 初始化状态: 数据库、迁移、默认管理员
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
