use order_server::{Config, Server, ServerState, print_banner, setup_environment};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. .env → 配置
    dotenv::dotenv().ok();
    let config = Config::from_env();

    // 2. 工作目录、日志
    let _log_guard = setup_environment(&config)?;

    print_banner();
    tracing::info!(
        environment = %config.environment,
        storage = ?config.storage,
        "Order server starting..."
    );

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务器 (Server::run 会启动后台任务)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
