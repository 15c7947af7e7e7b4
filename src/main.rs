use anyhow::Context;
use products_crud::infrastructure::{config::AppConfig, database::Database, logger::Logger};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("加载配置失败")?;
    Logger::init(&config.logging);

    if let Err(e) = run(config).await {
        error!("服务异常退出: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting products service...");

    let target = config.database.target()?;
    let db = Database::connect(&target, &config.pool)
        .await
        .context("初始化数据库连接池失败")?;

    if config.database.init_schema {
        db.create_products_table().await?;
    }

    let app = products_crud::build_app(db.clone());

    let addr = config.http.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("无法绑定到 {}", addr))?;

    info!("🚀 Products service running on http://{}", listener.local_addr()?);
    info!("📖 Available endpoints:");
    info!("   GET    /              - Product manager page");
    info!("   GET    /health        - Health check");
    info!("   GET    /api/products  - List products");
    info!("   POST   /api/products  - Create product {{product_name}}");
    info!("   PUT    /api/products  - Update product {{product_id, product_name}}");
    info!("   DELETE /api/products  - Delete product {{product_id}}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("无法监听 Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到退出信号，正在关闭...");
}
