use invoice_audit_rust::{router, AppConfig, AppState, HttpBackend};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 抽取/审核后端客户端
    let backend = HttpBackend::new(&config.backend)?;
    info!("Audit backend at {}", config.backend.base_url);

    let state = AppState::new(backend).with_upload_limit(config.server.max_upload_bytes);
    let app = router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/sessions                     - start provider wizard");
    info!("  POST   /api/sessions/:id/invoice         - upload invoice");
    info!("  POST   /api/sessions/:id/confirm         - confirm invoice data");
    info!("  POST   /api/sessions/:id/annexes         - upload annexes");
    info!("  GET    /api/sessions/:id/reconciliation  - invoice vs annexes");
    info!("  POST   /api/sessions/:id/submit          - final submission");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
