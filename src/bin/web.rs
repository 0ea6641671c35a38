//! Hive HTTP 服务
//!
//! 启动: cargo run --bin hive-web
//! 监听地址取 [server].bind，默认 http://127.0.0.1:5000

use std::sync::Arc;

use anyhow::Context;
use hive::api::http::create_router;
use hive::config::load_config;
use hive::core::Orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hive::observability::init();

    let cfg = load_config(None).context("Failed to load config")?;
    let orch = Arc::new(Orchestrator::from_config(&cfg));
    if cfg.server.seed_examples {
        orch.seed_examples()
            .await
            .context("Failed to seed example types")?;
    }

    let app = create_router(orch);
    let listener = tokio::net::TcpListener::bind(&cfg.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.bind))?;
    tracing::info!("{} HTTP: http://{}", cfg.app.display_name(), cfg.server.bind);
    axum::serve(listener, app).await?;

    Ok(())
}
