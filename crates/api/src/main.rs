use anyhow::Context;

use turfbook_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    turfbook_observability::init();

    let config = AppConfig::from_env();
    let port = config.port;
    let app = turfbook_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{port}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
