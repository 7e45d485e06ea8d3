use rallyd::{ServerBuilder, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        bind = %config.bind_addr,
        stats = %config.stats_url,
        ai = %config.ai_url,
        "starting rallyd"
    );

    let server = ServerBuilder::with_config(config).build().await?;
    server.run().await?;
    Ok(())
}
