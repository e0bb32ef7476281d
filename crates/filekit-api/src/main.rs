use filekit_core::Config;
use filekit_infra::{init_telemetry, LogFormat};
use tokio_util::sync::CancellationToken;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = Config::from_env()?;
    tracing::info!(environment = %config.environment, "Configuration loaded and validated successfully");

    let shutdown = CancellationToken::new();
    let (_state, router) =
        filekit_api::setup::initialize_app(config.clone(), shutdown.clone()).await?;

    filekit_api::setup::server::start_server(&config, router, shutdown).await?;

    Ok(())
}
