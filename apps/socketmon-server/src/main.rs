mod config;

use socketmon::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .compact()
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        addr = %config.bind_addr(),
        grid_size = config.grid.size(),
        idle_timeout_secs = config.idle_timeout.as_secs(),
        "starting Socketmon"
    );

    let server = SocketmonServerBuilder::new()
        .bind(&config.bind_addr())
        .grid(config.grid)
        .idle_timeout(config.idle_timeout)
        .build()
        .await?;

    println!("Socketmon listening on ws://{}", server.local_addr()?);

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
