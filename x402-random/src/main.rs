use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use x402_random::{
    app,
    config::{AppConfig, Cli},
    telemetry,
};

const SUPPORTED_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(cli.log_format);

    let config = AppConfig::from_cli(cli).context("invalid configuration")?;
    tracing::info!(
        network = %config.network,
        price = %config.price,
        pay_to = %config.pay_to,
        resource = %config.resource_url,
        "Starting x402-random"
    );
    if !config.network.is_testnet() && config.facilitator.url.is_none() {
        tracing::info!(
            facilitator = ?config.facilitator.preset,
            "Accepting mainnet payments; make sure the facilitator settles on {}",
            config.network
        );
    }

    let facilitator = config.facilitator.client()?;
    tracing::info!("Using facilitator at {}", facilitator.base_url);

    let paywall = app::paywall(&config, facilitator)?;
    match tokio::time::timeout(SUPPORTED_PROBE_TIMEOUT, paywall.check_supported()).await {
        Ok(Ok(unsupported)) if unsupported.is_empty() => {
            tracing::info!("Facilitator supports all configured payment kinds");
        }
        Ok(Ok(_)) => {}
        Ok(Err(err)) => tracing::warn!("Failed to query facilitator supported kinds: {err}"),
        Err(_) => tracing::warn!("Facilitator did not answer the supported kinds query in time"),
    }

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.listen_addr))?;

    tracing::info!("Server running at http://{}", config.listen_addr);
    axum::serve(listener, app::router(paywall))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
