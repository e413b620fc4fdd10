use std::sync::Arc;

use anyhow::Context;
use depth_gateway::config::{CONFIG_PATH_ENV, GatewayConfigFile};
use depth_gateway::{
    RestClient, SessionOrchestrator, TracingReporter, WsClient, WsConnector, load_config,
    load_default_config,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn print_help() {
    println!(
        r#"depth-gateway - local order book mirror

USAGE:
    depth-gateway [OPTIONS] [SYMBOL...]

OPTIONS:
    -c, --config <PATH>    JSON config file (default: ${} or embedded)
    -h, --help             Print this help

SYMBOL arguments replace the configured symbol list.

ENVIRONMENT:
    RUST_LOG               Log filter (default: depth_gateway=info)
    BINANCE_API_KEY        Overrides exchange.api_key
"#,
        CONFIG_PATH_ENV
    );
}

fn load(config_path: Option<String>) -> anyhow::Result<GatewayConfigFile> {
    let path = config_path.or_else(|| std::env::var(CONFIG_PATH_ENV).ok());
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            load_config(&path).with_context(|| format!("loading {}", path))
        }
        None => load_default_config().context("loading embedded configuration"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("depth_gateway=info")),
        )
        .init();

    let mut config_path: Option<String> = None;
    let mut symbols: Vec<String> = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                let path = args.next().context("--config requires a path argument")?;
                config_path = Some(path);
            }
            _ => symbols.push(arg),
        }
    }

    let mut config = load(config_path)?;
    config.apply_env();
    if !symbols.is_empty() {
        config = config.with_symbols(symbols);
    }
    config.validate()?;

    tracing::info!(
        exchange = %config.exchange.name,
        symbols = ?config.symbols,
        "Starting depth gateway"
    );

    let provider = RestClient::new(config.exchange.rest_url.clone())
        .with_api_key(config.exchange.api_key.clone())
        .with_limit(config.exchange.snapshot_limit);
    let connector = WsConnector::new(WsClient::new(&config.exchange.ws_url)?);

    let orchestrator = SessionOrchestrator::new(
        Arc::new(provider),
        Arc::new(connector),
        Arc::new(TracingReporter),
        config.session.to_session_config(),
    );

    let shutdown = orchestrator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping sessions");
            shutdown.shutdown();
        }
    });

    let outcomes = orchestrator.run_all(config.symbols()).await;

    let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();

    if failed > 0 {
        anyhow::bail!("{} of {} sessions failed", failed, outcomes.len());
    }
    Ok(())
}
