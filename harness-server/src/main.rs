use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Declarative test harness for script-language smart contracts: decodes a
/// batch of actions over HTTP and runs them against a sandboxed node.
#[derive(Debug, Parser)]
#[command(name = "harness-server", version, about)]
struct Cli {
    /// Path to a TOML configuration file. Missing is not an error; the
    /// compiled-in defaults apply.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = harness_server::load_config(cli.config.as_ref())?;

    harness_tracing::init_tracing(config.log_location.as_ref())?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "harness-server listening");

    let router = harness_server::router(config).into_make_service_with_connect_info::<SocketAddr>();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on ctrl-c, letting `axum::serve`'s graceful shutdown begin
/// draining in-flight requests. Also arms a watchdog that force-exits the
/// process 10s after the signal if the drain hasn't finished by then.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install ctrl-c handler");
    }
    tracing::info!("shutdown signal received, draining in-flight requests");

    tokio::spawn(async {
        tokio::time::sleep(Duration::from_secs(10)).await;
        harness_tracing::println_yellow_err("shutdown drain window elapsed, exiting anyway");
        std::process::exit(0);
    });
}
