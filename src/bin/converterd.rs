//! converterd: unit conversion daemon.
//!
//! Serves an [`EmbeddedConverter`](converter::EmbeddedConverter) over gRPC.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use converter::server::config::Config;
use converter::server::service::serve;

/// Converter daemon: unit conversions over gRPC.
#[derive(Parser)]
#[command(name = "converterd")]
#[command(version = converter::PKG_VERSION)]
#[command(about = "Unit conversion gRPC daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Address to bind to, overriding the configuration file.
    #[arg(short, long, env = "CONVERTERD_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: info for the daemon; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }

    let embedded = Arc::new(config.build_converter()?);

    // Parse address
    let addr: SocketAddr = config.server.address.parse().map_err(|e| {
        converter::ConverterError::Configuration(format!("Invalid address: {e}"))
    })?;

    info!(version = converter::version_string(), %addr, "converterd starting");

    let listener = TcpListener::bind(addr).await?;
    let shutdown_handle = Arc::clone(&embedded);
    serve(embedded, listener, async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown requested");
        // Cancel in-flight streams.
        shutdown_handle.shutdown();
    })
    .await?;

    Ok(())
}
