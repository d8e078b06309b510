//! convert: converterd CLI client
//!
//! Runs single conversions, streams, or the full demo against converterd.

use std::io::{self, BufRead, IsTerminal};
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use converter::client::{DemoOptions, ServiceClient, run_demo};
use converter::{Conversion, SeriesRequest, UnitConverter};

/// Converter CLI client
#[derive(Parser)]
#[command(name = "convert")]
#[command(version = converter::PKG_VERSION)]
#[command(about = "Unit conversion client for converterd")]
struct Args {
    /// Server address
    #[arg(
        short,
        long,
        env = "CONVERTER_ADDRESS",
        default_value = "http://127.0.0.1:5264"
    )]
    address: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check service health
    Health,

    /// Convert a single value
    Unary {
        /// Conversion, e.g. euro-to-dollar, km-to-miles, c2f
        conversion: Conversion,
        /// Value to convert
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Stream conversions of consecutive values
    Series {
        /// First value
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        start: f64,
        /// Number of values
        #[arg(short = 'n', long, default_value_t = 5)]
        count: u32,
        /// Conversion to apply
        #[arg(short, long, default_value = "celsius-to-fahrenheit")]
        conversion: Conversion,
    },

    /// Convert Celsius values over a bidirectional stream
    Stream {
        /// Values to send (or omit to read one per line from stdin)
        #[arg(allow_negative_numbers = true)]
        values: Vec<f64>,
    },

    /// Run every call shape in turn
    Demo {
        /// Delay between values sent over the bidirectional stream, in ms
        #[arg(long, default_value_t = 300)]
        pace_ms: u64,
        /// Print the report as JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let client = ServiceClient::connect(&args.address).await?;

    match args.command {
        Command::Health => {
            let (healthy, version, git_sha) = client.health().await?;
            let status = if healthy { "healthy" } else { "unhealthy" };
            println!(
                "converterd {version} ({})",
                git_sha.as_deref().unwrap_or("unknown")
            );
            println!("status: {status}");
        }

        Command::Unary { conversion, value } => {
            let reply = client.convert(conversion, value).await?;
            println!("{}", reply.description);
        }

        Command::Series {
            start,
            count,
            conversion,
        } => {
            let request = SeriesRequest::new(conversion, start, count);
            let mut stream = client.convert_series(request).await?;
            while let Some(reply) = stream.next().await {
                println!("{}", reply?.description);
            }
        }

        Command::Stream { values } => {
            let (tx, rx) = mpsc::channel(1);

            // Send from a separate task so replies print as they arrive.
            tokio::spawn(async move {
                if values.is_empty() {
                    let (line_tx, mut line_rx) = mpsc::channel::<String>(1);
                    std::thread::spawn(move || read_stdin_lines(line_tx));
                    while let Some(line) = line_rx.recv().await {
                        let parsed = line.trim().parse::<f64>().map_err(|e| {
                            converter::ConverterError::InvalidInput(format!("'{line}': {e}"))
                        });
                        if tx.send(parsed).await.is_err() {
                            break;
                        }
                    }
                } else {
                    for value in values {
                        if tx.send(Ok(value)).await.is_err() {
                            break;
                        }
                    }
                }
            });

            let mut stream = client
                .convert_stream(
                    Conversion::CelsiusToFahrenheit,
                    Box::pin(ReceiverStream::new(rx)),
                )
                .await?;
            while let Some(reply) = stream.next().await {
                println!("{}", reply?.description);
            }
        }

        Command::Demo { pace_ms, json } => {
            let options = DemoOptions {
                send_pacing: Duration::from_millis(pace_ms),
                ..DemoOptions::default()
            };
            let report = if json {
                let report = run_demo(&client, &options, |_| {}).await;
                println!("{}", serde_json::to_string_pretty(&report)?);
                report
            } else {
                println!("Connected to converterd at {}", args.address);
                run_demo(&client, &options, |line| println!("{line}")).await
            };
            if !report.all_ok() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Forward non-empty stdin lines until EOF or the receiver goes away.
fn read_stdin_lines(tx: mpsc::Sender<String>) {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("enter Celsius values, one per line (Ctrl-D to finish)");
    }
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        if tx.blocking_send(line).is_err() {
            break;
        }
    }
}
