//! Courier server binary.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port
//! courier-server
//!
//! # Bind elsewhere with verbose logging
//! courier-server --bind 0.0.0.0:9000 --log-level debug
//! ```

use clap::Parser;
use courier_server::{Server, ServerConfig, ServerError};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Courier messaging server
#[derive(Parser, Debug)]
#[command(name = "courier-server")]
#[command(about = "Courier instant-messaging server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8877")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Courier server starting");

    let server = Server::bind(ServerConfig { bind_address: args.bind }).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await
}
