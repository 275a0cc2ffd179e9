//! API Gateway - HTTP REST API for wishlist items and orders.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_lib::config::GatewayConfig;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "API Gateway for wishlist items and orders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "GATEWAY_PORT", default_value = "3000")]
        port: u16,
        /// Customer/order pairs to insert before accepting requests
        #[arg(long, default_value = "0")]
        preload: u64,
    },
    /// Insert synthetic customer/order pairs
    Seed {
        /// Pairs are numbered from start + 1
        #[arg(long, default_value = "0")]
        start: u64,
        /// Number of pairs to insert
        #[arg(long, default_value = "1000")]
        count: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = GatewayConfig::from_env();

    match cli.command {
        Commands::Serve { host, port, preload } => {
            config.host = host;
            config.port = port;
            gateway_lib::run_server(config, preload).await?;
        }
        Commands::Seed { start, count } => {
            let connection = gateway_lib::connect(&config);
            let written = gateway_lib::seed(connection, &config, start, count).await?;
            println!("Inserted {} customer/order pairs", written);
        }
    }

    Ok(())
}
