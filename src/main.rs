use anyhow::Result;
use clap::Parser;

mod auth;
mod cli;
mod config;
mod error;
mod handlers;
mod identity;
mod notify;
mod router;
mod schemas;
mod scope;
mod test_utils;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap resolves env-backed arguments
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.run().await?;

    Ok(())
}
