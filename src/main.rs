mod cli;
mod server;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    assetbox::observability::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => server::run(args).await?,
    }

    Ok(())
}
