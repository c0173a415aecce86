//! Reviewflow CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reviewflow::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { force } => reviewflow::cli::commands::init::execute(force, cli.json).await,
        Commands::Workflow(args) => reviewflow::cli::commands::workflow::execute(args, cli.json).await,
        Commands::Execution(args) => {
            reviewflow::cli::commands::execution::execute(args, cli.json).await
        }
        Commands::Log(args) => reviewflow::cli::commands::log::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        reviewflow::cli::handle_error(err, cli.json);
    }
}
