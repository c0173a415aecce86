//! CLI surface: argument parsing, command dispatch, output formatting.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

pub use output::{output, truncate, CommandOutput};

#[derive(Parser)]
#[command(name = "reviewflow", version, about = "Review automation workflow engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize configuration and database
    Init {
        /// Force reinitialization even if already initialized
        #[arg(short, long)]
        force: bool,
    },

    /// Workflow management commands
    Workflow(commands::workflow::WorkflowArgs),

    /// Execution history commands
    Execution(commands::execution::ExecutionArgs),

    /// Durable workflow log commands
    Log(commands::log::LogArgs),
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let payload = serde_json::json!({ "error": err.to_string() });
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&payload).unwrap_or_default()
        );
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
