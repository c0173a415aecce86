//! Durable workflow log CLI commands.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::adapters::sqlite::{initialize_default_database, SqliteLogRepository};
use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::log::{LogEntry, LogLevel};
use crate::domain::ports::{LogFilters, LogRepository};

#[derive(Args, Debug)]
pub struct LogArgs {
    #[command(subcommand)]
    pub command: LogCommands,
}

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// List log entries, newest first
    List {
        /// Filter by workflow ID
        #[arg(long)]
        workflow: Option<Uuid>,
        /// Filter by execution ID
        #[arg(long)]
        execution: Option<Uuid>,
        /// Filter by level (info, error)
        #[arg(long)]
        level: Option<String>,
        /// Maximum rows to show
        #[arg(long, default_value = "100")]
        limit: i64,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct LogEntrySummary {
    pub created_at: String,
    pub level: String,
    pub workflow_id: String,
    pub execution_id: Option<String>,
    pub action: Option<String>,
    pub message: String,
}

impl From<&LogEntry> for LogEntrySummary {
    fn from(entry: &LogEntry) -> Self {
        Self {
            created_at: entry.created_at.to_rfc3339(),
            level: entry.level.as_str().to_string(),
            workflow_id: entry.workflow_id.to_string(),
            execution_id: entry.execution_id.map(|id| id.to_string()),
            action: entry.action_kind.map(|k| k.as_str().to_string()),
            message: entry.message.clone(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct LogListOutput {
    pub entries: Vec<LogEntrySummary>,
    pub total: usize,
}

impl CommandOutput for LogListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["time", "level", "workflow", "action", "message"]);
        for entry in &self.entries {
            table.add_row(vec![
                entry.created_at.clone(),
                entry.level.clone(),
                entry.workflow_id[..8].to_string(),
                entry.action.clone().unwrap_or_default(),
                truncate(&entry.message, 60),
            ]);
        }
        render_list("log record", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: LogArgs, json_mode: bool) -> Result<()> {
    let pool = initialize_default_database()
        .await
        .context("Failed to open database; run `reviewflow init` first")?;
    let repo = SqliteLogRepository::new(pool);

    match args.command {
        LogCommands::List { workflow, execution, level, limit } => {
            let level = level
                .map(|s| LogLevel::from_str(&s).ok_or_else(|| anyhow!("Unknown level: {s}")))
                .transpose()?;
            let entries = repo
                .list(LogFilters {
                    workflow_id: workflow,
                    execution_id: execution,
                    level,
                    since: None,
                    limit: Some(limit),
                })
                .await?;
            let result = LogListOutput {
                entries: entries.iter().map(LogEntrySummary::from).collect(),
                total: entries.len(),
            };
            output(&result, json_mode);
        }
    }
    Ok(())
}
