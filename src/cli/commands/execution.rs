//! Execution history CLI commands.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::adapters::sqlite::{initialize_default_database, SqliteExecutionRepository};
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::execution::{Execution, ExecutionStatus};
use crate::domain::ports::{ExecutionFilters, ExecutionRepository};

#[derive(Args, Debug)]
pub struct ExecutionArgs {
    #[command(subcommand)]
    pub command: ExecutionCommands,
}

#[derive(Subcommand, Debug)]
pub enum ExecutionCommands {
    /// List executions, newest first
    List {
        /// Filter by workflow ID
        #[arg(long)]
        workflow: Option<Uuid>,
        /// Filter by status (pending, running, completed, failed)
        #[arg(long)]
        status: Option<String>,
        /// Maximum rows to show
        #[arg(long, default_value = "50")]
        limit: i64,
    },
    /// Show one execution with per-action outcomes
    Show {
        /// Execution ID
        id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ExecutionSummary {
    pub id: String,
    pub workflow_id: String,
    pub trigger_source: String,
    pub status: String,
    pub actions: String,
    pub duration_ms: Option<i64>,
    pub created_at: String,
}

impl From<&Execution> for ExecutionSummary {
    fn from(execution: &Execution) -> Self {
        Self {
            id: execution.id.to_string(),
            workflow_id: execution.workflow_id.to_string(),
            trigger_source: execution.trigger_source.clone(),
            status: execution.status.as_str().to_string(),
            actions: format!(
                "{}/{} ({} failed)",
                execution.actions_completed, execution.actions_total, execution.actions_failed
            ),
            duration_ms: execution.duration_ms(),
            created_at: execution.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ExecutionListOutput {
    pub executions: Vec<ExecutionSummary>,
    pub total: usize,
}

impl CommandOutput for ExecutionListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "workflow", "source", "status", "actions", "created"]);
        for ex in &self.executions {
            table.add_row(vec![
                ex.id[..8].to_string(),
                ex.workflow_id[..8].to_string(),
                ex.trigger_source.clone(),
                ex.status.clone(),
                ex.actions.clone(),
                ex.created_at.clone(),
            ]);
        }
        render_list("execution", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ExecutionDetailOutput {
    pub execution: Execution,
}

impl CommandOutput for ExecutionDetailOutput {
    fn to_human(&self) -> String {
        let ex = &self.execution;
        let mut lines = vec![
            format!("Execution {}", ex.id),
            format!("  workflow:  {}", ex.workflow_id),
            format!("  source:    {}", ex.trigger_source),
            format!("  status:    {}", ex.status.as_str()),
            format!(
                "  actions:   {}/{} completed, {} failed",
                ex.actions_completed, ex.actions_total, ex.actions_failed
            ),
        ];
        if let Some(duration) = ex.duration_ms() {
            lines.push(format!("  duration:  {duration}ms"));
        }
        if let Some(error) = &ex.error {
            lines.push(format!("  error:     {error}"));
        }
        if !ex.outcomes.is_empty() {
            lines.push("  outcomes:".to_string());
            for outcome in &ex.outcomes {
                let status = if outcome.success { "ok" } else { "failed" };
                let detail = outcome.error.clone().unwrap_or_default();
                lines.push(format!(
                    "    {}. {} [{}] {}ms {}",
                    outcome.index, outcome.kind, status, outcome.duration_ms, detail
                ));
            }
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ExecutionArgs, json_mode: bool) -> Result<()> {
    let pool = initialize_default_database()
        .await
        .context("Failed to open database; run `reviewflow init` first")?;
    let repo = SqliteExecutionRepository::new(pool);

    match args.command {
        ExecutionCommands::List { workflow, status, limit } => {
            let status = status
                .map(|s| {
                    ExecutionStatus::from_str(&s).ok_or_else(|| anyhow!("Unknown status: {s}"))
                })
                .transpose()?;
            let executions = repo
                .list(ExecutionFilters {
                    workflow_id: workflow,
                    status,
                    limit: Some(limit),
                    ..Default::default()
                })
                .await?;
            let result = ExecutionListOutput {
                executions: executions.iter().map(ExecutionSummary::from).collect(),
                total: executions.len(),
            };
            output(&result, json_mode);
        }
        ExecutionCommands::Show { id } => {
            let execution = repo
                .get(id)
                .await?
                .ok_or_else(|| anyhow!("Execution {id} not found"))?;
            output(&ExecutionDetailOutput { execution }, json_mode);
        }
    }
    Ok(())
}
