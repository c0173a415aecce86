//! Workflow management CLI commands.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::actions::ActionRegistry;
use crate::adapters::sqlite::{initialize_default_database, SqliteWorkflowRepository};
use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::workflow::Workflow;
use crate::domain::ports::WorkflowRepository;

#[derive(Args, Debug)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommands,
}

#[derive(Subcommand, Debug)]
pub enum WorkflowCommands {
    /// List workflows for a tenant
    List {
        /// Tenant ID
        #[arg(long)]
        tenant: Uuid,
    },
    /// Show workflow details
    Show {
        /// Workflow ID
        id: Uuid,
    },
    /// Create a workflow from a YAML or JSON definition file
    Create {
        /// Path to the definition file
        file: std::path::PathBuf,
    },
    /// Activate a workflow
    Enable {
        /// Workflow ID
        id: Uuid,
    },
    /// Deactivate a workflow
    Disable {
        /// Workflow ID
        id: Uuid,
    },
    /// Delete a workflow and its execution history
    Delete {
        /// Workflow ID
        id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub trigger: String,
    pub active: bool,
    pub priority: i32,
    pub actions: usize,
    pub runs: u64,
    pub successes: u64,
}

impl From<&Workflow> for WorkflowSummary {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: workflow.id.to_string(),
            name: workflow.name.clone(),
            trigger: workflow.trigger.as_str().to_string(),
            active: workflow.is_active,
            priority: workflow.priority,
            actions: workflow.actions.len(),
            runs: workflow.run_count,
            successes: workflow.success_count,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct WorkflowListOutput {
    pub workflows: Vec<WorkflowSummary>,
    pub total: usize,
}

impl CommandOutput for WorkflowListOutput {
    fn to_human(&self) -> String {
        let mut table =
            list_table(&["id", "name", "trigger", "active", "priority", "actions", "runs"]);
        for wf in &self.workflows {
            table.add_row(vec![
                wf.id[..8].to_string(),
                truncate(&wf.name, 32),
                wf.trigger.clone(),
                if wf.active { "yes" } else { "no" }.to_string(),
                wf.priority.to_string(),
                wf.actions.to_string(),
                format!("{}/{}", wf.successes, wf.runs),
            ]);
        }
        render_list("workflow", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct WorkflowDetailOutput {
    pub workflow: Workflow,
}

impl CommandOutput for WorkflowDetailOutput {
    fn to_human(&self) -> String {
        let wf = &self.workflow;
        let mut lines = vec![
            format!("Workflow: {}", wf.name),
            format!("  id:        {}", wf.id),
            format!("  tenant:    {}", wf.tenant_id),
            format!("  trigger:   {}", wf.trigger.as_str()),
            format!("  active:    {}", wf.is_active),
            format!("  priority:  {}", wf.priority),
            format!("  runs:      {}/{}", wf.success_count, wf.run_count),
            format!("  ai:        {}", if wf.ai.enabled { "enabled" } else { "disabled" }),
        ];
        if !wf.description.is_empty() {
            lines.push(format!("  about:     {}", wf.description));
        }
        if !wf.conditions.is_empty() {
            lines.push(format!("  conditions: {}", wf.conditions.len()));
        }
        lines.push("  actions:".to_string());
        for (index, spec) in wf.actions.iter().enumerate() {
            let marker = if spec.critical { " (critical)" } else { "" };
            lines.push(format!("    {index}. {}{marker}", spec.kind()));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct WorkflowChangeOutput {
    pub id: String,
    pub message: String,
}

impl CommandOutput for WorkflowChangeOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: WorkflowArgs, json_mode: bool) -> Result<()> {
    let pool = initialize_default_database()
        .await
        .context("Failed to open database; run `reviewflow init` first")?;
    let repo = SqliteWorkflowRepository::new(pool);

    match args.command {
        WorkflowCommands::List { tenant } => {
            let workflows = repo.list_by_tenant(tenant).await?;
            let result = WorkflowListOutput {
                workflows: workflows.iter().map(WorkflowSummary::from).collect(),
                total: workflows.len(),
            };
            output(&result, json_mode);
        }
        WorkflowCommands::Show { id } => {
            let workflow = repo
                .get(id)
                .await?
                .ok_or_else(|| anyhow!("Workflow {id} not found"))?;
            output(&WorkflowDetailOutput { workflow }, json_mode);
        }
        WorkflowCommands::Create { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let workflow: Workflow = if file.extension().is_some_and(|e| e == "json") {
                serde_json::from_str(&raw).context("Failed to parse workflow definition")?
            } else {
                serde_yaml::from_str(&raw).context("Failed to parse workflow definition")?
            };

            workflow.validate()?;
            let registry = ActionRegistry::builtin();
            for (index, spec) in workflow.actions.iter().enumerate() {
                let problems = registry.validate(&spec.config)?;
                if !problems.is_empty() {
                    return Err(anyhow!(
                        "action {index} ({}): {}",
                        spec.kind(),
                        problems.join("; ")
                    ));
                }
            }

            repo.insert(&workflow).await?;
            output(
                &WorkflowChangeOutput {
                    id: workflow.id.to_string(),
                    message: format!("Created workflow '{}' ({})", workflow.name, workflow.id),
                },
                json_mode,
            );
        }
        WorkflowCommands::Enable { id } => {
            set_active(&repo, id, true).await?;
            output(
                &WorkflowChangeOutput {
                    id: id.to_string(),
                    message: format!("Workflow {id} enabled"),
                },
                json_mode,
            );
        }
        WorkflowCommands::Disable { id } => {
            set_active(&repo, id, false).await?;
            output(
                &WorkflowChangeOutput {
                    id: id.to_string(),
                    message: format!("Workflow {id} disabled"),
                },
                json_mode,
            );
        }
        WorkflowCommands::Delete { id } => {
            repo.get(id)
                .await?
                .ok_or_else(|| anyhow!("Workflow {id} not found"))?;
            repo.delete(id).await?;
            output(
                &WorkflowChangeOutput {
                    id: id.to_string(),
                    message: format!("Workflow {id} deleted"),
                },
                json_mode,
            );
        }
    }
    Ok(())
}

async fn set_active(repo: &SqliteWorkflowRepository, id: Uuid, active: bool) -> Result<()> {
    let mut workflow = repo
        .get(id)
        .await?
        .ok_or_else(|| anyhow!("Workflow {id} not found"))?;
    workflow.is_active = active;
    workflow.updated_at = chrono::Utc::now();
    repo.update(&workflow).await?;
    Ok(())
}
