//! Implementation of the `reviewflow init` command.

use anyhow::{Context, Result};
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::config::Config;

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_written: bool,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("Wrote .reviewflow/config.yaml".to_string());
        }
        if self.database_initialized {
            lines.push("Database initialized at .reviewflow/reviewflow.db".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(force: bool, json_mode: bool) -> Result<()> {
    let dir = std::path::Path::new(".reviewflow");
    let config_path = dir.join("config.yaml");

    if config_path.exists() && !force {
        let result = InitOutput {
            success: false,
            message: "Already initialized. Use --force to overwrite the config.".to_string(),
            config_written: false,
            database_initialized: false,
        };
        output(&result, json_mode);
        return Ok(());
    }

    fs::create_dir_all(dir)
        .await
        .context("Failed to create .reviewflow directory")?;

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    fs::write(&config_path, yaml)
        .await
        .context("Failed to write config file")?;

    initialize_database(&format!("sqlite:{}", config.database.path))
        .await
        .context("Failed to initialize database")?;

    let result = InitOutput {
        success: true,
        message: "Initialized reviewflow.".to_string(),
        config_written: true,
        database_initialized: true,
    };
    output(&result, json_mode);
    Ok(())
}
