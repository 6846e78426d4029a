use serde::Serialize;
use tokio::process::Command;

use crate::config::AgentConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct AgentOutput {
    pub message: String,
    pub stdout: String,
}

/// Run the configured minting agent script and wait for it to exit.
///
/// The command comes from config so deployments are not tied to any absolute
/// path. The script manages its own wallet-data file; we never read it.
pub async fn run_agent(config: &AgentConfig) -> AppResult<AgentOutput> {
    let command = config
        .command
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("no agent command configured".into()))?;

    let mut cmd = Command::new(command);
    cmd.args(&config.args);
    if let Some(ref dir) = config.working_dir {
        cmd.current_dir(dir);
    }

    tracing::info!(command = %command, "Running agent script");
    let output = cmd
        .output()
        .await
        .map_err(|e| AppError::Agent(format!("failed to spawn agent: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        tracing::error!(status = ?output.status.code(), "Agent script failed");
        return Err(AppError::Agent(stderr));
    }

    Ok(AgentOutput {
        message: "Command executed".to_string(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}
