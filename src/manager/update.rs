//! Updating installed tools and checking for pending updates.

use super::{Outcome, ToolManager, UpdateStatus};
use crate::config::ToolDefinition;
use crate::error::{Result, ToolManagerError};
use crate::runner::{run_checked, ShellCommand};

impl ToolManager {
    pub async fn update(&mut self, name: &str) -> Result<Outcome> {
        let tool = self.tool(name)?;

        if !self.is_installed(name, &tool).await {
            return Err(ToolManagerError::NotInstalled(name.to_string()));
        }

        let platform = self
            .host
            .resolve(&tool)
            .cloned()
            .ok_or_else(|| ToolManagerError::NoPlatformConfig {
                tool: name.to_string(),
                action: "update",
            })?;

        let update_cmd = platform
            .update
            .as_deref()
            .ok_or_else(|| ToolManagerError::no_command(name, "update"))?;

        let env = self.command_env(&self.tool_dir(name), &platform);

        tracing::info!("Updating {} with command: {}", name, update_cmd);
        let command = ShellCommand::new(update_cmd).envs(env);
        run_checked(self.runner.as_ref(), &command)
            .await
            .map_err(|_| ToolManagerError::CommandFailed(format!("Update of {} failed", name)))?;

        Ok(Outcome::done(format!("Successfully updated {}", name)))
    }

    /// Update every installed tool, in name order. Tools that aren't
    /// installed are skipped and don't appear in the result.
    pub async fn update_all(&mut self) -> Vec<(String, Result<Outcome>)> {
        let mut installed = Vec::new();
        for (name, tool) in self.config.tools() {
            if self.is_installed(name, tool).await {
                installed.push(name.clone());
            }
        }

        let mut results = Vec::with_capacity(installed.len());
        for name in installed {
            let result = self.update(&name).await;
            results.push((name, result));
        }
        results
    }

    /// Update status of every installed tool, in name order.
    pub async fn check_updates(&self) -> Vec<(String, UpdateStatus)> {
        let mut updates = Vec::new();
        for (name, tool) in self.config.tools() {
            if self.is_installed(name, tool).await {
                let status = self.check_tool_update(name, tool).await;
                updates.push((name.clone(), status));
            }
        }
        updates
    }

    /// Pending when the `update_check` output mentions the tool name.
    async fn check_tool_update(&self, name: &str, tool: &ToolDefinition) -> UpdateStatus {
        let Some(platform) = self.host.resolve(tool) else {
            return UpdateStatus::Unknown;
        };

        let Some(check) = platform.update_check.as_deref() else {
            return UpdateStatus::UpToDate;
        };

        let command = ShellCommand::new(check).envs(self.path_env()).captured();
        match self.runner.run(&command).await {
            Ok(output) if output.stdout.contains(name) => UpdateStatus::Available,
            Ok(_) => UpdateStatus::UpToDate,
            Err(e) => {
                tracing::error!("Unexpected error executing command: {}", e);
                UpdateStatus::UpToDate
            }
        }
    }
}
