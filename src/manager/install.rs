//! Install and uninstall flows.

use std::collections::BTreeMap;

use super::{Outcome, ToolManager};
use crate::config::ToolDefinition;
use crate::deps::PackageManager;
use crate::error::{Result, ToolManagerError};
use crate::platform::Os;
use crate::runner::{run_checked, ShellCommand};

const ENVIRONMENT_NOTE: &str = "Please note: to make environment variables permanent, \
                                you may need to set them manually or restart your terminal.";

impl ToolManager {
    pub async fn install(&mut self, name: &str) -> Result<Outcome> {
        self.ensure_choco_privileges().await?;

        let tool = self.tool(name)?;

        if self.is_installed(name, &tool).await {
            return Ok(Outcome::already_installed(name));
        }

        self.ensure_dependencies(&tool).await?;

        let platform = self
            .host
            .resolve(&tool)
            .cloned()
            .ok_or_else(|| ToolManagerError::NoPlatformConfig {
                tool: name.to_string(),
                action: "installation",
            })?;

        let install_cmd = platform
            .install
            .as_deref()
            .ok_or_else(|| ToolManagerError::no_command(name, "install"))?;

        let tool_dir = self.tool_dir(name);
        std::fs::create_dir_all(&tool_dir).map_err(|e| {
            tracing::error!("Failed to create directory {}: {}", tool_dir.display(), e);
            ToolManagerError::InstallDir(tool_dir.clone())
        })?;

        let env = self.command_env(&tool_dir, &platform);

        tracing::info!("Installing {} with command: {}", name, install_cmd);
        let command = ShellCommand::new(install_cmd).envs(env.clone());
        run_checked(self.runner.as_ref(), &command)
            .await
            .map_err(|_| ToolManagerError::CommandFailed(format!("Installation of {} failed", name)))?;

        if platform.add_to_path {
            self.add_session_path(tool_dir.join("bin"));
        }

        let saved_env: BTreeMap<String, String> = platform
            .environment
            .keys()
            .filter_map(|key| env.get(key).map(|value| (key.clone(), value.clone())))
            .collect();
        self.config.save_tool_environment(name, &saved_env)?;

        let mut message = format!("Successfully installed {}.", name);
        if !platform.environment.is_empty() {
            message.push(' ');
            message.push_str(ENVIRONMENT_NOTE);
        }

        Ok(Outcome::done(message))
    }

    pub async fn uninstall(&mut self, name: &str) -> Result<Outcome> {
        let tool = self.tool(name)?;

        if !self.is_installed(name, &tool).await {
            return Ok(Outcome::not_installed(name));
        }

        let platform = self.host.resolve(&tool).cloned().unwrap_or_default();
        let uninstall_cmd = platform
            .uninstall
            .as_deref()
            .ok_or_else(|| ToolManagerError::no_command_on_platform(name, "uninstall"))?;

        let env = self.command_env(&self.tool_dir(name), &platform);

        tracing::info!("Uninstalling {} with command: {}", name, uninstall_cmd);
        let command = ShellCommand::new(uninstall_cmd).envs(env);
        run_checked(self.runner.as_ref(), &command)
            .await
            .map_err(|_| {
                ToolManagerError::CommandFailed(format!("Uninstallation of {} failed.", name))
            })?;

        self.config.remove_tool_environment(name)?;

        Ok(Outcome::done(format!("Successfully uninstalled {}.", name)))
    }

    /// Chocolatey needs an elevated shell; fail early instead of halfway through.
    async fn ensure_choco_privileges(&self) -> Result<()> {
        if self.host.os != Os::Windows || self.deps.package_manager() != Some(PackageManager::Choco) {
            return Ok(());
        }

        // `net session` only succeeds from an elevated prompt.
        let probe = ShellCommand::new("net session").captured();
        let elevated = matches!(self.runner.run(&probe).await, Ok(output) if output.success());

        if elevated {
            Ok(())
        } else {
            Err(ToolManagerError::Privileges)
        }
    }

    async fn ensure_dependencies(&self, tool: &ToolDefinition) -> Result<()> {
        let missing = self.deps.check_tool_dependencies(tool);
        if missing.is_empty() {
            return Ok(());
        }

        if !self.prompt.confirm_install(&missing)? {
            return Err(ToolManagerError::MissingDependencies(missing));
        }

        match self
            .deps
            .install_dependencies(&missing, self.runner.as_ref())
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::debug!("Dependency install failed: {}", e);
                Err(ToolManagerError::DependencyInstall(missing))
            }
        }
    }
}
