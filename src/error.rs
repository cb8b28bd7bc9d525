use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolManagerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tool {0} not found in configuration")]
    ToolNotFound(String),

    #[error("Missing dependencies: {}", .0.join(", "))]
    MissingDependencies(Vec<String>),

    #[error("Failed to install dependencies: {}", .0.join(", "))]
    DependencyInstall(Vec<String>),

    #[error("No package manager available to install dependencies")]
    NoPackageManager,

    /// No platform block resolved for the host. `action` is "installation" or "update".
    #[error("No {action} instructions for {tool} on this platform")]
    NoPlatformConfig { tool: String, action: &'static str },

    #[error("No {action} command defined for {tool}{suffix}")]
    NoCommand {
        tool: String,
        action: &'static str,
        suffix: &'static str,
    },

    #[error("{0}")]
    CommandFailed(String),

    #[error("Tool {0} is not installed")]
    NotInstalled(String),

    #[error("Failed to create installation directory: {}", .0.display())]
    InstallDir(PathBuf),

    #[error("Administrator privileges are required to install tools with Chocolatey. Please run the terminal as an administrator.")]
    Privileges,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dialog error: {0}")]
    Dialog(#[from] dialoguer::Error),
}

impl ToolManagerError {
    pub fn no_command(tool: impl Into<String>, action: &'static str) -> Self {
        Self::NoCommand {
            tool: tool.into(),
            action,
            suffix: "",
        }
    }

    /// Same as [`no_command`](Self::no_command) but phrased for the host platform.
    pub fn no_command_on_platform(tool: impl Into<String>, action: &'static str) -> Self {
        Self::NoCommand {
            tool: tool.into(),
            action,
            suffix: " on this platform.",
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolManagerError>;
