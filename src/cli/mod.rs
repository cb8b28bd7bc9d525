pub mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::ConfigStore;
use crate::deps::DependencyChecker;
use crate::error::Result;
use crate::manager::{DependencyPrompt, FixedAnswer, InteractivePrompt, ToolManager};
use crate::platform::HostPlatform;
use crate::runner::ShellRunner;

#[derive(Parser)]
#[command(name = "esim-tools")]
#[command(version)]
#[command(about = "eSim Automated Tool Manager")]
#[command(long_about = "Manages installation, updates, and configuration of the external tools eSim relies on.\n\nTools and their per-platform commands are declared in tools_config.json.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding tools_config.json, user_config.json and the log file
    #[arg(long, global = true, env = "ESIM_TOOLS_CONFIG_DIR", default_value = ".")]
    pub config_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a tool
    Install {
        /// The name of the tool to install (e.g., ngspice, kicad)
        tool_name: String,

        /// Install missing dependencies without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Update a tool or check for updates
    Update {
        /// The tool to update. Without it, checks installed tools for updates
        tool_name: Option<String>,

        /// Update all installed tools
        #[arg(long, conflicts_with = "tool_name")]
        all: bool,
    },

    /// List all available and installed tools
    List,

    /// Uninstall a tool
    Uninstall {
        /// The name of the tool to uninstall
        tool_name: String,
    },

    /// Set the base installation directory for tools
    SetPath {
        /// The new absolute path for tool installations
        path: String,
    },

    /// Show platform, package manager and system dependency status
    Doctor,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let host = HostPlatform::detect();
        let config = ConfigStore::load(&self.config_dir, host.os)?;
        let deps = DependencyChecker::detect(&host);

        let prompt: Box<dyn DependencyPrompt> = match self.command {
            Commands::Install { yes: true, .. } => Box::new(FixedAnswer(true)),
            _ => Box::new(InteractivePrompt),
        };

        let mut manager = ToolManager::new(config, host, deps, Arc::new(ShellRunner), prompt);

        match self.command {
            Commands::Install { tool_name, .. } => {
                commands::install::execute(&mut manager, &tool_name).await
            }
            Commands::Update { tool_name, all } => {
                commands::update::execute(&mut manager, tool_name, all).await
            }
            Commands::List => commands::list::execute(&manager).await,
            Commands::Uninstall { tool_name } => {
                commands::uninstall::execute(&mut manager, &tool_name).await
            }
            Commands::SetPath { path } => commands::set_path::execute(&mut manager, &path),
            Commands::Doctor => commands::doctor::execute(&manager),
        }
    }
}
