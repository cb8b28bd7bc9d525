use console::style;

use super::report;
use crate::error::{Result, ToolManagerError};
use crate::manager::{ToolManager, UpdateStatus};

pub async fn execute(manager: &mut ToolManager, tool_name: Option<String>, all: bool) -> Result<()> {
    match (tool_name, all) {
        (_, true) => update_all(manager).await,
        (Some(name), false) => update_one(manager, &name).await,
        (None, false) => check(manager).await,
    }
}

async fn update_one(manager: &mut ToolManager, tool_name: &str) -> Result<()> {
    println!(
        "{} Attempting to update {}...",
        style("→").cyan().bold(),
        style(tool_name).cyan()
    );

    let outcome = manager.update(tool_name).await?;
    report(&outcome);

    Ok(())
}

async fn update_all(manager: &mut ToolManager) -> Result<()> {
    println!("{} Updating all installed tools...", style("→").cyan().bold());

    let results = manager.update_all().await;
    if results.is_empty() {
        println!("{}", style("No installed tools to update.").dim());
        return Ok(());
    }

    let mut failed = 0;
    for (tool, result) in &results {
        match result {
            Ok(outcome) => println!(
                "  {} '{}': {}",
                style("✓").green().bold(),
                style(tool).cyan(),
                outcome
            ),
            Err(e) => {
                failed += 1;
                tracing::error!("'{}': {}", tool, e);
                println!("  {} '{}': {}", style("✗").red().bold(), style(tool).cyan(), e);
            }
        }
    }

    if failed > 0 {
        return Err(ToolManagerError::CommandFailed(format!(
            "{} of {} tools failed to update",
            failed,
            results.len()
        )));
    }

    Ok(())
}

async fn check(manager: &ToolManager) -> Result<()> {
    println!("{} Checking for available updates...", style("→").cyan().bold());

    let updates = manager.check_updates().await;
    if updates.is_empty() {
        println!("{} All tools are up to date.", style("✓").green().bold());
        return Ok(());
    }

    for (tool, status) in updates {
        let status = match status {
            UpdateStatus::Available => style(status.to_string()).yellow(),
            UpdateStatus::UpToDate => style(status.to_string()).green(),
            UpdateStatus::Unknown => style(status.to_string()).dim(),
        };
        println!("  - {}: {}", style(&tool).white().bold(), status);
    }

    Ok(())
}
