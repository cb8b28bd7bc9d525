use console::style;

use super::report;
use crate::error::Result;
use crate::manager::ToolManager;

pub async fn execute(manager: &mut ToolManager, tool_name: &str) -> Result<()> {
    println!(
        "{} Attempting to uninstall {}...",
        style("→").yellow().bold(),
        style(tool_name).cyan()
    );

    let outcome = manager.uninstall(tool_name).await?;
    report(&outcome);

    Ok(())
}
