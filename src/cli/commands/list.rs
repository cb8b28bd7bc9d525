use console::style;

use crate::error::Result;
use crate::manager::ToolManager;

pub async fn execute(manager: &ToolManager) -> Result<()> {
    let tools = manager.list().await;

    if tools.is_empty() {
        println!("{}", style("No tools configured.").dim());
        println!(
            "Add tool definitions to {}.",
            style(manager.config().tools_path().display()).cyan()
        );
        return Ok(());
    }

    println!("{}", style("Available tools").bold().cyan());
    println!();

    for tool in tools {
        let status = if tool.installed {
            format!(" {}", style("(installed)").green())
        } else {
            String::new()
        };
        println!(
            "  - {}{}: {}",
            style(&tool.name).white().bold(),
            status,
            style(&tool.description).dim()
        );
    }

    Ok(())
}
