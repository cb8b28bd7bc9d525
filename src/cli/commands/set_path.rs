use console::style;

use crate::error::Result;
use crate::manager::ToolManager;

pub fn execute(manager: &mut ToolManager, path: &str) -> Result<()> {
    let path = manager.config_mut().set_install_path(path)?;

    println!(
        "{} Installation path set to {}",
        style("✓").green().bold(),
        style(path.display()).cyan()
    );
    println!(
        "  Saved in {}",
        style(manager.config().user_path().display()).dim()
    );

    Ok(())
}
