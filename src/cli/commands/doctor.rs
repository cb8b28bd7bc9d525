use console::style;

use crate::error::{Result, ToolManagerError};
use crate::manager::ToolManager;

pub fn execute(manager: &ToolManager) -> Result<()> {
    let checker = manager.dependency_checker();
    let config = manager.config();

    println!("{}", style("Environment").bold().cyan());
    println!();
    println!("  Platform:        {}", style(manager.host()).white());
    print!("  Package manager: ");
    match checker.package_manager() {
        Some(pm) => println!("{}", style(pm).green()),
        None => println!("{}", style("(none found)").yellow()),
    }
    println!(
        "  Install path:    {}",
        style(config.install_path().display()).white()
    );
    println!("  Config dir:      {}", style(config.dir().display()).white());
    println!("  Tools config:    {}", style(config.tools_path().display()).dim());
    println!("  User config:     {}", style(config.user_path().display()).dim());

    let saved: Vec<&str> = config
        .user_config()
        .environment
        .keys()
        .map(String::as_str)
        .collect();
    if !saved.is_empty() {
        println!("  Saved env for:   {}", style(saved.join(", ")).dim());
    }
    println!();

    println!("{}", style("System dependencies").bold().cyan());
    println!();

    let missing = checker.check_system_dependencies();
    for dep in checker.system_dependencies() {
        if missing.iter().any(|m| m == dep) {
            println!("  {} {} {}", style("✗").red().bold(), dep, style("missing").red());
        } else {
            println!("  {} {}", style("✓").green().bold(), dep);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ToolManagerError::MissingDependencies(missing))
    }
}
