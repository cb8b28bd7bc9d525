pub mod doctor;
pub mod install;
pub mod list;
pub mod set_path;
pub mod uninstall;
pub mod update;

use console::style;

use crate::manager::{Outcome, OutcomeKind};

/// Print the result of a successful operation.
fn report(outcome: &Outcome) {
    match outcome.kind {
        OutcomeKind::Done => println!("{} {}", style("✓").green().bold(), outcome),
        OutcomeKind::AlreadyInstalled | OutcomeKind::NotInstalled => {
            println!("{} {}", style("•").dim(), outcome)
        }
    }
    tracing::debug!("{}", outcome);
}
