//! Asking the user whether to install missing dependencies.

use dialoguer::Confirm;

use crate::error::Result;

pub trait DependencyPrompt: Send + Sync {
    fn confirm_install(&self, missing: &[String]) -> Result<bool>;
}

/// Yes/no question on the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractivePrompt;

impl DependencyPrompt for InteractivePrompt {
    fn confirm_install(&self, missing: &[String]) -> Result<bool> {
        let message = format!(
            "The following dependencies are missing: {}. Do you want to install them?",
            missing.join(", ")
        );

        let answer = Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Fixed answer, for `--yes` and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl DependencyPrompt for FixedAnswer {
    fn confirm_install(&self, missing: &[String]) -> Result<bool> {
        tracing::debug!(
            "Answering {} for missing dependencies: {}",
            if self.0 { "yes" } else { "no" },
            missing.join(", ")
        );
        Ok(self.0)
    }
}
