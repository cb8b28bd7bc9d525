//! Result types returned by the manager.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The requested action ran and succeeded.
    Done,
    /// Install requested but the tool was already there.
    AlreadyInstalled,
    /// Uninstall requested but the tool wasn't there.
    NotInstalled,
}

/// A successful operation and the message to show for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub message: String,
}

impl Outcome {
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Done,
            message: message.into(),
        }
    }

    pub fn already_installed(tool: &str) -> Self {
        Self {
            kind: OutcomeKind::AlreadyInstalled,
            message: format!("Tool {} is already installed", tool),
        }
    }

    pub fn not_installed(tool: &str) -> Self {
        Self {
            kind: OutcomeKind::NotInstalled,
            message: format!("Tool {} is not installed.", tool),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    Available,
    UpToDate,
    /// No platform block for this host.
    Unknown,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UpdateStatus::Available => "Update available",
            UpdateStatus::UpToDate => "Up to date",
            UpdateStatus::Unknown => "Could not determine update status for this platform",
        };
        f.write_str(text)
    }
}

/// One row of `list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub installed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            Outcome::already_installed("ngspice").to_string(),
            "Tool ngspice is already installed"
        );
        assert_eq!(
            Outcome::not_installed("kicad").to_string(),
            "Tool kicad is not installed."
        );
        assert_eq!(Outcome::done("ok").kind, OutcomeKind::Done);
    }

    #[test]
    fn test_update_status_display() {
        assert_eq!(UpdateStatus::Available.to_string(), "Update available");
        assert_eq!(UpdateStatus::UpToDate.to_string(), "Up to date");
    }
}
