//! Host platform detection and per-platform tool config resolution.
//!
//! Tool definitions carry one block per OS (`windows`, `darwin`, `linux`).
//! The `linux` block doubles as the generic Linux instructions and as a map
//! of distro-specific overrides keyed by the `/etc/os-release` ID.

use std::fmt;
use std::path::Path;

use crate::config::{PlatformConfig, ToolDefinition};

const OS_RELEASE: &str = "/etc/os-release";

/// Distro ID reported when `/etc/os-release` can't be read or has no `ID=`.
pub const UNKNOWN_DISTRO: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Windows,
    Darwin,
    Other,
}

impl Os {
    /// The OS this binary was compiled for.
    pub fn current() -> Self {
        Self::from_name(std::env::consts::OS)
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            "macos" | "darwin" => Os::Darwin,
            _ => Os::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Windows => "windows",
            Os::Darwin => "darwin",
            Os::Other => "other",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system plus, on Linux, the distro ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub os: Os,
    pub distro: Option<String>,
}

impl HostPlatform {
    pub fn new(os: Os, distro: Option<&str>) -> Self {
        Self {
            os,
            distro: distro.map(|d| d.to_lowercase()),
        }
    }

    pub fn detect() -> Self {
        let os = Os::current();
        let distro = match os {
            Os::Linux => Some(detect_linux_distro(Path::new(OS_RELEASE))),
            _ => None,
        };

        let host = Self::new(os, distro.as_deref());
        tracing::debug!("Detected platform: {}", host);
        host
    }

    /// Pick the block of `tool` that applies to this host.
    ///
    /// On Linux a distro-keyed block wins over the generic `linux` block.
    /// Blocks that declare nothing are treated as missing.
    pub fn resolve<'a>(&self, tool: &'a ToolDefinition) -> Option<&'a PlatformConfig> {
        let config = match self.os {
            Os::Windows => tool.windows.as_ref(),
            Os::Darwin => tool.darwin.as_ref(),
            Os::Linux => tool.linux.as_ref().map(|linux| {
                self.distro
                    .as_deref()
                    .and_then(|distro| linux.distros.get(distro))
                    .unwrap_or(&linux.generic)
            }),
            Os::Other => None,
        };

        config.filter(|c| !c.is_empty())
    }

    /// Suffix appended to executable names when probing the filesystem.
    pub fn executable_suffix(&self) -> &'static str {
        match self.os {
            Os::Windows => ".exe",
            _ => "",
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.distro {
            Some(distro) => write!(f, "{} ({})", self.os, distro),
            None => write!(f, "{}", self.os),
        }
    }
}

fn detect_linux_distro(os_release: &Path) -> String {
    match std::fs::read_to_string(os_release) {
        Ok(content) => parse_os_release_id(&content).unwrap_or_else(|| UNKNOWN_DISTRO.to_string()),
        Err(e) => {
            tracing::warn!("Could not determine Linux distribution: {}", e);
            UNKNOWN_DISTRO.to_string()
        }
    }
}

/// Extract the `ID=` value from os-release content.
pub fn parse_os_release_id(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != "ID" {
            return None;
        }
        let value = value.trim().trim_matches('"').trim_matches('\'');
        (!value.is_empty()).then(|| value.to_lowercase())
    })
}
