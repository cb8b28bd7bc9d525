//! Dependency checks and package-manager installs.

use std::fmt;

use crate::config::ToolDefinition;
use crate::error::{Result, ToolManagerError};
use crate::platform::{HostPlatform, Os};
use crate::runner::{run_checked, CommandRunner, ShellCommand};

const UNIX_SYSTEM_DEPENDENCIES: &[&str] = &["curl", "wget", "tar", "gzip"];
const WINDOWS_SYSTEM_DEPENDENCIES: &[&str] = &["powershell"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    AptGet,
    Dnf,
    Yum,
    Choco,
    Brew,
}

impl PackageManager {
    pub fn binary(&self) -> &'static str {
        match self {
            PackageManager::AptGet => "apt-get",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Choco => "choco",
            PackageManager::Brew => "brew",
        }
    }

    /// The manager this host is expected to use, whether or not it's installed.
    pub fn for_host(host: &HostPlatform) -> Option<Self> {
        match host.os {
            Os::Windows => Some(PackageManager::Choco),
            Os::Darwin => Some(PackageManager::Brew),
            Os::Linux => match host.distro.as_deref()? {
                "ubuntu" | "debian" => Some(PackageManager::AptGet),
                "fedora" => Some(PackageManager::Dnf),
                "centos" => Some(PackageManager::Yum),
                _ => None,
            },
            Os::Other => None,
        }
    }

    pub fn install_command(&self, packages: &[String]) -> String {
        let packages = packages.join(" ");
        match self {
            PackageManager::Choco => format!("choco install {} -y", packages),
            PackageManager::Brew => format!("brew install {}", packages),
            PackageManager::AptGet | PackageManager::Dnf | PackageManager::Yum => {
                format!("sudo {} install -y {}", self.binary(), packages)
            }
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

pub fn is_tool_available(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Names from `names` that aren't on PATH, in order.
pub fn missing_binaries<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| !is_tool_available(name))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct DependencyChecker {
    os: Os,
    package_manager: Option<PackageManager>,
}

impl DependencyChecker {
    /// Use the host's package manager if its binary is on PATH.
    pub fn detect(host: &HostPlatform) -> Self {
        let package_manager =
            PackageManager::for_host(host).filter(|pm| is_tool_available(pm.binary()));

        match package_manager {
            Some(pm) => tracing::debug!("Using package manager {}", pm),
            None => tracing::debug!("No package manager available on {}", host),
        }

        Self::with_package_manager(host.os, package_manager)
    }

    pub fn with_package_manager(os: Os, package_manager: Option<PackageManager>) -> Self {
        Self {
            os,
            package_manager,
        }
    }

    pub fn package_manager(&self) -> Option<PackageManager> {
        self.package_manager
    }

    /// Binaries the install scripts commonly rely on for this OS.
    pub fn system_dependencies(&self) -> &'static [&'static str] {
        match self.os {
            Os::Linux | Os::Darwin => UNIX_SYSTEM_DEPENDENCIES,
            Os::Windows => WINDOWS_SYSTEM_DEPENDENCIES,
            Os::Other => &[],
        }
    }

    pub fn check_system_dependencies(&self) -> Vec<String> {
        let missing = missing_binaries(self.system_dependencies().iter().copied());
        if missing.is_empty() {
            tracing::info!("All system dependencies are available");
        } else {
            tracing::warn!("Missing system dependencies: {}", missing.join(", "));
        }
        missing
    }

    pub fn check_tool_dependencies(&self, tool: &ToolDefinition) -> Vec<String> {
        let missing = missing_binaries(tool.dependencies.iter().map(String::as_str));
        if missing.is_empty() {
            tracing::info!("All tool dependencies are available");
        } else {
            tracing::warn!("Missing dependencies for tool: {}", missing.join(", "));
        }
        missing
    }

    pub async fn install_dependencies(
        &self,
        dependencies: &[String],
        runner: &dyn CommandRunner,
    ) -> Result<()> {
        let package_manager = self.package_manager.ok_or_else(|| {
            tracing::error!("No package manager available to install dependencies");
            ToolManagerError::NoPackageManager
        })?;

        tracing::info!("Installing dependencies: {}", dependencies.join(", "));
        let command = ShellCommand::new(package_manager.install_command(dependencies));

        run_checked(runner, &command)
            .await
            .map(|_| ())
            .map_err(|_| ToolManagerError::DependencyInstall(dependencies.to_vec()))
    }
}
