//! Tool lifecycle: install, update, uninstall and installed-state detection.
//!
//! ## Module structure
//! - `types` - Outcome, UpdateStatus, ToolSummary
//! - `install` - install and uninstall flows
//! - `update` - update, update-all and update checks
//! - `env` - environment injected into tool commands
//! - `prompt` - confirmation before installing missing dependencies

mod env;
mod install;
mod prompt;
mod types;
mod update;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use prompt::{DependencyPrompt, FixedAnswer, InteractivePrompt};
pub use types::{Outcome, OutcomeKind, ToolSummary, UpdateStatus};

use crate::config::{ConfigStore, PlatformConfig, ToolDefinition};
use crate::deps::DependencyChecker;
use crate::error::{Result, ToolManagerError};
use crate::platform::HostPlatform;
use crate::runner::{CommandRunner, ShellCommand};

pub struct ToolManager {
    config: ConfigStore,
    host: HostPlatform,
    deps: DependencyChecker,
    runner: Arc<dyn CommandRunner>,
    prompt: Box<dyn DependencyPrompt>,
    /// Directories prepended to PATH for child processes of this run.
    session_path: Vec<PathBuf>,
}

impl ToolManager {
    pub fn new(
        config: ConfigStore,
        host: HostPlatform,
        deps: DependencyChecker,
        runner: Arc<dyn CommandRunner>,
        prompt: Box<dyn DependencyPrompt>,
    ) -> Self {
        Self {
            config,
            host,
            deps,
            runner,
            prompt,
            session_path: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    pub fn dependency_checker(&self) -> &DependencyChecker {
        &self.deps
    }

    pub fn tool_dir(&self, name: &str) -> PathBuf {
        self.config.install_path().join(name)
    }

    fn tool(&self, name: &str) -> Result<ToolDefinition> {
        self.config
            .tool(name)
            .cloned()
            .ok_or_else(|| ToolManagerError::ToolNotFound(name.to_string()))
    }

    /// Installed if the version check exits 0, or the executable is in the
    /// tool's `bin` directory, or the executable is on PATH.
    pub async fn is_installed(&self, name: &str, tool: &ToolDefinition) -> bool {
        let version_check = self
            .host
            .resolve(tool)
            .and_then(|p| p.version_check.as_deref())
            .or(tool.version_check.as_deref());

        if let Some(check) = version_check {
            let command = ShellCommand::new(check).envs(self.path_env()).captured();
            if let Ok(output) = self.runner.run(&command).await {
                if output.success() {
                    return true;
                }
            }
        }

        let executable = format!(
            "{}{}",
            tool.executable_name(name),
            self.host.executable_suffix()
        );

        if self.tool_dir(name).join("bin").join(&executable).exists() {
            return true;
        }

        self.on_path(&executable)
    }

    pub async fn list(&self) -> Vec<ToolSummary> {
        let mut summaries = Vec::with_capacity(self.config.tools().len());
        for (name, tool) in self.config.tools() {
            summaries.push(ToolSummary {
                name: name.clone(),
                description: tool.description().to_string(),
                installed: self.is_installed(name, tool).await,
            });
        }
        summaries
    }

    fn on_path(&self, executable: &str) -> bool {
        self.session_path
            .iter()
            .any(|dir| dir.join(executable).is_file())
            || which::which(executable).is_ok()
    }

    fn add_session_path(&mut self, dir: PathBuf) {
        if !self.session_path.contains(&dir) {
            tracing::info!("Added {} to PATH (current session only)", dir.display());
            self.session_path.insert(0, dir);
        }
    }

    /// PATH override for children, empty when nothing was added this run.
    fn path_env(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        if self.session_path.is_empty() {
            return env;
        }

        let current = std::env::var_os("PATH").unwrap_or_default();
        let dirs = self
            .session_path
            .iter()
            .cloned()
            .chain(std::env::split_paths(&current));

        match std::env::join_paths(dirs) {
            Ok(joined) => {
                env.insert("PATH".to_string(), joined.to_string_lossy().into_owned());
            }
            Err(e) => tracing::warn!("Could not extend PATH: {}", e),
        }
        env
    }

    /// Environment for install/update/uninstall commands of `name`.
    fn command_env(&self, tool_dir: &Path, platform: &PlatformConfig) -> BTreeMap<String, String> {
        let mut env = env::command_env(tool_dir, &platform.environment);
        env.extend(self.path_env());
        env
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::*;
    use crate::config::{TOOLS_CONFIG_FILE, USER_CONFIG_FILE};
    use crate::deps::PackageManager;
    use crate::platform::Os;
    use crate::runner::testing::RecordingRunner;

    pub struct Fixture {
        pub dir: tempfile::TempDir,
        pub runner: Arc<RecordingRunner>,
        pub manager: ToolManager,
    }

    pub struct FixtureBuilder {
        tools: String,
        host: HostPlatform,
        package_manager: Option<PackageManager>,
        runner: RecordingRunner,
        answer: bool,
        prompt: Option<Box<dyn DependencyPrompt>>,
    }

    impl FixtureBuilder {
        pub fn new(tools: &str) -> Self {
            Self {
                tools: tools.to_string(),
                host: HostPlatform::new(Os::Linux, Some("ubuntu")),
                package_manager: Some(PackageManager::AptGet),
                runner: RecordingRunner::new(),
                answer: false,
                prompt: None,
            }
        }

        pub fn host(mut self, host: HostPlatform) -> Self {
            self.host = host;
            self
        }

        pub fn package_manager(mut self, pm: Option<PackageManager>) -> Self {
            self.package_manager = pm;
            self
        }

        pub fn runner(mut self, runner: RecordingRunner) -> Self {
            self.runner = runner;
            self
        }

        pub fn answer(mut self, answer: bool) -> Self {
            self.answer = answer;
            self
        }

        pub fn prompt(mut self, prompt: impl DependencyPrompt + 'static) -> Self {
            self.prompt = Some(Box::new(prompt));
            self
        }

        pub fn build(self) -> Fixture {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join(TOOLS_CONFIG_FILE), &self.tools).unwrap();
            let user = serde_json::json!({ "install_path": dir.path().join("tools") });
            std::fs::write(dir.path().join(USER_CONFIG_FILE), user.to_string()).unwrap();

            let config = ConfigStore::load(dir.path(), self.host.os).unwrap();
            let deps = DependencyChecker::with_package_manager(self.host.os, self.package_manager);
            let runner = Arc::new(self.runner);
            let answer = self.answer;
            let prompt = self
                .prompt
                .unwrap_or_else(|| Box::new(FixedAnswer(answer)));

            let manager = ToolManager::new(
                config,
                self.host,
                deps,
                runner.clone(),
                prompt,
            );

            Fixture {
                dir,
                runner,
                manager,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FixtureBuilder;
    use crate::platform::{HostPlatform, Os};
    use crate::runner::testing::RecordingRunner;

    const TOOLS: &str = r#"{
        "tools": {
            "esim-test-ngspice": {
                "description": "Circuit simulator",
                "version_check": "ngspice --version",
                "linux": { "install": "install-ngspice" }
            },
            "esim-test-kicad": {
                "executable": "esim-test-kicad-bin",
                "linux": {
                    "install": "install-kicad",
                    "version_check": "kicad-cli version"
                }
            },
            "esim-test-ghdl": {}
        }
    }"#;

    #[tokio::test]
    async fn test_version_check_success_means_installed() {
        let fixture = FixtureBuilder::new(TOOLS)
            .runner(RecordingRunner::failing().exit("ngspice --version", 0))
            .build();
        let tool = fixture.manager.config().tool("esim-test-ngspice").unwrap();

        assert!(fixture.manager.is_installed("esim-test-ngspice", tool).await);
        let calls = fixture.runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].capture);
    }

    #[tokio::test]
    async fn test_platform_version_check_takes_precedence() {
        let fixture = FixtureBuilder::new(TOOLS)
            .runner(RecordingRunner::failing())
            .build();
        let tool = fixture.manager.config().tool("esim-test-kicad").unwrap();

        assert!(!fixture.manager.is_installed("esim-test-kicad", tool).await);
        assert_eq!(fixture.runner.lines(), vec!["kicad-cli version"]);
    }

    #[tokio::test]
    async fn test_executable_in_tool_bin_dir_means_installed() {
        let fixture = FixtureBuilder::new(TOOLS)
            .runner(RecordingRunner::failing())
            .build();
        let bin = fixture.manager.tool_dir("esim-test-kicad").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("esim-test-kicad-bin"), "").unwrap();

        let tool = fixture.manager.config().tool("esim-test-kicad").unwrap();
        assert!(fixture.manager.is_installed("esim-test-kicad", tool).await);
    }

    #[tokio::test]
    async fn test_windows_executable_gets_exe_suffix() {
        let tools = r#"{ "tools": { "esim-test-tool": { "windows": { "install": "x" } } } }"#;
        let fixture = FixtureBuilder::new(tools)
            .host(HostPlatform::new(Os::Windows, None))
            .package_manager(None)
            .build();
        let bin = fixture.manager.tool_dir("esim-test-tool").join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("esim-test-tool"), "").unwrap();

        let tool = fixture.manager.config().tool("esim-test-tool").unwrap();
        assert!(!fixture.manager.is_installed("esim-test-tool", tool).await);

        std::fs::write(bin.join("esim-test-tool.exe"), "").unwrap();
        assert!(fixture.manager.is_installed("esim-test-tool", tool).await);
    }

    #[tokio::test]
    async fn test_nothing_found_means_not_installed() {
        let fixture = FixtureBuilder::new(TOOLS).build();
        let tool = fixture.manager.config().tool("esim-test-ghdl").unwrap();
        assert!(!fixture.manager.is_installed("esim-test-ghdl", tool).await);
        assert!(fixture.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_reports_installed_state_and_descriptions() {
        let fixture = FixtureBuilder::new(TOOLS)
            .runner(RecordingRunner::failing().exit("ngspice --version", 0))
            .build();

        let summaries = fixture.manager.list().await;
        let rows: Vec<(&str, &str, bool)> = summaries
            .iter()
            .map(|s| (s.name.as_str(), s.description.as_str(), s.installed))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("esim-test-ghdl", "No description", false),
                ("esim-test-kicad", "No description", false),
                ("esim-test-ngspice", "Circuit simulator", true),
            ]
        );
    }
}
