use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolManagerError};
use crate::platform::Os;

pub const TOOLS_CONFIG_FILE: &str = "tools_config.json";
pub const USER_CONFIG_FILE: &str = "user_config.json";
pub const LOG_FILE: &str = "esim_tool_manager.log";

const DEFAULT_INSTALL_DIR: &str = "esim-tools";

/// Commands and settings for one tool on one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uninstall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_check: Option<String>,
    /// Command whose stdout mentions the tool name when an update is pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_check: Option<String>,
    /// Variables exported to the tool's commands and remembered in user config.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Put `<install_path>/<tool>/bin` on PATH after installing.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub add_to_path: bool,
}

impl PlatformConfig {
    pub fn is_empty(&self) -> bool {
        self.install.is_none()
            && self.update.is_none()
            && self.uninstall.is_none()
            && self.version_check.is_none()
            && self.update_check.is_none()
            && self.environment.is_empty()
            && !self.add_to_path
    }
}

/// The `linux` block: generic instructions plus distro-keyed overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinuxConfig {
    #[serde(flatten)]
    pub generic: PlatformConfig,
    #[serde(flatten)]
    pub distros: BTreeMap<String, PlatformConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Binaries that must be on PATH before installing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    /// Fallback used when the platform block has no `version_check`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_check: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<PlatformConfig>,
    #[serde(default, alias = "macos", skip_serializing_if = "Option::is_none")]
    pub darwin: Option<PlatformConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<LinuxConfig>,
}

impl ToolDefinition {
    pub fn executable_name<'a>(&'a self, tool_name: &'a str) -> &'a str {
        self.executable.as_deref().unwrap_or(tool_name)
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }
}

/// Contents of `tools_config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub tools: BTreeMap<String, ToolDefinition>,
}

/// Contents of `user_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_path: Option<PathBuf>,
    /// Saved environment per tool, written after a successful install.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, BTreeMap<String, String>>,
    /// Keys this version doesn't know about, kept so saving never drops them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Both config documents plus the directory they live in.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
    os: Os,
    tools: ToolsConfig,
    user: UserConfig,
}

impl ConfigStore {
    pub fn load(dir: impl Into<PathBuf>, os: Os) -> Result<Self> {
        let dir = dir.into();
        let tools = load_json(&dir.join(TOOLS_CONFIG_FILE))?;
        let user = load_json(&dir.join(USER_CONFIG_FILE))?;

        Ok(Self {
            dir,
            os,
            tools,
            user,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn tools_path(&self) -> PathBuf {
        self.dir.join(TOOLS_CONFIG_FILE)
    }

    pub fn user_path(&self) -> PathBuf {
        self.dir.join(USER_CONFIG_FILE)
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.tools.get(name)
    }

    /// All tools, ordered by name.
    pub fn tools(&self) -> &BTreeMap<String, ToolDefinition> {
        &self.tools.tools
    }

    pub fn user_config(&self) -> &UserConfig {
        &self.user
    }

    /// Base directory tools are installed under.
    pub fn install_path(&self) -> PathBuf {
        self.user
            .install_path
            .clone()
            .unwrap_or_else(|| default_install_path(self.os))
    }

    pub fn set_install_path(&mut self, path: &str) -> Result<PathBuf> {
        let path = PathBuf::from(shellexpand::tilde(path).as_ref());
        self.user.install_path = Some(path.clone());
        self.save_user_config()?;
        tracing::info!("Installation path set to {}", path.display());
        Ok(path)
    }

    pub fn save_user_config(&self) -> Result<()> {
        let path = self.user_path();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut content = serde_json::to_string_pretty(&self.user)?;
        content.push('\n');
        std::fs::write(&path, content)?;

        tracing::info!("User configuration saved");
        Ok(())
    }

    /// Merge `env` into the saved environment of `tool` and persist.
    pub fn save_tool_environment(
        &mut self,
        tool: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<()> {
        if env.is_empty() {
            return Ok(());
        }

        self.user
            .environment
            .entry(tool.to_string())
            .or_default()
            .extend(env.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.save_user_config()
    }

    /// Drop the saved environment of `tool`. Returns whether anything was removed.
    pub fn remove_tool_environment(&mut self, tool: &str) -> Result<bool> {
        if self.user.environment.remove(tool).is_none() {
            return Ok(false);
        }
        self.save_user_config()?;
        Ok(true)
    }
}

pub fn default_install_path(os: Os) -> PathBuf {
    match os {
        Os::Windows => PathBuf::from("C:\\").join(DEFAULT_INSTALL_DIR),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_INSTALL_DIR),
    }
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        tracing::warn!("Configuration file {} not found", path.display());
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        ToolManagerError::Config(format!("Invalid {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOOLS: &str = r#"{
        "tools": {
            "ngspice": {
                "description": "Mixed-level circuit simulator",
                "dependencies": ["curl", "tar"],
                "executable": "ngspice",
                "version_check": "ngspice --version",
                "linux": {
                    "install": "sudo apt-get install -y ngspice",
                    "add_to_path": true,
                    "environment": { "SPICE_LIB_DIR": "/usr/share/ngspice" },
                    "fedora": { "install": "sudo dnf install -y ngspice" },
                    "centos": { "install": "sudo yum install -y ngspice" }
                }
            },
            "kicad": {}
        }
    }"#;

    fn store_with(tools: &str, user: Option<&str>) -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOOLS_CONFIG_FILE), tools).unwrap();
        if let Some(user) = user {
            std::fs::write(dir.path().join(USER_CONFIG_FILE), user).unwrap();
        }
        let store = ConfigStore::load(dir.path(), Os::Linux).unwrap();
        (dir, store)
    }

    #[test]
    fn test_tool_definition_deserialization() {
        let (_dir, store) = store_with(TOOLS, None);
        let tool = store.tool("ngspice").unwrap();

        assert_eq!(tool.description(), "Mixed-level circuit simulator");
        assert_eq!(tool.dependencies, vec!["curl", "tar"]);
        assert_eq!(tool.version_check.as_deref(), Some("ngspice --version"));

        let linux = tool.linux.as_ref().unwrap();
        assert_eq!(
            linux.generic.install.as_deref(),
            Some("sudo apt-get install -y ngspice")
        );
        assert!(linux.generic.add_to_path);
        assert_eq!(
            linux.generic.environment.get("SPICE_LIB_DIR").map(String::as_str),
            Some("/usr/share/ngspice")
        );
        assert_eq!(linux.distros.len(), 2);
        assert_eq!(
            linux.distros["fedora"].install.as_deref(),
            Some("sudo dnf install -y ngspice")
        );
    }

    #[test]
    fn test_tool_defaults() {
        let (_dir, store) = store_with(TOOLS, None);
        let kicad = store.tool("kicad").unwrap();
        assert_eq!(kicad.description(), "No description");
        assert_eq!(kicad.executable_name("kicad"), "kicad");
        assert!(kicad.dependencies.is_empty());
        assert!(store.tool("missing").is_none());
    }

    #[test]
    fn test_tools_are_sorted_by_name() {
        let (_dir, store) = store_with(TOOLS, None);
        let names: Vec<&str> = store.tools().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["kicad", "ngspice"]);
    }

    #[test]
    fn test_missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path(), Os::Linux).unwrap();
        assert!(store.tools().is_empty());
        assert_eq!(store.user_config(), &UserConfig::default());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOOLS_CONFIG_FILE), "{ not json").unwrap();
        let err = ConfigStore::load(dir.path(), Os::Linux).unwrap_err();
        assert!(matches!(err, ToolManagerError::Config(_)));
        assert!(err.to_string().contains(TOOLS_CONFIG_FILE));
    }

    #[test]
    fn test_default_install_path() {
        assert_eq!(
            default_install_path(Os::Windows),
            PathBuf::from("C:\\").join("esim-tools")
        );
        assert!(default_install_path(Os::Linux).ends_with("esim-tools"));
    }

    #[test]
    fn test_install_path_from_user_config() {
        let (_dir, store) = store_with(TOOLS, Some(r#"{ "install_path": "/opt/esim" }"#));
        assert_eq!(store.install_path(), PathBuf::from("/opt/esim"));
    }

    #[test]
    fn test_set_install_path_persists_across_reload() {
        let (dir, mut store) = store_with(TOOLS, None);
        let target = dir.path().join("tools");

        let saved = store.set_install_path(target.to_str().unwrap()).unwrap();
        assert_eq!(saved, target);
        assert_eq!(store.install_path(), target);

        let reloaded = ConfigStore::load(dir.path(), Os::Linux).unwrap();
        assert_eq!(reloaded.install_path(), target);
    }

    #[test]
    fn test_set_install_path_expands_tilde() {
        let (_dir, mut store) = store_with(TOOLS, None);
        let saved = store.set_install_path("~/eda-tools").unwrap();
        assert!(!saved.to_string_lossy().starts_with('~'));
        assert!(saved.ends_with("eda-tools"));
    }

    #[test]
    fn test_save_and_remove_tool_environment() {
        let (dir, mut store) = store_with(TOOLS, None);
        let mut env = BTreeMap::new();
        env.insert("SPICE_LIB_DIR".to_string(), "/usr/share/ngspice".to_string());

        store.save_tool_environment("ngspice", &env).unwrap();

        let reloaded = ConfigStore::load(dir.path(), Os::Linux).unwrap();
        assert_eq!(reloaded.user_config().environment["ngspice"], env);

        assert!(store.remove_tool_environment("ngspice").unwrap());
        assert!(!store.remove_tool_environment("ngspice").unwrap());

        let reloaded = ConfigStore::load(dir.path(), Os::Linux).unwrap();
        assert!(reloaded.user_config().environment.is_empty());
    }

    #[test]
    fn test_empty_environment_is_not_saved() {
        let (dir, mut store) = store_with(TOOLS, None);
        store
            .save_tool_environment("kicad", &BTreeMap::new())
            .unwrap();
        assert!(!dir.path().join(USER_CONFIG_FILE).exists());
    }

    #[test]
    fn test_unknown_user_keys_survive_save() {
        let (dir, mut store) = store_with(TOOLS, Some(r#"{ "theme": "dark" }"#));
        store.set_install_path("/opt/esim").unwrap();

        let raw = std::fs::read_to_string(dir.path().join(USER_CONFIG_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["install_path"], "/opt/esim");
    }
}
