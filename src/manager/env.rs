//! Environment passed to tool commands.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

/// Install directory of the tool being acted on, visible to its commands.
pub const TOOL_DIR_VAR: &str = "ESIM_TOOL_DIR";

static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$\{([A-Za-z_][A-Za-z0-9_]*):-([^}]*)\}|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("static regex")
});

fn lookup(name: &str, scope: &BTreeMap<String, String>) -> Option<String> {
    scope
        .get(name)
        .cloned()
        .or_else(|| std::env::var(name).ok())
}

/// Resolve `$VAR`, `${VAR}` and `${VAR:-default}` in `value`.
///
/// `scope` is consulted before the process environment. Unknown variables
/// become empty strings. Substituted text is never expanded again.
pub fn resolve_env_value(value: &str, scope: &BTreeMap<String, String>) -> String {
    VAR_REF
        .replace_all(value, |caps: &Captures| {
            if let (Some(name), Some(default)) = (caps.get(1), caps.get(2)) {
                return lookup(name.as_str(), scope).unwrap_or_else(|| default.as_str().to_string());
            }
            caps.get(3)
                .or_else(|| caps.get(4))
                .and_then(|name| lookup(name.as_str(), scope))
                .unwrap_or_default()
        })
        .into_owned()
}

/// `ESIM_TOOL_DIR` plus the resolved `environment` block.
///
/// Values may reference `ESIM_TOOL_DIR` and other keys of the same block.
/// A reference to a sibling sees that sibling resolved against
/// `ESIM_TOOL_DIR` and the host only, whatever the key order.
pub fn command_env(tool_dir: &Path, environment: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut base = BTreeMap::new();
    base.insert(TOOL_DIR_VAR.to_string(), tool_dir.to_string_lossy().into_owned());

    let mut scope = base.clone();
    scope.extend(
        environment
            .iter()
            .map(|(key, value)| (key.clone(), resolve_env_value(value, &base))),
    );

    let mut env = base;
    for (key, value) in environment {
        env.insert(key.clone(), resolve_env_value(value, &scope));
    }

    env
}
