use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::debug;

use crate::{env_subst::substitute_env, schema::ProfilesFile};

/// Profile file names, checked in order.
const PROFILE_FILENAMES: &[&str] = &["apps.yaml", "apps.yml", "apps.json"];

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Point profile discovery at `path` instead of `~/.config/connector-auth/`.
pub fn set_config_dir(path: PathBuf) {
    *CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner()) = Some(path);
}

/// Clear the config directory override, restoring default discovery.
pub fn clear_config_dir() {
    *CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner()) = None;
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
}

/// Returns the config directory: override, or `~/.config/connector-auth/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Some(dir);
    }
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("connector-auth"))
}

/// Where a new profiles file would live.
pub fn default_profiles_path() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROFILE_FILENAMES[0])
}

/// Find the first existing profiles file in the config directory.
pub fn find_profiles_file() -> Option<PathBuf> {
    let dir = config_dir()?;
    PROFILE_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Load a profiles file (YAML or JSON, by extension) with env substitution.
pub fn load_profiles(path: &Path) -> anyhow::Result<ProfilesFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    let profiles = parse_profiles(&raw, path)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    debug!(path = %path.display(), apps = profiles.apps.len(), "loaded app profiles");
    Ok(profiles)
}

/// Locate and load the profiles file. `Ok(None)` when there is none.
pub fn discover_profiles() -> anyhow::Result<Option<(PathBuf, ProfilesFile)>> {
    let Some(path) = find_profiles_file() else {
        debug!("no app profiles file found");
        return Ok(None);
    };
    let profiles = load_profiles(&path)?;
    Ok(Some((path, profiles)))
}

fn parse_profiles(raw: &str, path: &Path) -> anyhow::Result<ProfilesFile> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    match ext {
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported profiles format: .{ext}"),
    }
}
