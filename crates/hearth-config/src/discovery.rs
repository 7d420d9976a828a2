//! Config layer discovery.
//!
//! Layers are merged key by key, later layers winning:
//!
//! | Layer | Path |
//! |---|---|
//! | [`ConfigLayer::User`] | `$HEARTH_CONFIG_DIR/config.toml`, else `<config dir>/hearth/config.toml` |
//! | [`ConfigLayer::Project`] | `./hearth.toml` |
//!
//! A project file that only sets `[session] ttl_secs` keeps every other
//! session key from the user file. Passing `--config <file>` replaces
//! discovery with a single [`ConfigLayer::Explicit`] layer.

use std::fmt;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::{ConfigError, HearthConfig, Result};

const PROJECT_CONFIG_FILE: &str = "hearth.toml";
const USER_CONFIG_FILE: &str = "config.toml";
const APP_NAME: &str = "hearth";
const CONFIG_DIR_ENV: &str = "HEARTH_CONFIG_DIR";

/// Where a config layer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Per-user file in the config directory.
    User,
    /// `hearth.toml` in the working (or given project) directory.
    Project,
    /// A file named on the command line.
    Explicit,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigLayer::User => "user",
            ConfigLayer::Project => "project",
            ConfigLayer::Explicit => "explicit",
        };
        f.pad(name)
    }
}

/// One layer that was considered while loading.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub layer: ConfigLayer,
    pub path: PathBuf,
    /// False when the file was missing or rejected.
    pub loaded: bool,
}

/// The merged configuration and how it was assembled.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HearthConfig,
    /// Layers in merge order (lowest precedence first).
    pub sources: Vec<ConfigSource>,
    /// One entry per rejected layer.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the layers that contributed to the config.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Discover and merge the user and project layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Like [`load_config`], with the user config directory given explicitly.
///
/// Missing layers are skipped. Layers that fail to parse, or that parse but
/// do not fit the schema (e.g. `port = "high"`), are skipped with a warning.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let user = config_dir
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .or_else(xdg_config_path);
    let project = project_dir
        .map(|dir| dir.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));

    let mut layers = Vec::with_capacity(2);
    if let Some(user) = user {
        layers.push((ConfigLayer::User, user));
    }
    layers.push((ConfigLayer::Project, project));

    let mut merged = Table::new();
    let mut sources = Vec::with_capacity(layers.len());
    let mut warnings = Vec::new();

    for (layer, path) in layers {
        let loaded = match read_layer(&path) {
            Ok(Some(table)) => {
                merge_tables(&mut merged, table);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warnings.push(format!("Skipping {} config {}: {}", layer, path.display(), e));
                false
            }
        };
        sources.push(ConfigSource {
            layer,
            path,
            loaded,
        });
    }

    Ok(LoadedConfig {
        config: into_config(merged)?,
        sources,
        warnings,
    })
}

/// Load exactly one file, bypassing discovery. Every failure is an error.
pub fn load_explicit(path: &Path) -> Result<LoadedConfig> {
    let config = load_config_file(path)?;
    Ok(LoadedConfig {
        config,
        sources: vec![ConfigSource {
            layer: ConfigLayer::Explicit,
            path: path.to_path_buf(),
            loaded: true,
        }],
        warnings: Vec::new(),
    })
}

/// Parse a single config file.
pub fn load_config_file(path: &Path) -> Result<HearthConfig> {
    into_config(read_table(path)?)
}

/// Write `config` to `path`, creating parent directories.
pub fn save_config(config: &HearthConfig, path: &Path) -> Result<()> {
    let write_err = |path: &Path, source| ConfigError::WriteFile {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(parent, e))?;
    }
    std::fs::write(path, config.to_toml()?).map_err(|e| write_err(path, e))
}

/// The user config file.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// The user config directory: `HEARTH_CONFIG_DIR` if set and non-empty,
/// otherwise the platform config directory plus `hearth`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join(APP_NAME)),
    }
}

/// Read a discovered layer. `Ok(None)` means the file does not exist.
///
/// The layer is checked against the schema on its own, so one bad layer
/// cannot poison the merge.
fn read_layer(path: &Path) -> Result<Option<Table>> {
    if !path.is_file() {
        return Ok(None);
    }
    let table = read_table(path)?;
    into_config(table.clone())?;
    Ok(Some(table))
}

fn read_table(path: &Path) -> Result<Table> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(contents.parse::<Table>()?)
}

fn into_config(table: Table) -> Result<HearthConfig> {
    Ok(Value::Table(table).try_into()?)
}

/// Overlay `overlay` onto `base`. Nested tables merge recursively; any other
/// value replaces what was there.
fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, incoming) in overlay {
        match incoming {
            Value::Table(incoming) => {
                if let Some(Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                } else {
                    base.insert(key, Value::Table(incoming));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}
