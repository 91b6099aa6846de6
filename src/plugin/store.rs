use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::PluginError;

/// Extension of installed plugin binaries. Dynamic-library-style naming;
/// the artifacts are executed as separate processes.
#[cfg(target_os = "macos")]
pub const BINARY_EXTENSION: &str = "dylib";
#[cfg(target_os = "windows")]
pub const BINARY_EXTENSION: &str = "dll";
#[cfg(all(not(target_os = "macos"), not(target_os = "windows")))]
pub const BINARY_EXTENSION: &str = "so";

/// Extension of persisted plugin definitions.
pub const DEFINITION_EXTENSION: &str = "plugin";

/// The managed plugin directory: one filesystem location holding each
/// plugin's binary (`<name>.<ext>`) and definition (`<name>.plugin`).
/// Pure path resolution; the files themselves are the only shared state.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the configured override, or the platform default.
    pub fn resolve(config: &AppConfig) -> Self {
        let root = config.plugin_dir().unwrap_or_else(default_plugin_dir);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{BINARY_EXTENSION}"))
    }

    pub fn definition_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{DEFINITION_EXTENSION}"))
    }

    /// Recursive, idempotent directory creation.
    pub fn ensure_dir(&self) -> Result<(), PluginError> {
        fs::create_dir_all(&self.root).map_err(|source| PluginError::DirectoryCreation {
            path: self.root.clone(),
            source,
        })
    }

    /// Installed plugin binaries as `(name, binary path)`, sorted by name.
    /// A missing directory means zero plugins, not an error.
    pub fn installed_binaries(&self) -> Vec<(String, PathBuf)> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut found: Vec<(String, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some(BINARY_EXTENSION) {
                    return None;
                }
                let name = path.file_stem()?.to_str()?.to_string();
                Some((name, path))
            })
            .collect();

        found.sort();
        found
    }
}

fn default_plugin_dir() -> PathBuf {
    if let Some(project_dirs) = directories::ProjectDirs::from("", "", "pylon") {
        return project_dirs.data_dir().join("plugins");
    }

    if let Some(base_dirs) = directories::BaseDirs::new() {
        return base_dirs.home_dir().join(".pylon/plugins");
    }

    PathBuf::from(".pylon-plugins")
}
