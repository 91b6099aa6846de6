use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub plugins: PluginsConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    pub log_filter: String,
}

#[derive(Debug, Deserialize)]
pub struct PluginsConfig {
    #[serde(default)]
    pub directory: Option<String>,
}

/// Partial user config: every field optional, so a user file only has to
/// name the values it overrides.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    general: UserGeneral,
    #[serde(default)]
    plugins: UserPlugins,
}

#[derive(Debug, Default, Deserialize)]
struct UserGeneral {
    log_filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UserPlugins {
    directory: Option<String>,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let defaults = include_str!("../config/default.toml");
        let mut config: AppConfig = toml::from_str(defaults)?;

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "pylon") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                let user_str = fs::read_to_string(&config_path)?;
                let user_config: UserConfig = toml::from_str(&user_str)?;
                config.overlay(user_config);
            }
        }

        Ok(config)
    }

    fn overlay(&mut self, user: UserConfig) {
        if let Some(log_filter) = user.general.log_filter {
            self.general.log_filter = log_filter;
        }
        if let Some(directory) = user.plugins.directory {
            self.plugins.directory = Some(directory);
        }
    }

    /// Managed plugin directory override, with `~` expanded.
    pub fn plugin_dir(&self) -> Option<PathBuf> {
        let raw = self.plugins.directory.as_ref()?;
        if let Some(rest) = raw.strip_prefix('~') {
            if let Some(home) = dirs_home() {
                return Some(PathBuf::from(format!(
                    "{}{rest}",
                    home.to_string_lossy()
                )));
            }
        }
        Some(PathBuf::from(raw))
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
