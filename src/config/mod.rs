use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("neither the XDG base directory nor HOME is set")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "mapmarks";
const APP_CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "markers.db";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_recenter_on_location_update")]
    pub recenter_on_location_update: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            recenter_on_location_update: default_recenter_on_location_update(),
        }
    }
}

const fn default_recenter_on_location_update() -> bool {
    true
}

impl AppConfig {
    /// Configured database file, or the per-user data directory default.
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigPathError> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        let (xdg_data_home, home) = data_env_dirs();
        default_database_path(xdg_data_home.as_deref(), home.as_deref())
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn data_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = xdg_root(xdg_config_home, home, ".config")?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn default_database_path(
    xdg_data_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = xdg_root(xdg_data_home, home, ".local/share")?;
    path.push(APP_DIR);
    path.push(DATABASE_FILE);
    Ok(path)
}

fn xdg_root(
    xdg_dir: Option<&Path>,
    home: Option<&Path>,
    home_fallback: &str,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_dir.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(home_fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "mapmarks",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/mapmarks/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("mapmarks", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/mapmarks/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("mapmarks", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn database_defaults_under_local_share() {
        let path = default_database_path(Some(Path::new("")), Some(Path::new("/tmp/home")))
            .expect("path should resolve");
        assert_eq!(path, PathBuf::from("/tmp/home/.local/share/mapmarks/markers.db"));

        let path = default_database_path(Some(Path::new("/data")), None)
            .expect("path should resolve");
        assert_eq!(path, PathBuf::from("/data/mapmarks/markers.db"));
    }

    #[test]
    fn configured_database_path_wins() {
        let config = AppConfig {
            database_path: Some(PathBuf::from("/srv/markers.db")),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolve_database_path().expect("path should resolve"),
            PathBuf::from("/srv/markers.db")
        );
    }

    #[test]
    fn config_file_fields_default_when_missing() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let app_dir = dir.path().join("mapmarks");
        std::fs::create_dir_all(&app_dir).expect("config dir should be created");
        std::fs::write(app_dir.join("config.json"), r#"{"database_path": "/x/m.db"}"#)
            .expect("config should be written");

        let config = load_app_config_with(Some(dir.path()), None);
        assert_eq!(config.database_path, Some(PathBuf::from("/x/m.db")));
        assert!(config.recenter_on_location_update);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let app_dir = dir.path().join("mapmarks");
        std::fs::create_dir_all(&app_dir).expect("config dir should be created");
        std::fs::write(app_dir.join("config.json"), "{ not json")
            .expect("config should be written");

        assert_eq!(load_app_config_with(Some(dir.path()), None), AppConfig::default());
    }
}
