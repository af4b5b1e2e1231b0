//! Configuration module for movie-search
//!
//! Handles loading and validating settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "MOVIE_SEARCH_SETTINGS_PATH";

/// Candidate settings files, in lookup order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/movie-search/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("movie-search/settings.yml"));
    }
    paths
}

/// Load settings from the first existing file, then apply environment overrides.
///
/// An explicit path must exist; otherwise `MOVIE_SEARCH_SETTINGS_PATH` and
/// [`default_paths`] are tried before falling back to defaults.
pub fn load(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = match resolve_path(explicit)? {
        Some(path) => {
            tracing::info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)?
        }
        None => {
            tracing::info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("settings file not found: {}", path.display()),
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    Ok(default_paths().into_iter().find(|p| p.exists()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_must_exist() {
        let result = load(Some(Path::new("/definitely/not/here/settings.yml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_default_paths_order() {
        let paths = default_paths();
        assert_eq!(paths[0], PathBuf::from("settings.yml"));
        assert_eq!(paths[1], PathBuf::from("config/settings.yml"));
    }
}
