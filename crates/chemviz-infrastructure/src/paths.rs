//! Unified path management for chemviz configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chemviz/           # Config directory (platform config dir)
//! ├── config.toml              # Client configuration
//! └── logs/                    # Rolling log files
//!     └── chemviz.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

const APP_DIR_NAME: &str = "chemviz";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct ChemVizPaths;

impl ChemVizPaths {
    /// Returns the chemviz configuration directory (e.g. `~/.config/chemviz/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory rolling log files are written to.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_config_dir() {
        // Headless CI may lack a config dir; only check the layout when it exists.
        if let Ok(dir) = ChemVizPaths::config_dir() {
            assert!(dir.ends_with(APP_DIR_NAME));
            assert_eq!(ChemVizPaths::config_file().unwrap(), dir.join("config.toml"));
            assert_eq!(ChemVizPaths::logs_dir().unwrap(), dir.join("logs"));
        }
    }
}
