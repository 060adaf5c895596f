use super::types::FileConfig;
use std::fs;
use std::path::{Path, PathBuf};
use toml;

/// Name of the configuration file searched for in the home directory and
/// the working directory when no explicit path is given.
const CONFIG_FILE_NAME: &str = ".rabbithole.toml";

/// Loads the optional configuration file.
///
/// A missing file is normal and yields an empty configuration. A file that
/// exists but cannot be read or parsed is reported as a warning and also
/// yields an empty configuration: a broken config file must never stop a
/// command from running with command-line values and defaults.
pub fn load_file_config(explicit: Option<&Path>) -> FileConfig {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => return FileConfig::default(),
        },
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Unable to open the {} file: {}", path.display(), e);
            return FileConfig::default();
        }
    };

    match toml::from_str(&content) {
        Ok(config) => {
            tracing::debug!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            tracing::warn!("Unable to parse the {} file: {}", path.display(), e);
            FileConfig::default()
        }
    }
}

/// Parses configuration from a string. Used by the resolution tests.
pub fn load_file_config_from_string(content: &str) -> Result<FileConfig, toml::de::Error> {
    toml::from_str(content)
}

/// First default location that actually exists: the home directory copy
/// wins over the working-directory copy.
fn default_config_path() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(CONFIG_FILE_NAME));
    }
    candidates.push(PathBuf::from(CONFIG_FILE_NAME));

    candidates.into_iter().find(|path| path.is_file())
}
