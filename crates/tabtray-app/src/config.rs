use std::fs;
use std::path::{Path, PathBuf};

use tabtray_core::{ConfigError, TrayConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

pub fn load_config(path: Option<&Path>) -> Result<TrayConfig, AppConfigError> {
    let config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            let contents = fs::read_to_string(path).map_err(|source| AppConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str::<TrayConfig>(&contents).map_err(|source| AppConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        }
        None => TrayConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
