use thiserror::Error;

use crate::ids::TabId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("tab not found: {0}")]
    TabNotFound(TabId),
    #[error("browser unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Validation(String),
}
