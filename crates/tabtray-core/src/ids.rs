use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TabId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl Display for TabId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "tab:{}", self.0)
    }
}

/// Synthetic id handed to list adapters for view recycling. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(pub u64);

impl Display for DisplayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "display:{}", self.0)
    }
}
