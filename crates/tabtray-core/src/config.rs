use serde::{Deserialize, Serialize};

use crate::clock::MILLIS_PER_DAY;
use crate::error::ConfigError;
use crate::id_storage::DEFAULT_ID_CACHE_CAPACITY;

pub const DEFAULT_INACTIVE_THRESHOLD_DAYS: i64 = 14;
pub const DEFAULT_AUTO_CLOSE_PROMPT_MIN_TABS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayConfig {
    /// Days without use before a tab counts as inactive. Zero or negative
    /// makes every eligible tab inactive.
    pub inactive_threshold_days: i64,
    pub id_cache_capacity: usize,
    pub auto_close_prompt_min_tabs: usize,
    pub features: FeatureDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureDefaults {
    pub inactive_tabs: bool,
    pub search_term_groups: bool,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            inactive_threshold_days: DEFAULT_INACTIVE_THRESHOLD_DAYS,
            id_cache_capacity: DEFAULT_ID_CACHE_CAPACITY,
            auto_close_prompt_min_tabs: DEFAULT_AUTO_CLOSE_PROMPT_MIN_TABS,
            features: FeatureDefaults::default(),
        }
    }
}

impl Default for FeatureDefaults {
    fn default() -> Self {
        Self {
            inactive_tabs: true,
            search_term_groups: true,
        }
    }
}

impl TrayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id_cache_capacity == 0 {
            return Err(ConfigError::Validation(
                "id_cache_capacity must be at least 1".to_owned(),
            ));
        }
        if self.inactive_threshold_days.checked_mul(MILLIS_PER_DAY).is_none() {
            return Err(ConfigError::Validation(format!(
                "inactive_threshold_days out of range: {}",
                self.inactive_threshold_days
            )));
        }
        Ok(())
    }

    pub fn inactive_threshold_millis(&self) -> i64 {
        self.inactive_threshold_days.saturating_mul(MILLIS_PER_DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::{TrayConfig, DEFAULT_INACTIVE_THRESHOLD_DAYS};
    use crate::clock::MILLIS_PER_DAY;
    use crate::error::ConfigError;

    #[test]
    fn defaults_are_valid() {
        let config = TrayConfig::default();
        config.validate().expect("default config should validate");
        assert_eq!(
            config.inactive_threshold_millis(),
            DEFAULT_INACTIVE_THRESHOLD_DAYS * MILLIS_PER_DAY
        );
        assert!(config.features.inactive_tabs);
        assert!(config.features.search_term_groups);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = TrayConfig {
            id_cache_capacity: 0,
            ..TrayConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn absurd_threshold_is_rejected() {
        let config = TrayConfig {
            inactive_threshold_days: i64::MAX,
            ..TrayConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
