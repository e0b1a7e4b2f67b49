use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::clock::MILLIS_PER_DAY;
use crate::config::TrayConfig;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoClosePeriod {
    #[default]
    Manual,
    OneDay,
    OneWeek,
    OneMonth,
}

impl AutoClosePeriod {
    pub fn max_age_millis(self) -> Option<i64> {
        match self {
            Self::Manual => None,
            Self::OneDay => Some(MILLIS_PER_DAY),
            Self::OneWeek => Some(7 * MILLIS_PER_DAY),
            Self::OneMonth => Some(30 * MILLIS_PER_DAY),
        }
    }
}

/// Persisted user settings consumed by the tray.
///
/// The four close-tabs flags are stored separately; callers should go through
/// [`TraySettings::set_auto_close_period`] so exactly one of them is set.
pub trait TraySettings: Send + Sync {
    fn inactive_tabs_enabled(&self) -> bool;
    fn set_inactive_tabs_enabled(&self, enabled: bool);

    fn search_term_groups_enabled(&self) -> bool;
    fn set_search_term_groups_enabled(&self, enabled: bool);

    fn close_tabs_manually(&self) -> bool;
    fn set_close_tabs_manually(&self, value: bool);

    fn close_tabs_after_one_day(&self) -> bool;
    fn set_close_tabs_after_one_day(&self, value: bool);

    fn close_tabs_after_one_week(&self) -> bool;
    fn set_close_tabs_after_one_week(&self, value: bool);

    fn close_tabs_after_one_month(&self) -> bool;
    fn set_close_tabs_after_one_month(&self, value: bool);

    fn auto_close_dialog_dismissed(&self) -> bool;
    fn set_auto_close_dialog_dismissed(&self, dismissed: bool);

    /// Longest enabled period wins if the flags were left inconsistent.
    fn auto_close_period(&self) -> AutoClosePeriod {
        if self.close_tabs_after_one_month() {
            AutoClosePeriod::OneMonth
        } else if self.close_tabs_after_one_week() {
            AutoClosePeriod::OneWeek
        } else if self.close_tabs_after_one_day() {
            AutoClosePeriod::OneDay
        } else {
            AutoClosePeriod::Manual
        }
    }

    fn set_auto_close_period(&self, period: AutoClosePeriod) {
        self.set_close_tabs_manually(period == AutoClosePeriod::Manual);
        self.set_close_tabs_after_one_day(period == AutoClosePeriod::OneDay);
        self.set_close_tabs_after_one_week(period == AutoClosePeriod::OneWeek);
        self.set_close_tabs_after_one_month(period == AutoClosePeriod::OneMonth);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsValues {
    pub inactive_tabs_enabled: bool,
    pub search_term_groups_enabled: bool,
    pub close_tabs_manually: bool,
    pub close_tabs_after_one_day: bool,
    pub close_tabs_after_one_week: bool,
    pub close_tabs_after_one_month: bool,
    pub auto_close_dialog_dismissed: bool,
}

impl Default for SettingsValues {
    fn default() -> Self {
        Self {
            inactive_tabs_enabled: true,
            search_term_groups_enabled: true,
            close_tabs_manually: true,
            close_tabs_after_one_day: false,
            close_tabs_after_one_week: false,
            close_tabs_after_one_month: false,
            auto_close_dialog_dismissed: false,
        }
    }
}

impl SettingsValues {
    pub fn from_config(config: &TrayConfig) -> Self {
        Self {
            inactive_tabs_enabled: config.features.inactive_tabs,
            search_term_groups_enabled: config.features.search_term_groups,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: RwLock<SettingsValues>,
}

impl InMemorySettings {
    pub fn new(values: SettingsValues) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn values(&self) -> SettingsValues {
        self.values.read().clone()
    }
}

macro_rules! flag_accessors {
    ($($get:ident / $set:ident),* $(,)?) => {
        $(
            fn $get(&self) -> bool {
                self.values.read().$get
            }

            fn $set(&self, value: bool) {
                self.values.write().$get = value;
            }
        )*
    };
}

impl TraySettings for InMemorySettings {
    flag_accessors!(
        inactive_tabs_enabled / set_inactive_tabs_enabled,
        search_term_groups_enabled / set_search_term_groups_enabled,
        close_tabs_manually / set_close_tabs_manually,
        close_tabs_after_one_day / set_close_tabs_after_one_day,
        close_tabs_after_one_week / set_close_tabs_after_one_week,
        close_tabs_after_one_month / set_close_tabs_after_one_month,
        auto_close_dialog_dismissed / set_auto_close_dialog_dismissed,
    );
}
