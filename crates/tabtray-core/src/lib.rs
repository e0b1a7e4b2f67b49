pub mod action;
pub mod auto_close;
pub mod binding;
pub mod browser;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod id_storage;
pub mod ids;
pub mod patch;
pub mod reducer;
pub mod settings;
pub mod sorter;
pub mod state;
pub mod store;
pub mod telemetry;

pub use action::TrayAction;
pub use auto_close::{expired_tabs, TabAutoCloser};
pub use binding::{
    inactive_section_binding, other_header_binding, should_show_other_header,
    should_show_title_header, tab_group_binding, title_header_binding, Binding, InactiveSection,
};
pub use browser::{BrowserSnapshot, BrowserTabs};
pub use clock::{Clock, ManualClock, SystemClock, MILLIS_PER_DAY, MILLIS_PER_HOUR};
pub use config::{FeatureDefaults, TrayConfig};
pub use controller::{InactiveTabsController, RefreshCallback};
pub use error::{BrowserError, ConfigError};
pub use id_storage::{RowKey, TabAdapterIdStorage};
pub use ids::{DisplayId, TabId};
pub use patch::{Patch, Snapshot, StateChange};
pub use settings::{AutoClosePeriod, InMemorySettings, SettingsValues, TraySettings};
pub use sorter::{classify, is_inactive, ClassifyOptions, TabSorter};
pub use state::{SearchTermGroup, TabPartition, TabRecord, TrayState};
pub use store::{Observer, Subscription, TrayStore};
pub use telemetry::{LogTelemetry, RecordingTelemetry, Telemetry, TelemetryEvent};
