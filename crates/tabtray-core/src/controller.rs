use std::sync::Arc;

use crate::action::TrayAction;
use crate::browser::BrowserTabs;
use crate::clock::Clock;
use crate::config::TrayConfig;
use crate::ids::TabId;
use crate::settings::{AutoClosePeriod, TraySettings};
use crate::sorter::{classify, ClassifyOptions};
use crate::state::TabRecord;
use crate::store::TrayStore;
use crate::telemetry::{Telemetry, TelemetryEvent};

pub type RefreshCallback = Box<dyn Fn() + Send + Sync>;

pub struct InactiveTabsController {
    browser: Arc<dyn BrowserTabs>,
    settings: Arc<dyn TraySettings>,
    telemetry: Arc<dyn Telemetry>,
    clock: Arc<dyn Clock>,
    store: TrayStore,
    config: TrayConfig,
    on_refresh: RefreshCallback,
}

impl InactiveTabsController {
    pub fn new(
        browser: Arc<dyn BrowserTabs>,
        settings: Arc<dyn TraySettings>,
        telemetry: Arc<dyn Telemetry>,
        clock: Arc<dyn Clock>,
        store: TrayStore,
        config: TrayConfig,
        on_refresh: RefreshCallback,
    ) -> Self {
        Self {
            browser,
            settings,
            telemetry,
            clock,
            store,
            config,
            on_refresh,
        }
    }

    pub fn update_card_expansion(&self, is_expanded: bool) {
        self.telemetry.record(if is_expanded {
            TelemetryEvent::InactiveTabsExpanded
        } else {
            TelemetryEvent::InactiveTabsCollapsed
        });
        self.store.dispatch(TrayAction::UpdateInactiveExpanded {
            expanded: is_expanded,
        });
    }

    pub fn should_show_auto_close_prompt(&self) -> bool {
        if self.settings.auto_close_dialog_dismissed()
            || self.settings.auto_close_period() == AutoClosePeriod::OneMonth
        {
            return false;
        }
        self.store.state().partition.inactive_tabs.len() >= self.config.auto_close_prompt_min_tabs
    }

    pub fn auto_close_prompt_shown(&self) {
        self.telemetry.record(TelemetryEvent::AutoClosePromptShown);
    }

    pub fn close(&self) {
        self.settings.set_auto_close_dialog_dismissed(true);
        tracing::info!("auto-close prompt dismissed");
        self.telemetry.record(TelemetryEvent::AutoClosePromptDismissed);
        (self.on_refresh)();
    }

    pub fn enable_auto_closed(&self) {
        self.settings.set_auto_close_period(AutoClosePeriod::OneMonth);
        self.settings.set_auto_close_dialog_dismissed(true);
        tracing::info!("auto-close enabled for inactive tabs");
        self.telemetry.record(TelemetryEvent::AutoCloseTurnedOn);
        (self.on_refresh)();
    }

    pub fn open_inactive_tab(&self, tab: &TabRecord) {
        if let Err(error) = self.browser.select_tab(&tab.id) {
            tracing::warn!(tab = %tab.id, %error, "failed to select inactive tab");
        }
        self.telemetry.record(TelemetryEvent::OpenInactiveTab);
    }

    pub fn close_inactive_tab(&self, tab: &TabRecord) {
        if let Err(error) = self.browser.remove_tabs(std::slice::from_ref(&tab.id)) {
            tracing::warn!(tab = %tab.id, %error, "failed to close inactive tab");
        }
        self.telemetry.record(TelemetryEvent::CloseInactiveTab);
    }

    /// The set is recomputed from the live browser rather than taken from the
    /// store, which may lag behind.
    pub fn delete_all_inactive_tabs(&self, show_undo: impl FnOnce(bool)) {
        let snapshot = self.browser.snapshot();
        let options = ClassifyOptions {
            inactive_enabled: self.settings.inactive_tabs_enabled(),
            groups_enabled: self.settings.search_term_groups_enabled(),
            inactive_threshold_millis: self.config.inactive_threshold_millis(),
        };
        let partition = classify(
            &snapshot.tabs,
            snapshot.selected_tab_id.as_ref(),
            self.clock.now_millis(),
            &options,
        );
        let ids: Vec<TabId> = partition
            .inactive_tabs
            .into_iter()
            .map(|tab| tab.id)
            .collect();

        let removed = if ids.is_empty() {
            0
        } else {
            match self.browser.remove_tabs(&ids) {
                Ok(()) => ids.len(),
                Err(error) => {
                    tracing::warn!(count = ids.len(), %error, "failed to close inactive tabs");
                    0
                }
            }
        };

        tracing::info!(removed, "closed all inactive tabs");
        self.telemetry
            .record(TelemetryEvent::CloseAllInactiveTabs { count: removed });
        show_undo(removed > 0);
    }
}
