use std::sync::Arc;

use crate::browser::BrowserTabs;
use crate::clock::Clock;
use crate::ids::TabId;
use crate::settings::{AutoClosePeriod, TraySettings};
use crate::state::TabRecord;
use crate::telemetry::{Telemetry, TelemetryEvent};

/// Tabs that have outlived `period`. Private tabs and the selected tab are
/// never returned; [`AutoClosePeriod::Manual`] returns nothing.
pub fn expired_tabs(
    tabs: &[TabRecord],
    selected_tab_id: Option<&TabId>,
    now_millis: i64,
    period: AutoClosePeriod,
) -> Vec<TabId> {
    let Some(max_age) = period.max_age_millis() else {
        return Vec::new();
    };
    tabs.iter()
        .filter(|tab| !tab.private && selected_tab_id != Some(&tab.id))
        .filter(|tab| now_millis.saturating_sub(tab.last_active_millis()) > max_age)
        .map(|tab| tab.id.clone())
        .collect()
}

pub struct TabAutoCloser {
    browser: Arc<dyn BrowserTabs>,
    settings: Arc<dyn TraySettings>,
    telemetry: Arc<dyn Telemetry>,
    clock: Arc<dyn Clock>,
}

impl TabAutoCloser {
    pub fn new(
        browser: Arc<dyn BrowserTabs>,
        settings: Arc<dyn TraySettings>,
        telemetry: Arc<dyn Telemetry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            browser,
            settings,
            telemetry,
            clock,
        }
    }

    /// Returns the ids that were closed; empty when nothing expired or the
    /// browser refused the removal.
    pub fn run(&self) -> Vec<TabId> {
        let period = self.settings.auto_close_period();
        let snapshot = self.browser.snapshot();
        let expired = expired_tabs(
            &snapshot.tabs,
            snapshot.selected_tab_id.as_ref(),
            self.clock.now_millis(),
            period,
        );
        if expired.is_empty() {
            return expired;
        }

        if let Err(error) = self.browser.remove_tabs(&expired) {
            tracing::warn!(?period, count = expired.len(), %error, "auto-close failed");
            return Vec::new();
        }

        tracing::info!(?period, count = expired.len(), "auto-closed expired tabs");
        self.telemetry.record(TelemetryEvent::InactiveTabsAutoClosed {
            count: expired.len(),
        });
        expired
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::browser::{BrowserSnapshot, BrowserTabs};
    use crate::clock::{ManualClock, MILLIS_PER_DAY};
    use crate::error::BrowserError;
    use crate::ids::TabId;
    use crate::settings::{AutoClosePeriod, InMemorySettings, TraySettings};
    use crate::state::TabRecord;
    use crate::telemetry::{RecordingTelemetry, TelemetryEvent};

    use super::{expired_tabs, TabAutoCloser};

    const NOW: i64 = 1_700_000_000_000;

    fn tab(id: &str, days: i64) -> TabRecord {
        let mut tab = TabRecord::new(id, "https://example.com");
        tab.last_access_millis = NOW - days * MILLIS_PER_DAY - 1;
        tab
    }

    fn ids(values: &[&str]) -> Vec<TabId> {
        values.iter().map(|id| TabId::from(*id)).collect()
    }

    #[test]
    fn manual_period_closes_nothing() {
        let tabs = vec![tab("t1", 400)];
        assert!(expired_tabs(&tabs, None, NOW, AutoClosePeriod::Manual).is_empty());
    }

    #[test]
    fn expiry_respects_period_selection_and_privacy() {
        let mut private = tab("private", 60);
        private.private = true;
        let tabs = vec![tab("t1", 2), tab("t2", 8), tab("t3", 31), tab("selected", 90), private];
        let selected = TabId::from("selected");

        assert_eq!(
            expired_tabs(&tabs, Some(&selected), NOW, AutoClosePeriod::OneDay),
            ids(&["t1", "t2", "t3"])
        );
        assert_eq!(
            expired_tabs(&tabs, Some(&selected), NOW, AutoClosePeriod::OneWeek),
            ids(&["t2", "t3"])
        );
        assert_eq!(
            expired_tabs(&tabs, Some(&selected), NOW, AutoClosePeriod::OneMonth),
            ids(&["t3"])
        );
    }

    #[derive(Default)]
    struct FakeBrowser {
        snapshot: Mutex<BrowserSnapshot>,
    }

    impl BrowserTabs for FakeBrowser {
        fn snapshot(&self) -> BrowserSnapshot {
            self.snapshot.lock().clone()
        }

        fn select_tab(&self, _tab_id: &TabId) -> Result<(), BrowserError> {
            Ok(())
        }

        fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), BrowserError> {
            self.snapshot
                .lock()
                .tabs
                .retain(|tab| !tab_ids.contains(&tab.id));
            Ok(())
        }
    }

    #[test]
    fn closer_removes_expired_and_records_count() {
        let browser = Arc::new(FakeBrowser::default());
        browser.snapshot.lock().tabs = vec![tab("t1", 2), tab("t2", 10)];
        let settings = Arc::new(InMemorySettings::default());
        settings.set_auto_close_period(AutoClosePeriod::OneWeek);
        let telemetry = Arc::new(RecordingTelemetry::default());
        let closer = TabAutoCloser::new(
            browser.clone(),
            settings,
            telemetry.clone(),
            Arc::new(ManualClock::new(NOW)),
        );

        assert_eq!(closer.run(), ids(&["t2"]));
        assert_eq!(browser.snapshot().tabs.len(), 1);
        assert_eq!(
            telemetry.events(),
            vec![TelemetryEvent::InactiveTabsAutoClosed { count: 1 }]
        );

        assert!(closer.run().is_empty(), "nothing left to expire");
        assert_eq!(telemetry.events().len(), 1);
    }
}
