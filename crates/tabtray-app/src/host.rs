use std::sync::Arc;

use parking_lot::Mutex;
use tabtray_core::{BrowserError, BrowserSnapshot, BrowserTabs, Clock, TabId, TabRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    TabOpened { tab_id: TabId },
    TabSelected { tab_id: TabId },
    TabsRemoved { tab_ids: Vec<TabId> },
    TabsRestored { tab_ids: Vec<TabId> },
}

struct HostInner {
    tabs: Vec<TabRecord>,
    selected_tab_id: Option<TabId>,
    revision: u64,
    /// Last bulk removal with original positions, kept for undo.
    last_removed: Vec<(usize, TabRecord)>,
    events: Vec<HostEvent>,
}

pub struct InMemoryBrowser {
    inner: Mutex<HostInner>,
    clock: Arc<dyn Clock>,
}

impl InMemoryBrowser {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HostInner {
                tabs: Vec::new(),
                selected_tab_id: None,
                revision: 0,
                last_removed: Vec::new(),
                events: Vec::new(),
            }),
            clock,
        }
    }

    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.inner.lock().events.clone()
    }

    pub fn has_undo(&self) -> bool {
        !self.inner.lock().last_removed.is_empty()
    }

    pub fn open_tab(&self, tab: TabRecord, select: bool) {
        let mut inner = self.inner.lock();
        let tab_id = tab.id.clone();
        match inner.tabs.iter_mut().find(|existing| existing.id == tab_id) {
            Some(existing) => *existing = tab,
            None => inner.tabs.push(tab),
        }
        if select {
            inner.selected_tab_id = Some(tab_id.clone());
        }
        inner.revision += 1;
        inner.events.push(HostEvent::TabOpened { tab_id });
    }

    pub fn clear_undo(&self) {
        self.inner.lock().last_removed.clear();
    }

    /// Puts back the tabs removed by the last bulk removal. Returns how many
    /// came back.
    pub fn restore_last_removed(&self) -> usize {
        let mut inner = self.inner.lock();
        let removed = std::mem::take(&mut inner.last_removed);
        if removed.is_empty() {
            return 0;
        }

        let mut tab_ids = Vec::with_capacity(removed.len());
        for (index, tab) in removed {
            let index = index.min(inner.tabs.len());
            tab_ids.push(tab.id.clone());
            inner.tabs.insert(index, tab);
        }
        inner.revision += 1;
        let count = tab_ids.len();
        inner.events.push(HostEvent::TabsRestored { tab_ids });
        count
    }
}

impl BrowserTabs for InMemoryBrowser {
    fn snapshot(&self) -> BrowserSnapshot {
        let inner = self.inner.lock();
        BrowserSnapshot {
            tabs: inner.tabs.clone(),
            selected_tab_id: inner.selected_tab_id.clone(),
            revision: inner.revision,
        }
    }

    fn select_tab(&self, tab_id: &TabId) -> Result<(), BrowserError> {
        let now = self.clock.now_millis();
        let mut inner = self.inner.lock();
        let tab = inner
            .tabs
            .iter_mut()
            .find(|tab| &tab.id == tab_id)
            .ok_or_else(|| BrowserError::TabNotFound(tab_id.clone()))?;
        tab.last_access_millis = now;
        inner.selected_tab_id = Some(tab_id.clone());
        inner.revision += 1;
        inner.events.push(HostEvent::TabSelected {
            tab_id: tab_id.clone(),
        });
        Ok(())
    }

    /// All-or-nothing: an unknown id fails the whole call.
    fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), BrowserError> {
        let mut inner = self.inner.lock();
        if let Some(missing) = tab_ids
            .iter()
            .find(|id| !inner.tabs.iter().any(|tab| &tab.id == *id))
        {
            return Err(BrowserError::TabNotFound(missing.clone()));
        }

        let mut removed = Vec::with_capacity(tab_ids.len());
        let mut kept = Vec::with_capacity(inner.tabs.len());
        for (index, tab) in std::mem::take(&mut inner.tabs).into_iter().enumerate() {
            if tab_ids.contains(&tab.id) {
                removed.push((index, tab));
            } else {
                kept.push(tab);
            }
        }
        inner.tabs = kept;
        inner.last_removed = removed;

        let selection_removed = inner
            .selected_tab_id
            .as_ref()
            .is_some_and(|selected| tab_ids.contains(selected));
        if selection_removed {
            inner.selected_tab_id = inner
                .tabs
                .iter()
                .filter(|tab| !tab.private)
                .max_by_key(|tab| tab.last_active_millis())
                .map(|tab| tab.id.clone());
        }

        inner.revision += 1;
        inner.events.push(HostEvent::TabsRemoved {
            tab_ids: tab_ids.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tabtray_core::{BrowserError, BrowserTabs, ManualClock, TabId, TabRecord};

    use super::{HostEvent, InMemoryBrowser};

    fn browser_with(ids: &[&str]) -> InMemoryBrowser {
        let browser = InMemoryBrowser::new(Arc::new(ManualClock::new(10_000)));
        for (i, id) in ids.iter().enumerate() {
            let mut tab = TabRecord::new(*id, format!("https://{id}.example"));
            tab.last_access_millis = i as i64;
            browser.open_tab(tab, i == 0);
        }
        browser
    }

    fn tab_ids(browser: &InMemoryBrowser) -> Vec<String> {
        browser
            .snapshot()
            .tabs
            .into_iter()
            .map(|tab| tab.id.0)
            .collect()
    }

    #[test]
    fn select_touches_last_access_and_bumps_revision() {
        let browser = browser_with(&["a", "b"]);
        let before = browser.revision();

        browser
            .select_tab(&TabId::from("b"))
            .expect("tab b should exist");

        let snapshot = browser.snapshot();
        assert_eq!(snapshot.selected_tab_id, Some(TabId::from("b")));
        assert_eq!(snapshot.tabs[1].last_access_millis, 10_000);
        assert_eq!(snapshot.revision, before + 1);
    }

    #[test]
    fn removal_of_unknown_tab_changes_nothing() {
        let browser = browser_with(&["a", "b"]);

        let result = browser.remove_tabs(&[TabId::from("a"), TabId::from("zzz")]);

        assert_eq!(result, Err(BrowserError::TabNotFound(TabId::from("zzz"))));
        assert_eq!(tab_ids(&browser), vec!["a", "b"]);
    }

    #[test]
    fn removing_selected_tab_selects_most_recent_survivor() {
        let browser = browser_with(&["a", "b", "c"]);

        browser
            .remove_tabs(&[TabId::from("a")])
            .expect("removal should succeed");

        assert_eq!(browser.snapshot().selected_tab_id, Some(TabId::from("c")));
    }

    #[test]
    fn restore_puts_tabs_back_in_place() {
        let browser = browser_with(&["a", "b", "c", "d"]);
        browser
            .remove_tabs(&[TabId::from("b"), TabId::from("d")])
            .expect("removal should succeed");
        assert!(browser.has_undo());

        assert_eq!(browser.restore_last_removed(), 2);
        assert_eq!(tab_ids(&browser), vec!["a", "b", "c", "d"]);
        assert_eq!(browser.restore_last_removed(), 0, "undo is one-shot");
        assert!(matches!(
            browser.events().last(),
            Some(HostEvent::TabsRestored { tab_ids }) if tab_ids.len() == 2
        ));
    }

    #[test]
    fn cleared_undo_restores_nothing() {
        let browser = browser_with(&["a", "b"]);
        browser
            .remove_tabs(&[TabId::from("b")])
            .expect("removal should succeed");

        browser.clear_undo();

        assert!(!browser.has_undo());
        assert_eq!(browser.restore_last_removed(), 0);
        assert_eq!(tab_ids(&browser), vec!["a"]);
    }
}
