use serde::{Deserialize, Serialize};

use crate::ids::TabId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// Zero when the tab was never accessed.
    #[serde(default)]
    pub last_access_millis: i64,
    #[serde(default)]
    pub created_at_millis: i64,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub search_term: Option<String>,
}

impl TabRecord {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: TabId::new(id),
            url: url.into(),
            title: String::new(),
            last_access_millis: 0,
            created_at_millis: 0,
            pinned: false,
            private: false,
            search_term: None,
        }
    }

    /// Last time the tab was in use. Tabs that were never accessed age from
    /// their creation time.
    pub fn last_active_millis(&self) -> i64 {
        self.last_access_millis.max(self.created_at_millis)
    }

    /// Grouping key: trimmed, lowercased search term. `None` when blank.
    pub fn search_term_key(&self) -> Option<String> {
        let term = self.search_term.as_deref()?.trim();
        if term.is_empty() {
            None
        } else {
            Some(term.to_lowercase())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTermGroup {
    pub key: String,
    pub title: String,
    pub members: Vec<TabRecord>,
    pub last_active_millis: i64,
}

impl SearchTermGroup {
    pub fn contains(&self, tab_id: &TabId) -> bool {
        self.members.iter().any(|tab| &tab.id == tab_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabPartition {
    pub normal_tabs: Vec<TabRecord>,
    pub inactive_tabs: Vec<TabRecord>,
    pub search_term_groups: Vec<SearchTermGroup>,
    pub private_tabs: Vec<TabRecord>,
}

impl TabPartition {
    pub fn is_empty(&self) -> bool {
        self.normal_tabs.is_empty()
            && self.inactive_tabs.is_empty()
            && self.search_term_groups.is_empty()
            && self.private_tabs.is_empty()
    }

    pub fn non_private_len(&self) -> usize {
        self.normal_tabs.len()
            + self.inactive_tabs.len()
            + self
                .search_term_groups
                .iter()
                .map(|group| group.members.len())
                .sum::<usize>()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrayState {
    pub partition: TabPartition,
    pub selected_tab_id: Option<TabId>,
    pub inactive_expanded: bool,
}
