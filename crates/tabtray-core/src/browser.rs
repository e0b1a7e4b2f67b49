use crate::error::BrowserError;
use crate::ids::TabId;
use crate::state::TabRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserSnapshot {
    pub tabs: Vec<TabRecord>,
    pub selected_tab_id: Option<TabId>,
    /// Bumped by the browser on every change to `tabs` or the selection.
    pub revision: u64,
}

pub trait BrowserTabs: Send + Sync {
    fn snapshot(&self) -> BrowserSnapshot;

    fn select_tab(&self, tab_id: &TabId) -> Result<(), BrowserError>;

    fn remove_tabs(&self, tab_ids: &[TabId]) -> Result<(), BrowserError>;
}
