use crate::ids::TabId;
use crate::state::TabPartition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayAction {
    UpdatePartition {
        partition: TabPartition,
        selected_tab_id: Option<TabId>,
    },
    UpdateInactiveExpanded {
        expanded: bool,
    },
}
