use crate::state::TrayState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub state: TrayState,
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub changes: Vec<StateChange>,
    pub from_revision: u64,
    pub to_revision: u64,
}

impl Patch {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    PartitionReplaced,
    SelectedTabChanged,
    InactiveExpandedChanged,
}
