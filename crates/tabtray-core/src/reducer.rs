use crate::action::TrayAction;
use crate::patch::StateChange;
use crate::state::TrayState;

/// Applies `action` to `state`. An empty result means the state is unchanged.
pub fn apply_action(state: &mut TrayState, action: TrayAction) -> Vec<StateChange> {
    let mut changes = Vec::new();

    match action {
        TrayAction::UpdatePartition {
            partition,
            selected_tab_id,
        } => {
            if state.partition != partition {
                state.partition = partition;
                changes.push(StateChange::PartitionReplaced);
            }
            if state.selected_tab_id != selected_tab_id {
                state.selected_tab_id = selected_tab_id;
                changes.push(StateChange::SelectedTabChanged);
            }
        }
        TrayAction::UpdateInactiveExpanded { expanded } => {
            if state.inactive_expanded != expanded {
                state.inactive_expanded = expanded;
                changes.push(StateChange::InactiveExpandedChanged);
            }
        }
    }

    changes
}
