use serde::Deserialize;
use tabtray_core::{TabId, TabRecord, MILLIS_PER_DAY};

/// One line of the command script, e.g.
/// `{"command":"close_inactive","id":"t2"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    OpenTab {
        id: String,
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        search_term: Option<String>,
        #[serde(default)]
        private: bool,
        /// How long ago the tab was last used.
        #[serde(default)]
        idle_days: i64,
        #[serde(default)]
        select: bool,
    },
    SelectTab {
        id: String,
    },
    ExpandInactive {
        expanded: bool,
    },
    DismissAutoClose,
    EnableAutoClose,
    OpenInactive {
        id: String,
    },
    CloseInactive {
        id: String,
    },
    CloseAllInactive,
    Undo,
    AdvanceClock {
        hours: i64,
    },
    RunAutoClose,
    SetFeatures {
        #[serde(default)]
        inactive_tabs: Option<bool>,
        #[serde(default)]
        search_term_groups: Option<bool>,
    },
    PrintState,
}

impl UiCommand {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

pub fn tab_record(
    id: String,
    url: String,
    title: String,
    search_term: Option<String>,
    private: bool,
    idle_days: i64,
    now_millis: i64,
) -> TabRecord {
    let last_access = now_millis.saturating_sub(idle_days.saturating_mul(MILLIS_PER_DAY));
    TabRecord {
        id: TabId::new(id),
        url,
        title,
        last_access_millis: last_access,
        created_at_millis: last_access,
        pinned: false,
        private,
        search_term,
    }
}
