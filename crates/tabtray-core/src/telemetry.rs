use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    InactiveTabsExpanded,
    InactiveTabsCollapsed,
    AutoClosePromptShown,
    AutoClosePromptDismissed,
    AutoCloseTurnedOn,
    OpenInactiveTab,
    CloseInactiveTab,
    CloseAllInactiveTabs { count: usize },
    InactiveTabsAutoClosed { count: usize },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InactiveTabsExpanded => "inactive_tabs_expanded",
            Self::InactiveTabsCollapsed => "inactive_tabs_collapsed",
            Self::AutoClosePromptShown => "auto_close_prompt_shown",
            Self::AutoClosePromptDismissed => "auto_close_prompt_dismissed",
            Self::AutoCloseTurnedOn => "auto_close_turned_on",
            Self::OpenInactiveTab => "open_inactive_tab",
            Self::CloseInactiveTab => "close_inactive_tab",
            Self::CloseAllInactiveTabs { .. } => "close_all_inactive_tabs",
            Self::InactiveTabsAutoClosed { .. } => "inactive_tabs_auto_closed",
        }
    }
}

/// Fire-and-forget sink; implementations must not block the caller.
pub trait Telemetry: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogTelemetry;

impl Telemetry for LogTelemetry {
    fn record(&self, event: TelemetryEvent) {
        tracing::info!(target: "tabtray::telemetry", event = event.name(), details = ?event);
    }
}

#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<TelemetryEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl Telemetry for RecordingTelemetry {
    fn record(&self, event: TelemetryEvent) {
        self.events.lock().push(event);
    }
}
