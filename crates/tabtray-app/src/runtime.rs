use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tabtray_core::{
    inactive_section_binding, other_header_binding, tab_group_binding, title_header_binding,
    Binding, BrowserError, BrowserTabs, Clock, DisplayId, InactiveSection, InactiveTabsController,
    ManualClock, RowKey, SearchTermGroup, TabAdapterIdStorage, TabAutoCloser, TabId, TabRecord,
    TabSorter, Telemetry, TraySettings, TrayConfig, TrayStore, MILLIS_PER_HOUR,
};
use thiserror::Error;

use crate::bridge::{tab_record, UiCommand};
use crate::host::InMemoryBrowser;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown tab {0}")]
    UnknownTab(TabId),
    #[error("{0} is not in the inactive section")]
    TabNotInactive(TabId),
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("script i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode tray view: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabRow {
    pub display_id: DisplayId,
    pub id: TabId,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRow {
    pub display_id: DisplayId,
    pub key: String,
    pub title: String,
    pub tabs: Vec<TabRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InactiveView {
    pub expanded: bool,
    pub tabs: Vec<TabRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrayView {
    pub revision: u64,
    pub selected_tab_id: Option<TabId>,
    pub show_title_header: bool,
    pub show_other_header: bool,
    pub normal: Vec<TabRow>,
    pub groups: Vec<GroupRow>,
    pub inactive: InactiveView,
    pub private: Vec<TabRow>,
    pub auto_close_prompt: bool,
    pub undo_available: bool,
}

#[derive(Debug, Default)]
struct SectionModel {
    show_title_header: bool,
    show_other_header: bool,
    groups: Vec<SearchTermGroup>,
    inactive: InactiveSection,
}

struct SectionBindings {
    title_header: Binding<bool>,
    other_header: Binding<bool>,
    groups: Binding<Vec<SearchTermGroup>>,
    inactive: Binding<InactiveSection>,
}

impl SectionBindings {
    fn new(model: &Arc<Mutex<SectionModel>>) -> Self {
        let title = Arc::clone(model);
        let other = Arc::clone(model);
        let groups = Arc::clone(model);
        let inactive = Arc::clone(model);
        Self {
            title_header: title_header_binding(move |show| {
                title.lock().show_title_header = *show;
            }),
            other_header: other_header_binding(move |show| {
                other.lock().show_other_header = *show;
            }),
            groups: tab_group_binding(move |value| {
                groups.lock().groups = value.clone();
            }),
            inactive: inactive_section_binding(move |section| {
                inactive.lock().inactive = section.clone();
            }),
        }
    }

    fn start(&mut self, store: &TrayStore) {
        self.title_header.start(store);
        self.other_header.start(store);
        self.groups.start(store);
        self.inactive.start(store);
    }

    fn stop(&mut self) {
        self.title_header.stop();
        self.other_header.stop();
        self.groups.stop();
        self.inactive.stop();
    }
}

pub struct TrayRuntime {
    browser: Arc<InMemoryBrowser>,
    settings: Arc<dyn TraySettings>,
    clock: Arc<ManualClock>,
    store: TrayStore,
    sorter: TabSorter,
    controller: InactiveTabsController,
    auto_closer: TabAutoCloser,
    id_storage: TabAdapterIdStorage,
    min_id_capacity: usize,
    sections: SectionBindings,
    model: Arc<Mutex<SectionModel>>,
    needs_render: Arc<AtomicBool>,
    synced_browser_revision: Option<u64>,
    rendered_revision: Option<u64>,
    undo_available: bool,
    prompt_reported: bool,
}

impl TrayRuntime {
    pub fn bootstrap(
        config: &TrayConfig,
        settings: Arc<dyn TraySettings>,
        telemetry: Arc<dyn Telemetry>,
        clock: Arc<ManualClock>,
    ) -> Self {
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let browser = Arc::new(InMemoryBrowser::new(Arc::clone(&shared_clock)));
        let browser_tabs: Arc<dyn BrowserTabs> = browser.clone();
        let store = TrayStore::new();

        let needs_render = Arc::new(AtomicBool::new(false));
        let refresh_flag = Arc::clone(&needs_render);
        let controller = InactiveTabsController::new(
            Arc::clone(&browser_tabs),
            Arc::clone(&settings),
            Arc::clone(&telemetry),
            Arc::clone(&shared_clock),
            store.clone(),
            config.clone(),
            Box::new(move || refresh_flag.store(true, Ordering::SeqCst)),
        );
        let sorter = TabSorter::new(
            Arc::clone(&settings),
            Arc::clone(&shared_clock),
            store.clone(),
            config,
        );
        let auto_closer = TabAutoCloser::new(
            browser_tabs,
            Arc::clone(&settings),
            telemetry,
            shared_clock,
        );

        let model = Arc::new(Mutex::new(SectionModel::default()));
        let mut sections = SectionBindings::new(&model);
        sections.start(&store);

        let mut runtime = Self {
            browser,
            settings,
            clock,
            store,
            sorter,
            controller,
            auto_closer,
            id_storage: TabAdapterIdStorage::new(config.id_cache_capacity),
            min_id_capacity: config.id_cache_capacity,
            sections,
            model,
            needs_render,
            synced_browser_revision: None,
            rendered_revision: None,
            undo_available: false,
            prompt_reported: false,
        };
        runtime.sync(true);
        tracing::info!(
            threshold_days = config.inactive_threshold_days,
            id_cache_capacity = config.id_cache_capacity,
            "tray runtime ready"
        );
        runtime
    }

    pub fn store(&self) -> &TrayStore {
        &self.store
    }

    pub fn browser(&self) -> &InMemoryBrowser {
        &self.browser
    }

    /// Applies one command. Returns the new view when anything visible
    /// changed, or always for `print_state`.
    pub fn handle_ui_command(
        &mut self,
        command: UiCommand,
    ) -> Result<Option<TrayView>, RuntimeError> {
        let mut force_sync = false;
        let mut force_render = false;
        let undo_offered = self.undo_available;
        if !matches!(command, UiCommand::PrintState) {
            self.undo_available = false;
        }

        match command {
            UiCommand::OpenTab {
                id,
                url,
                title,
                search_term,
                private,
                idle_days,
                select,
            } => {
                let tab = tab_record(
                    id,
                    url,
                    title,
                    search_term,
                    private,
                    idle_days,
                    self.clock.now_millis(),
                );
                self.browser.open_tab(tab, select);
            }
            UiCommand::SelectTab { id } => self.browser.select_tab(&TabId::new(id))?,
            UiCommand::ExpandInactive { expanded } => {
                self.controller.update_card_expansion(expanded)
            }
            UiCommand::DismissAutoClose => self.controller.close(),
            UiCommand::EnableAutoClose => self.controller.enable_auto_closed(),
            UiCommand::OpenInactive { id } => {
                let tab = self.inactive_tab(TabId::new(id))?;
                self.controller.open_inactive_tab(&tab);
            }
            UiCommand::CloseInactive { id } => {
                let tab = self.inactive_tab(TabId::new(id))?;
                self.controller.close_inactive_tab(&tab);
            }
            UiCommand::CloseAllInactive => {
                let mut removed = false;
                self.controller
                    .delete_all_inactive_tabs(|any_removed| removed = any_removed);
                self.undo_available = removed;
                force_render = removed;
            }
            UiCommand::Undo => {
                let restored = if undo_offered {
                    self.browser.restore_last_removed()
                } else {
                    0
                };
                if restored == 0 {
                    tracing::warn!("nothing to undo");
                }
            }
            UiCommand::AdvanceClock { hours } => {
                self.clock.advance(hours.saturating_mul(MILLIS_PER_HOUR));
                force_sync = true;
            }
            UiCommand::RunAutoClose => {
                let closed = self.auto_closer.run();
                tracing::debug!(count = closed.len(), "auto-close pass finished");
            }
            UiCommand::SetFeatures {
                inactive_tabs,
                search_term_groups,
            } => {
                if let Some(enabled) = inactive_tabs {
                    self.settings.set_inactive_tabs_enabled(enabled);
                }
                if let Some(enabled) = search_term_groups {
                    self.settings.set_search_term_groups_enabled(enabled);
                }
                force_sync = true;
            }
            UiCommand::PrintState => force_render = true,
        }

        // Only a close-all that is still on offer can be undone.
        if !self.undo_available {
            self.browser.clear_undo();
        }
        self.sync(force_sync);

        let refresh_requested = self.needs_render.swap(false, Ordering::SeqCst);
        let revision = self.store.revision();
        if force_render || refresh_requested || self.rendered_revision != Some(revision) {
            return Ok(Some(self.render()));
        }
        Ok(None)
    }

    /// Reads commands line by line and writes each emitted view as one JSON
    /// line. Blank lines and `#` comments are skipped. A command that fails
    /// is logged and the script continues.
    pub fn run_script(
        &mut self,
        input: impl BufRead,
        mut output: impl Write,
    ) -> Result<usize, RuntimeError> {
        let mut emitted = 0;
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let command = match UiCommand::parse(trimmed) {
                Ok(command) => command,
                Err(error) => {
                    tracing::error!(line = index + 1, %error, "invalid command");
                    continue;
                }
            };
            match self.handle_ui_command(command) {
                Ok(Some(view)) => {
                    serde_json::to_writer(&mut output, &view)?;
                    writeln!(output)?;
                    emitted += 1;
                }
                Ok(None) => {}
                Err(error) => tracing::error!(line = index + 1, %error, "command failed"),
            }
        }
        output.flush()?;
        Ok(emitted)
    }

    pub fn shutdown(mut self) {
        self.sections.stop();
        tracing::debug!(observers = self.store.observer_count(), "tray runtime stopped");
    }

    fn sync(&mut self, force: bool) {
        let revision = self.browser.revision();
        if !force && self.synced_browser_revision == Some(revision) {
            return;
        }
        let patch = self.sorter.update_tabs(&self.browser.snapshot());
        self.synced_browser_revision = Some(revision);
        tracing::trace!(changes = patch.changes.len(), "tray synced");
    }

    fn inactive_tab(&self, id: TabId) -> Result<TabRecord, RuntimeError> {
        let state = self.store.state();
        if let Some(tab) = state
            .partition
            .inactive_tabs
            .iter()
            .find(|tab| tab.id == id)
        {
            return Ok(tab.clone());
        }
        if self.browser.snapshot().tabs.iter().any(|tab| tab.id == id) {
            Err(RuntimeError::TabNotInactive(id))
        } else {
            Err(RuntimeError::UnknownTab(id))
        }
    }

    fn render(&mut self) -> TrayView {
        let snapshot = self.store.snapshot();
        let model = self.model.lock();

        let row_count = snapshot.state.partition.normal_tabs.len()
            + snapshot.state.partition.private_tabs.len()
            + model.inactive.tabs.len()
            + model
                .groups
                .iter()
                .map(|group| group.members.len() + 1)
                .sum::<usize>();
        self.id_storage
            .resize_cache_if_needed(self.min_id_capacity.max(row_count));

        let normal = tab_rows(&mut self.id_storage, &snapshot.state.partition.normal_tabs);
        let private = tab_rows(&mut self.id_storage, &snapshot.state.partition.private_tabs);
        let inactive = InactiveView {
            expanded: model.inactive.expanded,
            tabs: tab_rows(&mut self.id_storage, &model.inactive.tabs),
        };
        let groups = model
            .groups
            .iter()
            .map(|group| GroupRow {
                display_id: self
                    .id_storage
                    .get_stable_id_for_key(RowKey::Group(group.key.clone())),
                key: group.key.clone(),
                title: group.title.clone(),
                tabs: tab_rows(&mut self.id_storage, &group.members),
            })
            .collect();

        let view = TrayView {
            revision: snapshot.revision,
            selected_tab_id: snapshot.state.selected_tab_id.clone(),
            show_title_header: model.show_title_header,
            show_other_header: model.show_other_header,
            normal,
            groups,
            inactive,
            private,
            auto_close_prompt: self.controller.should_show_auto_close_prompt(),
            undo_available: self.undo_available,
        };
        drop(model);

        if view.auto_close_prompt && !self.prompt_reported {
            self.controller.auto_close_prompt_shown();
            self.prompt_reported = true;
        }
        self.rendered_revision = Some(view.revision);
        view
    }
}

fn tab_rows(id_storage: &mut TabAdapterIdStorage, tabs: &[TabRecord]) -> Vec<TabRow> {
    tabs.iter()
        .map(|tab| TabRow {
            display_id: id_storage.get_stable_id(tab),
            id: tab.id.clone(),
            url: tab.url.clone(),
            title: tab.title.clone(),
        })
        .collect()
}
