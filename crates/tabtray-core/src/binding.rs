use std::sync::Arc;

use parking_lot::Mutex;

use crate::state::{SearchTermGroup, TabRecord, TrayState};
use crate::store::{Subscription, TrayStore};

type Projection<T> = Arc<dyn Fn(&TrayState) -> T + Send + Sync>;
type ChangeCallback<T> = Arc<Mutex<Box<dyn FnMut(&T) + Send>>>;

pub struct Binding<T> {
    projection: Projection<T>,
    on_change: ChangeCallback<T>,
    subscription: Option<(TrayStore, Subscription)>,
}

impl<T> Binding<T>
where
    T: PartialEq + Send + 'static,
{
    pub fn new(
        projection: impl Fn(&TrayState) -> T + Send + Sync + 'static,
        on_change: impl FnMut(&T) + Send + 'static,
    ) -> Self {
        Self {
            projection: Arc::new(projection),
            on_change: Arc::new(Mutex::new(Box::new(on_change))),
            subscription: None,
        }
    }

    /// Subscribes to `store`. Restarting drops the previous subscription,
    /// wherever it was attached, and re-emits the current value.
    pub fn start(&mut self, store: &TrayStore) {
        self.stop();

        let projection = Arc::clone(&self.projection);
        let on_change = Arc::clone(&self.on_change);
        let mut last: Option<T> = None;
        let subscription = store.subscribe(Box::new(move |snapshot| {
            let value = projection(&snapshot.state);
            if last.as_ref() == Some(&value) {
                return;
            }
            let mut callback = on_change.lock();
            (*callback)(&value);
            last = Some(value);
        }));
        self.subscription = Some((store.clone(), subscription));
    }

    pub fn stop(&mut self) {
        if let Some((store, subscription)) = self.subscription.take() {
            store.unsubscribe(subscription);
        }
    }

    pub fn is_started(&self) -> bool {
        self.subscription.is_some()
    }
}

pub fn should_show_title_header(state: &TrayState) -> bool {
    !state.partition.normal_tabs.is_empty()
}

pub fn should_show_other_header(state: &TrayState) -> bool {
    !state.partition.normal_tabs.is_empty() && !state.partition.search_term_groups.is_empty()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InactiveSection {
    pub expanded: bool,
    pub tabs: Vec<TabRecord>,
}

pub fn inactive_section(state: &TrayState) -> InactiveSection {
    InactiveSection {
        expanded: state.inactive_expanded,
        tabs: state.partition.inactive_tabs.clone(),
    }
}

pub fn title_header_binding(on_change: impl FnMut(&bool) + Send + 'static) -> Binding<bool> {
    Binding::new(should_show_title_header, on_change)
}

pub fn other_header_binding(on_change: impl FnMut(&bool) + Send + 'static) -> Binding<bool> {
    Binding::new(should_show_other_header, on_change)
}

pub fn tab_group_binding(
    on_change: impl FnMut(&Vec<SearchTermGroup>) + Send + 'static,
) -> Binding<Vec<SearchTermGroup>> {
    Binding::new(
        |state: &TrayState| state.partition.search_term_groups.clone(),
        on_change,
    )
}

pub fn inactive_section_binding(
    on_change: impl FnMut(&InactiveSection) + Send + 'static,
) -> Binding<InactiveSection> {
    Binding::new(inactive_section, on_change)
}
