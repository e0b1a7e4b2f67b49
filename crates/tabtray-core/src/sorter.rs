use std::collections::HashMap;
use std::sync::Arc;

use crate::action::TrayAction;
use crate::browser::BrowserSnapshot;
use crate::clock::Clock;
use crate::config::TrayConfig;
use crate::ids::TabId;
use crate::patch::Patch;
use crate::settings::TraySettings;
use crate::state::{SearchTermGroup, TabPartition, TabRecord};
use crate::store::TrayStore;

pub const MIN_GROUP_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    pub inactive_enabled: bool,
    pub groups_enabled: bool,
    pub inactive_threshold_millis: i64,
}

/// True when `tab` has gone unused for longer than `threshold_millis`. The
/// selected tab is never inactive. A threshold of zero or less matches every
/// other tab.
pub fn is_inactive(
    tab: &TabRecord,
    selected_tab_id: Option<&TabId>,
    now_millis: i64,
    threshold_millis: i64,
) -> bool {
    if selected_tab_id == Some(&tab.id) {
        return false;
    }
    threshold_millis <= 0 || now_millis.saturating_sub(tab.last_active_millis()) > threshold_millis
}

/// Splits `tabs` into private, grouped, inactive and normal buckets.
///
/// Every non-private tab lands in exactly one bucket. Grouping is decided
/// before inactivity, so an old tab that shares a search term with another
/// tab stays in its group.
pub fn classify(
    tabs: &[TabRecord],
    selected_tab_id: Option<&TabId>,
    now_millis: i64,
    options: &ClassifyOptions,
) -> TabPartition {
    let mut partition = TabPartition::default();

    let mut candidates: Vec<&TabRecord> = Vec::with_capacity(tabs.len());
    for tab in tabs {
        if tab.private {
            partition.private_tabs.push(tab.clone());
        } else {
            candidates.push(tab);
        }
    }

    let mut grouped = vec![false; candidates.len()];
    if options.groups_enabled {
        partition.search_term_groups = group_by_search_term(
            &candidates,
            &mut grouped,
            selected_tab_id,
            now_millis,
        );
    }

    for (index, tab) in candidates.iter().enumerate() {
        if grouped[index] {
            continue;
        }
        if options.inactive_enabled
            && is_inactive(
                tab,
                selected_tab_id,
                now_millis,
                options.inactive_threshold_millis,
            )
        {
            partition.inactive_tabs.push((*tab).clone());
        } else {
            partition.normal_tabs.push((*tab).clone());
        }
    }

    partition
}

fn group_by_search_term(
    candidates: &[&TabRecord],
    grouped: &mut [bool],
    selected_tab_id: Option<&TabId>,
    now_millis: i64,
) -> Vec<SearchTermGroup> {
    let mut key_order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, tab) in candidates.iter().enumerate() {
        if let Some(key) = tab.search_term_key() {
            buckets
                .entry(key.clone())
                .or_insert_with(|| {
                    key_order.push(key);
                    Vec::new()
                })
                .push(index);
        }
    }

    let mut groups = Vec::new();
    for key in key_order {
        let Some(indices) = buckets.remove(&key) else {
            continue;
        };
        if indices.len() < MIN_GROUP_SIZE {
            continue;
        }

        let members: Vec<TabRecord> = indices.iter().map(|i| candidates[*i].clone()).collect();
        let last_active_millis = members
            .iter()
            .map(|tab| {
                if selected_tab_id == Some(&tab.id) {
                    now_millis
                } else {
                    tab.last_active_millis()
                }
            })
            .max()
            .unwrap_or_default();
        let title = members[0]
            .search_term
            .as_deref()
            .map(str::trim)
            .unwrap_or(key.as_str())
            .to_owned();
        for index in indices {
            grouped[index] = true;
        }
        groups.push(SearchTermGroup {
            key,
            title,
            members,
            last_active_millis,
        });
    }

    // Stable: groups with equal recency keep first-appearance order.
    groups.sort_by(|a, b| b.last_active_millis.cmp(&a.last_active_millis));
    groups
}

pub struct TabSorter {
    settings: Arc<dyn TraySettings>,
    clock: Arc<dyn Clock>,
    store: TrayStore,
    inactive_threshold_millis: i64,
}

impl TabSorter {
    pub fn new(
        settings: Arc<dyn TraySettings>,
        clock: Arc<dyn Clock>,
        store: TrayStore,
        config: &TrayConfig,
    ) -> Self {
        Self {
            settings,
            clock,
            store,
            inactive_threshold_millis: config.inactive_threshold_millis(),
        }
    }

    pub fn options(&self) -> ClassifyOptions {
        ClassifyOptions {
            inactive_enabled: self.settings.inactive_tabs_enabled(),
            groups_enabled: self.settings.search_term_groups_enabled(),
            inactive_threshold_millis: self.inactive_threshold_millis,
        }
    }

    pub fn update_tabs(&self, snapshot: &BrowserSnapshot) -> Patch {
        let selected = snapshot.selected_tab_id.as_ref();
        let partition = classify(
            &snapshot.tabs,
            selected,
            self.clock.now_millis(),
            &self.options(),
        );

        tracing::debug!(
            browser_revision = snapshot.revision,
            normal = partition.normal_tabs.len(),
            inactive = partition.inactive_tabs.len(),
            groups = partition.search_term_groups.len(),
            private = partition.private_tabs.len(),
            "classified tabs"
        );

        self.store.dispatch(TrayAction::UpdatePartition {
            partition,
            selected_tab_id: snapshot.selected_tab_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use proptest::prelude::*;

    use crate::browser::BrowserSnapshot;
    use crate::clock::{ManualClock, MILLIS_PER_DAY, MILLIS_PER_HOUR};
    use crate::config::TrayConfig;
    use crate::ids::TabId;
    use crate::settings::{InMemorySettings, TraySettings};
    use crate::state::TabRecord;
    use crate::store::TrayStore;

    use super::{classify, ClassifyOptions, TabSorter};

    const NOW: i64 = 1_700_000_000_000;

    fn options(inactive_enabled: bool, groups_enabled: bool) -> ClassifyOptions {
        ClassifyOptions {
            inactive_enabled,
            groups_enabled,
            inactive_threshold_millis: 30 * MILLIS_PER_DAY,
        }
    }

    fn tab(id: &str, accessed_ago: i64) -> TabRecord {
        let mut tab = TabRecord::new(id, format!("https://{id}.example"));
        tab.last_access_millis = NOW - accessed_ago;
        tab.created_at_millis = NOW - accessed_ago;
        tab
    }

    fn searched(id: &str, accessed_ago: i64, term: &str) -> TabRecord {
        let mut tab = tab(id, accessed_ago);
        tab.search_term = Some(term.to_owned());
        tab
    }

    fn ids(tabs: &[TabRecord]) -> Vec<&str> {
        tabs.iter().map(|tab| tab.id.as_str()).collect()
    }

    fn scenario_tabs() -> Vec<TabRecord> {
        let mut private = tab("t5", MILLIS_PER_HOUR);
        private.private = true;
        vec![
            tab("t1", 0),
            tab("t2", 40 * MILLIS_PER_DAY),
            searched("t3", MILLIS_PER_HOUR, "shoes"),
            searched("t4", 2 * MILLIS_PER_HOUR, "shoes"),
            private,
        ]
    }

    #[test]
    fn classifies_end_to_end_scenario() {
        let tabs = scenario_tabs();
        let selected = TabId::from("t1");

        let partition = classify(&tabs, Some(&selected), NOW, &options(true, true));

        assert_eq!(ids(&partition.normal_tabs), vec!["t1"]);
        assert_eq!(ids(&partition.inactive_tabs), vec!["t2"]);
        assert_eq!(partition.search_term_groups.len(), 1);
        assert_eq!(partition.search_term_groups[0].key, "shoes");
        assert_eq!(ids(&partition.search_term_groups[0].members), vec!["t3", "t4"]);
        assert_eq!(ids(&partition.private_tabs), vec!["t5"]);
    }

    #[test]
    fn empty_collection_yields_empty_partition() {
        let partition = classify(&[], None, NOW, &options(true, true));
        assert!(partition.is_empty());
    }

    #[test]
    fn singleton_search_term_degrades_to_inactive_or_normal() {
        let tabs = vec![
            searched("old", 60 * MILLIS_PER_DAY, "boots"),
            searched("fresh", MILLIS_PER_HOUR, "hats"),
        ];

        let partition = classify(&tabs, None, NOW, &options(true, true));

        assert!(partition.search_term_groups.is_empty());
        assert_eq!(ids(&partition.inactive_tabs), vec!["old"]);
        assert_eq!(ids(&partition.normal_tabs), vec!["fresh"]);
    }

    #[test]
    fn grouping_takes_priority_over_inactivity() {
        let tabs = vec![
            searched("a", 90 * MILLIS_PER_DAY, "Rust"),
            searched("b", 80 * MILLIS_PER_DAY, "rust "),
        ];

        let partition = classify(&tabs, None, NOW, &options(true, true));

        assert!(partition.inactive_tabs.is_empty());
        assert_eq!(partition.search_term_groups[0].title, "Rust");
        assert_eq!(ids(&partition.search_term_groups[0].members), vec!["a", "b"]);
    }

    #[test]
    fn groups_are_ordered_by_most_recent_member() {
        let tabs = vec![
            searched("a1", 5 * MILLIS_PER_HOUR, "alpha"),
            searched("b1", 3 * MILLIS_PER_HOUR, "beta"),
            searched("a2", 4 * MILLIS_PER_HOUR, "alpha"),
            searched("b2", 6 * MILLIS_PER_HOUR, "beta"),
        ];

        let partition = classify(&tabs, None, NOW, &options(true, true));

        let keys: Vec<&str> = partition
            .search_term_groups
            .iter()
            .map(|group| group.key.as_str())
            .collect();
        assert_eq!(keys, vec!["beta", "alpha"]);
    }

    #[test]
    fn selected_member_makes_its_group_most_recent() {
        let tabs = vec![
            searched("a1", MILLIS_PER_HOUR, "alpha"),
            searched("a2", 2 * MILLIS_PER_HOUR, "alpha"),
            searched("b1", 40 * MILLIS_PER_DAY, "beta"),
            searched("b2", 41 * MILLIS_PER_DAY, "beta"),
        ];
        let selected = TabId::from("b2");

        let partition = classify(&tabs, Some(&selected), NOW, &options(true, true));

        assert_eq!(partition.search_term_groups[0].key, "beta");
        assert_eq!(partition.search_term_groups[0].last_active_millis, NOW);
    }

    #[test]
    fn non_positive_threshold_marks_every_eligible_tab_inactive() {
        let tabs = vec![tab("t1", 0), tab("t2", 0), tab("t3", MILLIS_PER_HOUR)];
        let selected = TabId::from("t2");

        for threshold in [0, -1] {
            let options = ClassifyOptions {
                inactive_threshold_millis: threshold,
                ..options(true, false)
            };
            let partition = classify(&tabs, Some(&selected), NOW, &options);
            assert_eq!(ids(&partition.inactive_tabs), vec!["t1", "t3"]);
            assert_eq!(ids(&partition.normal_tabs), vec!["t2"]);
        }
    }

    #[test]
    fn never_accessed_tab_uses_creation_time() {
        let mut created_recently = TabRecord::new("new", "https://new.example");
        created_recently.created_at_millis = NOW - MILLIS_PER_HOUR;

        let partition = classify(&[created_recently], None, NOW, &options(true, true));

        assert_eq!(ids(&partition.normal_tabs), vec!["new"]);
    }

    #[test]
    fn sorter_publishes_and_is_idempotent() {
        let store = TrayStore::new();
        let settings = Arc::new(InMemorySettings::default());
        let clock = Arc::new(ManualClock::new(NOW));
        let config = TrayConfig {
            inactive_threshold_days: 30,
            ..TrayConfig::default()
        };
        let sorter = TabSorter::new(settings.clone(), clock, store.clone(), &config);
        let snapshot = BrowserSnapshot {
            tabs: scenario_tabs(),
            selected_tab_id: Some(TabId::from("t1")),
            revision: 1,
        };

        let first = sorter.update_tabs(&snapshot);
        let second = sorter.update_tabs(&snapshot);

        assert!(!first.is_noop());
        assert!(second.is_noop(), "unchanged input must not produce a new revision");
        assert_eq!(ids(&store.state().partition.inactive_tabs), vec!["t2"]);

        settings.set_inactive_tabs_enabled(false);
        sorter.update_tabs(&snapshot);
        let state = store.state();
        assert!(state.partition.inactive_tabs.is_empty());
        assert_eq!(ids(&state.partition.normal_tabs), vec!["t1", "t2"]);
    }

    fn arb_tabs() -> impl Strategy<Value = Vec<TabRecord>> {
        prop::collection::vec(
            (
                0i64..(90 * MILLIS_PER_DAY),
                any::<bool>(),
                prop::option::of(prop::sample::select(vec!["shoes", "Shoes", "rust", " "])),
            ),
            0..24,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(index, (age, private, term))| {
                    let mut tab = TabRecord::new(format!("t{index}"), "https://example.com");
                    tab.last_access_millis = NOW - age;
                    tab.private = private;
                    tab.search_term = term.map(str::to_owned);
                    tab
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn partition_is_complete_and_disjoint(
            tabs in arb_tabs(),
            inactive_enabled in any::<bool>(),
            groups_enabled in any::<bool>(),
        ) {
            let partition = classify(&tabs, None, NOW, &options(inactive_enabled, groups_enabled));

            let private_count = tabs.iter().filter(|tab| tab.private).count();
            prop_assert_eq!(partition.private_tabs.len(), private_count);
            prop_assert_eq!(partition.non_private_len(), tabs.len() - private_count);

            let mut seen = HashSet::new();
            let grouped = partition
                .search_term_groups
                .iter()
                .flat_map(|group| group.members.iter());
            for tab in partition
                .normal_tabs
                .iter()
                .chain(partition.inactive_tabs.iter())
                .chain(grouped)
            {
                prop_assert!(!tab.private);
                prop_assert!(seen.insert(tab.id.clone()), "{} appears twice", tab.id);
            }
            for group in &partition.search_term_groups {
                prop_assert!(group.members.len() >= 2);
            }
        }

        #[test]
        fn selected_tab_is_never_inactive(tabs in arb_tabs(), pick in any::<prop::sample::Index>()) {
            prop_assume!(!tabs.is_empty());
            let selected = tabs[pick.index(tabs.len())].id.clone();

            let partition = classify(&tabs, Some(&selected), NOW, &options(true, true));

            prop_assert!(partition.inactive_tabs.iter().all(|tab| tab.id != selected));
        }

        #[test]
        fn feature_flags_gate_their_buckets(tabs in arb_tabs()) {
            let no_inactive = classify(&tabs, None, NOW, &options(false, true));
            prop_assert!(no_inactive.inactive_tabs.is_empty());

            let no_groups = classify(&tabs, None, NOW, &options(true, false));
            prop_assert!(no_groups.search_term_groups.is_empty());
        }
    }
}
