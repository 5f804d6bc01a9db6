use crate::filter;
use crate::input::Action;
use crate::model::{Catalog, ResourceDescriptor};
use tracing::debug;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputMode {
    Browse,
    Search,
}

/// The list/viewport state of a session.
///
/// `active_list` is either every catalog name or the ranked result of the
/// current search. `active_indices` holds the catalog position of each entry,
/// so names listed under several groups stay distinct. After every mutation
/// `cursor` indexes into `active_list` (or is 0 when it is empty) and the window
/// `[scroll_offset, scroll_offset + viewport_height)` contains the cursor.
pub struct App {
    running: bool,
    mode: InputMode,
    catalog: Catalog,
    all_names: Vec<String>,
    active_list: Vec<String>,
    active_indices: Vec<usize>,
    cursor: usize,
    scroll_offset: usize,
    query: String,
    viewport_width: u16,
    viewport_height: u16,
    cluster: String,
    context: String,
}

impl App {
    pub fn new(catalog: Catalog, cluster: String, context: String) -> Self {
        let all_names = catalog.names();
        let mut app = Self {
            running: true,
            mode: InputMode::Browse,
            active_list: all_names.clone(),
            active_indices: (0..all_names.len()).collect(),
            all_names,
            catalog,
            cursor: 0,
            scroll_offset: 0,
            query: String::new(),
            viewport_width: 80,
            viewport_height: 20,
            cluster,
            context,
        };
        app.select_last();
        app
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn active_list(&self) -> &[String] {
        &self.active_list
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_width(&self) -> u16 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> u16 {
        self.viewport_height
    }

    /// Name under the cursor, or `""` when the active list is empty.
    pub fn selected_name(&self) -> &str {
        self.active_list
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn selected_descriptor(&self) -> Option<&ResourceDescriptor> {
        self.active_indices
            .get(self.cursor)
            .and_then(|&index| self.catalog.get(index))
    }

    /// The rows inside the scroll window, paired with their index in the
    /// active list.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &str)> {
        self.active_list
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(self.viewport_height as usize)
            .map(|(index, name)| (index, name.as_str()))
    }

    /// Applies new list dimensions. Cursor, mode and list contents are kept;
    /// only the scroll window may move.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport_width = width.max(1);
        self.viewport_height = height.max(1);
        self.sync_scroll();
    }

    pub fn apply_action(&mut self, action: Action) {
        debug!("mode={:?} action={action:?}", self.mode);
        match self.mode {
            InputMode::Browse => self.apply_browse_action(action),
            InputMode::Search => self.apply_search_action(action),
        }
    }

    fn apply_browse_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Up => self.move_selection(-1),
            Action::Down => self.move_selection(1),
            Action::PageUp => self.move_selection(-self.page_step()),
            Action::PageDown => self.move_selection(self.page_step()),
            Action::Top => self.select_first(),
            Action::Bottom => self.select_last(),
            Action::StartSearch => {
                self.mode = InputMode::Search;
                self.query.clear();
            }
            Action::Reset => self.restore_catalog(),
            Action::SubmitInput
            | Action::CancelInput
            | Action::Backspace
            | Action::InputChar(_) => {}
        }
    }

    fn apply_search_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::InputChar(c) => {
                self.query.push(c);
                self.refilter();
            }
            Action::Backspace => {
                self.query.pop();
                self.refilter();
            }
            Action::SubmitInput => {
                // Committing nothing would leave Browse with an empty list.
                if self.active_list.is_empty() {
                    return;
                }
                self.mode = InputMode::Browse;
                self.select_first();
            }
            Action::CancelInput => {
                self.mode = InputMode::Browse;
                self.restore_catalog();
            }
            Action::Up
            | Action::Down
            | Action::PageUp
            | Action::PageDown
            | Action::Top
            | Action::Bottom
            | Action::StartSearch
            | Action::Reset => {}
        }
    }

    fn refilter(&mut self) {
        if self.query.is_empty() {
            self.show_all();
        } else {
            let indices = filter::rank(&self.query, &self.all_names);
            self.active_list = indices
                .iter()
                .map(|&index| self.all_names[index].clone())
                .collect();
            self.active_indices = indices;
        }
        self.select_first();
    }

    fn restore_catalog(&mut self) {
        self.query.clear();
        self.show_all();
        self.select_last();
    }

    fn show_all(&mut self) {
        self.active_list = self.all_names.clone();
        self.active_indices = (0..self.all_names.len()).collect();
    }

    fn page_step(&self) -> isize {
        self.viewport_height.max(1) as isize
    }

    fn move_selection(&mut self, delta: isize) {
        if self.active_list.is_empty() {
            self.cursor = 0;
            self.sync_scroll();
            return;
        }

        let max_index = self.active_list.len().saturating_sub(1) as isize;
        let current = self.cursor.min(max_index as usize) as isize;
        self.cursor = (current + delta).clamp(0, max_index) as usize;
        self.sync_scroll();
    }

    fn select_first(&mut self) {
        self.cursor = 0;
        self.sync_scroll();
    }

    fn select_last(&mut self) {
        self.cursor = self.active_list.len().saturating_sub(1);
        self.sync_scroll();
    }

    /// Keeps the cursor at the nearest edge of the window rather than
    /// recentering. The upward check runs before the downward one so the
    /// latter sees the corrected offset.
    fn sync_scroll(&mut self) {
        let height = self.viewport_height.max(1) as usize;

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        }

        if self.cursor >= self.scroll_offset + height {
            self.scroll_offset = self.cursor + 1 - height;
        }

        let max_offset = self.active_list.len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }
}

#[cfg(test)]
mod tests {
    use super::{App, InputMode};
    use crate::input::Action;
    use crate::model::{Catalog, GroupVersionResource, ResourceDescriptor};
    use chrono::Local;

    fn catalog(names: &[&str]) -> Catalog {
        let resources = names
            .iter()
            .map(|name| ResourceDescriptor {
                name: name.to_string(),
                kind: name.to_string(),
                namespaced: true,
                gvr: GroupVersionResource {
                    group: String::new(),
                    version: "v1".to_string(),
                    resource: name.to_string(),
                },
            })
            .collect();
        Catalog::new(resources, Vec::new(), Local::now())
    }

    fn app_with(names: &[&str], height: u16) -> App {
        let mut app = App::new(
            catalog(names),
            "https://127.0.0.1:6443/".to_string(),
            "kind-dev".to_string(),
        );
        app.resize(80, height);
        app
    }

    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("kind{index:02}")).collect()
    }

    fn app_with_count(count: usize, height: u16) -> App {
        let names = numbered(count);
        let refs = names.iter().map(String::as_str).collect::<Vec<_>>();
        app_with(&refs, height)
    }

    fn type_query(app: &mut App, query: &str) {
        for c in query.chars() {
            app.apply_action(Action::InputChar(c));
        }
    }

    fn assert_window_contains_cursor(app: &App) {
        let height = app.viewport_height() as usize;
        let len = app.active_list().len();
        if len >= height {
            assert!(app.scroll_offset() <= app.cursor());
            assert!(app.cursor() < app.scroll_offset() + height);
        } else {
            assert_eq!(app.scroll_offset(), 0);
        }
    }

    const SAMPLE: [&str; 4] = ["pods", "services", "podtemplates", "deployments"];

    #[test]
    fn starts_in_browse_mode_at_last_item() {
        let app = app_with(&SAMPLE, 10);
        assert_eq!(app.mode(), InputMode::Browse);
        assert_eq!(app.cursor(), 3);
        assert_eq!(app.selected_name(), "deployments");
        assert_eq!(app.active_list(), app.catalog().names().as_slice());
    }

    #[test]
    fn initial_window_shows_bottom_of_long_list() {
        let app = app_with_count(50, 10);
        assert_eq!(app.cursor(), 49);
        assert_eq!(app.scroll_offset(), 40);
    }

    #[test]
    fn up_and_down_clamp_at_edges() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::Down);
        assert_eq!(app.cursor(), 3);

        for _ in 0..10 {
            app.apply_action(Action::Up);
        }
        assert_eq!(app.cursor(), 0);
        assert_eq!(app.selected_name(), "pods");

        app.apply_action(Action::Down);
        assert_eq!(app.selected_name(), "services");
    }

    #[test]
    fn cursor_and_window_stay_consistent_under_any_movement() {
        let mut app = app_with_count(37, 7);
        let moves = [
            Action::Up,
            Action::Down,
            Action::PageUp,
            Action::PageDown,
            Action::Top,
            Action::Bottom,
        ];
        let mut seed = 17u64;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let action = moves[(seed >> 33) as usize % moves.len()].clone();
            app.apply_action(action);
            assert!(app.cursor() < app.active_list().len());
            assert_window_contains_cursor(&app);
        }
    }

    #[test]
    fn scrolling_up_keeps_cursor_on_top_edge() {
        let mut app = app_with_count(30, 5);
        assert_eq!(app.scroll_offset(), 25);
        for _ in 0..6 {
            app.apply_action(Action::Up);
        }
        assert_eq!(app.cursor(), 23);
        assert_eq!(app.scroll_offset(), 23);
    }

    #[test]
    fn scrolling_down_keeps_cursor_on_bottom_edge() {
        let mut app = app_with_count(30, 5);
        app.apply_action(Action::Top);
        assert_eq!(app.scroll_offset(), 0);
        for _ in 0..7 {
            app.apply_action(Action::Down);
        }
        assert_eq!(app.cursor(), 7);
        assert_eq!(app.scroll_offset(), 3);
    }

    #[test]
    fn jump_to_bottom_puts_cursor_on_window_bottom_edge() {
        let mut app = app_with_count(25, 6);
        app.apply_action(Action::Top);
        app.apply_action(Action::Down);
        app.apply_action(Action::Bottom);
        assert_eq!(app.cursor(), 24);
        assert_eq!(app.scroll_offset() + app.viewport_height() as usize - 1, 24);
    }

    #[test]
    fn paging_moves_by_viewport_height() {
        let mut app = app_with_count(30, 8);
        app.apply_action(Action::Top);
        app.apply_action(Action::PageDown);
        assert_eq!(app.cursor(), 8);
        app.apply_action(Action::PageDown);
        app.apply_action(Action::PageDown);
        app.apply_action(Action::PageDown);
        assert_eq!(app.cursor(), 29);
        app.apply_action(Action::PageUp);
        assert_eq!(app.cursor(), 21);
    }

    #[test]
    fn entering_search_keeps_full_list_and_clears_query() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        assert_eq!(app.mode(), InputMode::Search);
        assert_eq!(app.query(), "");
        assert_eq!(app.active_list(), app.catalog().names().as_slice());
    }

    #[test]
    fn typing_ranks_against_full_catalog_and_resets_cursor() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "pod");

        assert_eq!(app.query(), "pod");
        assert_eq!(app.cursor(), 0);
        let mut listed = app.active_list().to_vec();
        listed.sort();
        assert_eq!(listed, vec!["podtemplates".to_string(), "pods".to_string()]);
    }

    #[test]
    fn committing_search_switches_to_browse_on_filtered_list() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "pod");
        app.apply_action(Action::SubmitInput);

        assert_eq!(app.mode(), InputMode::Browse);
        assert_eq!(app.cursor(), 0);
        assert_eq!(app.active_list().len(), 2);
        assert!(app.active_list().contains(&"pods".to_string()));
        assert!(app.active_list().contains(&"podtemplates".to_string()));
        assert_eq!(app.selected_name(), app.active_list()[0]);
    }

    #[test]
    fn committed_list_clamps_cursor() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "pod");
        app.apply_action(Action::SubmitInput);
        app.apply_action(Action::Down);
        assert_eq!(app.cursor(), 1);
        app.apply_action(Action::Down);
        assert_eq!(app.cursor(), 1);
    }

    #[test]
    fn committing_empty_result_stays_in_search() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "zzznomatch");
        app.apply_action(Action::SubmitInput);

        assert_eq!(app.mode(), InputMode::Search);
        assert!(app.active_list().is_empty());
        assert_eq!(app.query(), "zzznomatch");
    }

    #[test]
    fn zero_matches_leave_inert_empty_selection() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "zzznomatch");

        assert!(app.active_list().is_empty());
        assert_eq!(app.cursor(), 0);
        assert_eq!(app.scroll_offset(), 0);
        assert_eq!(app.selected_name(), "");
        assert!(app.selected_descriptor().is_none());
        assert_eq!(app.visible_rows().count(), 0);
    }

    #[test]
    fn clearing_query_restores_full_list() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "svc");
        for _ in 0..3 {
            app.apply_action(Action::Backspace);
        }
        assert_eq!(app.query(), "");
        assert_eq!(app.active_list(), app.catalog().names().as_slice());
        assert_eq!(app.cursor(), 0);

        app.apply_action(Action::Backspace);
        assert_eq!(app.query(), "");
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn committing_with_empty_query_keeps_full_list() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "pod");
        app.apply_action(Action::Backspace);
        app.apply_action(Action::Backspace);
        app.apply_action(Action::Backspace);
        app.apply_action(Action::SubmitInput);

        assert_eq!(app.mode(), InputMode::Browse);
        assert_eq!(app.active_list().len(), SAMPLE.len());
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn cancelling_search_restores_catalog_at_last_index() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "zzznomatch");
        app.apply_action(Action::CancelInput);

        assert_eq!(app.mode(), InputMode::Browse);
        assert_eq!(app.query(), "");
        assert_eq!(app.active_list(), app.catalog().names().as_slice());
        assert_eq!(app.cursor(), SAMPLE.len() - 1);

        app.apply_action(Action::StartSearch);
        app.apply_action(Action::CancelInput);
        assert_eq!(app.cursor(), SAMPLE.len() - 1);
    }

    #[test]
    fn reset_from_browse_drops_committed_filter() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "pod");
        app.apply_action(Action::SubmitInput);
        app.apply_action(Action::Reset);

        assert_eq!(app.mode(), InputMode::Browse);
        assert_eq!(app.active_list(), app.catalog().names().as_slice());
        assert_eq!(app.cursor(), SAMPLE.len() - 1);
        assert_eq!(app.selected_name(), "deployments");
    }

    #[test]
    fn reentering_search_keeps_committed_list_until_typing() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "pod");
        app.apply_action(Action::SubmitInput);
        app.apply_action(Action::StartSearch);

        assert_eq!(app.query(), "");
        assert_eq!(app.active_list().len(), 2);

        app.apply_action(Action::InputChar('s'));
        assert!(app.active_list().contains(&"services".to_string()));
    }

    #[test]
    fn navigation_is_ignored_while_searching() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        app.apply_action(Action::Top);
        app.apply_action(Action::Reset);
        assert_eq!(app.mode(), InputMode::Search);
        assert_eq!(app.cursor(), SAMPLE.len() - 1);
    }

    #[test]
    fn text_input_is_ignored_while_browsing() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::InputChar('x'));
        app.apply_action(Action::SubmitInput);
        assert_eq!(app.query(), "");
        assert_eq!(app.mode(), InputMode::Browse);
        assert_eq!(app.active_list().len(), SAMPLE.len());
    }

    #[test]
    fn resize_only_moves_scroll_window() {
        let mut app = app_with_count(40, 10);
        app.apply_action(Action::Top);
        for _ in 0..15 {
            app.apply_action(Action::Down);
        }
        let before = app.active_list().to_vec();
        assert_eq!(app.scroll_offset(), 6);

        app.resize(120, 4);
        assert_eq!(app.cursor(), 15);
        assert_eq!(app.mode(), InputMode::Browse);
        assert_eq!(app.active_list(), before.as_slice());
        assert_eq!(app.viewport_width(), 120);
        assert_eq!(app.viewport_height(), 4);
        assert_window_contains_cursor(&app);
        assert_eq!(app.scroll_offset(), 12);

        app.resize(120, 4);
        assert_eq!(app.scroll_offset(), 12);
    }

    #[test]
    fn growing_viewport_past_list_length_resets_offset() {
        let mut app = app_with_count(30, 5);
        assert_eq!(app.scroll_offset(), 25);
        app.resize(80, 50);
        assert_eq!(app.scroll_offset(), 0);
        assert_eq!(app.cursor(), 29);
    }

    #[test]
    fn zero_height_is_clamped() {
        let mut app = app_with_count(5, 3);
        app.resize(0, 0);
        assert_eq!(app.viewport_height(), 1);
        assert_eq!(app.viewport_width(), 1);
        assert_eq!(app.scroll_offset(), app.cursor());
    }

    #[test]
    fn visible_rows_follow_scroll_window() {
        let mut app = app_with_count(10, 3);
        app.apply_action(Action::Top);
        app.apply_action(Action::Down);
        app.apply_action(Action::Down);
        app.apply_action(Action::Down);
        let rows = app.visible_rows().collect::<Vec<_>>();
        assert_eq!(rows, vec![(1, "kind01"), (2, "kind02"), (3, "kind03")]);
    }

    #[test]
    fn empty_catalog_is_inert() {
        let mut app = app_with(&[], 10);
        assert_eq!(app.cursor(), 0);
        for action in [
            Action::Up,
            Action::Down,
            Action::Top,
            Action::Bottom,
            Action::PageDown,
            Action::Reset,
        ] {
            app.apply_action(action);
            assert_eq!(app.cursor(), 0);
            assert_eq!(app.selected_name(), "");
        }
        app.apply_action(Action::StartSearch);
        app.apply_action(Action::SubmitInput);
        assert_eq!(app.mode(), InputMode::Search);
    }

    #[test]
    fn selected_descriptor_follows_cursor() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::Top);
        let descriptor = app.selected_descriptor().map(|d| d.name.clone());
        assert_eq!(descriptor.as_deref(), Some("pods"));
    }

    fn events_descriptor(group: &str) -> ResourceDescriptor {
        ResourceDescriptor {
            name: "events".to_string(),
            kind: "Event".to_string(),
            namespaced: true,
            gvr: GroupVersionResource {
                group: group.to_string(),
                version: "v1".to_string(),
                resource: "events".to_string(),
            },
        }
    }

    fn app_with_duplicate_events() -> App {
        let pods = ResourceDescriptor {
            name: "pods".to_string(),
            kind: "Pod".to_string(),
            namespaced: true,
            gvr: GroupVersionResource {
                group: String::new(),
                version: "v1".to_string(),
                resource: "pods".to_string(),
            },
        };
        let resources = vec![events_descriptor(""), pods, events_descriptor("events.k8s.io")];
        let mut app = App::new(
            Catalog::new(resources, Vec::new(), Local::now()),
            "https://127.0.0.1:6443/".to_string(),
            "kind-dev".to_string(),
        );
        app.resize(80, 10);
        app
    }

    fn selected_gvr(app: &App) -> Option<String> {
        app.selected_descriptor()
            .map(|descriptor| descriptor.gvr.to_string())
    }

    #[test]
    fn duplicate_names_resolve_to_their_own_descriptor() {
        let mut app = app_with_duplicate_events();
        app.apply_action(Action::Bottom);
        assert_eq!(app.cursor(), 2);
        assert_eq!(selected_gvr(&app).as_deref(), Some("events.k8s.io/v1/events"));

        app.apply_action(Action::Top);
        assert_eq!(selected_gvr(&app).as_deref(), Some("v1/events"));
    }

    #[test]
    fn duplicate_names_stay_distinct_after_filtering() {
        let mut app = app_with_duplicate_events();
        app.apply_action(Action::StartSearch);
        type_query(&mut app, "events");
        app.apply_action(Action::SubmitInput);

        assert_eq!(app.active_list(), ["events", "events"]);
        assert_eq!(selected_gvr(&app).as_deref(), Some("v1/events"));
        app.apply_action(Action::Down);
        assert_eq!(selected_gvr(&app).as_deref(), Some("events.k8s.io/v1/events"));

        app.apply_action(Action::Reset);
        assert_eq!(app.cursor(), 2);
        assert_eq!(selected_gvr(&app).as_deref(), Some("events.k8s.io/v1/events"));
    }

    #[test]
    fn quit_works_in_both_modes() {
        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::Quit);
        assert!(!app.running());

        let mut app = app_with(&SAMPLE, 10);
        app.apply_action(Action::StartSearch);
        app.apply_action(Action::Quit);
        assert!(!app.running());
    }
}
