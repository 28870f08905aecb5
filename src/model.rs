use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const MAX_WINDOW_ROWS: usize = 20;
const WINDOW_PADDING_ROWS: usize = 7;

/// Shell commands tried in order when attaching, richest first.
pub const SHELL_CANDIDATES: [&[&str]; 3] = [&["bash"], &["ash"], &["sh"]];

pub fn shell_candidates() -> Vec<Vec<String>> {
    SHELL_CANDIDATES
        .iter()
        .map(|command| command.iter().map(|part| part.to_string()).collect())
        .collect()
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SelectableItem {
    pub name: String,
    pub metadata: BTreeMap<String, String>,
}

impl SelectableItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(name: impl Into<String>, metadata: BTreeMap<String, String>) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }

    pub fn has_metadata(&self) -> bool {
        !self.metadata.is_empty()
    }

    pub fn matches_filter(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.name
            .to_ascii_lowercase()
            .contains(&needle.to_ascii_lowercase())
    }
}

/// A filterable pick-one list. `filtered` holds indices into `items`.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    items: Vec<SelectableItem>,
    filter_query: String,
    filtered: Vec<usize>,
    cursor: Option<usize>,
    window_rows: usize,
}

impl ListState {
    pub fn new(mut items: Vec<SelectableItem>) -> Self {
        items.sort_by(|left, right| left.name.cmp(&right.name));
        let window_rows = initial_window_rows(items.len());
        let mut state = Self {
            items,
            filter_query: String::new(),
            filtered: Vec::new(),
            cursor: None,
            window_rows,
        };
        state.recompute();
        state.cursor = if state.filtered.is_empty() {
            None
        } else {
            Some(0)
        };
        state
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn filter_query(&self) -> &str {
        &self.filter_query
    }

    pub fn filtered_view(&self) -> Vec<&SelectableItem> {
        self.filtered.iter().map(|index| &self.items[*index]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn window_rows(&self) -> usize {
        self.window_rows
    }

    pub fn set_window_rows(&mut self, rows: usize) {
        self.window_rows = rows;
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter_query = query.to_string();
        self.recompute();
        self.cursor = match (self.filtered.len(), self.cursor) {
            (0, _) => None,
            (len, Some(cursor)) => Some(cursor.min(len - 1)),
            (_, None) => Some(0),
        };
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let Some(current) = self.cursor else {
            return;
        };
        let max_index = self.filtered.len().saturating_sub(1) as isize;
        let next = (current as isize + delta).clamp(0, max_index) as usize;
        self.cursor = Some(next);
    }

    pub fn select_first(&mut self) {
        if !self.filtered.is_empty() {
            self.cursor = Some(0);
        }
    }

    pub fn select_last(&mut self) {
        if !self.filtered.is_empty() {
            self.cursor = Some(self.filtered.len() - 1);
        }
    }

    pub fn selected(&self) -> Option<&SelectableItem> {
        self.cursor
            .and_then(|cursor| self.filtered.get(cursor))
            .map(|index| &self.items[*index])
    }

    fn recompute(&mut self) {
        let query = self.filter_query.clone();
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.matches_filter(&query))
            .map(|(index, _)| index)
            .collect();
    }
}

pub fn initial_window_rows(item_count: usize) -> usize {
    (item_count + WINDOW_PADDING_ROWS).min(MAX_WINDOW_ROWS)
}

/// Rows left for the list once the banner and the metadata panel are drawn.
pub fn visible_rows_for(
    available_rows: u16,
    banner_height: u16,
    auxiliary_rows: usize,
    item_count: usize,
) -> usize {
    (available_rows as usize)
        .saturating_sub(banner_height as usize)
        .saturating_sub(auxiliary_rows)
        .min(item_count)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum NavLevel {
    Namespace,
    Pod,
    Container,
}

impl NavLevel {
    pub fn title(self) -> &'static str {
        match self {
            Self::Namespace => "namespaces",
            Self::Pod => "pods",
            Self::Container => "containers",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavigationFrame {
    level: NavLevel,
    pub list: ListState,
    resolved_namespace: Option<String>,
    resolved_pod: Option<String>,
}

impl NavigationFrame {
    pub fn namespaces(list: ListState) -> Self {
        Self {
            level: NavLevel::Namespace,
            list,
            resolved_namespace: None,
            resolved_pod: None,
        }
    }

    pub fn pods(namespace: impl Into<String>, list: ListState) -> Self {
        Self {
            level: NavLevel::Pod,
            list,
            resolved_namespace: Some(namespace.into()),
            resolved_pod: None,
        }
    }

    pub fn containers(
        namespace: impl Into<String>,
        pod: impl Into<String>,
        list: ListState,
    ) -> Self {
        Self {
            level: NavLevel::Container,
            list,
            resolved_namespace: Some(namespace.into()),
            resolved_pod: Some(pod.into()),
        }
    }

    pub fn level(&self) -> NavLevel {
        self.level
    }

    pub fn resolved_namespace(&self) -> Option<&str> {
        self.resolved_namespace.as_deref()
    }

    pub fn resolved_pod(&self) -> Option<&str> {
        self.resolved_pod.as_deref()
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SelectionResult {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

impl Display for SelectionResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.pod, self.container)
    }
}
