//! Row selection on management screens
//!
//! A selection is a pure reducer over an ordered set of entity ids. Each
//! screen owns its own set; nothing is shared between screens or persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Ids checked by the operator, in the order they were checked
///
/// Equality is set equality: the check order is kept for display only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectionSet {
    ids: Vec<String>,
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.ids.len() == other.ids.len() && self.ids.iter().all(|id| other.contains(id))
    }
}

impl Eq for SelectionSet {}

/// Reducer actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Toggle(String),
    SelectAll(Vec<String>),
    Clear,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(mut self, action: Selection) -> Self {
        match action {
            Selection::Toggle(id) => {
                match self.ids.iter().position(|existing| *existing == id) {
                    Some(index) => {
                        self.ids.remove(index);
                    }
                    None => self.ids.push(id),
                }
            }
            Selection::SelectAll(ids) => {
                for id in ids {
                    if !self.ids.contains(&id) {
                        self.ids.push(id);
                    }
                }
            }
            Selection::Clear => self.ids.clear(),
        }
        self
    }

    pub fn toggle(self, id: impl Into<String>) -> Self {
        self.apply(Selection::Toggle(id.into()))
    }

    pub fn clear(self) -> Self {
        self.apply(Selection::Clear)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<String> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        SelectionSet::new().apply(Selection::SelectAll(iter.into_iter().collect()))
    }
}

impl From<Vec<String>> for SelectionSet {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<SelectionSet> for Vec<String> {
    fn from(set: SelectionSet) -> Self {
        set.ids
    }
}

/// Management screens that keep a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Authors,
    Books,
    Categories,
    Patrons,
    Employees,
    Borrowing,
    Fines,
    Warehouse,
    Notifications,
}

/// One selection per screen, owned by whoever renders the screens
#[derive(Debug, Clone, Default)]
pub struct ScreenSelections {
    sets: HashMap<Screen, SelectionSet>,
}

impl ScreenSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, screen: Screen) -> SelectionSet {
        self.sets.get(&screen).cloned().unwrap_or_default()
    }

    pub fn dispatch(&mut self, screen: Screen, action: Selection) -> &SelectionSet {
        let current = self.sets.remove(&screen).unwrap_or_default();
        self.sets.entry(screen).or_insert(current.apply(action))
    }

    /// Leaving a screen drops its selection
    pub fn navigate_away(&mut self, screen: Screen) {
        self.sets.remove(&screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[&str]) -> SelectionSet {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_toggle_twice_restores_original() {
        for original in [set(&[]), set(&["1"]), set(&["1", "2", "3"])] {
            for id in ["1", "2", "9"] {
                let round_trip = original.clone().toggle(id).toggle(id);
                assert_eq!(round_trip, original);
            }
        }
    }

    #[test]
    fn test_equality_ignores_check_order() {
        assert_eq!(set(&["1", "2", "3"]), set(&["3", "1", "2"]));
        assert_ne!(set(&["1", "2"]), set(&["1", "2", "3"]));
        assert_ne!(set(&["1", "2"]), set(&["1", "4"]));
    }

    #[test]
    fn test_clear_always_empties() {
        for original in [set(&[]), set(&["a"]), set(&["a", "b", "c"])] {
            assert!(original.clear().is_empty());
        }
    }

    #[test]
    fn test_select_all_deduplicates_and_keeps_order() {
        let selection = set(&["2"]).apply(Selection::SelectAll(vec![
            "1".to_string(),
            "2".to_string(),
            "3".to_string(),
            "1".to_string(),
        ]));
        assert_eq!(selection.ids(), ["2", "1", "3"]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let selection: SelectionSet = serde_json::from_str(r#"["7","7","8"]"#).unwrap();
        assert_eq!(serde_json::to_string(&selection).unwrap(), r#"["7","8"]"#);
    }

    #[test]
    fn test_screens_are_independent() {
        let mut screens = ScreenSelections::new();
        screens.dispatch(Screen::Authors, Selection::Toggle("1".to_string()));
        screens.dispatch(Screen::Books, Selection::Toggle("b1".to_string()));

        assert!(screens.get(Screen::Authors).contains("1"));
        assert!(!screens.get(Screen::Authors).contains("b1"));

        screens.navigate_away(Screen::Authors);
        assert!(screens.get(Screen::Authors).is_empty());
        assert_eq!(screens.get(Screen::Books).len(), 1);
    }
}
