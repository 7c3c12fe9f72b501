#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Model,
    Session,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerItem {
    pub id: String,
    pub label: String,
}

impl PickerItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PickerState {
    pub kind: PickerKind,
    pub title: String,
    pub items: Vec<PickerItem>,
    pub selected: usize,
}

impl PickerState {
    pub fn new<T: Into<String>>(
        kind: PickerKind,
        title: T,
        items: Vec<PickerItem>,
        selected: usize,
    ) -> Self {
        let selected = selected.min(items.len().saturating_sub(1));
        Self {
            kind,
            title: title.into(),
            items,
            selected,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.items.get(self.selected).map(|i| i.id.as_str())
    }

    pub fn move_up(&mut self) {
        if !self.items.is_empty() {
            if self.selected == 0 {
                self.selected = self.items.len() - 1;
            } else {
                self.selected -= 1;
            }
        }
    }

    pub fn move_down(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    /// Drop the highlighted entry and return its id.
    pub fn remove_selected(&mut self) -> Option<String> {
        if self.items.is_empty() {
            return None;
        }
        let removed = self.items.remove(self.selected);
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
        Some(removed.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(ids: &[&str]) -> PickerState {
        let items = ids.iter().map(|id| PickerItem::new(*id, *id)).collect();
        PickerState::new(PickerKind::Session, "Chats", items, 0)
    }

    #[test]
    fn movement_wraps_around() {
        let mut state = picker(&["a", "b", "c"]);
        state.move_up();
        assert_eq!(state.selected_id(), Some("c"));
        state.move_down();
        assert_eq!(state.selected_id(), Some("a"));
    }

    #[test]
    fn remove_selected_keeps_selection_in_range() {
        let mut state = picker(&["a", "b"]);
        state.move_down();
        assert_eq!(state.remove_selected(), Some("b".to_string()));
        assert_eq!(state.selected_id(), Some("a"));
        assert_eq!(state.remove_selected(), Some("a".to_string()));
        assert_eq!(state.remove_selected(), None);
        assert_eq!(state.selected_id(), None);
    }
}
