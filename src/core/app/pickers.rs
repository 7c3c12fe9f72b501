use super::{App, NamePromptKind, UiMode};
use crate::api::models::format_size;
use crate::ui::picker::{PickerItem, PickerKind, PickerState};

impl App {
    pub fn open_model_picker(&mut self) {
        if self.models.is_empty() {
            self.set_status("No models loaded (try /models to refresh)");
            return;
        }
        let items: Vec<PickerItem> = self
            .models
            .iter()
            .map(|model| {
                let label = match model.size {
                    Some(size) => format!("{}  ({})", model.name, format_size(size)),
                    None => model.name.clone(),
                };
                PickerItem::new(model.name.clone(), label)
            })
            .collect();
        let selected = items
            .iter()
            .position(|item| item.id == self.model())
            .unwrap_or(0);
        self.ui.mode = UiMode::Picker(PickerState::new(
            PickerKind::Model,
            "Select model",
            items,
            selected,
        ));
    }

    pub fn open_session_picker(&mut self) {
        let names = match self.store.list() {
            Ok(names) => names,
            Err(err) => {
                self.set_status(format!("Cannot list chats: {err}"));
                return;
            }
        };
        if names.is_empty() {
            self.set_status("No saved chats");
            return;
        }
        let selected = self
            .active_session_name
            .as_deref()
            .and_then(|active| names.iter().position(|name| name == active))
            .unwrap_or(0);
        let items = names
            .into_iter()
            .map(|name| PickerItem::new(name.clone(), name))
            .collect();
        self.ui.mode = UiMode::Picker(PickerState::new(
            PickerKind::Session,
            "Load chat (Del deletes)",
            items,
            selected,
        ));
    }

    pub fn open_save_prompt(&mut self) {
        let suggested = self.active_session_name.clone().unwrap_or_default();
        self.ui.stash_input(&suggested);
        self.ui.mode = UiMode::NamePrompt(NamePromptKind::SaveSession);
    }

    /// Act on the highlighted picker entry and return to typing.
    pub fn apply_picker_selection(&mut self) {
        let Some(picker) = self.ui.picker() else {
            return;
        };
        let kind = picker.kind;
        let Some(id) = picker.selected_id().map(str::to_string) else {
            self.ui.return_to_typing();
            return;
        };
        self.ui.return_to_typing();

        match kind {
            PickerKind::Model => {
                if let Err(err) = self.set_model(&id) {
                    self.set_status(err);
                }
            }
            PickerKind::Session => {
                if let Err(err) = self.load_session(&id) {
                    self.set_status(err.to_string());
                }
            }
        }
    }

    /// Delete the highlighted saved chat and keep the picker open.
    pub fn delete_picker_selection(&mut self) {
        let Some(picker) = self.ui.picker_mut() else {
            return;
        };
        if picker.kind != PickerKind::Session {
            return;
        }
        let Some(name) = picker.selected_id().map(str::to_string) else {
            return;
        };
        match self.delete_session(&name) {
            Ok(()) => {
                let empty = match self.ui.picker_mut() {
                    Some(picker) => {
                        picker.remove_selected();
                        picker.items.is_empty()
                    }
                    None => true,
                };
                if empty {
                    self.ui.return_to_typing();
                }
            }
            Err(err) => self.set_status(err.to_string()),
        }
    }

    pub fn close_overlay(&mut self) {
        if matches!(self.ui.mode, UiMode::NamePrompt(_)) {
            self.ui.restore_input();
        }
        self.ui.return_to_typing();
    }
}
