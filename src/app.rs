//! Application state and navigation logic.

use std::path::Path;

use anyhow::Result;

use crate::data::{unix_now, ServiceData};
use crate::refresh::Orchestrator;
use crate::ui::Theme;

/// The current view/tab in the TUI.
///
/// Field editing is shown as an overlay (controlled by `App::editor`)
/// rather than as a separate view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Registered services.
    Services,
    /// Configuration fields of the selected service.
    Config,
    /// Connected instances of the selected service.
    Instances,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Services => View::Config,
            View::Config => View::Instances,
            View::Instances => View::Services,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Services => View::Instances,
            View::Config => View::Services,
            View::Instances => View::Config,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Services => "Services",
            View::Config => "Config",
            View::Instances => "Instances",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,
    /// Key of the field open in the editor overlay.
    pub editor: Option<String>,

    orchestrator: Orchestrator,

    // Navigation state
    pub selected_service_index: usize,
    pub selected_field_index: usize,
    pub selected_instance_index: usize,

    // Search/filter
    pub filter_text: String,
    pub filter_active: bool,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, std::time::Instant)>,
}

impl App {
    /// Create a new App driving the given orchestrator, with a theme
    /// matching the terminal background.
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self::with_theme(orchestrator, Theme::detect())
    }

    pub fn with_theme(orchestrator: Orchestrator, theme: Theme) -> Self {
        Self {
            running: true,
            current_view: View::Services,
            show_help: false,
            editor: None,
            orchestrator,
            selected_service_index: 0,
            selected_field_index: 0,
            selected_instance_index: 0,
            filter_text: String::new(),
            filter_active: false,
            theme,
            status_message: None,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Returns a description of the current backend.
    pub fn source_description(&self) -> &str {
        self.orchestrator.backend_description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, std::time::Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Apply completed backend requests. Returns true if anything changed.
    pub fn poll(&mut self) -> bool {
        let changed = self.orchestrator.poll();
        if changed {
            self.clamp_selection();
        }
        changed
    }

    /// Periodic refresh of the selected service.
    pub fn tick(&mut self) {
        self.orchestrator.refresh();
    }

    /// Refresh on demand: the service list and the selected service.
    pub fn force_refresh(&mut self) {
        self.orchestrator.load_services();
        if !self.orchestrator.refresh() && self.orchestrator.selected_service().is_some() {
            self.set_status_message("Refresh already in progress".to_string());
        }
    }

    fn clamp_selection(&mut self) {
        let services = self.filtered_services().len();
        let fields = self.field_keys().len();
        let instances = self.instance_ids().len();
        self.selected_service_index = self.selected_service_index.min(services.saturating_sub(1));
        self.selected_field_index = self.selected_field_index.min(fields.saturating_sub(1));
        self.selected_instance_index =
            self.selected_instance_index.min(instances.saturating_sub(1));
    }

    /// Switch to the next view (cycles through Services → Config → Instances).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    /// Move selection down by n items.
    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_count().saturating_sub(1);
        let index = self.selected_index_mut();
        *index = (*index + n).min(max);
    }

    /// Move selection up by n items.
    pub fn select_prev_n(&mut self, n: usize) {
        let index = self.selected_index_mut();
        *index = index.saturating_sub(n);
    }

    /// Jump to the first item in the list.
    pub fn select_first(&mut self) {
        *self.selected_index_mut() = 0;
    }

    /// Jump to the last item in the list.
    pub fn select_last(&mut self) {
        let last = self.visible_count().saturating_sub(1);
        *self.selected_index_mut() = last;
    }

    /// Select a row by its visual position, ignoring positions past the end.
    pub fn select_row(&mut self, row: usize) {
        if row < self.visible_count() {
            *self.selected_index_mut() = row;
        }
    }

    fn selected_index_mut(&mut self) -> &mut usize {
        match self.current_view {
            View::Services => &mut self.selected_service_index,
            View::Config => &mut self.selected_field_index,
            View::Instances => &mut self.selected_instance_index,
        }
    }

    /// Number of rows in the current view after filtering.
    pub fn visible_count(&self) -> usize {
        match self.current_view {
            View::Services => self.filtered_services().len(),
            View::Config => self.field_keys().len(),
            View::Instances => self.instance_ids().len(),
        }
    }

    /// Service names matching the filter, in listing order.
    pub fn filtered_services(&self) -> Vec<&str> {
        self.orchestrator
            .services()
            .iter()
            .map(String::as_str)
            .filter(|name| self.matches_filter(name))
            .collect()
    }

    /// Field keys of the selected service matching the filter.
    pub fn field_keys(&self) -> Vec<&str> {
        self.orchestrator
            .view()
            .service_data
            .as_ref()
            .map(|data| {
                data.keys().map(String::as_str).filter(|k| self.matches_filter(k)).collect()
            })
            .unwrap_or_default()
    }

    /// Instance ids of the selected service matching the filter.
    pub fn instance_ids(&self) -> Vec<&str> {
        self.orchestrator
            .view()
            .instances
            .keys()
            .map(String::as_str)
            .filter(|id| self.matches_filter(id))
            .collect()
    }

    pub fn selected_field_key(&self) -> Option<&str> {
        self.field_keys().get(self.selected_field_index).copied()
    }

    /// Activate the selected row: select a service, or edit a field.
    pub fn enter(&mut self) {
        match self.current_view {
            View::Services => {
                let Some(name) = self
                    .filtered_services()
                    .get(self.selected_service_index)
                    .map(|s| s.to_string())
                else {
                    return;
                };
                self.select_service(&name);
            }
            View::Config => self.open_editor(),
            View::Instances => {}
        }
    }

    /// Start polling a service and switch to its configuration.
    pub fn select_service(&mut self, name: &str) {
        self.orchestrator.select_service(name);
        self.selected_field_index = 0;
        self.selected_instance_index = 0;
        self.clear_filter();
        self.current_view = View::Config;
    }

    /// Open the editor overlay for the selected field.
    pub fn open_editor(&mut self) {
        self.editor = self.selected_field_key().map(str::to_string);
    }

    /// Close the editor, keeping any edit as a local unsaved change.
    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Whether the field in the editor cannot be changed.
    pub fn editor_read_only(&self) -> bool {
        self.editor.as_deref().is_some_and(ServiceData::is_read_only)
    }

    /// Current value of the field in the editor.
    pub fn editor_value(&self) -> Option<&str> {
        let key = self.editor.as_deref()?;
        self.orchestrator
            .view()
            .service_data
            .as_ref()?
            .get(key)?
            .value
            .as_deref()
    }

    fn edit_value(&mut self, f: impl FnOnce(&mut String)) {
        let Some(key) = self.editor.clone() else {
            return;
        };
        let mut value = self.editor_value().unwrap_or_default().to_string();
        f(&mut value);
        if let Some(data) = self.orchestrator.service_data_mut() {
            data.edit(&key, value);
        }
    }

    /// Append a character to the edited value.
    pub fn editor_push(&mut self, c: char) {
        self.edit_value(|v| v.push(c));
    }

    /// Remove the last character of the edited value.
    pub fn editor_pop(&mut self) {
        self.edit_value(|v| {
            v.pop();
        });
    }

    /// Clear the edited value.
    pub fn editor_clear(&mut self) {
        self.edit_value(String::clear);
    }

    /// Restore the last saved value of the edited field.
    pub fn editor_revert(&mut self) {
        if let Some(key) = self.editor.clone() {
            if let Some(data) = self.orchestrator.service_data_mut() {
                data.revert(&key);
            }
        }
    }

    /// Save the edited field and close the editor.
    pub fn editor_save(&mut self) {
        let Some(key) = self.editor.take() else {
            return;
        };
        if self.orchestrator.save_field(&key) {
            self.set_status_message(format!("Saving {}...", key));
        } else {
            self.set_status_message(format!("{} cannot be saved", key));
        }
    }

    /// Navigate back: close the editor first, then return to Services.
    pub fn go_back(&mut self) {
        if self.editor.is_some() {
            self.close_editor();
            return;
        }
        if self.current_view != View::Services {
            self.current_view = View::Services;
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_selection();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
    }

    /// Check if a name matches the current filter (case-insensitive).
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the view state of the selected service to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let view = self.orchestrator.view();
        if view.service.is_none() {
            anyhow::bail!("No service selected");
        }
        write_export(&view.export(unix_now()), path)
    }
}

/// Write any serializable export as pretty JSON.
pub fn write_export<T: serde::Serialize>(export: &T, path: &Path) -> Result<()> {
    use std::io::Write;

    let json = serde_json::to_string_pretty(export)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
