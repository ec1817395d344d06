//! Config view rendering.
//!
//! One row per field of the selected service. Fields with an unsaved local
//! edit are marked with `*`.

use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use super::common::{filter_info, render_empty};
use crate::app::App;
use crate::data::ServiceData;

/// Render the Config view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.orchestrator().view();
    let Some(ref data) = view.service_data else {
        let message = if view.service.is_some() {
            "Loading configuration..."
        } else {
            "No service selected"
        };
        render_empty(frame, app, area, "Config", message);
        return;
    };

    let keys = app.field_keys();

    let header = Row::new(vec![
        Cell::from(""),
        Cell::from("Key"),
        Cell::from("Title"),
        Cell::from("Type"),
        Cell::from("Value"),
    ])
    .height(1)
    .style(app.theme.column_header());

    let rows: Vec<Row> = keys
        .iter()
        .filter_map(|key| data.get(key).map(|field| (key, field)))
        .map(|(key, field)| {
            let read_only = ServiceData::is_read_only(key);
            let value_style = app.theme.field_value(field, read_only);
            let marker = if field.is_dirty() { "*" } else { "" };
            let key_cell = if read_only {
                format!("{} (ro)", key)
            } else {
                key.to_string()
            };
            Row::new(vec![
                Cell::from(marker).style(value_style),
                Cell::from(key_cell),
                Cell::from(field.title.clone().unwrap_or_default()),
                Cell::from(field.kind.clone().unwrap_or_default()),
                Cell::from(field.value.clone().unwrap_or_default()).style(value_style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Fill(2), // Key
        Constraint::Fill(3), // Title
        Constraint::Length(10),
        Constraint::Fill(4), // Value
    ];

    let selected = app.selected_field_index.min(keys.len().saturating_sub(1));
    let dirty = data.dirty_keys().len();
    let dirty_info = if dirty > 0 {
        format!(" [{} unsaved]", dirty)
    } else {
        String::new()
    };

    let title = format!(
        " Config: {} ({}/{}){}{} ",
        view.service.as_deref().unwrap_or_default(),
        keys.len(),
        data.len(),
        dirty_info,
        filter_info(app)
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(app.theme.panel(title))
        .row_highlight_style(app.theme.selected_row())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
