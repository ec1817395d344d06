//! Services view rendering.
//!
//! Lists every registered service; the selected (polled) one is marked.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use super::common::{filter_info, render_empty};
use crate::app::App;

/// Render the Services view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let total = app.orchestrator().services().len();
    if total == 0 {
        render_empty(frame, app, area, "Services (0)", "No services registered (r to reload)");
        return;
    }

    let services = app.filtered_services();
    let active = app.orchestrator().selected_service();

    let header = Row::new(vec![Cell::from("Service"), Cell::from("")])
        .height(1)
        .style(app.theme.column_header());

    let rows: Vec<Row> = services
        .iter()
        .map(|name| {
            let marker = if Some(*name) == active {
                Cell::from("polling").style(Style::default().fg(app.theme.accent))
            } else {
                Cell::from("")
            };
            Row::new(vec![Cell::from(name.to_string()), marker])
        })
        .collect();

    let widths = [Constraint::Fill(3), Constraint::Length(10)];

    let selected = app.selected_service_index.min(services.len().saturating_sub(1));
    let position_info = if !services.is_empty() {
        format!(" [{}/{}]", selected + 1, services.len())
    } else {
        String::new()
    };

    let title = format!(
        " Services ({}/{}){}{} ",
        services.len(),
        total,
        filter_info(app),
        position_info
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
