//! Instances view rendering.
//!
//! Shows one row per connected instance: id, tags, then one column per
//! accumulated header. Service info sits above the table and the per-minute
//! counter totals below it.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::{filter_info, render_empty};
use crate::app::App;
use crate::data::unix_now;

/// Render the Instances view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.orchestrator().view();
    if view.service.is_none() {
        render_empty(frame, app, area, "Instances", "No service selected");
        return;
    }

    let info = view.info_pairs();
    let info_height = if info.is_empty() { 0 } else { info.len().min(4) as u16 + 2 };

    let chunks = Layout::vertical([
        Constraint::Length(info_height),
        Constraint::Min(5),
        Constraint::Length(3),
    ])
    .split(area);

    if !info.is_empty() {
        render_info(frame, app, chunks[0], &info);
    }
    render_table(frame, app, chunks[1]);
    render_totals(frame, app, chunks[2]);
}

fn render_info(frame: &mut Frame, app: &App, area: Rect, info: &[(String, String)]) {
    let lines: Vec<Line> = info
        .iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!(" {}: ", key), Style::default().add_modifier(Modifier::DIM)),
                Span::raw(value.clone()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(app.theme.panel(" Info ")), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.orchestrator().view();
    let ids = app.instance_ids();
    let now = unix_now();

    let mut header_cells = vec![Cell::from("Instance"), Cell::from("Status")];
    header_cells.extend(view.headers.values().map(|label| Cell::from(label.clone())));
    let header = Row::new(header_cells).height(1).style(app.theme.column_header());

    let rows: Vec<Row> = ids
        .iter()
        .map(|id| {
            let tags: Vec<Span> = view
                .tags_for(id)
                .iter()
                .flat_map(|tag| {
                    [
                        Span::styled(tag.text.clone(), app.theme.tag(tag.kind)),
                        Span::raw(" "),
                    ]
                })
                .collect();

            let mut cells = vec![
                Cell::from(id.to_string()),
                Cell::from(Line::from(tags)),
            ];
            cells.extend(view.instance_cells(id, now).into_iter().map(Cell::from));
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Fill(2), Constraint::Fill(3)];
    widths.extend(view.headers.iter().map(|_| Constraint::Fill(1)));

    let selected = app.selected_instance_index.min(ids.len().saturating_sub(1));
    let position_info = if !ids.is_empty() {
        format!(" [{}/{}]", selected + 1, ids.len())
    } else {
        String::new()
    };

    let title = format!(
        " Instances ({}/{}){}{} ",
        ids.len(),
        view.instances.len(),
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

fn render_totals(frame: &mut Frame, app: &App, area: Rect) {
    let totals = &app.orchestrator().view().totals;

    let line = if totals.is_empty() {
        Line::from(Span::styled(" No counters reported", Style::default().add_modifier(Modifier::DIM)))
    } else {
        let spans: Vec<Span> = totals
            .iter()
            .flat_map(|(label, total)| {
                [
                    Span::raw(format!(" {}: ", label)),
                    Span::styled(total.to_string(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(" │"),
                ]
            })
            .collect();
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line).block(app.theme.panel(" Totals ")), area);
}
