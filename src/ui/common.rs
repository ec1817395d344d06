//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::TagKind;

/// Render the header bar with the selected service overview.
///
/// Displays: status indicator, service name, instance counts by tag type,
/// and a loading indicator while a refresh is outstanding.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let orchestrator = app.orchestrator();
    let view = orchestrator.view();

    let Some(ref service) = view.service else {
        let line = Line::from(vec![
            Span::styled(" CCENTRAL ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(
                "| {} services | select one with Enter",
                orchestrator.services().len()
            )),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let (ok, warning, danger) = view.tag_counts();

    // Overall status indicator
    let status_style = app.theme.tag(if danger > 0 {
        TagKind::Danger
    } else if warning > 0 {
        TagKind::Warning
    } else {
        TagKind::Success
    });

    let version = view
        .service_data
        .as_ref()
        .and_then(|d| d.version())
        .unwrap_or("-");

    let count_span = |n: usize, kind: TagKind| {
        if n > 0 {
            Span::styled(n.to_string(), app.theme.tag(kind))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        }
    };

    let mut spans = vec![
        Span::styled(" ● ", status_style),
        Span::styled("CCENTRAL ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(service.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" v.{} │ ", version)),
        count_span(ok, TagKind::Success),
        Span::raw(" ok "),
        count_span(warning, TagKind::Warning),
        Span::raw(" warn "),
        count_span(danger, TagKind::Danger),
        Span::raw(" danger │ "),
        Span::styled(
            view.instances.len().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" instances"),
    ];
    if view.loading {
        spans.push(Span::styled(" ⟳", Style::default().fg(app.theme.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = vec![
        Line::from(" 1:Services "),
        Line::from(" 2:Config "),
        Line::from(" 3:Instances "),
    ];

    let selected = match app.current_view {
        View::Services => 0,
        View::Config => 1,
        View::Instances => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab(false))
        .highlight_style(app.theme.tab(true))
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: backend, time since last update, available controls.
/// Also displays temporary status messages.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.accent));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else {
        match app.current_view {
            View::Services => "/:search Enter:select Tab:switch r:refresh ?:help q:quit",
            View::Config => "Enter:edit /:search Tab:switch e:export ?:help q:quit",
            View::Instances => "/:search Tab:switch e:export ?:help q:quit",
        }
    };

    let updated = match app.orchestrator().view().last_updated {
        Some(at) => format!("Updated {:.1}s ago", at.elapsed().as_secs_f64()),
        None if app.orchestrator().selected_service().is_some() => "Loading...".to_string(),
        None => "Idle".to_string(),
    };

    let status = format!(
        " {} | {} | {}",
        app.source_description(),
        updated,
        controls
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.column_header())]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Select service / edit field"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Editor"),
        Line::from("  Enter       Save and close"),
        Line::from("  Esc         Close, keep edit unsaved"),
        Line::from("  Ctrl+U      Clear value"),
        Line::from("  Ctrl+R      Revert to saved value"),
        Line::from(""),
        section(" General"),
        Line::from("  /         Start filter/search"),
        Line::from("  c         Clear filter"),
        Line::from("  r         Refresh now"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let paragraph = Paragraph::new(help_text).block(app.theme.overlay(" Help "));

    // Center the help overlay - responsive to terminal size
    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 27u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Filter suffix for block titles: live input, applied filter, or nothing.
pub fn filter_info(app: &App) -> String {
    if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    }
}

/// Placeholder paragraph for views with nothing to show yet.
pub fn render_empty(frame: &mut Frame, app: &App, area: Rect, title: &str, message: &str) {
    let block = app.theme.panel(format!(" {} ", title));
    let empty = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", message),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .block(block);
    frame.render_widget(empty, area);
}
