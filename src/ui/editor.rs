//! Field editor overlay rendering.
//!
//! Displays a modal overlay for the field being edited. Keystrokes change
//! the field's live value directly, so what is shown here is always the
//! value the Config view shows too.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Minimum width required for the editor overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 50;
/// Minimum height required for the editor overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Render the field editor as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let Some(ref key) = app.editor else {
        return;
    };
    let Some(field) = app
        .orchestrator()
        .view()
        .service_data
        .as_ref()
        .and_then(|data| data.get(key))
    else {
        return;
    };
    let read_only = app.editor_read_only();

    let overlay_width = (area.width * 80 / 100).clamp(MIN_OVERLAY_WIDTH, 90);
    let overlay_height = MIN_OVERLAY_HEIGHT + 2;

    let x = area.x + (area.width.saturating_sub(overlay_width)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_height)) / 2;
    let overlay_area = Rect::new(x, y, overlay_width, overlay_height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let chunks = Layout::vertical([
        Constraint::Min(6),    // Field info
        Constraint::Length(3), // Value input
        Constraint::Length(1), // Footer
    ])
    .split(overlay_area);

    // ===== FIELD INFO =====
    let dim = Style::default().add_modifier(Modifier::DIM);
    let info_lines = vec![
        Line::from(vec![Span::styled(
            format!(" {} ", field.title.as_deref().unwrap_or(key)),
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::styled(" Type: ", dim),
            Span::raw(field.kind.clone().unwrap_or_else(|| "-".to_string())),
            Span::styled("    Default: ", dim),
            Span::raw(field.default.clone().unwrap_or_else(|| "-".to_string())),
        ]),
        Line::from(vec![
            Span::styled(" Saved: ", dim),
            Span::raw(field.value_orig.clone().unwrap_or_default()),
        ]),
        Line::from(""),
        Line::from(Span::raw(format!(
            " {}",
            field.description.as_deref().unwrap_or("")
        ))),
    ];

    let title = if read_only {
        format!(" {} (read-only) ", key)
    } else {
        format!(" Edit {} ", key)
    };
    let info_block = app
        .theme
        .overlay(title)
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT);
    frame.render_widget(
        Paragraph::new(info_lines).block(info_block).wrap(Wrap { trim: false }),
        chunks[0],
    );

    // ===== VALUE INPUT =====
    let value = field.value.clone().unwrap_or_default();
    let value_text = if read_only { value } else { format!("{}_", value) };
    let value_style = app.theme.field_value(field, read_only);
    let input_block = app
        .theme
        .overlay(if field.is_dirty() { " Value * " } else { " Value " });
    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", value_text), value_style)).block(input_block),
        chunks[1],
    );

    // ===== FOOTER =====
    let controls = if read_only {
        " Esc:close "
    } else {
        " Enter:save Esc:close (keep edit) Ctrl+U:clear Ctrl+R:revert "
    };
    let footer = Paragraph::new(Line::from(vec![Span::styled(controls, dim)]));
    frame.render_widget(footer, chunks[2]);
}
