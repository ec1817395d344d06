//! Dashboard colours.
//!
//! The palette is chosen once at startup from the terminal background.
//! Views ask the theme for the style of what they draw (a tag, a config
//! value, a panel) instead of picking colours themselves.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType};

use crate::data::{FieldDefinition, TagKind};

#[derive(Debug, Clone)]
pub struct Theme {
    /// Active tab, overlay frames, column headers and the loading marker.
    pub accent: Color,
    /// Frames of the view panels.
    pub frame: Color,
    /// Background of the selected table row.
    pub selection: Color,
    /// Tag colours in [`TagKind`] order: success, warning, danger.
    tags: [Color; 3],
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            frame: Color::Gray,
            selection: Color::DarkGray,
            tags: [Color::Green, Color::Yellow, Color::Red],
        }
    }

    /// Yellow is unreadable on light backgrounds, warnings use dark orange.
    pub fn light() -> Self {
        Self {
            accent: Color::Blue,
            frame: Color::DarkGray,
            selection: Color::LightBlue,
            tags: [Color::Green, Color::Indexed(130), Color::Red],
        }
    }

    /// Pick the palette matching the terminal background.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn tag_color(&self, kind: TagKind) -> Color {
        match kind {
            TagKind::Success => self.tags[0],
            TagKind::Warning => self.tags[1],
            TagKind::Danger => self.tags[2],
        }
    }

    pub fn tag(&self, kind: TagKind) -> Style {
        let style = Style::default().fg(self.tag_color(kind));
        if kind == TagKind::Danger {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Style of a config value: dimmed when it cannot be edited, in the
    /// warning colour while it holds an unsaved edit.
    pub fn field_value(&self, field: &FieldDefinition, read_only: bool) -> Style {
        if read_only {
            Style::default().add_modifier(Modifier::DIM)
        } else if field.is_dirty() {
            Style::default()
                .fg(self.tag_color(TagKind::Warning))
                .add_modifier(Modifier::ITALIC)
        } else {
            Style::default()
        }
    }

    pub fn column_header(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn selected_row(&self) -> Style {
        Style::default().bg(self.selection).add_modifier(Modifier::BOLD)
    }

    pub fn tab(&self, active: bool) -> Style {
        if active {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.frame)
        }
    }

    /// Bordered block framing one of the views.
    pub fn panel<'a>(&self, title: impl Into<Line<'a>>) -> Block<'a> {
        self.block(title.into(), self.frame)
    }

    /// Bordered block for a modal drawn over the views.
    pub fn overlay<'a>(&self, title: impl Into<Line<'a>>) -> Block<'a> {
        self.block(title.into(), self.accent)
    }

    fn block<'a>(&self, title: Line<'a>, color: Color) -> Block<'a> {
        Block::bordered()
            .title(title)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SchemaItem;

    fn field() -> FieldDefinition {
        FieldDefinition::from_schema(&SchemaItem::new("30", "integer", "Timeout", ""))
    }

    #[test]
    fn test_tag_colors_are_distinct() {
        for theme in [Theme::dark(), Theme::light()] {
            let success = theme.tag_color(TagKind::Success);
            let warning = theme.tag_color(TagKind::Warning);
            let danger = theme.tag_color(TagKind::Danger);
            assert_ne!(success, warning);
            assert_ne!(warning, danger);
            assert_ne!(success, danger);
        }
    }

    #[test]
    fn test_danger_tag_is_bold() {
        let theme = Theme::dark();
        assert!(theme.tag(TagKind::Danger).add_modifier.contains(Modifier::BOLD));
        assert!(!theme.tag(TagKind::Success).add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_field_value_style() {
        let theme = Theme::dark();
        let mut field = field();
        assert_eq!(theme.field_value(&field, false), Style::default());

        field.value = Some("45".to_string());
        let dirty = theme.field_value(&field, false);
        assert_eq!(dirty.fg, Some(Color::Yellow));
        assert!(dirty.add_modifier.contains(Modifier::ITALIC));

        // Read-only wins over dirty
        let read_only = theme.field_value(&field, true);
        assert!(read_only.add_modifier.contains(Modifier::DIM));
        assert_eq!(read_only.fg, None);
    }
}
