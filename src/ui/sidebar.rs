use crate::catalog::ModelCatalog;
use crate::ui::theme::{Theme, ThemeMode};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget, Widget, Wrap},
};

/// Settings panel: model selector, dark mode state, attribution.
pub struct Sidebar<'a> {
    catalog: &'a ModelCatalog,
    selected_label: &'a str,
    mode: ThemeMode,
}

impl<'a> Sidebar<'a> {
    pub fn new(catalog: &'a ModelCatalog, selected_label: &'a str, mode: ThemeMode) -> Self {
        Self { catalog, selected_label, mode }
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme: Theme = self.mode.palette();
        let block = Block::default()
            .borders(Borders::ALL)
            .title("⚙️ Settings")
            .style(theme.border(false));
        let inner = block.inner(area);
        block.render(area, buf);
        buf.set_style(inner, theme.base());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(self.catalog.len() as u16),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        buf.set_line(
            chunks[0].x,
            chunks[0].y,
            &Line::from(Span::styled("Choose a model:", theme.muted())),
            chunks[0].width,
        );

        let items: Vec<ListItem> = self
            .catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| ListItem::new(format!("{}. {}", i + 1, entry.label)).style(theme.base()))
            .collect();
        let mut state = ListState::default().with_selected(self.catalog.position(self.selected_label));
        StatefulWidget::render(
            List::new(items).highlight_style(theme.highlight()).highlight_symbol("▶ "),
            chunks[1],
            buf,
            &mut state,
        );

        let toggle = if self.mode.is_dark() { "on" } else { "off" };
        buf.set_line(
            chunks[3].x,
            chunks[3].y,
            &Line::from(Span::styled(format!("🌙 Dark Mode: {}", toggle), theme.base())),
            chunks[3].width,
        );

        Paragraph::new(vec![
            Line::from(Span::styled("─".repeat(chunks[4].width as usize), theme.muted())),
            Line::from(Span::styled("Powered by OpenRouter", theme.muted())),
            Line::from(Span::styled("https://openrouter.ai", theme.muted())),
        ])
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);
    }
}
