//! Transcript display component

use crate::conversation::{Role, Turn};
use crate::ui::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Renders a borrowed transcript. Scrolling is counted in lines up from the bottom.
pub struct ConversationHistory<'a> {
    turns: &'a [Turn],
    theme: Theme,
    scroll_from_bottom: usize,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(turns: &'a [Turn], theme: Theme) -> Self {
        Self {
            turns,
            theme,
            scroll_from_bottom: 0,
        }
    }

    pub fn scrolled(mut self, lines_from_bottom: usize) -> Self {
        self.scroll_from_bottom = lines_from_bottom;
        self
    }

    /// All lines for the transcript at the given content width
    pub fn lines(&self, width: u16) -> Vec<Line<'a>> {
        let mut all_lines = Vec::new();
        for turn in self.turns {
            all_lines.extend(self.render_turn(turn, width));
            all_lines.push(Line::from(""));
        }
        all_lines
    }

    fn render_turn(&self, turn: &'a Turn, width: u16) -> Vec<Line<'a>> {
        let (icon, color) = match turn.role() {
            Role::User => ("👤", self.theme.user),
            Role::Assistant => ("🤖", self.theme.assistant),
        };

        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{} ", icon), self.theme.base()),
            Span::styled(
                turn.role().display_name(),
                self.theme.base().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])];

        let content_style = self.theme.base().fg(color);
        for content_line in wrap_text(turn.content(), width.saturating_sub(2) as usize) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(content_line, content_style),
            ]));
        }
        lines
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 Conversation")
            .style(self.theme.border(false));

        let inner_area = block.inner(area);
        block.render(area, buf);
        buf.set_style(inner_area, self.theme.base());

        if self.turns.is_empty() {
            let welcome = [
                Line::from(Span::styled("Pick a model in the sidebar and say hello.", self.theme.base())),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter sends · Shift+Enter new line · /help for commands",
                    self.theme.muted(),
                )),
            ];
            for (i, line) in welcome.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let all_lines = self.lines(inner_area.width);
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_scroll = total.saturating_sub(height);
        let scroll = self.scroll_from_bottom.min(max_scroll);
        let start = max_scroll - scroll;
        let end = (start + height).min(total);

        for (i, line) in all_lines[start..end].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if total > height {
            let mut state = ScrollbarState::new(max_scroll).position(start);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .style(Style::default().fg(self.theme.muted))
                .render(area, buf, &mut state);
        }
    }
}

/// Wrap `text` to `width` display columns.
///
/// Line breaks, indentation and inner runs of spaces are kept as written.
/// Lines only break at a space when they overflow; a word wider than the
/// pane is split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return text.split('\n').map(str::to_string).collect();
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_width = 0;

        for (is_space, token) in split_runs(paragraph) {
            let token_width = token.width();

            if is_space {
                if current_width + token_width <= width {
                    current_line.push_str(token);
                    current_width += token_width;
                } else {
                    // The run that overflows becomes the break itself
                    lines.push(current_line.trim_end().to_string());
                    current_line.clear();
                    current_width = 0;
                }
                continue;
            }

            if current_width + token_width > width && !current_line.trim().is_empty() {
                lines.push(current_line.trim_end().to_string());
                current_line.clear();
                current_width = 0;
            }

            for c in token.chars() {
                let char_width = c.width().unwrap_or(0);
                if current_width + char_width > width && current_width > 0 {
                    lines.push(std::mem::take(&mut current_line));
                    current_width = 0;
                }
                current_line.push(c);
                current_width += char_width;
            }
        }

        lines.push(current_line);
    }
    lines
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_runs(text: &str) -> Vec<(bool, &str)> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (i, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                runs.push((prev, &text[start..i]));
                start = i;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }
    if let Some(is_space) = in_space {
        runs.push((is_space, &text[start..]));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeMode;

    #[test]
    fn wrap_keeps_paragraph_breaks() {
        let wrapped = wrap_text("first line\n\nthird", 40);
        assert_eq!(wrapped, vec!["first line", "", "third"]);
    }

    #[test]
    fn wrap_breaks_on_width() {
        let wrapped = wrap_text("the quick brown fox", 9);
        assert_eq!(wrapped, vec!["the quick", "brown fox"]);
    }

    #[test]
    fn long_word_is_split_at_width() {
        let wrapped = wrap_text("a supercalifragilistic b", 5);
        assert_eq!(wrapped, vec!["a", "super", "calif", "ragil", "istic", "b"]);
    }

    #[test]
    fn indentation_and_inner_spacing_survive() {
        let wrapped = wrap_text("fn main() {\n    println!(\"hi\");\n}", 40);
        assert_eq!(wrapped, vec!["fn main() {", "    println!(\"hi\");", "}"]);
        assert_eq!(wrap_text("a    b", 40), vec!["a    b"]);
    }

    #[test]
    fn wide_glyphs_count_as_two_columns() {
        assert_eq!(wrap_text("❌ ab", 5), vec!["❌ ab"]);
        assert_eq!(wrap_text("❌ abc", 5), vec!["❌", "abc"]);
    }

    #[test]
    fn long_url_is_fully_visible_in_narrow_pane() {
        let url = "https://openrouter.ai/api/v1/chat/completions";
        let turns = vec![Turn::assistant(format!("for url: {}", url))];
        let area = Rect::new(0, 0, 48, 8);
        let mut buf = Buffer::empty(area);
        ConversationHistory::new(&turns, ThemeMode::Light.palette()).render(area, &mut buf);

        // Rows with borders and indentation stripped, glued back together
        let joined: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf.get(x, y).symbol().to_string())
                    .collect::<String>()
                    .trim_end_matches([' ', '│'])
                    .trim_start_matches('│')
                    .trim()
                    .to_string()
            })
            .collect();
        assert!(joined.contains(url), "rendered: {joined}");
    }

    #[test]
    fn each_turn_has_header_content_and_spacer() {
        let turns = vec![Turn::user("Hello"), Turn::assistant("Hi!\nHow are you?")];
        let history = ConversationHistory::new(&turns, ThemeMode::Dark.palette());
        // user: header + 1 line + spacer, assistant: header + 2 lines + spacer
        assert_eq!(history.lines(80).len(), 7);
    }

    #[test]
    fn renders_latest_turn_at_bottom() {
        let turns = vec![Turn::user("Hello"), Turn::assistant("Hi!")];
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        ConversationHistory::new(&turns, ThemeMode::Light.palette()).render(area, &mut buf);

        let rows: Vec<String> = (0..area.height)
            .map(|y| (0..area.width).map(|x| buf.get(x, y).symbol().to_string()).collect())
            .collect();
        assert!(rows.iter().any(|row| row.contains("Hi!")));
    }
}
