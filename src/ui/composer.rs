use crate::ui::commands::{ParsedCommand, parse_slash_command};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    /// Enter on non-command text; the caller submits the current input
    Submit,
    Command(ParsedCommand),
    None,
}

/// Cursor and placeholder for the command input. The text itself lives in
/// the console so the submission handler can clear it.
#[derive(Debug, Clone)]
pub struct Composer {
    /// Cursor position in chars, not bytes or columns
    cursor: usize,
    /// First char shown when the input is wider than the box
    scroll: usize,
    placeholder: String,
}

impl Composer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            cursor: 0,
            scroll: 0,
            placeholder: placeholder.into(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle key input against `input`. A disabled composer ignores everything.
    pub fn handle_key(&mut self, input: &mut String, key: KeyEvent, enabled: bool) -> ComposerResult {
        if key.kind != KeyEventKind::Press || !enabled {
            return ComposerResult::None;
        }
        self.clamp(input);

        match key.code {
            KeyCode::Enter => {
                if input.trim().is_empty() {
                    return ComposerResult::None;
                }
                if let Some(command) = parse_slash_command(input) {
                    input.clear();
                    self.cursor = 0;
                    return ComposerResult::Command(command);
                }
                return ComposerResult::Submit;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let at = byte_index(input, self.cursor);
                input.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = byte_index(input, self.cursor);
                    input.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < input.chars().count() {
                    let at = byte_index(input, self.cursor);
                    input.remove(at);
                }
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor < input.chars().count() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.cursor = 0;
            }
            KeyCode::End => {
                self.cursor = input.chars().count();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Keep the cursor inside the text after it was changed elsewhere.
    pub fn clamp(&mut self, input: &str) {
        self.cursor = self.cursor.min(input.chars().count());
    }

    /// Shift the visible window of `input` so the cursor fits in `width`
    /// display columns.
    pub fn scroll_into_view(&mut self, input: &str, width: usize) {
        self.clamp(input);
        let limit = width.saturating_sub(1);
        if display_width(input.chars()) <= limit {
            self.scroll = 0;
            return;
        }
        self.scroll = self.scroll.min(self.cursor);
        while self.scroll < self.cursor
            && display_width(input.chars().skip(self.scroll).take(self.cursor - self.scroll)) > limit
        {
            self.scroll += 1;
        }
    }

    pub fn view<'a>(&'a self, input: &'a str, loading: bool, focused: bool) -> ComposerView<'a> {
        ComposerView {
            composer: self,
            input,
            loading,
            focused,
        }
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn display_width(chars: impl Iterator<Item = char>) -> usize {
    chars.map(|c| c.width().unwrap_or(0)).sum()
}

/// Renderable snapshot of the composer
pub struct ComposerView<'a> {
    composer: &'a Composer,
    input: &'a str,
    loading: bool,
    focused: bool,
}

impl ComposerView<'_> {
    /// Terminal cursor position for `area`, when the input accepts typing.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        if self.loading || !self.focused || area.width < 3 || area.height < 3 {
            return None;
        }
        let (scroll, cursor) = self.window();
        let column = display_width(self.input.chars().skip(scroll).take(cursor - scroll));
        let max_x = area.width.saturating_sub(3) as usize;
        Some((area.x + 1 + column.min(max_x) as u16, area.y + 1))
    }

    /// Scroll and cursor, both clamped to the current input
    fn window(&self) -> (usize, usize) {
        let cursor = self.composer.cursor.min(self.input.chars().count());
        (self.composer.scroll.min(cursor), cursor)
    }

    fn title(&self) -> Line<'static> {
        if self.loading {
            Line::from(vec![
                Span::raw(" פקודה "),
                Span::styled("⏳ שולח... ", Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC)),
            ])
        } else {
            Line::from(" פקודה (Enter=שלח) ")
        }
    }
}

impl Widget for ComposerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.loading {
            Style::default().fg(Color::DarkGray)
        } else if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(border);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let line = if self.input.is_empty() {
            Line::from(Span::styled(
                self.composer.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let style = if self.loading {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            let (scroll, _) = self.window();
            let visible: String = self.input.chars().skip(scroll).collect();
            Line::from(Span::styled(visible, style))
        };
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
