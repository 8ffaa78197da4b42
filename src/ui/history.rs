//! Command history display component

use crate::history::{CommandEntry, CommandHistory};
use chrono::{DateTime, Local, Utc};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use serde_json::Value;
use std::fmt::Write;
use unicode_width::UnicodeWidthChar;

pub const HISTORY_TITLE: &str = "היסטוריית פקודות";
pub const RESEND_LABEL: &str = "שלח מחדש";
pub const COMMAND_LABEL: &str = "פקודה:";
pub const LLM_RESULT_LABEL: &str = "תוצאה LLM:";
pub const API_RESULT_LABEL: &str = "תוצאה API:";

/// Renders the session history, newest first
pub struct HistoryWidget<'a> {
    history: &'a CommandHistory,
    selected: Option<usize>,
    focused: bool,
    timestamp_format: &'a str,
}

impl<'a> HistoryWidget<'a> {
    pub fn new(history: &'a CommandHistory, timestamp_format: &'a str) -> Self {
        Self {
            history,
            selected: None,
            focused: false,
            timestamp_format,
        }
    }

    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl Widget for HistoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({}) ", HISTORY_TITLE, self.history.len()))
            .border_style(border);

        if self.history.is_empty() {
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "No commands yet.",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )),
                Line::from(Span::styled(
                    "Type a command above and press Enter. /help lists the keys.",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .block(block)
            .render(area, buf);
            return;
        }

        let width = area.width.saturating_sub(2) as usize;
        let mut rows: Vec<Line<'static>> = Vec::new();
        let mut selected_rows = None;
        for (index, entry) in self.history.iter().enumerate() {
            let is_selected = self.selected == Some(index);
            let start = rows.len();
            for line in entry_lines(entry, self.timestamp_format, is_selected) {
                rows.extend(wrap_line(line, width));
            }
            if is_selected {
                selected_rows = Some((start, rows.len()));
            }
            rows.push(Line::from(Span::styled(
                "─".repeat(width),
                Style::default().fg(Color::DarkGray),
            )));
        }

        let height = area.height.saturating_sub(2) as usize;
        let offset = scroll_offset(selected_rows, height).min(u16::MAX as usize) as u16;

        // Rows are pre-wrapped so the offset counts exactly what is drawn.
        Paragraph::new(rows)
            .block(block)
            .scroll((offset, 0))
            .render(area, buf);
    }
}

/// First row to show so the selected entry is in view
fn scroll_offset(selected: Option<(usize, usize)>, height: usize) -> usize {
    match selected {
        Some((start, end)) if end > height => start,
        _ => 0,
    }
}

/// Break a styled line into rows no wider than `width` display columns.
pub fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let mut rows = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    for span in line.spans {
        let mut chunk = String::new();
        for c in span.content.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                rows.push(Line::from(std::mem::take(&mut spans)));
                used = 0;
            }
            chunk.push(c);
            used += w;
        }
        if !chunk.is_empty() {
            spans.push(Span::styled(chunk, span.style));
        }
    }
    if !spans.is_empty() {
        rows.push(Line::from(spans));
    }
    rows
}

/// Display block for one entry: resend control, timestamp, command, both
/// payloads and the entry's own error.
pub fn entry_lines(entry: &CommandEntry, timestamp_format: &str, selected: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let resend_style = if entry.is_resendable() {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };
    let marker = if selected { "▶ " } else { "  " };
    lines.push(Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(format!("[{}]", RESEND_LABEL), resend_style),
        Span::raw(" "),
        Span::styled(
            format_timestamp(&entry.timestamp, timestamp_format),
            Style::default().fg(Color::DarkGray),
        ),
    ]));

    let command_style = if selected {
        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{} {}", COMMAND_LABEL, entry.command), command_style),
    ]));

    push_payload(&mut lines, LLM_RESULT_LABEL, &entry.llm_result);
    push_payload(&mut lines, API_RESULT_LABEL, &entry.api_result);

    if let Some(error) = &entry.error {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("⚠ {}", error), Style::default().fg(Color::Red)),
        ]));
    }

    lines
}

fn push_payload(lines: &mut Vec<Line<'static>>, label: &str, payload: &Value) {
    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(label.to_string(), Style::default().fg(Color::Gray)),
    ]));
    for text in pretty_json(payload).lines() {
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(text.to_string(), Style::default().fg(Color::Green)),
        ]));
    }
}

/// Two-space indented JSON, `null` for absent payloads
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Local-time rendering; an unusable format string falls back to RFC 3339.
pub fn format_timestamp(timestamp: &DateTime<Utc>, format: &str) -> String {
    let local = timestamp.with_timezone(&Local);
    let mut out = String::new();
    if write!(out, "{}", local.format(format)).is_err() {
        return local.to_rfc3339();
    }
    out
}
