//! Overlay listing the backend's own command log

use crate::backend::HistoryRecord;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

#[derive(Debug, Default)]
pub struct ServerLog {
    records: Vec<HistoryRecord>,
    state: ListState,
    loading: bool,
}

impl ServerLog {
    /// An overlay waiting for `GET /history`
    pub fn loading() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn set_records(&mut self, records: Vec<HistoryRecord>) {
        self.loading = false;
        self.state = ListState::default();
        if !records.is_empty() {
            self.state.select(Some(0));
        }
        self.records = records;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn up(&mut self) {
        if let Some(i) = self.state.selected() {
            self.state.select(Some(i.saturating_sub(1)));
        }
    }

    pub fn down(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let next = match self.state.selected() {
            Some(i) => (i + 1).min(self.records.len() - 1),
            None => 0,
        };
        self.state.select(Some(next));
    }

    pub fn selected(&self) -> Option<&HistoryRecord> {
        self.state.selected().and_then(|i| self.records.get(i))
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = centered_rect(80, 70, frame.size());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Server log (Enter=resend, Esc=close) ")
            .border_style(Style::default().fg(Color::Blue));

        if self.loading || self.records.is_empty() {
            let message = if self.loading { "Loading..." } else { "The backend has no logged commands." };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    message,
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )))
                .block(block),
                area,
            );
            return;
        }

        let items: Vec<ListItem> = self
            .records
            .iter()
            .map(|record| {
                ListItem::new(Line::from(vec![
                    Span::styled(record.timestamp.clone(), Style::default().fg(Color::DarkGray)),
                    Span::raw("  "),
                    Span::raw(record.text.clone()),
                    Span::styled(format!("  ({})", record.id), Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Blue).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
