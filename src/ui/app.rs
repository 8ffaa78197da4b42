use crate::backend::CommandBackend;
use crate::config::{Config, UiConfig};
use crate::console::Console;
use crate::events::AppEvent;
use crate::ui::commands::{ParsedCommand, SlashCommand, get_help_text};
use crate::ui::composer::{Composer, ComposerResult};
use crate::ui::history::HistoryWidget;
use crate::ui::server_log::{ServerLog, centered_rect};
use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use futures::{Stream, StreamExt};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Which pane receives key input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    History,
}

enum Overlay {
    Help(String),
    ServerLog(ServerLog),
}

/// Terminal front end around a [`Console`]
pub struct App {
    console: Console,
    composer: Composer,
    focus: Focus,
    selected: Option<usize>,
    overlay: Option<Overlay>,
    backend: Arc<dyn CommandBackend>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    timestamp_format: String,
    should_quit: bool,
}

impl App {
    pub fn new(ui: &UiConfig, backend: Arc<dyn CommandBackend>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let console = Console::new().with_on_command(|text| {
            tracing::debug!(command = %text, "command issued");
        });

        Self {
            console,
            composer: Composer::new(ui.placeholder.clone()),
            focus: Focus::Composer,
            selected: None,
            overlay: None,
            backend,
            events_tx,
            events_rx,
            timestamp_format: ui.timestamp_format.clone(),
            should_quit: false,
        }
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Composer => {
                let enabled = !self.console.is_loading();
                match self.composer.handle_key(self.console.input_mut(), key, enabled) {
                    ComposerResult::Submit => self.submit(),
                    ComposerResult::Command(command) => self.run_slash_command(command),
                    ComposerResult::None => {}
                }
            }
            Focus::History => self.handle_history_key(key),
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Composer if !self.console.history().is_empty() => {
                self.selected.get_or_insert(0);
                Focus::History
            }
            _ => Focus::Composer,
        };
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        let len = self.console.history().len();
        match key.code {
            KeyCode::Up => {
                self.selected = Some(self.selected.map_or(0, |i| i.saturating_sub(1)));
            }
            KeyCode::Down if len > 0 => {
                self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(len - 1)));
            }
            KeyCode::Enter | KeyCode::Char('r') => self.resend_selected(),
            _ => {}
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let Some(overlay) = self.overlay.as_mut() else {
            return;
        };

        match overlay {
            Overlay::Help(_) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.overlay = None;
                }
            }
            Overlay::ServerLog(log) => match key.code {
                KeyCode::Esc => self.overlay = None,
                KeyCode::Up => log.up(),
                KeyCode::Down => log.down(),
                KeyCode::Enter => {
                    if self.console.is_loading() {
                        return;
                    }
                    let id = log.selected().map(|record| record.id.clone());
                    if id.is_some() {
                        self.overlay = None;
                        self.resend(id);
                    }
                }
                _ => {}
            },
        }
    }

    fn run_slash_command(&mut self, command: ParsedCommand) {
        tracing::debug!(command = command.command.command(), argument = ?command.argument, "slash command");
        match command.command {
            SlashCommand::Resend => {
                let id = match command.argument() {
                    Some(id) => Some(id.to_string()),
                    None => self.selected_entry_id(),
                };
                self.resend(id);
            }
            SlashCommand::History => self.open_server_log(),
            SlashCommand::Help => self.overlay = Some(Overlay::Help(get_help_text())),
            SlashCommand::Quit => self.should_quit = true,
        }
    }

    fn selected_entry_id(&self) -> Option<String> {
        self.selected
            .and_then(|i| self.console.history().get(i))
            .filter(|entry| entry.is_resendable())
            .and_then(|entry| entry.id.clone())
    }

    fn resend_selected(&mut self) {
        if self.console.is_loading() {
            return;
        }
        let id = self.selected_entry_id();
        self.resend(id);
    }

    /// Dispatch the current input to the backend on a background task.
    fn submit(&mut self) {
        let Some(text) = self.console.begin_submit() else {
            return;
        };

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.create_command(&text).await;
            let _ = tx.send(AppEvent::CommandFinished { text, outcome });
        });
    }

    fn resend(&mut self, id: Option<String>) {
        let Some(id) = self.console.begin_resend(id.as_deref()) else {
            return;
        };

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.resend_command(&id).await;
            let _ = tx.send(AppEvent::ResendFinished { id, outcome });
        });
    }

    fn open_server_log(&mut self) {
        self.overlay = Some(Overlay::ServerLog(ServerLog::loading()));

        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = backend.recent_commands().await;
            let _ = tx.send(AppEvent::ServerLogLoaded(outcome));
        });
    }

    /// Apply a finished request to the console.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        let before = self.console.history().len();

        match event {
            AppEvent::CommandFinished { text, outcome } => {
                self.console.finish_submit(text, outcome);
                self.composer.clamp(self.console.input());
            }
            AppEvent::ResendFinished { id, outcome } => {
                self.console.finish_resend(id, outcome);
            }
            AppEvent::ServerLogLoaded(outcome) => match outcome {
                Ok(records) => {
                    if let Some(Overlay::ServerLog(log)) = self.overlay.as_mut() {
                        log.set_records(records);
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load server log");
                    if matches!(self.overlay, Some(Overlay::ServerLog(_))) {
                        self.overlay = None;
                    }
                    self.console.show_error(err.to_string());
                }
            },
        }

        // Keep the selection on the same entry when a new one is prepended.
        let added = self.console.history().len() - before;
        if added > 0 {
            if let Some(selected) = self.selected.as_mut() {
                *selected += added;
            }
        }
    }

    /// Apply every event that arrived since the last tick.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_app_event(event);
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let banner_height = if self.console.error().is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(banner_height),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.size());

        let loading = self.console.is_loading();
        let composer_focused = self.focus == Focus::Composer && self.overlay.is_none();
        self.composer
            .scroll_into_view(self.console.input(), chunks[0].width.saturating_sub(2) as usize);
        let view = self.composer.view(self.console.input(), loading, composer_focused);
        let cursor = view.cursor_position(chunks[0]);
        frame.render_widget(view, chunks[0]);
        if let Some((x, y)) = cursor {
            frame.set_cursor(x, y);
        }

        if let Some(error) = self.console.error() {
            let banner = Paragraph::new(Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" שגיאה "),
            );
            frame.render_widget(banner, chunks[1]);
        }

        let history = HistoryWidget::new(self.console.history(), &self.timestamp_format)
            .selected(if self.focus == Focus::History { self.selected } else { None })
            .focused(self.focus == Focus::History);
        frame.render_widget(history, chunks[2]);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " Enter send · Tab history · r resend · /help · Esc quit",
                Style::default().fg(Color::DarkGray),
            ))),
            chunks[3],
        );

        match self.overlay.as_mut() {
            Some(Overlay::Help(text)) => {
                let area = centered_rect(70, 60, frame.size());
                frame.render_widget(Clear, area);
                frame.render_widget(
                    Paragraph::new(text.clone()).block(
                        Block::default()
                            .borders(Borders::ALL)
                            .title(" Help ")
                            .border_style(Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)),
                    ),
                    area,
                );
            }
            Some(Overlay::ServerLog(log)) => log.render(frame),
            None => {}
        }
    }

    /// Draw, then wait for a key, a finished request or the next tick.
    async fn event_loop<B, S>(&mut self, terminal: &mut Terminal<B>, mut terminal_events: S) -> Result<()>
    where
        B: Backend,
        S: Stream<Item = io::Result<Event>> + Unpin,
    {
        let mut ticker = tokio::time::interval(Duration::from_millis(250));

        while !self.should_quit {
            self.drain_events();
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                event = terminal_events.next() => match event {
                    Some(Ok(Event::Key(key))) => self.handle_key(key),
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return Err(err.into()),
                    None => break,
                },
                Some(event) = self.events_rx.recv() => self.handle_app_event(event),
                _ = ticker.tick() => {}
            }
        }
        Ok(())
    }
}

/// Run the terminal UI until the user quits.
pub async fn run(config: Config, backend: Arc<dyn CommandBackend>) -> Result<()> {
    tracing::info!(base_url = %config.backend.base_url, "starting terminal UI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(&config.ui, backend);
    let result = app.event_loop(&mut terminal, EventStream::new()).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
