//! The command console: input, loading flag, error banner and history,
//! plus the two request handlers that mutate them.

use crate::backend::{CommandBackend, CommandReply, ResendReply};
use crate::error::BackendError;
use crate::history::{CommandEntry, CommandHistory};
use chrono::Utc;

/// Banner text when a submission fails without a backend detail
pub const CREATE_ERROR_FALLBACK: &str = "שגיאה ביצירת הבקשה";
/// Banner text when a resend fails without a backend detail
pub const RESEND_ERROR_FALLBACK: &str = "שגיאה בשליחה חוזרת";
/// Prefix of the label given to resent entries
pub const RESEND_MARKER: &str = "🔁";

/// Called with the submitted text after every successful submission
pub type CommandCallback = Box<dyn FnMut(&str) + Send>;

#[derive(Default)]
pub struct Console {
    input: String,
    loading: bool,
    error: Option<String>,
    history: CommandHistory,
    on_command: Option<CommandCallback>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_on_command(mut self, callback: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_command = Some(Box::new(callback));
        self
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the banner, e.g. with a failure that has no handler of its own.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.input.trim().is_empty()
    }

    /// Start a submission of the current input. Returns the text to send, or
    /// `None` when the input is blank and nothing should happen.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.input.trim().is_empty() {
            return None;
        }

        self.loading = true;
        self.error = None;
        Some(self.input.clone())
    }

    /// Record the outcome of a submission started with [`Console::begin_submit`].
    pub fn finish_submit(&mut self, text: String, outcome: Result<CommandReply, BackendError>) {
        match outcome {
            Ok(reply) => {
                tracing::info!(command = %text, id = ?reply.id, "command completed");
                self.history.record(CommandEntry::completed(
                    text.clone(),
                    reply.id,
                    reply.llm_result,
                    reply.api_result,
                    Utc::now(),
                ));
                if let Some(callback) = self.on_command.as_mut() {
                    callback(&text);
                }
            }
            Err(err) => {
                tracing::warn!(command = %text, error = %err, "command failed");
                let message = err.detail().unwrap_or(CREATE_ERROR_FALLBACK).to_string();
                self.error = Some(message.clone());
                self.history.record(CommandEntry::failed(text, message, Utc::now()));
            }
        }

        self.loading = false;
        self.input.clear();
    }

    /// Start resending the entry with `id`. Missing or empty ids are ignored.
    pub fn begin_resend(&mut self, id: Option<&str>) -> Option<String> {
        let id = id.filter(|id| !id.is_empty())?;

        self.loading = true;
        self.error = None;
        Some(id.to_string())
    }

    /// Record the outcome of a resend started with [`Console::begin_resend`].
    /// Failures only reach the banner; they add no history entry.
    pub fn finish_resend(&mut self, id: String, outcome: Result<ResendReply, BackendError>) {
        match outcome {
            Ok(reply) => {
                let original_id = reply.original_id.filter(|o| !o.is_empty()).unwrap_or(id);
                tracing::info!(id = %original_id, "resend completed");
                self.history.record(CommandEntry::completed(
                    format!("{} {}", RESEND_MARKER, original_id),
                    Some(original_id),
                    reply.llm_result,
                    reply.api_result,
                    Utc::now(),
                ));
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "resend failed");
                self.error = Some(err.detail().unwrap_or(RESEND_ERROR_FALLBACK).to_string());
            }
        }

        self.loading = false;
    }

    /// Submit the current input and wait for the backend.
    pub async fn submit(&mut self, backend: &dyn CommandBackend) {
        let Some(text) = self.begin_submit() else {
            return;
        };
        let outcome = backend.create_command(&text).await;
        self.finish_submit(text, outcome);
    }

    /// Resend the entry with `id` and wait for the backend.
    pub async fn resend(&mut self, backend: &dyn CommandBackend, id: Option<&str>) {
        let Some(id) = self.begin_resend(id) else {
            return;
        };
        let outcome = backend.resend_command(&id).await;
        self.finish_resend(id, outcome);
    }
}
