use crate::backend::{CommandReply, HistoryRecord, ResendReply};
use crate::error::BackendError;

/// Results posted back to the UI loop by request tasks
#[derive(Debug)]
pub enum AppEvent {
    /// `POST /command` finished
    CommandFinished {
        text: String,
        outcome: Result<CommandReply, BackendError>,
    },

    /// `POST /resend/{id}` finished
    ResendFinished {
        id: String,
        outcome: Result<ResendReply, BackendError>,
    },

    /// `GET /history` finished
    ServerLogLoaded(Result<Vec<HistoryRecord>, BackendError>),
}
