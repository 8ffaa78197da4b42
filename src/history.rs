//! Session command history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// One submitted or resent command and what the backend made of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEntry {
    /// Backend log id; only entries carrying one can be resent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub command: String,
    pub llm_result: Value,
    pub api_result: Value,
    /// When the response arrived on this side
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandEntry {
    pub fn completed(
        command: impl Into<String>,
        id: Option<String>,
        llm_result: Value,
        api_result: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            command: command.into(),
            llm_result,
            api_result,
            timestamp,
            error: None,
        }
    }

    /// A request that never produced results
    pub fn failed(command: impl Into<String>, error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: None,
            command: command.into(),
            llm_result: Value::Null,
            api_result: Value::Null,
            timestamp,
            error: Some(error.into()),
        }
    }

    pub fn is_resendable(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Append-only list of entries, newest first
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: VecDeque<CommandEntry>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend an entry.
    pub fn record(&mut self, entry: CommandEntry) {
        self.entries.push_front(entry);
    }

    pub fn latest(&self) -> Option<&CommandEntry> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&CommandEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
