//! Terminal front end for the command console

pub mod app;
pub mod commands;
pub mod composer;
pub mod history;
pub mod server_log;

pub use app::{App, Focus, run};
pub use commands::{ParsedCommand, SlashCommand, get_help_text};
pub use composer::Composer;
pub use history::HistoryWidget;
pub use server_log::ServerLog;
