//! Terminal console for an MCP command backend: type a free-text command,
//! see how the backend interpreted it and what executing it returned, and
//! resend earlier commands by id.

pub mod backend;
pub mod config;
pub mod console;
pub mod error;
pub mod events;
pub mod history;
pub mod logging;
pub mod ui;

pub use backend::{BackendClient, CommandBackend};
pub use config::Config;
pub use console::Console;
pub use error::BackendError;
pub use history::{CommandEntry, CommandHistory};
