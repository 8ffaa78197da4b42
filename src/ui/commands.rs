use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting the input with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Resend a command by id, or the selected history entry
    Resend,
    /// Show the backend's own command log
    History,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Resend => "resend a command by id (default: the selected entry)",
            SlashCommand::History => "show the backend command log",
            SlashCommand::Help => "show available commands and keys",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input. Unknown commands return `None` and
/// the text is treated as an ordinary command for the backend.
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim().strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let remaining: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "q" | "exit" | "bye" => Some(SlashCommand::Quit),
        "r" => Some(SlashCommand::Resend),
        "log" => Some(SlashCommand::History),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    let argument = if remaining.is_empty() {
        None
    } else {
        Some(remaining.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Help text for all commands and key bindings
pub fn get_help_text() -> String {
    let mut help = String::from("Commands:\n");
    for command in SlashCommand::iter() {
        help.push_str(&format!("  /{:<8} {}\n", command.command(), command.description()));
    }

    help.push_str("\nKeys:\n");
    help.push_str("  Enter      send the command (or resend the selected entry)\n");
    help.push_str("  Tab        switch between input and history\n");
    help.push_str("  Up/Down    select a history entry\n");
    help.push_str("  r          resend the selected entry\n");
    help.push_str("  Esc        close this window / quit\n");
    help.push_str("  Ctrl+C     quit\n");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands_and_arguments() {
        assert_eq!(
            parse_slash_command("/resend 1234-abcd"),
            Some(ParsedCommand {
                command: SlashCommand::Resend,
                argument: Some("1234-abcd".to_string()),
            })
        );
        assert_eq!(
            parse_slash_command("  /HISTORY  ").map(|c| c.command),
            Some(SlashCommand::History)
        );
        assert_eq!(parse_slash_command("/help").unwrap().argument(), None);
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(parse_slash_command("/q").map(|c| c.command), Some(SlashCommand::Quit));
        assert_eq!(parse_slash_command("/exit").map(|c| c.command), Some(SlashCommand::Quit));
        assert_eq!(parse_slash_command("/r abc").map(|c| c.command), Some(SlashCommand::Resend));
        assert_eq!(parse_slash_command("/log").map(|c| c.command), Some(SlashCommand::History));
    }

    #[test]
    fn plain_and_unknown_input_is_not_a_command() {
        assert_eq!(parse_slash_command("הדלק את האור"), None);
        assert_eq!(parse_slash_command("/unknown thing"), None);
        assert_eq!(parse_slash_command("/"), None);
    }

    #[test]
    fn help_lists_every_command() {
        let help = get_help_text();
        for command in SlashCommand::iter() {
            assert!(help.contains(&format!("/{}", command.command())));
        }
    }
}
