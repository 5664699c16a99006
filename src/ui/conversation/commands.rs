use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Translate the selected message
    Translate,
    /// Summarize the selected message
    Summarize,
    /// Show or hide the language menu of the selected message
    Languages,
    /// Set the default target language
    Target,
    /// Switch between dark and light theme
    Theme,
    /// Clear the error banner
    Dismiss,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
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
            SlashCommand::Translate => "translate the selected message (/translate fr)",
            SlashCommand::Summarize => "summarize the selected message",
            SlashCommand::Languages => "toggle the translate menu of the selected message",
            SlashCommand::Target => "set the default target language (/target es)",
            SlashCommand::Theme => "switch between dark and light theme",
            SlashCommand::Dismiss => "clear the error banner",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }

    /// Whether the command issues a capability call and so needs an idle manager.
    pub fn needs_idle(self) -> bool {
        matches!(self, SlashCommand::Translate | SlashCommand::Summarize)
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let body = input.trim().strip_prefix('/')?;

    let mut parts = body.split_whitespace();
    let head = parts.next()?;
    let rest: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(head).ok().or_else(|| match head.to_lowercase().as_str() {
        "q" | "bye" | "exit" => Some(SlashCommand::Quit),
        "t" | "tr" => Some(SlashCommand::Translate),
        "s" | "sum" => Some(SlashCommand::Summarize),
        "l" | "lang" | "menu" => Some(SlashCommand::Languages),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    let argument = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for entry in command_entries() {
        help.push_str(&format!("/{} - {}\n", entry.keyword, entry.description));
    }

    help.push_str("\nKeys: Up/Down select a message, Ctrl+T translate menu, Ctrl+S summarize,");
    help.push_str("\nLeft/Right pick a language while the menu is open, Enter translates,");
    help.push_str("\nCtrl+L theme, Esc closes menus and errors, Ctrl+C quits.");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_argument() {
        let parsed = parse_slash_command("/translate  fr ").unwrap();
        assert_eq!(parsed.command, SlashCommand::Translate);
        assert_eq!(parsed.argument(), Some("fr"));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse_slash_command("/q").unwrap().command, SlashCommand::Quit);
        assert_eq!(parse_slash_command("/s").unwrap().command, SlashCommand::Summarize);
        assert!(parse_slash_command("/nope").is_none());
        assert!(parse_slash_command("hello /theme").is_none());
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = get_help_text();
        for entry in command_entries() {
            assert!(help.contains(&format!("/{}", entry.keyword)));
        }
    }
}
