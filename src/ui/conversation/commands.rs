use std::str::FromStr;

use crate::ui::theme::ThemeMode;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Switch to a different model
    Model,
    /// Toggle or set the display theme
    Theme,
    /// Show help
    Help,
    /// Exit the application
    Bye,
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

    /// Explicit theme for `/theme dark|light`; `None` means toggle.
    pub fn theme_target(&self) -> Option<ThemeMode> {
        if self.command != SlashCommand::Theme {
            return None;
        }

        match self.argument()?.trim().to_lowercase().as_str() {
            "dark" | "d" | "on" => Some(ThemeMode::Dark),
            "light" | "l" | "off" => Some(ThemeMode::Light),
            _ => None,
        }
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Model => "switch model by name or number (see sidebar)",
            SlashCommand::Theme => "toggle dark mode, or /theme dark|light",
            SlashCommand::Help => "show available commands",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let rest = input.trim().strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    let tail: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "q" | "quit" | "exit" => Some(SlashCommand::Bye),
        "m" | "models" => Some(SlashCommand::Model),
        "dark" | "t" => Some(SlashCommand::Theme),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })?;

    let argument = if tail.is_empty() {
        None
    } else {
        Some(tail.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// One-line help for the status bar
pub fn get_help_text() -> String {
    let commands: Vec<String> = SlashCommand::iter()
        .map(|c| format!("/{} {}", c.command(), c.description()))
        .collect();
    format!(
        "{} · Tab/Shift+Tab cycle model · Ctrl+T theme · PgUp/PgDn scroll",
        commands.join(" · ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_with_argument() {
        let parsed = parse_slash_command("/model Gemma 3 27B").unwrap();
        assert_eq!(parsed.command, SlashCommand::Model);
        assert_eq!(parsed.argument(), Some("Gemma 3 27B"));
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(parse_slash_command("/q").unwrap().command, SlashCommand::Bye);
        assert_eq!(parse_slash_command("/exit").unwrap().command, SlashCommand::Bye);
        assert_eq!(parse_slash_command("/m 2").unwrap().command, SlashCommand::Model);
        assert_eq!(parse_slash_command("/HELP").unwrap().command, SlashCommand::Help);
    }

    #[test]
    fn plain_text_and_unknown_commands_are_not_commands() {
        assert!(parse_slash_command("hello /model").is_none());
        assert!(parse_slash_command("/frobnicate").is_none());
        assert!(parse_slash_command("/").is_none());
    }

    #[test]
    fn theme_target_reads_argument() {
        let toggle = parse_slash_command("/theme").unwrap();
        assert_eq!(toggle.theme_target(), None);
        assert_eq!(
            parse_slash_command("/theme dark").unwrap().theme_target(),
            Some(ThemeMode::Dark)
        );
        assert_eq!(
            parse_slash_command("/theme light").unwrap().theme_target(),
            Some(ThemeMode::Light)
        );
    }

    #[test]
    fn help_mentions_every_command() {
        let help = get_help_text();
        for command in SlashCommand::iter() {
            assert!(help.contains(&format!("/{}", command.command())));
        }
    }
}
