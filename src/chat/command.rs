// Available slash commands: (command, description)
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("/begin", "Look for a partner (optionally: /begin <lang>)"),
    ("/leave", "Leave the queue or the current chat"),
    ("/lang", "Set the language you read messages in"),
    ("/status", "Show the session state"),
    ("/help", "Show available commands"),
    ("/quit", "Leave and exit"),
];

/// Slash command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Begin(Option<String>),
    Leave,
    Lang(Option<String>),
    Status,
    Help,
    Quit,
    Unknown(String),
}

/// Input types
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Command(SlashCommand),
    Empty,
}

pub fn parse_input(input: &str) -> Input {
    let input = input.trim();

    if input.is_empty() {
        return Input::Empty;
    }

    input
        .strip_prefix('/')
        .map_or_else(|| Input::Text(input.to_string()), parse_slash_command)
}

fn parse_slash_command(cmd: &str) -> Input {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let argument = parts.get(1).map(|s| (*s).to_string());

    match parts.first().copied() {
        Some("begin" | "start") => Input::Command(SlashCommand::Begin(argument)),
        Some("leave" | "cancel") => Input::Command(SlashCommand::Leave),
        Some("lang") => Input::Command(SlashCommand::Lang(argument)),
        Some("status") => Input::Command(SlashCommand::Status),
        Some("help") => Input::Command(SlashCommand::Help),
        Some("quit" | "exit" | "q") => Input::Command(SlashCommand::Quit),
        _ => Input::Command(SlashCommand::Unknown(parts.join(" "))),
    }
}
