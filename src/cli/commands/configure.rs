//! Configure command handler for editing settings.

use anyhow::{Result, bail};
use inquire::Text;

use crate::config::{AuthConfig, ConfigFile, ConfigManager};
use crate::translation::{DEFAULT_LANGUAGE, validate_language};
use crate::ui::{Style, handle_prompt_cancellation};

/// Runs the configure command.
///
/// With `show`, prints the current settings. Otherwise prompts for the server,
/// translation API, default language and identity, then saves the file.
pub fn run_configure(show: bool) -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;

    print_current(&config);
    if show {
        return Ok(());
    }

    let Some(updated) = handle_prompt_cancellation(|| prompt_config(config))? else {
        return Ok(());
    };
    manager.save(&updated)?;

    println!();
    println!(
        "{} Configuration saved to {}",
        Style::success("✓"),
        Style::secondary(manager.config_path().display())
    );
    Ok(())
}

fn or_not_set(value: Option<&str>) -> String {
    value.map_or_else(|| Style::secondary("(not set)"), Style::value)
}

fn token_summary(auth: &AuthConfig) -> String {
    match (&auth.token_env, auth.get_token()) {
        (Some(env), Some(_)) => Style::value(format!("(set via ${env})")),
        (Some(env), None) => Style::warning(format!("(${env} is not set)")),
        (None, Some(_)) => Style::value("(set in file)"),
        (None, None) => Style::secondary("(not set)"),
    }
}

fn print_current(config: &ConfigFile) {
    println!("{}", Style::header("Current settings"));
    println!(
        "  {}      {}",
        Style::label("server"),
        or_not_set(config.polychat.server.as_deref())
    );
    println!(
        "  {}    {}",
        Style::label("language"),
        or_not_set(config.polychat.language.as_deref())
    );
    println!(
        "  {} {}",
        Style::label("translation"),
        or_not_set(config.translation.api.as_deref())
    );
    println!(
        "  {}     {}",
        Style::label("user_id"),
        or_not_set(config.auth.user_id.as_deref())
    );
    println!(
        "  {}  {}",
        Style::label("first_name"),
        or_not_set(config.auth.first_name.as_deref())
    );
    println!("  {}       {}", Style::label("token"), token_summary(&config.auth));
    println!();
}

fn prompt_required(message: &str, current: Option<&str>, help: &str) -> Result<String> {
    let mut prompt = Text::new(message).with_help_message(help);
    if let Some(current) = current {
        prompt = prompt.with_default(current);
    }

    let value = prompt.prompt()?;
    let value = value.trim();
    if value.is_empty() {
        bail!("{} cannot be empty", message.trim_end_matches(':'));
    }
    Ok(value.to_string())
}

fn prompt_config(mut config: ConfigFile) -> Result<ConfigFile> {
    config.polychat.server = Some(prompt_required(
        "Chat server:",
        config.polychat.server.as_deref(),
        "WebSocket URL, e.g. wss://chat.example.com",
    )?);

    config.translation.api = Some(prompt_required(
        "Translation API:",
        config.translation.api.as_deref(),
        "Base URL; messages are posted to <url>/translate/message",
    )?);

    let language = prompt_required(
        "Default language:",
        Some(config.polychat.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)),
        "Language code you read messages in, e.g. en, fr, es",
    )?;
    validate_language(&language)?;
    config.polychat.language = Some(language);

    config.auth.user_id = Some(prompt_required(
        "User id:",
        config.auth.user_id.as_deref(),
        "Your id on the chat server",
    )?);

    config.auth.first_name = Some(prompt_required(
        "First name:",
        config.auth.first_name.as_deref(),
        "Shown to your chat partner",
    )?);

    if config.auth.token.is_none() {
        config.auth.token_env = Some(prompt_required(
            "Token variable:",
            Some(config.auth.token_env.as_deref().unwrap_or("POLYCHAT_TOKEN")),
            "Environment variable holding your auth token",
        )?);
    }

    Ok(config)
}
