use std::io::IsTerminal;

use anyhow::Result;
use inquire::Select;
use tracing::warn;

use crate::chat::{ChatSession, SessionConfig, WebSocketConnector, run_terminal};
use crate::config::{ConfigManager, ResolveOptions, resolve_config};
use crate::status;
use crate::translation::{Language, TranslationClient, selection_options};
use crate::ui::{Style, handle_prompt_cancellation};

pub struct ChatOptions {
    pub to: Option<String>,
    pub server: Option<String>,
    pub api: Option<String>,
}

pub async fn run_chat(options: ChatOptions) -> Result<()> {
    let manager = ConfigManager::new()?;
    let file_config = manager.load_or_default()?;

    let resolve_options = ResolveOptions {
        language: options.to.clone(),
        server: options.server,
        api: options.api,
    };
    let resolved = resolve_config(&resolve_options, &file_config)?;

    let client = TranslationClient::new(
        resolved.api_url.clone(),
        resolved.catalog_url.clone(),
        resolved.translate_timeout,
    )?
    .with_token(resolved.auth.token.clone());

    let language = if options.to.is_some() || !std::io::stdin().is_terminal() {
        resolved.language
    } else {
        match choose_language(&client, &resolved.language).await? {
            Some(language) => language,
            None => return Ok(()),
        }
    };

    status!(
        "{} {}",
        Style::label("server"),
        Style::secondary(&resolved.server)
    );

    let session = ChatSession::new(
        SessionConfig::new(resolved.server, language),
        resolved.auth,
        WebSocketConnector::new(resolved.connect_timeout),
        client,
    );
    run_terminal(session).await
}

/// Asks which language to read messages in. `None` means the user cancelled.
async fn choose_language(client: &TranslationClient, default: &str) -> Result<Option<String>> {
    let catalog = match client.fetch_supported_languages().await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "Language catalog unavailable");
            eprintln!(
                "{} Failed to fetch supported languages.",
                Style::warning("Warning:")
            );
            Vec::new()
        }
    };

    let options = selection_options(catalog);
    handle_prompt_cancellation(|| select_language(&options, default))
}

fn select_language(options: &[Language], default: &str) -> Result<String> {
    let labels: Vec<String> = options
        .iter()
        .map(|l| format!("{} - {}", l.code, l.native_name))
        .collect();
    let default_index = options.iter().position(|l| l.code == default).unwrap_or(0);

    let selection = Select::new("Select your language to begin chatting:", labels)
        .with_starting_cursor(default_index)
        .prompt()?;

    // Labels are "code - name"; split always yields the code first.
    let code = selection.split(" - ").next().unwrap_or(&selection);
    Ok(code.to_string())
}
