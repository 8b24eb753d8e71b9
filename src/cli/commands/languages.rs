//! Language catalog listing.

use anyhow::Result;

use crate::config::ConfigManager;
use crate::translation::{TranslationClient, print_languages, selection_options};

/// Fetches the language catalog and prints it to stdout.
///
/// # Errors
///
/// Returns an error if the config file is malformed or the catalog cannot be fetched.
pub async fn print_catalog() -> Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load_or_default()?;

    let client = TranslationClient::new(
        config.translation.api.clone().unwrap_or_default(),
        config.catalog_url(),
        config.translate_timeout(),
    )?;

    let catalog = client.fetch_supported_languages().await?;
    print_languages(&selection_options(catalog));
    Ok(())
}
