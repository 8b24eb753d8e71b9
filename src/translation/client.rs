use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::language::Language;
use crate::error::ChatError;

/// Translates chat text between languages.
///
/// Implementations make a single attempt: no retry and no caching.
pub trait Translator: Send + Sync + 'static {
    fn translate(
        &self,
        text: &str,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<String, ChatError>> + Send;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    to: &'a str,
    from: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    #[serde(rename = "nativeName")]
    native_name: String,
}

// Microsoft Translator nests the map under `translation`; plain gateways return it bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogResponse {
    Scoped {
        translation: BTreeMap<String, LanguageEntry>,
    },
    Bare(BTreeMap<String, LanguageEntry>),
}

impl CatalogResponse {
    fn into_languages(self) -> Vec<Language> {
        let (Self::Scoped { translation: map } | Self::Bare(map)) = self;
        map.into_iter()
            .map(|(code, entry)| Language {
                code,
                native_name: entry.native_name,
            })
            .collect()
    }
}

/// HTTP client for the translation gateway and the language catalog.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: Client,
    api_url: String,
    catalog_url: String,
    token: Option<String>,
}

impl TranslationClient {
    /// Creates a client whose requests fail after `timeout`.
    pub fn new(api_url: String, catalog_url: String, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::TranslationFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url,
            catalog_url,
            token: None,
        })
    }

    /// Attaches the user's bearer token to gateway requests.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Fetches the languages the gateway can translate between.
    pub async fn fetch_supported_languages(&self) -> Result<Vec<Language>, ChatError> {
        let response = self
            .client
            .get(&self.catalog_url)
            .send()
            .await
            .map_err(|e| ChatError::LanguageCatalogFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChatError::LanguageCatalogFailed(format!(
                "catalog request failed with status {}",
                response.status()
            )));
        }

        let catalog: CatalogResponse = response
            .json()
            .await
            .map_err(|e| ChatError::LanguageCatalogFailed(e.to_string()))?;

        Ok(catalog.into_languages())
    }

    fn translate_url(&self) -> String {
        format!("{}/translate/message", self.api_url.trim_end_matches('/'))
    }
}

impl Translator for TranslationClient {
    async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ChatError> {
        let url = self.translate_url();
        let mut request = self.client.post(&url).json(&TranslateRequest {
            to,
            from,
            message: text,
        });

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChatError::TranslationFailed(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::TranslationFailed(format!(
                "gateway responded with status {status}: {body}"
            )));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::TranslationFailed(format!("malformed response: {e}")))?;

        Ok(body.text)
    }
}
