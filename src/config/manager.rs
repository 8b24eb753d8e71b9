use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::AuthContext;
use crate::paths;
use crate::translation::DEFAULT_LANGUAGE;

/// Catalog of languages the public translator supports.
pub const DEFAULT_CATALOG_URL: &str =
    "https://api.cognitive.microsofttranslator.com/languages?api-version=3.0&scope=translation";

/// Default WebSocket handshake timeout.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Default translation request timeout.
pub const DEFAULT_TRANSLATE_TIMEOUT_SECS: u64 = 10;

/// Settings in the `[polychat]` section of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolychatConfig {
    /// WebSocket URL of the pairing server.
    pub server: Option<String>,
    /// Default preferred language.
    pub language: Option<String>,
    /// Handshake timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
}

/// The `[translation]` section: the gateway and language catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Base URL of the translation gateway.
    pub api: Option<String>,
    /// Language catalog URL.
    pub catalog: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// The `[auth]` section: who we are on the chat server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    /// Token stored directly in config (not recommended).
    pub token: Option<String>,
    /// Environment variable holding the token.
    pub token_env: Option<String>,
}

impl AuthConfig {
    /// Gets the token, preferring the environment variable over the config file.
    pub fn get_token(&self) -> Option<String> {
        if let Some(env_var) = &self.token_env
            && let Ok(token) = std::env::var(env_var)
            && !token.is_empty()
        {
            return Some(token);
        }
        self.token.clone()
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/polychat/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub polychat: PolychatConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl ConfigFile {
    pub fn catalog_url(&self) -> String {
        self.translation
            .catalog
            .clone()
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string())
    }

    pub fn translate_timeout(&self) -> Duration {
        Duration::from_secs(
            self.translation
                .timeout_secs
                .unwrap_or(DEFAULT_TRANSLATE_TIMEOUT_SECS),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.polychat
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }
}

/// Resolved configuration after merging CLI arguments and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server: String,
    pub api_url: String,
    pub catalog_url: String,
    pub language: String,
    pub connect_timeout: Duration,
    pub translate_timeout: Duration,
    pub auth: AuthContext,
}

/// CLI overrides that take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub language: Option<String>,
    pub server: Option<String>,
    pub api: Option<String>,
}

fn missing(key: &str, flag: &str) -> anyhow::Error {
    anyhow!(
        "Missing required configuration: '{key}'\n\n\
         Please provide it via:\n  \
         - CLI option: polychat chat {flag}\n  \
         - Config file: run 'polychat configure' or edit ~/.config/polychat/config.toml"
    )
}

/// Resolves configuration by merging CLI options with config file settings.
///
/// CLI options take precedence over config file values; the preferred language
/// falls back to English.
///
/// # Errors
///
/// Returns an error if the server, translation API, or user identity is missing.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<ResolvedConfig> {
    let server = options
        .server
        .as_ref()
        .or(config_file.polychat.server.as_ref())
        .cloned()
        .ok_or_else(|| missing("server", "--server <url>"))?;

    let api_url = options
        .api
        .as_ref()
        .or(config_file.translation.api.as_ref())
        .cloned()
        .ok_or_else(|| missing("translation.api", "--api <url>"))?;

    let language = options
        .language
        .as_ref()
        .or(config_file.polychat.language.as_ref())
        .cloned()
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let auth = &config_file.auth;
    let (Some(user_id), Some(first_name)) = (&auth.user_id, &auth.first_name) else {
        bail!(
            "Missing user identity\n\n\
             Set auth.user_id and auth.first_name in ~/.config/polychat/config.toml\n\
             or run 'polychat configure'."
        );
    };

    let Some(token) = auth.get_token() else {
        let env_var = auth.token_env.as_deref().unwrap_or("POLYCHAT_TOKEN");
        bail!(
            "Missing auth token\n\n\
             Set the {env_var} environment variable:\n  \
             export {env_var}=\"your-token\"\n\n\
             Or set auth.token in ~/.config/polychat/config.toml"
        );
    };

    Ok(ResolvedConfig {
        server,
        api_url,
        catalog_url: config_file.catalog_url(),
        language,
        connect_timeout: config_file.connect_timeout(),
        translate_timeout: config_file.translate_timeout(),
        auth: AuthContext::new(token, user_id.clone(), first_name.clone()),
    })
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a config manager for `$XDG_CONFIG_HOME/polychat/config.toml`
    /// (or `~/.config/polychat/config.toml`).
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        toml::from_str(&contents).with_context(|| {
            format!(
                "Failed to parse config file: {}",
                self.config_path.display()
            )
        })
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })
    }

    /// Loads the config, treating a missing file as empty.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_test_config() -> ConfigFile {
        ConfigFile {
            polychat: PolychatConfig {
                server: Some("wss://chat.example.com".to_string()),
                language: Some("fr".to_string()),
                connect_timeout_secs: None,
            },
            translation: TranslationConfig {
                api: Some("https://api.example.com".to_string()),
                catalog: None,
                timeout_secs: Some(3),
            },
            auth: AuthConfig {
                user_id: Some("u1".to_string()),
                first_name: Some("Sam".to_string()),
                token: Some("file-token".to_string()),
                token_env: None,
            },
        }
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("nested/config.toml"));

        let config = create_test_config();
        manager.save(&config).unwrap();

        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));

        assert!(manager.load().is_err());
        assert_eq!(manager.load_or_default().unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_load_or_default_rejects_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[polychat\nserver = ").unwrap();

        let manager = ConfigManager::with_path(path);
        assert!(manager.load_or_default().is_err());
    }

    #[test]
    fn test_partial_file_parses() {
        let config: ConfigFile = toml::from_str("[polychat]\nlanguage = \"de\"\n").unwrap();
        assert_eq!(config.polychat.language.as_deref(), Some("de"));
        assert!(config.auth.user_id.is_none());
        assert_eq!(config.catalog_url(), DEFAULT_CATALOG_URL);
        assert_eq!(
            config.translate_timeout(),
            Duration::from_secs(DEFAULT_TRANSLATE_TIMEOUT_SECS)
        );
    }

    #[test]
    #[serial]
    fn test_token_from_env_takes_priority() {
        // SAFETY: env-touching tests are serialized
        unsafe {
            std::env::set_var("POLYCHAT_TEST_TOKEN", "env-token");
        }

        let auth = AuthConfig {
            token: Some("file-token".to_string()),
            token_env: Some("POLYCHAT_TEST_TOKEN".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(auth.get_token(), Some("env-token".to_string()));

        // SAFETY: see above
        unsafe {
            std::env::remove_var("POLYCHAT_TEST_TOKEN");
        }
        assert_eq!(auth.get_token(), Some("file-token".to_string()));
    }

    #[test]
    fn test_resolve_config_from_file() {
        let resolved = resolve_config(&ResolveOptions::default(), &create_test_config()).unwrap();

        assert_eq!(resolved.server, "wss://chat.example.com");
        assert_eq!(resolved.api_url, "https://api.example.com");
        assert_eq!(resolved.language, "fr");
        assert_eq!(resolved.translate_timeout, Duration::from_secs(3));
        assert_eq!(
            resolved.connect_timeout,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );
        assert_eq!(resolved.auth, AuthContext::new("file-token", "u1", "Sam"));
    }

    #[test]
    fn test_resolve_config_cli_overrides_file() {
        let options = ResolveOptions {
            language: Some("ja".to_string()),
            server: Some("ws://localhost:8080".to_string()),
            api: Some("http://localhost:3000".to_string()),
        };

        let resolved = resolve_config(&options, &create_test_config()).unwrap();

        assert_eq!(resolved.server, "ws://localhost:8080");
        assert_eq!(resolved.api_url, "http://localhost:3000");
        assert_eq!(resolved.language, "ja");
    }

    #[test]
    fn test_resolve_config_language_defaults_to_english() {
        let mut config = create_test_config();
        config.polychat.language = None;

        let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();
        assert_eq!(resolved.language, "en");
    }

    #[test]
    fn test_resolve_config_missing_server() {
        let mut config = create_test_config();
        config.polychat.server = None;

        let err = resolve_config(&ResolveOptions::default(), &config).unwrap_err();
        assert!(err.to_string().contains("server"));
    }

    #[test]
    fn test_resolve_config_missing_identity() {
        let mut config = create_test_config();
        config.auth.first_name = None;

        let err = resolve_config(&ResolveOptions::default(), &config).unwrap_err();
        assert!(err.to_string().contains("identity"));
    }

    #[test]
    fn test_resolve_config_missing_token() {
        let mut config = create_test_config();
        config.auth.token = None;
        config.auth.token_env = Some("POLYCHAT_TEST_UNSET_TOKEN".to_string());

        let err = resolve_config(&ResolveOptions::default(), &config).unwrap_err();
        assert!(err.to_string().contains("POLYCHAT_TEST_UNSET_TOKEN"));
    }
}
