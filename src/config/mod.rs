mod manager;

pub use manager::{
    AuthConfig, ConfigFile, ConfigManager, DEFAULT_CATALOG_URL, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_TRANSLATE_TIMEOUT_SECS, PolychatConfig, ResolveOptions, ResolvedConfig,
    TranslationConfig, resolve_config,
};
