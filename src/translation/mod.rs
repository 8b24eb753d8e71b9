mod client;
mod language;

pub use client::{TranslationClient, Translator};
pub use language::{
    DEFAULT_LANGUAGE, Language, print_languages, selection_options, validate_language,
};
