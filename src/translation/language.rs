//! Language codes and the catalog offered for selection.

use anyhow::Result;

use crate::ui::Style;

/// Language used when the user has not picked one.
pub const DEFAULT_LANGUAGE: &str = "en";

const DEFAULT_LANGUAGE_NAME: &str = "English";

/// A language the gateway can translate into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub native_name: String,
}

impl Language {
    fn default_language() -> Self {
        Self {
            code: DEFAULT_LANGUAGE.to_string(),
            native_name: DEFAULT_LANGUAGE_NAME.to_string(),
        }
    }
}

/// Builds the selection list: the default language first, then the catalog without it.
///
/// An empty catalog (for example after a failed fetch) still offers the default.
pub fn selection_options(catalog: Vec<Language>) -> Vec<Language> {
    std::iter::once(Language::default_language())
        .chain(catalog.into_iter().filter(|l| l.code != DEFAULT_LANGUAGE))
        .collect()
}

/// Prints language codes and their native names to stdout.
pub fn print_languages(languages: &[Language]) {
    println!("{}", Style::header("Supported languages"));
    for language in languages {
        println!(
            "  {:8} {}",
            Style::code(&language.code),
            Style::secondary(&language.native_name)
        );
    }
}

/// Validates the shape of a language code.
///
/// Codes are compared by exact equality elsewhere, so `zh-Hans` and `zh` are distinct.
///
/// # Errors
///
/// Returns an error if the code is empty or contains characters other than ASCII
/// letters, digits and `-`.
pub fn validate_language(lang: &str) -> Result<()> {
    let well_formed = !lang.is_empty()
        && lang.len() <= 16
        && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    if well_formed {
        Ok(())
    } else {
        anyhow::bail!(
            "Invalid language code: '{lang}'\n\n\
             Language codes look like: en, fr, es, zh-Hans, ...\n\
             Run 'polychat languages' to see all supported codes."
        )
    }
}
