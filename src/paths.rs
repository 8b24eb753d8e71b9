//! XDG-style path utilities for configuration.
//!
//! Prefers XDG Base Directory conventions over OS-specific locations, so the
//! config file lives in the same place on Linux and macOS.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "polychat";

/// Returns the configuration directory.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/polychat` if `XDG_CONFIG_HOME` is set and non-empty
/// 2. `~/.config/polychat` otherwise
pub fn config_dir() -> Result<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => Ok(PathBuf::from(xdg).join(APP_DIR)),
        _ => {
            let home = dirs::home_dir().context("Failed to determine home directory")?;
            Ok(home.join(".config").join(APP_DIR))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn with_xdg<F: FnOnce()>(value: Option<&str>, f: F) {
        let original = std::env::var_os("XDG_CONFIG_HOME");
        // SAFETY: tests touching XDG_CONFIG_HOME are serialized
        unsafe {
            match value {
                Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }

        f();

        // SAFETY: see above
        unsafe {
            match original {
                Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_config_dir_default() {
        with_xdg(None, || {
            let dir = config_dir().unwrap();
            assert!(dir.ends_with(".config/polychat"));
        });
    }

    #[test]
    #[serial]
    fn test_config_dir_xdg_override() {
        with_xdg(Some("/custom/config"), || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/config/polychat"));
        });
    }

    #[test]
    #[serial]
    fn test_config_dir_ignores_empty_xdg() {
        with_xdg(Some(""), || {
            assert!(config_dir().unwrap().ends_with(".config/polychat"));
        });
    }
}
