//! Application configuration.
//!
//! Every field has a default, so an empty JSON object (or no config at all) is valid. Keys may
//! also be written in the upper-case form used by older deployments (`PASSWORD`, `APP_KEY`).
//!
//! Environment overrides:
//! - `XIZOA_PASSWORD` - gate password
//! - `XIZOA_APP_KEY` - key-value store key

use crate::persistence::{DEFAULT_APP_KEY, DEFAULT_EXPORT_FILENAME};
use crate::shell_cache::DEFAULT_CACHE_NAME;
use serde::{Deserialize, Serialize};

/// Default gate password.
pub const DEFAULT_PASSWORD: &str = "ADMIN";

/// Environment variable overriding [`AppConfig::password`].
pub const ENV_PASSWORD: &str = "XIZOA_PASSWORD";
/// Environment variable overriding [`AppConfig::app_key`].
pub const ENV_APP_KEY: &str = "XIZOA_APP_KEY";

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Plaintext password compared by the gate.
    #[serde(alias = "PASSWORD")]
    pub password: String,
    /// Key under which the project is saved.
    #[serde(alias = "APP_KEY")]
    pub app_key: String,
    /// Suggested filename of exports.
    pub export_filename: String,
    /// Versioned name of the offline shell cache, see [`crate::ShellCache::from_config`].
    pub cache_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            password: DEFAULT_PASSWORD.to_string(),
            app_key: DEFAULT_APP_KEY.to_string(),
            export_filename: DEFAULT_EXPORT_FILENAME.to_string(),
            cache_name: DEFAULT_CACHE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Apply `XIZOA_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(password) = value(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(app_key) = value(ENV_APP_KEY) {
            self.app_key = app_key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_all_defaults() {
        assert_eq!(AppConfig::from_json_str("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn accepts_legacy_upper_case_keys() {
        let config = AppConfig::from_json_str(r#"{"PASSWORD": "pw", "APP_KEY": "k"}"#).unwrap();
        assert_eq!(config.password, "pw");
        assert_eq!(config.app_key, "k");
        assert_eq!(config.export_filename, DEFAULT_EXPORT_FILENAME);
    }

    #[test]
    fn overrides_skip_empty_values() {
        let config = AppConfig::default().with_overrides_from(|name| match name {
            ENV_PASSWORD => Some("secret".to_string()),
            ENV_APP_KEY => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.password, "secret");
        assert_eq!(config.app_key, DEFAULT_APP_KEY);
    }
}
