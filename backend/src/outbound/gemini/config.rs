//! Language model settings loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Model used when `ASSISTANT_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Generative Language API root used when `ASSISTANT_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the hosted language model behind the assistant.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ASSISTANT")]
pub struct AssistantSettings {
    /// Provider API key; the scripted fixture model is used when absent.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// API root, without a trailing slash.
    pub base_url: Option<String>,
}

impl AssistantSettings {
    /// Return the API key when one is configured and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Return the configured model, falling back to the default.
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Return the configured API root, falling back to the default.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for assistant configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> AssistantSettings {
        AssistantSettings::load_from_iter([OsString::from("hello-assistant")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("ASSISTANT_API_KEY", None::<String>),
            ("ASSISTANT_MODEL", None::<String>),
            ("ASSISTANT_BASE_URL", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert!(settings.api_key().is_none());
        assert_eq!(settings.model(), DEFAULT_MODEL);
        assert_eq!(settings.base_url(), DEFAULT_BASE_URL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ASSISTANT_API_KEY", Some("secret".to_owned())),
            ("ASSISTANT_MODEL", Some("gemini-2.5-pro".to_owned())),
            ("ASSISTANT_BASE_URL", Some("http://127.0.0.1:9000/v1/".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.api_key(), Some("secret"));
        assert_eq!(settings.model(), "gemini-2.5-pro");
        assert_eq!(settings.base_url(), "http://127.0.0.1:9000/v1");
    }

    #[rstest]
    fn blank_api_key_counts_as_missing() {
        let _guard = lock_env([
            ("ASSISTANT_API_KEY", Some("   ".to_owned())),
            ("ASSISTANT_MODEL", None::<String>),
            ("ASSISTANT_BASE_URL", None::<String>),
        ]);

        assert!(load_from_empty_args().api_key().is_none());
    }
}
