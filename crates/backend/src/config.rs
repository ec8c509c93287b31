//! Backend connection settings.

use std::path::PathBuf;

pub const URL_VAR: &str = "PARALLAX_BACKEND_URL";
pub const KEY_VAR: &str = "PARALLAX_BACKEND_KEY";
pub const SESSION_FILE_VAR: &str = "PARALLAX_SESSION_FILE";

/// Endpoint URL and public API key, plus where the HTTP backend keeps its session.
///
/// Both the URL and the key are required. Missing either one is a normal,
/// recognized state ("not configured"), not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
    pub session_file: Option<PathBuf>,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            session_file: None,
        }
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var(URL_VAR).ok(),
            std::env::var(KEY_VAR).ok(),
            std::env::var(SESSION_FILE_VAR).ok(),
        )
    }

    /// Build from raw values; blank values count as absent.
    pub fn from_values(
        url: Option<String>,
        api_key: Option<String>,
        session_file: Option<String>,
    ) -> Option<Self> {
        let url = non_blank(url)?;
        let api_key = non_blank(api_key)?;
        Some(Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            session_file: non_blank(session_file).map(PathBuf::from),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_values_mean_not_configured() {
        assert!(BackendConfig::from_values(None, Some("k".into()), None).is_none());
        assert!(BackendConfig::from_values(Some("http://x".into()), None, None).is_none());
        assert!(BackendConfig::from_values(Some("  ".into()), Some("k".into()), None).is_none());
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let cfg = BackendConfig::from_values(
            Some("https://db.example.com/".into()),
            Some("anon".into()),
            Some("".into()),
        )
        .unwrap();
        assert_eq!(cfg.url, "https://db.example.com");
        assert_eq!(cfg.session_file, None);
    }
}
