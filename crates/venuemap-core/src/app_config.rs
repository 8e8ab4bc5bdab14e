use std::path::PathBuf;

use crate::place::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub catalog_path: PathBuf,
    pub places_base_url: String,
    pub places_api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub autocomplete_min_chars: usize,
    pub autocomplete_debounce_ms: u64,
    pub search_max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub detail_zoom: u8,
    pub default_center: Coordinates,
    pub default_zoom: u8,
    pub home_position: Option<Coordinates>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("catalog_path", &self.catalog_path)
            .field("places_base_url", &self.places_base_url)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("autocomplete_min_chars", &self.autocomplete_min_chars)
            .field("autocomplete_debounce_ms", &self.autocomplete_debounce_ms)
            .field("search_max_retries", &self.search_max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("detail_zoom", &self.detail_zoom)
            .field("default_center", &self.default_center)
            .field("default_zoom", &self.default_zoom)
            .field("home_position", &self.home_position)
            .finish()
    }
}
