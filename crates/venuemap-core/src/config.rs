use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::place::Coordinates;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so they can
/// be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_var(var, &or_default(var, default))
    };

    let env = parse_environment(&or_default("VENUEMAP_ENV", "development"))?;
    let log_level = or_default("VENUEMAP_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default(
        "VENUEMAP_CATALOG_PATH",
        "./config/catalog.yaml",
    ));
    let places_base_url = or_default(
        "VENUEMAP_PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/place/",
    );

    let places_api_key = lookup("VENUEMAP_PLACES_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    if env == Environment::Production && places_api_key.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "VENUEMAP_PLACES_API_KEY".to_string(),
        ));
    }

    let request_timeout_secs = parse("VENUEMAP_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "VENUEMAP_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("VENUEMAP_USER_AGENT", "venuemap/0.1 (location-finder)");

    let autocomplete_min_chars: usize = parse_var(
        "VENUEMAP_AUTOCOMPLETE_MIN_CHARS",
        &or_default("VENUEMAP_AUTOCOMPLETE_MIN_CHARS", "3"),
    )?;
    let autocomplete_debounce_ms = parse("VENUEMAP_AUTOCOMPLETE_DEBOUNCE_MS", "250")?;
    let search_max_retries: u32 = parse_var(
        "VENUEMAP_SEARCH_MAX_RETRIES",
        &or_default("VENUEMAP_SEARCH_MAX_RETRIES", "1"),
    )?;
    let retry_backoff_base_ms = parse("VENUEMAP_RETRY_BACKOFF_BASE_MS", "500")?;

    let detail_zoom = parse_zoom("VENUEMAP_DETAIL_ZOOM", &or_default("VENUEMAP_DETAIL_ZOOM", "17"))?;
    let default_zoom =
        parse_zoom("VENUEMAP_DEFAULT_ZOOM", &or_default("VENUEMAP_DEFAULT_ZOOM", "12"))?;
    let default_center = parse_var(
        "VENUEMAP_DEFAULT_CENTER",
        &or_default("VENUEMAP_DEFAULT_CENTER", "40.7306,-73.9866"),
    )?;
    let home_position = lookup("VENUEMAP_HOME_POSITION")
        .ok()
        .map(|raw| parse_var::<Coordinates>("VENUEMAP_HOME_POSITION", &raw))
        .transpose()?;

    Ok(AppConfig {
        env,
        log_level,
        catalog_path,
        places_base_url,
        places_api_key,
        request_timeout_secs,
        user_agent,
        autocomplete_min_chars,
        autocomplete_debounce_ms,
        search_max_retries,
        retry_backoff_base_ms,
        detail_zoom,
        default_center,
        default_zoom,
        home_position,
    })
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Web map zoom levels run from 0 (world) to 22 (building).
fn parse_zoom(var: &str, raw: &str) -> Result<u8, ConfigError> {
    let zoom: u8 = parse_var(var, raw)?;
    if zoom > 22 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("zoom {zoom} is outside 0..=22"),
        });
    }
    Ok(zoom)
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VENUEMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
