use crate::app_config::{AppConfig, Environment, LOCAL_ORIGINS};
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
/// The lookup is injected so parsing can be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::{IpAddr, SocketAddr};

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let raw_url = require("SUPABASE_URL")?;
    let database_url =
        url::Url::parse(raw_url.trim()).map_err(|e| invalid("SUPABASE_URL", e.to_string()))?;
    if !matches!(database_url.scheme(), "http" | "https") {
        return Err(invalid(
            "SUPABASE_URL",
            format!("unsupported scheme '{}'", database_url.scheme()),
        ));
    }
    let database_key = require("SUPABASE_KEY")?;

    let env = parse_environment(&or_default("BRANDINTEL_ENV", "development"));

    let host: IpAddr = or_default("HOST", "0.0.0.0")
        .parse()
        .map_err(|e: std::net::AddrParseError| invalid("HOST", e.to_string()))?;
    let port: u16 = or_default("PORT", "8001")
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid("PORT", e.to_string()))?;

    let log_level = or_default("BRANDINTEL_LOG_LEVEL", "info");
    let db_timeout_secs: u64 = or_default("BRANDINTEL_DB_TIMEOUT_SECS", "30")
        .parse()
        .map_err(|e: std::num::ParseIntError| invalid("BRANDINTEL_DB_TIMEOUT_SECS", e.to_string()))?;

    let allowed_origins = allowed_origins(lookup("FRONTEND_URL").ok().as_deref());

    Ok(AppConfig {
        database_url,
        database_key,
        env,
        bind_addr: SocketAddr::new(host, port),
        log_level,
        allowed_origins,
        db_timeout_secs,
    })
}

/// Localhost variants followed by every configured origin, trimmed and de-duplicated.
fn allowed_origins(frontend_url: Option<&str>) -> Vec<String> {
    let mut origins: Vec<String> = LOCAL_ORIGINS.iter().map(|o| (*o).to_string()).collect();
    for origin in frontend_url
        .unwrap_or_default()
        .split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
    {
        if !origins.iter().any(|existing| existing == origin) {
            origins.push(origin.to_string());
        }
    }
    origins
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
